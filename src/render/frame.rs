use std::time::Instant;

/// Longest frame delta reported; a stalled window should not fast-forward
/// animations in one jump.
const MAX_FRAME_TIME: f64 = 0.25;
const FPS_WINDOW: usize = 60;

/// Host frame clock. `now` is seconds since the clock was created and is
/// the time base for every tween, timer and entrance in the hive.
pub struct FrameClock {
    origin: Instant,
    last_frame: Option<Instant>,
    elapsed: f64,
    fps_samples: Vec<f64>,
    pub fps: f64,
    pub frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_frame: None,
            elapsed: 0.0,
            fps_samples: Vec::with_capacity(FPS_WINDOW),
            fps: 0.0,
            frames: 0,
        }
    }

    /// Call once per redraw. Returns the current time in seconds.
    pub fn begin_frame(&mut self) -> f64 {
        self.begin_frame_at(Instant::now())
    }

    pub fn begin_frame_at(&mut self, at: Instant) -> f64 {
        let dt = at.saturating_duration_since(self.anchor()).as_secs_f64();
        self.last_frame = Some(at);
        self.advance(dt)
    }

    /// Live time for input events between redraws. Matches what the next
    /// `begin_frame` would return at the same instant, so an event never
    /// lands behind the frame that first shows it.
    pub fn now(&self) -> f64 {
        self.now_at(Instant::now())
    }

    pub fn now_at(&self, at: Instant) -> f64 {
        let since = at.saturating_duration_since(self.anchor()).as_secs_f64();
        self.elapsed + since.min(MAX_FRAME_TIME)
    }

    /// Time of the last frame.
    pub fn frame_time(&self) -> f64 {
        self.elapsed
    }

    fn anchor(&self) -> Instant {
        self.last_frame.unwrap_or(self.origin)
    }

    fn advance(&mut self, raw_dt: f64) -> f64 {
        self.frames += 1;
        self.elapsed += raw_dt.clamp(0.0, MAX_FRAME_TIME);
        if raw_dt > 0.0 {
            self.fps_samples.push(raw_dt);
            if self.fps_samples.len() > FPS_WINDOW {
                self.fps_samples.remove(0);
            }
            let avg: f64 = self.fps_samples.iter().sum::<f64>() / self.fps_samples.len() as f64;
            self.fps = 1.0 / avg;
        }
        self.elapsed
    }
}
