/// Easing curves used by presentation tweens and the entrance animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ease {
    Linear,
    #[default]
    CubicInOut,
    OutCubic,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
            Self::OutCubic => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
        }
    }
}

/// Scalar animated from `from` to `to` over `[start, start + duration]`.
/// Times are seconds on the host frame clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    start: f64,
    duration: f64,
    ease: Ease,
}

impl Tween {
    pub fn settled(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            start: 0.0,
            duration: 0.0,
            ease: Ease::Linear,
        }
    }

    pub fn new(from: f32, to: f32, start: f64, duration: f64, ease: Ease) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            ease,
        }
    }

    pub fn value(&self, now: f64) -> f32 {
        if self.duration <= 0.0 || now >= self.start + self.duration {
            return self.to;
        }
        if now <= self.start {
            return self.from;
        }
        let t = ((now - self.start) / self.duration) as f32;
        self.from + (self.to - self.from) * self.ease.apply(t)
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration.max(0.0)
    }

    pub fn is_done(&self, now: f64) -> bool {
        now >= self.end()
    }

    /// Continue from the value shown at `now` toward `to`. Retargeting to the
    /// current target keeps the running tween.
    pub fn retarget(&mut self, to: f32, now: f64, duration: f64, ease: Ease) {
        if self.to == to {
            return;
        }
        *self = Self::new(self.value(now), to, now, duration, ease);
    }
}
