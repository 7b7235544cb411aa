use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::hive::input::PointerButton;
use crate::interact::tween::Ease;

/// Screen = world · scale + translate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn new(translate: Vec2, scale: f32) -> Self {
        Self { translate, scale }
    }

    pub fn apply(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.translate
    }

    pub fn invert(&self, screen: Vec2) -> Vec2 {
        (screen - self.translate) / self.scale
    }

    pub fn clamped(self, extent: ScaleExtent) -> Self {
        Self {
            scale: extent.clamp(self.scale),
            ..self
        }
    }

    pub fn panned(self, delta: Vec2) -> Self {
        Self {
            translate: self.translate + delta,
            ..self
        }
    }

    /// Scale by `factor` keeping the world point under `anchor` fixed.
    pub fn zoomed_at(self, anchor: Vec2, factor: f32, extent: ScaleExtent) -> Self {
        let world = self.invert(anchor);
        let scale = extent.clamp(self.scale * factor);
        Self {
            translate: anchor - world * scale,
            scale,
        }
    }

    pub fn lerp(self, to: ViewTransform, t: f32) -> Self {
        Self {
            translate: self.translate.lerp(to.translate, t),
            scale: self.scale + (to.scale - self.scale) * t,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleExtent {
    pub min: f32,
    pub max: f32,
}

impl Default for ScaleExtent {
    fn default() -> Self {
        Self { min: 0.3, max: 1.5 }
    }
}

impl ScaleExtent {
    pub fn clamp(&self, scale: f32) -> f32 {
        if scale.is_finite() {
            scale.clamp(self.min, self.max)
        } else {
            self.min
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureKind {
    Pan(Vec2),
    Zoom { anchor: Vec2, factor: f32 },
}

/// A raw pan/zoom request from the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    pub ctrl: bool,
    /// Held button for drags, `None` for wheel input.
    pub button: Option<PointerButton>,
}

impl Gesture {
    /// Ctrl-modified input and drags with anything but the primary button
    /// belong to the host, not the camera.
    pub fn is_accepted(&self) -> bool {
        !self.ctrl && matches!(self.button, None | Some(PointerButton::Primary))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entrance {
    from: ViewTransform,
    to: ViewTransform,
    start: f64,
    duration: f64,
}

impl Entrance {
    fn at(&self, now: f64) -> (ViewTransform, bool) {
        if self.duration <= 0.0 || now >= self.start + self.duration {
            return (self.to, true);
        }
        let t = ((now - self.start).max(0.0) / self.duration) as f32;
        (self.from.lerp(self.to, Ease::CubicInOut.apply(t)), false)
    }
}

/// Pan/zoom state. Requests land in a single pending slot that `tick`
/// consumes, so several gestures within one frame produce one transform.
#[derive(Clone, Debug)]
pub struct Camera {
    current: ViewTransform,
    pending: Option<ViewTransform>,
    entrance: Option<Entrance>,
    pub extent: ScaleExtent,
}

impl Camera {
    pub fn new(extent: ScaleExtent) -> Self {
        Self {
            current: ViewTransform::IDENTITY,
            pending: None,
            entrance: None,
            extent,
        }
    }

    pub fn current(&self) -> ViewTransform {
        self.current
    }

    pub fn pending(&self) -> Option<ViewTransform> {
        self.pending
    }

    pub fn is_animating(&self) -> bool {
        self.entrance.is_some()
    }

    /// Store `t` (scale clamped) as the transform to apply on the next tick.
    /// A user request ends any running entrance.
    pub fn request(&mut self, t: ViewTransform) {
        self.entrance = None;
        self.pending = Some(t.clamped(self.extent));
    }

    pub fn apply_gesture(&mut self, gesture: &Gesture) {
        let base = self.pending.unwrap_or(self.current);
        let next = match gesture.kind {
            GestureKind::Pan(delta) => base.panned(delta),
            GestureKind::Zoom { anchor, factor } => base.zoomed_at(anchor, factor, self.extent),
        };
        self.request(next);
    }

    pub fn begin_entrance(&mut self, to: ViewTransform, now: f64, duration: f64) {
        self.pending = None;
        self.entrance = Some(Entrance {
            from: self.current,
            to: to.clamped(self.extent),
            start: now,
            duration,
        });
    }

    /// Apply the pending transform or advance the entrance. Returns whether
    /// the current transform changed.
    pub fn tick(&mut self, now: f64) -> bool {
        let before = self.current;
        if let Some(t) = self.pending.take() {
            self.current = t;
        } else if let Some(entrance) = self.entrance {
            let (t, done) = entrance.at(now);
            self.current = t;
            if done {
                self.entrance = None;
            }
        }
        self.current != before
    }

    pub fn reset(&mut self) {
        self.cancel();
        self.current = ViewTransform::IDENTITY;
    }

    /// Drop the pending transform and any entrance; the current one stays.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.entrance = None;
    }
}
