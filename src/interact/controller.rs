use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::timer::Debounce;
use super::tween::{Ease, Tween};
use crate::hex::tile::{Tile, TileId};
use crate::render::camera::{Camera, Gesture, ScaleExtent, ViewTransform};

/// Receives every clicked tile exactly once per click.
pub type ClickSink = Box<dyn FnMut(&Tile)>;

/// Timings in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub hover_grace: f64,
    pub hover_in: f64,
    pub hover_out: f64,
    pub dim_opacity: f32,
    pub pulse_up: f64,
    pub pulse_down: f64,
    pub pulse_scale: f32,
    pub entrance: f64,
    pub entrance_scale: f32,
    pub scale_extent: ScaleExtent,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hover_grace: 0.05,
            hover_in: 0.15,
            hover_out: 0.2,
            dim_opacity: 0.3,
            pulse_up: 0.08,
            pulse_down: 0.2,
            pulse_scale: 1.1,
            entrance: 1.0,
            entrance_scale: 0.8,
            scale_extent: ScaleExtent::default(),
        }
    }
}

/// Observable state changes, drained by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Hovered(TileId),
    Reset,
    Clicked(TileId),
}

/// Hover role of a tile right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Idle,
    Emphasized,
    Dimmed,
}

#[derive(Clone, Copy, Debug)]
struct TileVisual {
    opacity: Tween,
    emphasis: Tween,
}

impl TileVisual {
    fn resting() -> Self {
        Self {
            opacity: Tween::settled(1.0),
            emphasis: Tween::settled(0.0),
        }
    }
}

/// Animated presentation values for one tile at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePresentation {
    pub opacity: f32,
    /// 0 = resting stroke, 1 = hover stroke and glow.
    pub emphasis: f32,
    /// 0 = at rest, 1 = peak of the click pulse.
    pub pulse: f32,
}

impl TilePresentation {
    pub const RESTING: TilePresentation = TilePresentation {
        opacity: 1.0,
        emphasis: 0.0,
        pulse: 0.0,
    };
}

/// Owns hover state, the hover-reset timer, click pulses and the camera.
/// Never creates or destroys tiles; presentation state is keyed by id.
pub struct Controller {
    config: InteractionConfig,
    hovered: Option<TileId>,
    raised: Option<TileId>,
    visuals: HashMap<TileId, TileVisual>,
    pulses: HashMap<TileId, f64>,
    reset_timer: Debounce<TileId>,
    camera: Camera,
    sink: Option<ClickSink>,
    transitions: Vec<Transition>,
    mounted: bool,
}

impl Controller {
    pub fn new(config: InteractionConfig) -> Self {
        let camera = Camera::new(config.scale_extent);
        Self {
            config,
            hovered: None,
            raised: None,
            visuals: HashMap::new(),
            pulses: HashMap::new(),
            reset_timer: Debounce::default(),
            camera,
            sink: None,
            transitions: Vec::new(),
            mounted: false,
        }
    }

    pub fn set_sink(&mut self, sink: ClickSink) {
        self.sink = Some(sink);
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn hovered(&self) -> Option<&TileId> {
        self.hovered.as_ref()
    }

    /// Tile drawn last, i.e. on top of its neighbors.
    pub fn raised(&self) -> Option<&TileId> {
        self.raised.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Start the entrance toward `translate(center) · scale(entrance_scale)`.
    pub fn mount(&mut self, center: Vec2, now: f64) {
        self.mounted = true;
        self.camera.reset();
        let target = ViewTransform::new(center, self.config.entrance_scale);
        self.camera.begin_entrance(target, now, self.config.entrance);
    }

    /// Replace presentation state for a fresh batch.
    pub fn install(&mut self, tiles: &[Tile]) {
        self.reset_timer.cancel();
        self.hovered = None;
        self.raised = None;
        self.pulses.clear();
        self.visuals = tiles
            .iter()
            .map(|t| (t.id.clone(), TileVisual::resting()))
            .collect();
    }

    pub fn on_enter(&mut self, id: &TileId, now: f64) {
        if !self.mounted || !self.visuals.contains_key(id) {
            return;
        }
        self.reset_timer.cancel();
        if self.hovered.as_ref() == Some(id) {
            return;
        }

        let cfg = &self.config;
        for (tile, visual) in self.visuals.iter_mut() {
            let (opacity, emphasis) = if tile == id {
                (1.0, 1.0)
            } else {
                (cfg.dim_opacity, 0.0)
            };
            visual.opacity.retarget(opacity, now, cfg.hover_in, Ease::CubicInOut);
            visual.emphasis.retarget(emphasis, now, cfg.hover_in, Ease::CubicInOut);
        }
        self.hovered = Some(id.clone());
        self.raised = Some(id.clone());
        log::debug!("hover enter {id}");
        self.transitions.push(Transition::Hovered(id.clone()));
    }

    /// Leaving anything but the hovered tile is ignored; otherwise the reset
    /// waits out the grace period so moving between tiles never flashes.
    pub fn on_leave(&mut self, id: &TileId, now: f64) {
        if !self.mounted || self.hovered.as_ref() != Some(id) {
            return;
        }
        self.reset_timer.schedule(now + self.config.hover_grace, id.clone());
    }

    pub fn on_click(&mut self, tile: &Tile, now: f64) {
        if !self.mounted {
            return;
        }
        self.pulses.insert(tile.id.clone(), now);
        log::info!("Clicked stream: {} - {} viewers", tile.meta.title, tile.meta.viewers);
        self.transitions.push(Transition::Clicked(tile.id.clone()));
        if let Some(sink) = self.sink.as_mut() {
            sink(tile);
        }
    }

    /// Externally computed transform; clamped and coalesced like gestures.
    pub fn on_zoom(&mut self, transform: ViewTransform) {
        if self.mounted {
            self.camera.request(transform);
        }
    }

    /// Returns whether the gesture moved the camera.
    pub fn on_gesture(&mut self, gesture: &Gesture) -> bool {
        if !self.mounted {
            return false;
        }
        if !gesture.is_accepted() {
            log::debug!("gesture filtered: {gesture:?}");
            return false;
        }
        self.camera.apply_gesture(gesture);
        true
    }

    /// Re-run the entrance toward the default view.
    pub fn reset_view(&mut self, center: Vec2, now: f64) {
        if self.mounted {
            let target = ViewTransform::new(center, self.config.entrance_scale);
            self.camera.begin_entrance(target, now, self.config.entrance);
        }
    }

    /// Advance timers and the camera. Returns whether anything is still
    /// animating, so the host knows to keep requesting frames.
    pub fn tick(&mut self, now: f64) -> bool {
        if !self.mounted {
            return false;
        }
        if let Some(id) = self.reset_timer.take_due(now) {
            // Only the leave of the still-hovered tile may reset.
            if self.hovered.as_ref() == Some(&id) {
                self.reset(now);
            }
        }
        self.camera.tick(now);

        let cycle = self.pulse_cycle();
        self.pulses.retain(|_, start| now < *start + cycle);

        self.camera.is_animating()
            || self.camera.pending().is_some()
            || !self.pulses.is_empty()
            || self.reset_timer.pending().is_some()
            || self
                .visuals
                .values()
                .any(|v| !v.opacity.is_done(now) || !v.emphasis.is_done(now))
    }

    fn reset(&mut self, now: f64) {
        let cfg = &self.config;
        for visual in self.visuals.values_mut() {
            visual.opacity.retarget(1.0, now, cfg.hover_out, Ease::CubicInOut);
            visual.emphasis.retarget(0.0, now, cfg.hover_out, Ease::CubicInOut);
        }
        if let Some(id) = self.hovered.take() {
            log::debug!("hover reset after {id}");
        }
        self.transitions.push(Transition::Reset);
    }

    /// Cancel every pending timer, transform and animation. Nothing fires
    /// after this until the next mount.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.reset_timer.cancel();
        self.camera.cancel();
        self.pulses.clear();
        self.hovered = None;
        self.raised = None;
    }

    pub fn emphasis(&self, id: &TileId) -> Emphasis {
        match &self.hovered {
            None => Emphasis::Idle,
            Some(h) if h == id => Emphasis::Emphasized,
            Some(_) => Emphasis::Dimmed,
        }
    }

    pub fn presentation(&self, id: &TileId, now: f64) -> TilePresentation {
        let Some(visual) = self.visuals.get(id) else {
            return TilePresentation::RESTING;
        };
        TilePresentation {
            opacity: visual.opacity.value(now),
            emphasis: visual.emphasis.value(now),
            pulse: self.pulse(id, now),
        }
    }

    fn pulse_cycle(&self) -> f64 {
        self.config.pulse_up.max(0.0) + self.config.pulse_down.max(0.0)
    }

    fn pulse(&self, id: &TileId, now: f64) -> f32 {
        let Some(&start) = self.pulses.get(id) else {
            return 0.0;
        };
        let t = now - start;
        let up = self.config.pulse_up;
        let down = self.config.pulse_down;
        if t < 0.0 || t >= up + down {
            0.0
        } else if t < up {
            Ease::CubicInOut.apply((t / up) as f32)
        } else {
            1.0 - Ease::CubicInOut.apply(((t - up) / down) as f32)
        }
    }

    pub fn take_transitions(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.transitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::tile::TileMeta;
    use crate::hive::input::PointerButton;
    use crate::render::camera::GestureKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tiles(n: usize) -> Vec<Tile> {
        (0..n)
            .map(|i| Tile {
                id: TileId::from_index(i),
                axial: None,
                pixel: Vec2::new(i as f32 * 400.0, 0.0),
                radius: 180.0,
                meta: TileMeta {
                    title: format!("Stream {i}"),
                    viewers: 100 + i as u32,
                    popularity: 20.0,
                    thumbnail: None,
                    active: true,
                },
            })
            .collect()
    }

    fn mounted(n: usize) -> (Controller, Vec<Tile>) {
        let mut c = Controller::new(InteractionConfig::default());
        let t = tiles(n);
        c.install(&t);
        c.mount(Vec2::new(960.0, 540.0), 0.0);
        (c, t)
    }

    fn id(i: usize) -> TileId {
        TileId::from_index(i)
    }

    #[test]
    fn test_hover_exclusivity() {
        let (mut c, _) = mounted(5);
        c.on_enter(&id(1), 0.0);
        c.on_enter(&id(3), 0.01);
        let emphasized: Vec<usize> = (0..5)
            .filter(|&i| c.emphasis(&id(i)) == Emphasis::Emphasized)
            .collect();
        assert_eq!(emphasized, vec![3]);
        assert_eq!(c.emphasis(&id(1)), Emphasis::Dimmed);
        assert_eq!(c.raised(), Some(&id(3)));
    }

    #[test]
    fn test_enter_then_leave_resets_after_grace() {
        let (mut c, _) = mounted(3);
        c.on_enter(&id(0), 1.0);
        c.on_leave(&id(0), 1.2);
        c.tick(1.24);
        assert_eq!(c.hovered(), Some(&id(0)));
        c.tick(1.26);
        assert_eq!(c.hovered(), None);
        assert_eq!(
            c.take_transitions(),
            vec![Transition::Hovered(id(0)), Transition::Reset]
        );
        // Raise order survives the reset.
        assert_eq!(c.raised(), Some(&id(0)));
    }

    #[test]
    fn test_moving_between_tiles_never_resets() {
        let (mut c, _) = mounted(3);
        c.on_enter(&id(0), 0.0);
        c.on_leave(&id(0), 0.5);
        c.on_enter(&id(1), 0.52);
        for step in 0..20 {
            c.tick(0.52 + step as f64 * 0.01);
        }
        assert_eq!(c.hovered(), Some(&id(1)));
        assert_eq!(
            c.take_transitions(),
            vec![Transition::Hovered(id(0)), Transition::Hovered(id(1))]
        );
    }

    #[test]
    fn test_leave_of_other_tile_ignored() {
        let (mut c, _) = mounted(3);
        c.on_enter(&id(2), 0.0);
        c.on_leave(&id(0), 0.1);
        c.tick(1.0);
        assert_eq!(c.hovered(), Some(&id(2)));
    }

    #[test]
    fn test_reenter_same_tile_cancels_reset() {
        let (mut c, _) = mounted(2);
        c.on_enter(&id(0), 0.0);
        c.on_leave(&id(0), 0.1);
        c.on_enter(&id(0), 0.12);
        c.tick(0.5);
        assert_eq!(c.hovered(), Some(&id(0)));
        assert_eq!(c.take_transitions(), vec![Transition::Hovered(id(0))]);
    }

    #[test]
    fn test_hover_tweens_dim_others() {
        let (mut c, _) = mounted(3);
        c.on_enter(&id(1), 0.0);
        let hovered = c.presentation(&id(1), 0.15);
        let other = c.presentation(&id(0), 0.15);
        assert_eq!(hovered.emphasis, 1.0);
        assert_eq!(hovered.opacity, 1.0);
        assert!((other.opacity - 0.3).abs() < 1e-6);
        let midway = c.presentation(&id(0), 0.075);
        assert!(midway.opacity < 1.0 && midway.opacity > 0.3);
    }

    #[test]
    fn test_click_pulses_and_calls_sink_once() {
        let (mut c, t) = mounted(5);
        let seen: Rc<RefCell<Vec<TileId>>> = Rc::default();
        let sink_seen = Rc::clone(&seen);
        c.set_sink(Box::new(move |tile: &Tile| sink_seen.borrow_mut().push(tile.id.clone())));

        c.on_click(&t[3], 2.0);
        assert_eq!(*seen.borrow(), vec![id(3)]);
        assert_eq!(c.take_transitions(), vec![Transition::Clicked(id(3))]);

        assert!((c.presentation(&id(3), 2.08).pulse - 1.0).abs() < 1e-5);
        assert!(c.presentation(&id(3), 2.18).pulse > 0.0);
        c.tick(2.3);
        assert_eq!(c.presentation(&id(3), 2.3).pulse, 0.0);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_gestures_filtered_and_clamped() {
        let (mut c, _) = mounted(1);
        c.tick(5.0);
        let ctrl_zoom = Gesture {
            kind: GestureKind::Zoom {
                anchor: Vec2::ZERO,
                factor: 3.0,
            },
            ctrl: true,
            button: None,
        };
        assert!(!c.on_gesture(&ctrl_zoom));
        let right_pan = Gesture {
            kind: GestureKind::Pan(Vec2::ONE),
            ctrl: false,
            button: Some(PointerButton::Secondary),
        };
        assert!(!c.on_gesture(&right_pan));

        c.on_zoom(ViewTransform::new(Vec2::ZERO, 40.0));
        c.tick(5.1);
        assert_eq!(c.camera().current().scale, 1.5);
        c.on_zoom(ViewTransform::new(Vec2::ZERO, 0.01));
        c.tick(5.2);
        assert_eq!(c.camera().current().scale, 0.3);
    }

    #[test]
    fn test_transforms_coalesce_until_tick() {
        let (mut c, _) = mounted(1);
        c.tick(2.0);
        for i in 1..=5 {
            c.on_zoom(ViewTransform::new(Vec2::splat(i as f32), 1.0));
        }
        assert_eq!(c.camera().current().translate, Vec2::new(960.0, 540.0));
        c.tick(2.01);
        assert_eq!(c.camera().current().translate, Vec2::splat(5.0));
    }

    #[test]
    fn test_entrance_reaches_target() {
        let (mut c, _) = mounted(1);
        assert!(c.tick(0.5));
        c.tick(1.0);
        let t = c.camera().current();
        assert_eq!(t.translate, Vec2::new(960.0, 540.0));
        assert_eq!(t.scale, 0.8);
    }

    #[test]
    fn test_unmount_cancels_everything() {
        let (mut c, t) = mounted(3);
        let calls = Rc::new(RefCell::new(0));
        let sink_calls = Rc::clone(&calls);
        c.set_sink(Box::new(move |_| *sink_calls.borrow_mut() += 1));

        c.on_enter(&id(0), 0.0);
        c.on_leave(&id(0), 0.1);
        c.on_zoom(ViewTransform::new(Vec2::ZERO, 1.2));
        c.take_transitions();
        c.unmount();

        assert!(!c.tick(5.0));
        c.on_enter(&id(1), 5.0);
        c.on_click(&t[1], 5.0);
        assert!(c.take_transitions().is_empty());
        assert_eq!(*calls.borrow(), 0);
        assert_ne!(c.camera().current().scale, 1.2);
    }

    #[test]
    fn test_unmount_drops_raised_tile() {
        let (mut c, _) = mounted(3);
        c.on_enter(&id(1), 0.0);
        assert_eq!(c.raised(), Some(&id(1)));
        c.unmount();
        assert_eq!(c.raised(), None);
        assert_eq!(c.emphasis(&id(1)), Emphasis::Idle);
    }

    #[test]
    fn test_install_drops_stale_state() {
        let (mut c, _) = mounted(3);
        c.on_enter(&id(2), 0.0);
        c.on_leave(&id(2), 0.1);
        c.install(&tiles(2));
        assert_eq!(c.hovered(), None);
        assert_eq!(c.raised(), None);
        c.tick(1.0);
        assert_eq!(c.take_transitions(), vec![Transition::Hovered(id(2))]);
        assert_eq!(c.presentation(&id(2), 1.0), TilePresentation::RESTING);
    }
}
