pub mod config;
pub mod feed;
pub mod input;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::hex::layout::{self, Layout, LayoutMode, LayoutParams, Viewport};
use crate::hex::tile::{Tile, TileId};
use crate::interact::controller::{ClickSink, Controller, Transition};
use crate::render::camera::{Gesture, ViewTransform};
use crate::render::scene::{self, Scene, SceneStyle};
use config::HiveConfig;
use feed::MetaFeed;

/// The host-facing hive: owns the tile batch and the interaction controller,
/// turns screen-space pointer input into tile events and hands out a scene
/// per frame. Nothing is generated or drawn until it is attached to a surface.
pub struct HiveMap {
    params: LayoutParams,
    feed: MetaFeed,
    viewport_override: Option<Viewport>,
    style: SceneStyle,
    seed: u64,
    rng: ChaCha8Rng,
    layout: Layout,
    controller: Controller,
    viewport: Option<Viewport>,
    /// Tile under the cursor, as last reported to the controller.
    pointer_over: Option<TileId>,
}

impl HiveMap {
    pub fn new(config: &HiveConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        log::info!("hive seed: {seed}");
        Self {
            params: config.layout.clone(),
            feed: config.feed.clone(),
            viewport_override: config.viewport_override(),
            style: SceneStyle {
                show_labels: config.display.show_labels,
                ..SceneStyle::default()
            },
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            layout: Layout::empty(),
            controller: Controller::new(config.interaction.clone()),
            viewport: None,
            pointer_over: None,
        }
    }

    pub fn set_sink(&mut self, sink: ClickSink) {
        self.controller.set_sink(sink);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_attached(&self) -> bool {
        self.viewport.is_some()
    }

    /// Size the batch was laid out against.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.layout.tiles
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn mode(&self) -> LayoutMode {
        self.params.mode
    }

    pub fn show_labels(&self) -> bool {
        self.style.show_labels
    }

    pub fn set_show_labels(&mut self, show: bool) {
        self.style.show_labels = show;
    }

    pub fn hovered_tile(&self) -> Option<&Tile> {
        self.controller.hovered().and_then(|id| self.layout.get(id))
    }

    /// Mount on a surface of `viewport` size. The RNG restarts from the seed,
    /// so attaching again after a detach reproduces the same batch.
    pub fn attach(&mut self, viewport: Viewport, now: f64) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.viewport = Some(self.viewport_override.unwrap_or(viewport).or_nominal());
        self.rebuild(now, true);
    }

    /// Replace the batch wholesale for a new surface size.
    pub fn resize(&mut self, viewport: Viewport, now: f64) {
        if self.viewport.is_none() || self.viewport_override.is_some() {
            return;
        }
        let viewport = viewport.or_nominal();
        if self.viewport == Some(viewport) {
            return;
        }
        self.viewport = Some(viewport);
        self.rebuild(now, true);
    }

    /// Draw a fresh batch for the current surface. The view stays where the
    /// user left it.
    pub fn regenerate(&mut self, now: f64) {
        if self.viewport.is_some() {
            self.rebuild(now, false);
        }
    }

    pub fn set_mode(&mut self, mode: LayoutMode, now: f64) {
        if self.params.mode != mode {
            self.params.mode = mode;
            self.regenerate(now);
        }
    }

    pub fn set_params(&mut self, params: LayoutParams, now: f64) {
        if self.params != params {
            self.params = params;
            self.regenerate(now);
        }
    }

    /// New batch for the current viewport. `remount` restarts the camera
    /// and entrance; otherwise the current view is kept.
    fn rebuild(&mut self, now: f64, remount: bool) {
        let Some(viewport) = self.viewport else {
            return;
        };
        self.layout = layout::generate(viewport, &self.params, &self.feed, &mut self.rng);
        self.pointer_over = None;
        self.controller.install(&self.layout.tiles);
        if remount || !self.controller.is_mounted() {
            self.controller.mount(viewport.center(), now);
        }
    }

    /// Cancel timers and animations and drop the surface. The batch is kept
    /// but nothing reacts until the next attach.
    pub fn detach(&mut self) {
        self.controller.unmount();
        self.viewport = None;
        self.pointer_over = None;
    }

    /// Route a cursor position (screen space) to enter/leave events.
    pub fn pointer_moved(&mut self, pos: Vec2, now: f64) {
        if !self.controller.is_mounted() {
            return;
        }
        let hit = hit_test(
            &self.layout.tiles,
            self.controller.raised(),
            self.controller.camera().current(),
            pos,
        )
        .map(|i| self.layout.tiles[i].id.clone());
        if hit == self.pointer_over {
            return;
        }
        if let Some(old) = self.pointer_over.take() {
            self.controller.on_leave(&old, now);
        }
        if let Some(new) = &hit {
            self.controller.on_enter(new, now);
        }
        self.pointer_over = hit;
    }

    pub fn pointer_left(&mut self, now: f64) {
        if let Some(old) = self.pointer_over.take() {
            self.controller.on_leave(&old, now);
        }
    }

    /// Click at a screen position; returns the id of the tile hit, if any.
    pub fn click_at(&mut self, pos: Vec2, now: f64) -> Option<TileId> {
        if !self.controller.is_mounted() {
            return None;
        }
        let i = hit_test(
            &self.layout.tiles,
            self.controller.raised(),
            self.controller.camera().current(),
            pos,
        )?;
        let tile = &self.layout.tiles[i];
        self.controller.on_click(tile, now);
        Some(tile.id.clone())
    }

    pub fn gesture(&mut self, gesture: &Gesture) -> bool {
        self.controller.on_gesture(gesture)
    }

    pub fn reset_view(&mut self, now: f64) {
        if let Some(viewport) = self.viewport {
            self.controller.reset_view(viewport.center(), now);
        }
    }

    /// Advance the controller; true while anything is still animating.
    pub fn tick(&mut self, now: f64) -> bool {
        self.controller.tick(now)
    }

    pub fn take_transitions(&mut self) -> Vec<Transition> {
        self.controller.take_transitions()
    }

    /// The frame to paint, or `None` while there is no surface.
    pub fn scene(&self, now: f64) -> Option<Scene> {
        self.viewport?;
        Some(scene::project(&self.layout.tiles, &self.controller, &self.style, now))
    }
}

/// Index of the topmost tile under `screen`: the raised tile first, then the
/// rest in reverse acceptance order.
pub fn hit_test(tiles: &[Tile], raised: Option<&TileId>, transform: ViewTransform, screen: Vec2) -> Option<usize> {
    if transform.scale <= 0.0 {
        return None;
    }
    let world = transform.invert(screen);
    if let Some(i) = raised.and_then(|id| tiles.iter().position(|t| &t.id == id)) {
        if tiles[i].contains(world) {
            return Some(i);
        }
    }
    tiles.iter().rposition(|t| t.contains(world))
}
