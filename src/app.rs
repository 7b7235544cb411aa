use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::hex::tile::Tile;
use crate::hive::config::HiveConfig;
use crate::hive::input::{HiveAction, InputState, KeyBind, PointerButton, PointerMotion, PointerState, ScrollDelta};
use crate::hive::HiveMap;
use crate::render::engine::RenderEngine;
use crate::render::frame::FrameClock;
use crate::render::painter::paint_scene;
use crate::ui::detail::stream_detail;
use crate::ui::settings::settings_menu;
use crate::ui::style::HivePalette;
use crate::ui::tooltip::stream_tooltip;

pub struct App {
    config: HiveConfig,
    hive: HiveMap,
    input: InputState,
    pointer: PointerState,
    clock: FrameClock,
    engine: Option<RenderEngine>,
    clicks: Receiver<Tile>,
    selected: Option<Tile>,
    settings_open: bool,
    rebinding: Option<HiveAction>,
}

impl App {
    pub fn new(config: HiveConfig) -> Self {
        let (tx, clicks) = mpsc::channel();
        let mut hive = HiveMap::new(&config);
        hive.set_sink(Box::new(move |tile: &Tile| {
            let _ = tx.send(tile.clone());
        }));
        Self {
            input: InputState::new(config.key_bindings.clone()),
            config,
            hive,
            pointer: PointerState::default(),
            clock: FrameClock::new(),
            engine: None,
            clicks,
            selected: None,
            settings_open: false,
            rebinding: None,
        }
    }

    fn request_redraw(&self) {
        if let Some(engine) = &self.engine {
            engine.gpu.window.request_redraw();
        }
    }

    fn apply_actions(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.clock.now();
        for action in self.input.drain_pressed() {
            match action {
                HiveAction::Regenerate => self.hive.regenerate(now),
                HiveAction::ToggleLayoutMode => {
                    self.config.layout.mode = self.config.layout.mode.toggled();
                    log::info!("layout mode: {}", self.config.layout.mode.display_name());
                }
                HiveAction::ResetView => self.hive.reset_view(now),
                HiveAction::ToggleLabels => {
                    self.config.display.show_labels = !self.config.display.show_labels;
                }
                HiveAction::OpenSettings => self.settings_open = !self.settings_open,
                HiveAction::Quit => {
                    self.hive.detach();
                    event_loop.exit();
                }
            }
        }
        self.sync_config(now);
    }

    /// Push edited settings into the hive; a changed layout regenerates.
    fn sync_config(&mut self, now: f64) {
        if self.hive.params() != &self.config.layout {
            self.hive.set_params(self.config.layout.clone(), now);
        }
        self.hive.set_show_labels(self.config.display.show_labels);
    }

    fn on_key(&mut self, code: KeyCode, pressed: bool, egui_wants_keys: bool) {
        if pressed {
            if let Some(action) = self.rebinding.take() {
                if code != KeyCode::Escape {
                    let bind = KeyBind {
                        code,
                        shift: self.input.shift_held,
                    };
                    self.input.rebind(action, bind);
                    self.config.key_bindings.insert(action, bind);
                    log::info!("{} bound to {}", action.display_name(), bind.display_name());
                }
                return;
            }
        }
        if !egui_wants_keys || !pressed {
            self.input.on_key_event(code, pressed);
        }
    }

    fn on_cursor_moved(&mut self, pos: Vec2, over_ui: bool) {
        let now = self.clock.now();
        match self.pointer.on_moved(pos) {
            PointerMotion::Hover(p) if !over_ui => self.hive.pointer_moved(p, now),
            PointerMotion::Hover(_) => self.hive.pointer_left(now),
            PointerMotion::Drag(gesture) => {
                self.hive.gesture(&gesture);
            }
            PointerMotion::Pending => {}
        }
    }

    fn on_mouse_button(&mut self, button: MouseButton, state: ElementState, over_ui: bool) {
        let pressed = state.is_pressed();
        if pressed && over_ui {
            return;
        }
        let button = match button {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
            MouseButton::Middle => PointerButton::Middle,
            _ => PointerButton::Other,
        };
        if let Some((PointerButton::Primary, pos)) = self.pointer.on_button(button, pressed) {
            if !over_ui {
                self.hive.click_at(pos, self.clock.now());
            }
        }
    }

    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.clock.begin_frame();
        let animating = self.hive.tick(now);
        for transition in self.hive.take_transitions() {
            log::debug!("hive transition: {transition:?}");
        }
        while let Ok(tile) = self.clicks.try_recv() {
            self.selected = Some(tile);
        }

        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let Some(scene) = self.hive.scene(now) else {
            return;
        };

        engine.thumbnails.ensure(
            &engine.egui.ctx,
            self.hive.tiles().iter().filter_map(|t| t.meta.thumbnail.as_deref()),
        );

        let window = engine.gpu.window.clone();
        let palette = engine.palette;
        let fps = self.clock.fps;
        let thumbnails = &engine.thumbnails;
        let hive = &self.hive;
        let show_tooltip = self.config.display.show_tooltip && !self.pointer.is_dragging();
        let config = &mut self.config;
        let selected = &mut self.selected;
        let settings_open = &mut self.settings_open;
        let rebinding = &mut self.rebinding;
        let input = &self.input;

        let output = engine.egui.run(&window, |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            paint_scene(&painter, &scene, &palette, thumbnails);

            egui::Area::new(egui::Id::new("hive_status"))
                .anchor(egui::Align2::LEFT_BOTTOM, [12.0, -12.0])
                .interactable(false)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} streams | {} | seed {} | {:.0} fps",
                            hive.tiles().len(),
                            hive.mode().display_name(),
                            hive.seed(),
                            fps
                        ))
                        .small()
                        .color(palette.highlight),
                    );
                });

            if show_tooltip && selected.is_none() {
                if let Some(tile) = hive.hovered_tile() {
                    stream_tooltip(ctx, tile, thumbnails);
                }
            }
            stream_detail(ctx, selected, thumbnails);
            settings_menu(ctx, settings_open, config, input, rebinding);
        });

        let egui_repaint = output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|v| v.repaint_delay.is_zero());

        match engine.draw_and_submit(&output) {
            Ok(frame) => frame.present(),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                engine.gpu.surface.configure(&engine.gpu.device, &engine.gpu.config);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                event_loop.exit();
            }
            Err(e) => log::error!("render error: {e:?}"),
        }

        self.sync_config(now);
        if animating || egui_repaint {
            self.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title("Hive Map")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("create window"),
        );
        let engine = RenderEngine::new(window, HivePalette::default());
        self.hive.attach(engine.viewport(), self.clock.now());
        self.engine = Some(engine);
        self.request_redraw();
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.hive.detach();
        self.engine = None;
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let consumed = engine.egui.on_window_event(&engine.gpu.window, &event);
        let over_ui = engine.egui.wants_pointer_input();
        let egui_wants_keys = engine.egui.wants_keyboard_input();
        let scale = engine.scale_factor();
        if consumed {
            engine.gpu.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                self.hive.detach();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                engine.gpu.resize(new_size.width, new_size.height);
                let viewport = engine.viewport();
                self.hive.resize(viewport, self.clock.now());
                self.request_redraw();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.on_key(code, event.state.is_pressed(), egui_wants_keys);
                    self.apply_actions(event_loop);
                    self.request_redraw();
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.pointer.set_ctrl(modifiers.state().control_key());
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32) / scale;
                self.on_cursor_moved(pos, over_ui);
                self.request_redraw();
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer.on_left();
                self.hive.pointer_left(self.clock.now());
                self.request_redraw();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.on_mouse_button(button, state, over_ui);
                self.request_redraw();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if over_ui {
                    return;
                }
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => ScrollDelta::Lines(y),
                    MouseScrollDelta::PixelDelta(p) => ScrollDelta::Pixels(p.y as f32 / scale),
                };
                if let Some(gesture) = self.pointer.on_wheel(delta) {
                    self.hive.gesture(&gesture);
                }
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}
