use std::sync::Arc;
use winit::window::Window;

/// egui context plus its winit input adapter and wgpu renderer.
pub struct EguiIntegration {
    pub ctx: egui::Context,
    state: egui_winit::State,
    pub renderer: egui_wgpu::Renderer,
}

impl EguiIntegration {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, window: Arc<Window>) -> Self {
        let ctx = egui::Context::default();
        let viewport_id = ctx.viewport_id();
        let state = egui_winit::State::new(ctx.clone(), viewport_id, &window, None, None, None);
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());
        Self { ctx, state, renderer }
    }

    /// Feed a window event to egui. Returns true when egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Pointer is over an egui window or being dragged by one.
    pub fn wants_pointer_input(&self) -> bool {
        self.ctx.wants_pointer_input() || self.ctx.is_pointer_over_area()
    }

    pub fn wants_keyboard_input(&self) -> bool {
        self.ctx.wants_keyboard_input()
    }

    /// Run one egui pass with `build` and forward platform output (cursor
    /// icon, clipboard) to the window.
    pub fn run(&mut self, window: &Window, build: impl FnMut(&egui::Context)) -> egui::FullOutput {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, build);
        self.state
            .handle_platform_output(window, full_output.platform_output.clone());
        full_output
    }

    /// Tessellate and upload textures and buffers for `full_output`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        screen: &egui_wgpu::ScreenDescriptor,
        full_output: &egui::FullOutput,
    ) -> Vec<egui::ClippedPrimitive> {
        let jobs = self
            .ctx
            .tessellate(full_output.shapes.clone(), full_output.pixels_per_point);
        for (id, delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        self.renderer.update_buffers(device, queue, encoder, &jobs, screen);
        jobs
    }

    pub fn free_textures(&mut self, full_output: &egui::FullOutput) {
        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
