use std::sync::Arc;
use winit::window::Window;

use crate::hex::layout::Viewport;
use crate::ui::integration::EguiIntegration;
use crate::ui::style::{apply_hive_style, HivePalette};
use crate::ui::thumbnails::ThumbnailAtlas;

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub window: Arc<Window>,
}

impl GpuState {
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("request adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("hivemap device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            ..Default::default()
        }))
        .expect("request device");

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Self {
            surface,
            device,
            queue,
            config,
            window,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

/// The drawing surface: GPU state, egui and the thumbnail textures. Exists
/// only while the window does; the hive never draws without one.
pub struct RenderEngine {
    pub gpu: GpuState,
    pub egui: EguiIntegration,
    pub thumbnails: ThumbnailAtlas,
    pub palette: HivePalette,
}

impl RenderEngine {
    pub fn new(window: Arc<Window>, palette: HivePalette) -> Self {
        let gpu = GpuState::new(window.clone());
        let egui = EguiIntegration::new(&gpu.device, gpu.config.format, window);
        apply_hive_style(&egui.ctx, &palette);
        Self {
            gpu,
            egui,
            thumbnails: ThumbnailAtlas::default(),
            palette,
        }
    }

    /// Logical (point) size of the surface, the space the hive lays out in.
    pub fn viewport(&self) -> Viewport {
        let scale = self.scale_factor().max(f32::EPSILON);
        Viewport::new(
            self.gpu.config.width as f32 / scale,
            self.gpu.config.height as f32 / scale,
        )
    }

    pub fn scale_factor(&self) -> f32 {
        self.gpu.window.scale_factor() as f32
    }

    /// Clear to the hive background, draw the egui output on top, submit.
    pub fn draw_and_submit(
        &mut self,
        egui_output: &egui::FullOutput,
    ) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point: self.scale_factor(),
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("hive encoder"),
            });

        let paint_jobs = self.egui.prepare(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &screen,
            egui_output,
        );

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("hive pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.palette.clear_color()),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            self.egui.renderer.render(&mut pass, &paint_jobs, &screen);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.egui.free_textures(egui_output);
        Ok(output)
    }
}
