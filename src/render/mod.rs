pub mod pipeline;
pub mod sheet;
pub mod uniform;

use std::sync::Arc;
use winit::window::Window;

use crate::pet::PetState;

use self::pipeline::SpritePipeline;
use self::sheet::SheetImage;
use self::uniform::SpriteUniform;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create wgpu surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to create wgpu device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no texture formats")]
    NoSurfaceFormat,
}

/// Device, surface and the sprite pipeline.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub sprite_pipeline: SpritePipeline,
    clear_color: wgpu::Color,
}

/// Intermediate frame state returned by `begin_frame`.
pub struct FrameContext {
    pub output: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuState {
    /// Initialize wgpu and upload the three sprite sheets (ordered like
    /// [`PetState::ALL`]).
    pub fn new(
        window: Arc<Window>,
        images: &[SheetImage; 3],
        clear_color: [f64; 4],
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        log::info!(
            "GPU adapter: {:?} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("spritecat_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);

        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;

        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Surface: format={:?}, alpha_mode={:?}", format, alpha_mode);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let sprite_pipeline = SpritePipeline::new(&device, &queue, format, images);

        let [r, g, b, a] = clear_color;
        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            sprite_pipeline,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    /// Resize the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Size of the sheet texture shown for `state`.
    pub fn sheet_size(&self, state: PetState) -> (u32, u32) {
        let sheet = self.sprite_pipeline.sheet(state);
        (sheet.width, sheet.height)
    }

    /// Upload this frame's sprite placement.
    pub fn update_sprite(&self, uniform: &SpriteUniform) {
        self.sprite_pipeline.update_uniform(&self.queue, uniform);
    }

    /// Acquire the next surface texture and create a command encoder.
    /// Returns None if the surface is lost/outdated (caller should skip this frame).
    pub fn begin_frame(&self) -> Option<FrameContext> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                return None;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                return None;
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                return None;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        Some(FrameContext {
            output,
            view,
            encoder,
        })
    }

    /// Clear to the background colour and draw the current frame of `state`'s sheet.
    pub fn draw_sprite(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        state: PetState,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sprite_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let p = &self.sprite_pipeline;
        render_pass.set_pipeline(&p.pipeline);
        render_pass.set_bind_group(0, &p.uniform_bind_group, &[]);
        render_pass.set_bind_group(1, &p.sheet(state).bind_group, &[]);
        render_pass.set_vertex_buffer(0, p.vertex_buffer.slice(..));
        render_pass.set_index_buffer(p.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..6, 0, 0..1);
    }

    /// Create an egui render pass that preserves existing content (LoadOp::Load).
    /// Returns a 'static render pass suitable for egui_wgpu::Renderer::render().
    pub fn begin_overlay_pass(
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'static> {
        let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("overlay_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.forget_lifetime()
    }

    /// Submit the command encoder and present.
    pub fn finish_frame(
        &self,
        encoder: wgpu::CommandEncoder,
        output: wgpu::SurfaceTexture,
        extra_cmd_bufs: Vec<wgpu::CommandBuffer>,
    ) {
        self.queue.submit(
            extra_cmd_bufs
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        output.present();
    }
}
