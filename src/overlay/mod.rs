pub mod history;

use std::time::Duration;

use winit::window::Window;

use self::history::{FrameHistory, FrameStats};
use crate::pet::scene::PetScene;
use crate::render::GpuState;

/// Number of frame times to keep for the debug stats.
const FRAME_HISTORY_LEN: usize = 300;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;

pub const TITLE: &str = "Sprite Player";

/// Header lines telling the user how the cat behaves.
pub fn instructions(inactivity_delay: Duration) -> [String; 2] {
    let secs = inactivity_delay.as_secs_f64();
    let unit = if secs == 1.0 { "second" } else { "seconds" };
    [
        format!("The cat will go to sleep after {secs} {unit} of inactivity (no mouse movement)."),
        "Click on the cat to wake it up!".to_string(),
    ]
}

/// What the debug panel shows about the cat, copied out of the scene so the
/// egui closure borrows nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct PetStatus {
    pub state: &'static str,
    pub sheet: String,
    pub frame: u32,
    pub frame_count: u32,
    pub looped: bool,
    pub holding: bool,
    pub sheet_offset_x: i64,
    pub frames_per_second: f32,
    pub inactivity_delay: Duration,
    pub inactivity_remaining: Option<Duration>,
    pub clock: Duration,
    pub next_timer_in: Option<Duration>,
    pub pending_timers: usize,
}

impl PetStatus {
    pub fn from_scene(scene: &PetScene) -> Self {
        let anim = scene.animator();
        let config = anim.config();
        Self {
            state: scene.state().label(),
            sheet: config.sheet().to_string(),
            frame: anim.frame(),
            frame_count: config.frame_count(),
            looped: config.looped(),
            holding: anim.is_holding(),
            sheet_offset_x: anim.sheet_offset_x(),
            frames_per_second: config.frames_per_second(),
            inactivity_delay: scene.controller().inactivity_delay(),
            inactivity_remaining: scene.inactivity_remaining(),
            clock: scene.now(),
            next_timer_in: scene.next_timer_in(),
            pending_timers: scene.pending_timers(),
        }
    }
}

/// Title/instructions header plus an F12 debug panel, drawn with egui.
pub struct Overlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    /// Debug panel visibility (F12).
    pub debug_visible: bool,
    /// Freeze the cat's clock.
    pub paused: bool,
    /// Playback rate picked in the panel, taken by the app once.
    requested_fps: Option<f32>,

    frame_times: FrameHistory,
    stats: FrameStats,
    frame_count: u64,
    log_timer: f64,
}

impl Overlay {
    pub fn new(window: &Window, gpu: &GpuState) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            debug_visible: false,
            paused: false,
            requested_fps: None,
            frame_times: FrameHistory::new(FRAME_HISTORY_LEN),
            stats: FrameStats::default(),
            frame_count: 0,
            log_timer: 0.0,
        }
    }

    /// Record a frame time, update rolling stats, and periodically log.
    pub fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frame_times.record(dt);
        self.stats = self.frame_times.stats();

        self.log_timer += dt;
        if self.log_timer >= FPS_LOG_INTERVAL {
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                self.stats.fps,
                self.stats.avg * 1000.0,
                self.stats.min * 1000.0,
                self.stats.max * 1000.0,
                self.frame_count,
            );
            self.log_timer = 0.0;
        }
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::debug!("debug panel {}", if self.debug_visible { "shown" } else { "hidden" });
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        response.consumed
    }

    /// Whether the pointer is over an egui panel (so clicks belong to the UI).
    pub fn pointer_over_ui(&self) -> bool {
        self.egui_ctx.is_pointer_over_area()
    }

    /// Playback rate chosen in the debug panel since the last call.
    pub fn take_requested_fps(&mut self) -> Option<f32> {
        self.requested_fps.take()
    }

    /// Run the egui frame and produce paint output.
    /// Returns (clipped_primitives, textures_delta, screen_descriptor).
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
        status: &PetStatus,
    ) -> (
        Vec<egui::epaint::ClippedPrimitive>,
        egui::TexturesDelta,
        egui_wgpu::ScreenDescriptor,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);

        let debug_visible = self.debug_visible;
        let stats = self.stats;
        let mut paused = self.paused;
        let mut fps = status.frames_per_second;

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_header(ctx, status.inactivity_delay);
            if debug_visible {
                draw_debug(ctx, status, &stats, &mut paused, &mut fps);
            }
        });

        self.paused = paused;
        if fps != status.frames_per_second {
            self.requested_fps = Some(fps);
        }

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_w, screen_h],
            pixels_per_point,
        };

        (clipped_primitives, full_output.textures_delta, screen_descriptor)
    }

    /// Upload egui textures and buffers. Call before the overlay render pass.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::epaint::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor)
    }

    /// Render egui into the given render pass.
    pub fn render(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::epaint::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for &id in &textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }
    }
}

fn draw_header(ctx: &egui::Context, inactivity_delay: Duration) {
    egui::Area::new(egui::Id::new("header"))
        .anchor(egui::Align2::CENTER_TOP, [0.0, 16.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(TITLE)
                        .size(28.0)
                        .strong()
                        .color(egui::Color32::from_gray(235)),
                );
                ui.add_space(6.0);
                ui.label(egui::RichText::new("Instructions:").color(egui::Color32::from_gray(200)));
                for line in instructions(inactivity_delay) {
                    ui.label(
                        egui::RichText::new(format!("• {line}"))
                            .color(egui::Color32::from_gray(200)),
                    );
                }
            });
        });
}

fn draw_debug(
    ctx: &egui::Context,
    s: &PetStatus,
    stats: &FrameStats,
    paused: &mut bool,
    fps: &mut f32,
) {
    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 220))
        .corner_radius(6.0)
        .inner_margin(10.0);

    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .default_width(280.0)
        .resizable(false)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));

            ui.heading("Cat");
            ui.label(format!("State: {}", s.state));
            ui.label(format!(
                "Frame: {} / {}{}",
                s.frame,
                s.frame_count,
                if s.holding { " (held)" } else { "" },
            ));
            ui.label(format!("Loop: {} | Offset: {}px", s.looped, s.sheet_offset_x));
            ui.label(egui::RichText::new(&s.sheet).monospace().small());
            match s.inactivity_remaining {
                Some(left) => ui.label(format!("Sleep in: {:.1}s", left.as_secs_f32())),
                None => ui.label("Sleep in: -"),
            };
            ui.label(format!(
                "Clock: {:.2}s | Timers: {} | Next: {}",
                s.clock.as_secs_f64(),
                s.pending_timers,
                s.next_timer_in
                    .map(|d| format!("{}ms", d.as_millis()))
                    .unwrap_or_else(|| "-".to_string()),
            ));
            ui.add_space(4.0);

            ui.heading("Performance");
            ui.label(format!("FPS: {:.1}", stats.fps));
            ui.label(format!(
                "Frame: {:.2}ms avg | {:.2} min | {:.2} max",
                stats.avg * 1000.0,
                stats.min * 1000.0,
                stats.max * 1000.0,
            ));
            ui.add_space(4.0);

            ui.heading("Controls");
            ui.checkbox(paused, "Pause");
            ui.horizontal(|ui| {
                ui.label("Playback:");
                ui.add(egui::Slider::new(fps, 1.0..=30.0).suffix(" fps"));
            });
            ui.add_space(4.0);
            ui.label("F12: Toggle | ESC: Quit");
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::layout::SpriteLayout;
    use crate::pet::tests::reference_sheets;
    use crate::pet::PetController;

    #[test]
    fn status_snapshot_tracks_scene() {
        let controller =
            PetController::new(reference_sheets(), Duration::from_millis(5000)).unwrap();
        let mut scene = PetScene::new(controller, SpriteLayout::new(8.0, glam::Vec2::ONE).unwrap());
        scene.start();
        scene.advance(Duration::from_millis(250));

        let status = PetStatus::from_scene(&scene);
        assert_eq!(status.state, "Idle");
        assert_eq!(status.frame, 2);
        assert_eq!(status.frame_count, 11);
        assert!(status.looped);
        assert!(!status.holding);
        assert_eq!(status.inactivity_remaining, Some(Duration::from_millis(4750)));
        assert_eq!(status.clock, Duration::from_millis(250));
        assert_eq!(status.sheet_offset_x, -64);
        assert_eq!(status.pending_timers, 2);
        assert_eq!(status.next_timer_in, Some(Duration::from_millis(125)));
        assert_eq!(status.inactivity_delay, Duration::from_millis(5000));
    }

    #[test]
    fn instructions_follow_inactivity_delay() {
        let [sleep, click] = instructions(Duration::from_millis(5000));
        assert_eq!(
            sleep,
            "The cat will go to sleep after 5 seconds of inactivity (no mouse movement)."
        );
        assert_eq!(click, "Click on the cat to wake it up!");

        let [sleep, _] = instructions(Duration::from_millis(1500));
        assert!(sleep.contains("after 1.5 seconds of"));
        let [sleep, _] = instructions(Duration::from_secs(1));
        assert!(sleep.contains("after 1 second of"));
    }
}
