use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::overlay::{Overlay, PetStatus, TITLE};
use crate::pet::scene::PetScene;
use crate::pet::{PetController, PetState};
use crate::render::sheet::SheetImage;
use crate::render::uniform::SpriteUniform;
use crate::render::{FrameContext, GpuState};
use crate::settings::Settings;

/// Largest step fed to the cat's clock per redraw; a stalled window
/// shouldn't replay seconds of ticks at once.
const MAX_FRAME_DT: Duration = Duration::from_millis(250);

/// Placeholder tints when a sheet file is missing (orange, blue-gray, cream).
fn placeholder_tint(state: PetState) -> [u8; 3] {
    match state {
        PetState::Idle => [255, 165, 50],
        PetState::Sleeping => [100, 100, 110],
        PetState::Waking => [255, 200, 150],
    }
}

/// Top-level application state.
struct App {
    settings: Settings,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    overlay: Option<Overlay>,

    scene: PetScene,
    /// Last cursor position inside the window, physical pixels.
    cursor: Option<Vec2>,

    last_frame_time: Option<Instant>,

    // Screen dimensions
    screen_w: u32,
    screen_h: u32,

    /// Startup failure to hand back from `run`.
    fatal: Option<Box<dyn Error>>,
}

impl App {
    fn new(settings: Settings) -> Result<Self, Box<dyn Error>> {
        let sheets = settings.pet_sheets()?;
        let controller = PetController::new(sheets, settings.inactivity_delay())?;
        let scene = PetScene::new(controller, settings.sprite_layout()?);

        Ok(Self {
            settings,
            window: None,
            gpu: None,
            overlay: None,
            scene,
            cursor: None,
            last_frame_time: None,
            screen_w: 0,
            screen_h: 0,
            fatal: None,
        })
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let [w, h] = self.settings.window_size;
        let attrs = WindowAttributes::default()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(w, h));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        self.screen_w = size.width;
        self.screen_h = size.height;
        log::info!("Window created: {}x{}", size.width, size.height);

        let images = PetState::ALL.map(|state| {
            SheetImage::load_or_placeholder(
                &self.settings.sheet_path(state),
                self.scene.controller().sheets().for_state(state),
                placeholder_tint(state),
            )
        });

        let gpu = GpuState::new(window.clone(), &images, self.settings.clear_color)?;
        log::info!("wgpu + sprite pipeline initialized");
        let overlay = Overlay::new(&window, &gpu);

        self.scene
            .resize(Vec2::new(size.width as f32, size.height as f32));
        self.scene.set_pixels_per_point(window.scale_factor() as f32);
        self.scene.start();
        log::info!(
            "Cat awake; naps after {:?} without pointer movement",
            self.scene.controller().inactivity_delay()
        );

        self.gpu = Some(gpu);
        self.overlay = Some(overlay);
        self.window = Some(window);
        Ok(())
    }

    /// Advance the cat's clock by the wall time since the last redraw.
    fn step(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            let dt = now.duration_since(last);
            let paused = match &mut self.overlay {
                Some(overlay) => {
                    overlay.record_frame(dt.as_secs_f64());
                    overlay.paused
                }
                None => false,
            };
            if !paused {
                self.scene.advance(dt.min(MAX_FRAME_DT));
            }
        }
        self.last_frame_time = Some(now);
    }

    fn render(&mut self) {
        let (Some(window), Some(gpu), Some(overlay)) =
            (&self.window, &mut self.gpu, &mut self.overlay)
        else {
            return;
        };

        let state = self.scene.state();
        let (sheet_w, sheet_h) = gpu.sheet_size(state);
        let uniform = SpriteUniform::new(
            Vec2::new(self.screen_w as f32, self.screen_h as f32),
            &self.scene.sprite_rect(),
            self.scene.animator().uv_rect(sheet_w, sheet_h),
        );
        gpu.update_sprite(&uniform);

        let status = PetStatus::from_scene(&self.scene);
        let (primitives, textures_delta, screen_descriptor) =
            overlay.run_frame(window, self.screen_w, self.screen_h, &status);

        if let Some(FrameContext {
            output,
            view,
            mut encoder,
        }) = gpu.begin_frame()
        {
            gpu.draw_sprite(&mut encoder, &view, state);

            let extra = overlay.prepare(
                &gpu.device,
                &gpu.queue,
                &mut encoder,
                &primitives,
                &textures_delta,
                &screen_descriptor,
            );
            {
                let mut pass = GpuState::begin_overlay_pass(&mut encoder, &view);
                overlay.render(&mut pass, &primitives, &screen_descriptor);
            }
            gpu.finish_frame(encoder, output, extra);
        }
        overlay.free_textures(&textures_delta);

        if let Some(fps) = overlay.take_requested_fps() {
            if let Err(e) = self.scene.set_frames_per_second(fps) {
                log::warn!("Ignoring playback rate: {e}");
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            self.fatal = Some(e);
            event_loop.exit();
            return;
        }
        // Continuous loop; frame ticks are due several times a second.
        event_loop.set_control_flow(ControlFlow::Poll);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match (&self.window, &mut self.overlay) {
            (Some(window), Some(overlay)) => overlay.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                self.screen_w = new_size.width;
                self.screen_h = new_size.height;
                self.scene
                    .resize(Vec2::new(new_size.width as f32, new_size.height as f32));
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::info!("Scale factor changed to {scale_factor}");
                self.scene.set_pixels_per_point(scale_factor as f32);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
                self.scene.pointer_moved();
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let over_ui = self
                    .overlay
                    .as_ref()
                    .is_some_and(|overlay| overlay.pointer_over_ui());
                if let Some(pos) = self.cursor.filter(|_| !consumed && !over_ui) {
                    self.scene.click_at(pos);
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => {
                        log::info!("ESC pressed, exiting");
                        event_loop.exit();
                    }
                    PhysicalKey::Code(KeyCode::F12) => {
                        if let Some(overlay) = &mut self.overlay {
                            overlay.toggle_debug();
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::RedrawRequested => {
                self.step();
                self.render();
            }
            _ => {}
        }
    }
}

/// Load settings, open the window and run until it closes.
pub fn run() -> Result<(), Box<dyn Error>> {
    let settings = Settings::load_or_default();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings)?;
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
