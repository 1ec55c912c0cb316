use std::sync::Arc;

use anyhow::Context;
use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::Config;
use crate::debug::timer::TickPhase;
use crate::debug::Diagnostics;
use crate::pacer::FramePacer;
use crate::path::ReplayCursor;
use crate::render::overlay::Overlay;
use crate::render::GpuState;
use crate::session::{InputEvent, Session, TickOutcome};

const WINDOW_TITLE: &str = "Path Heatmap";

/// Top-level application state.
struct App {
    config: Config,
    session: Session,
    pacer: FramePacer,
    diagnostics: Diagnostics,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    overlay: Option<Overlay>,

    /// Last cursor position in canvas pixels.
    cursor: Vec2,
    last_tick_time: Option<Instant>,
    /// A tick produced a frame that has not been uploaded yet.
    frame_dirty: bool,

    /// Set when startup fails inside the event loop; returned from `run`.
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config, replay: Option<ReplayCursor>) -> Self {
        let session = Session::new(&config, replay);
        let pacer = FramePacer::new(config.target_fps, Instant::now());
        let cursor = Vec2::new(config.width as f32 * 0.5, config.height as f32 * 0.5);
        Self {
            config,
            session,
            pacer,
            diagnostics: Diagnostics::new(),
            window: None,
            gpu: None,
            overlay: None,
            cursor,
            last_tick_time: None,
            frame_dirty: false,
            fatal: None,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_resizable(false);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        log::info!(
            "Window created: {}x{} (canvas {}x{})",
            size.width,
            size.height,
            self.config.width,
            self.config.height
        );

        let gpu = GpuState::new(window.clone(), self.config.width, self.config.height)?;
        let overlay = Overlay::new(&window, &gpu, self.config.width, self.config.height);
        log::info!("wgpu + egui initialized");

        self.gpu = Some(gpu);
        self.overlay = Some(overlay);
        self.window = Some(window);
        Ok(())
    }

    /// Surface pixels to canvas pixels.
    fn to_canvas(&self, x: f64, y: f64) -> Vec2 {
        let (sw, sh) = match &self.gpu {
            Some(gpu) => (gpu.surface_config.width, gpu.surface_config.height),
            None => (self.config.width, self.config.height),
        };
        Vec2::new(
            (x * self.config.width as f64 / sw.max(1) as f64) as f32,
            (y * self.config.height as f64 / sh.max(1) as f64) as f32,
        )
    }

    /// Run one session tick if the pacer says it is due.
    fn tick_if_due(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if !self.pacer.is_due(now) {
            return;
        }

        if self.session.tick() == TickOutcome::Stopped {
            log::info!(
                "Session stopped: {} ticks, {} cells visited ({:.2}% coverage)",
                self.session.tick_count(),
                self.session.coverage().visited_cells(),
                self.session.coverage().coverage_percent()
            );
            event_loop.exit();
            return;
        }

        if let Some(last) = self.last_tick_time {
            self.diagnostics
                .record_frame(now.duration_since(last).as_secs_f64());
        }
        self.last_tick_time = Some(now);
        self.pacer.mark_tick(now);
        self.frame_dirty = true;

        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn present(&mut self) {
        let (Some(window), Some(gpu), Some(overlay)) =
            (&self.window, &mut self.gpu, &mut self.overlay)
        else {
            return;
        };

        if self.frame_dirty {
            self.session.timers.begin();
            gpu.upload_frame(self.session.renderer().frame());
            self.session.timers.end(TickPhase::Upload);
            self.frame_dirty = false;
        }

        let Some(mut frame) = gpu.begin_frame() else {
            return;
        };
        self.session.timers.begin();

        gpu.draw_canvas(&mut frame.encoder, &frame.view);

        let snapshot = self
            .diagnostics
            .snapshot(&self.session, self.pacer.interval().as_secs_f64());
        let output = overlay.run_frame(
            window,
            gpu.surface_config.width,
            gpu.surface_config.height,
            self.session.renderer().texts(),
            snapshot.as_ref(),
        );
        let extra = overlay.prepare(&gpu.device, &gpu.queue, &mut frame.encoder, &output);
        {
            let mut pass = GpuState::begin_egui_pass(&mut frame.encoder, &frame.view);
            overlay.render(&mut pass, &output);
        }

        gpu.finish_frame(frame.encoder, frame.output, extra);
        overlay.free_textures(&output);
        self.session.timers.end(TickPhase::Present);
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

        // First tick immediately; after that the pacer drives WaitUntil.
        self.pacer = FramePacer::new(self.config.target_fps, Instant::now());
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.pacer.deadline()));
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            return;
        }
        if !self.session.is_running() {
            event_loop.exit();
            return;
        }
        self.tick_if_due(event_loop);
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.pacer.deadline()));
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
                log::info!("Close requested");
                self.session.push_event(InputEvent::Quit);
                // Don't wait out the pacer for a quit.
                self.pacer = FramePacer::new(self.config.target_fps, Instant::now());
                self.tick_if_due(event_loop);
            }
            WindowEvent::KeyboardInput { event: key, .. } => {
                let pressed = key.state == ElementState::Pressed;
                match key.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) if pressed => {
                        log::info!("ESC pressed");
                        self.session.push_event(InputEvent::Quit);
                    }
                    PhysicalKey::Code(KeyCode::F12) => {
                        if self.diagnostics.poll_toggle(pressed) {
                            log::debug!("Diagnostics panel visible: {}", self.diagnostics.visible);
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = self.to_canvas(position.x, position.y);
                self.session.push_event(InputEvent::PointerMoved(self.cursor));
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if !consumed => {
                self.session.push_event(InputEvent::Click(self.cursor));
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.present();
            }
            _ => {}
        }
    }
}

/// Create the event loop and run until the session stops.
pub fn run(config: Config, replay: Option<ReplayCursor>) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = App::new(config, replay);
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
