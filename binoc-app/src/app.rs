use crate::files::{self, DirAssets, IMAGE_EXTENSIONS};
use anyhow::{Context, Result};
use binoc_compositor::render_side_by_side;
use binoc_engine::{EngineConfig, EngineEvent, EngineState, PresentationEngine};
use binoc_timing::{FrameClock, IntervalTimer};
use log::{debug, error, info, warn};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_skia::Pixmap;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

const NAV_COOLDOWN_SECS: f64 = 0.25;

pub enum Mode {
    /// Play an authored stimulus set.
    Sequence {
        set_path: PathBuf,
        wait: bool,
        loop_playback: bool,
    },
    /// Browse a folder and build ad-hoc pairs interactively.
    Browse { folder: PathBuf, recursive: bool },
}

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    canvas: Option<Pixmap>,
    canvas_dirty: bool,
    engine: PresentationEngine<DirAssets, ThreadRng>,
    clock: FrameClock,
    nav_cooldown: IntervalTimer,
    mode: Mode,
    should_exit: bool,
}

impl App {
    pub fn new(mode: Mode) -> Result<Self> {
        let (config, assets_root) = match &mode {
            Mode::Sequence {
                set_path,
                wait,
                loop_playback,
            } => (
                EngineConfig {
                    auto_start: !wait,
                    loop_playback: *loop_playback,
                    ..EngineConfig::default()
                },
                // bundle keys resolve next to the set document
                set_path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."))
                    .to_path_buf(),
            ),
            Mode::Browse { folder, .. } => (EngineConfig::default(), folder.clone()),
        };

        let mut engine =
            PresentationEngine::new(config, DirAssets::new(assets_root), rand::rng());

        match &mode {
            Mode::Sequence { set_path, wait, .. } => {
                let sequence = files::load_set(set_path)?;
                info!("loaded {}: {} stimuli", set_path.display(), sequence.len());
                engine.prewarm(&sequence);
                engine.load(sequence)?;
                if *wait {
                    info!("press SPACE to start");
                }
            }
            Mode::Browse { folder, recursive } => {
                let list = files::list_files(folder, &IMAGE_EXTENSIONS, *recursive)
                    .with_context(|| format!("scanning {}", folder.display()))?;
                engine.enter_browse(list);
                print_help();
            }
        }

        Ok(Self {
            window: None,
            pixels: None,
            canvas: None,
            canvas_dirty: true,
            engine,
            clock: FrameClock::new(),
            nav_cooldown: IntervalTimer::disarmed(),
            mode,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.run_app(&mut self).map_err(Into::into)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .context("no monitor available")?;

        let window_attributes = Window::default_attributes()
            .with_title("binoc")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();

        info!(
            "display: {}×{}",
            physical_size.width, physical_size.height
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.canvas = Pixmap::new(physical_size.width, physical_size.height);
        self.canvas_dirty = true;

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);

        // presentation timing starts at the first real frame, not at launch
        self.clock = FrameClock::new();

        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let delta = self.clock.delta_secs();
        self.nav_cooldown.tick(delta);

        for event in self.engine.tick(delta) {
            match event {
                EngineEvent::Advanced { position } => debug!("pair {position}"),
                EngineEvent::IsiStarted { position } => debug!("isi after pair {position}"),
                EngineEvent::RunComplete => info!("presentation finished"),
            }
        }

        let Some(canvas) = self.canvas.as_mut() else {
            return Ok(());
        };
        if self.engine.overlay_mut().take_refresh() || self.canvas_dirty {
            render_side_by_side(self.engine.overlay(), canvas);
            self.canvas_dirty = false;
        }

        let Some(pixels) = self.pixels.as_mut() else {
            return Ok(());
        };
        pixels.frame_mut().copy_from_slice(canvas.data());
        pixels.render()?;
        Ok(())
    }

    fn handle_input(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = key else { return };
        match code {
            KeyCode::Escape => self.cleanup_and_exit(event_loop),
            KeyCode::Space => self.toggle_run(),
            KeyCode::BracketLeft => self.engine.adjust_flash_frequency(-1.0),
            KeyCode::BracketRight => self.engine.adjust_flash_frequency(1.0),
            KeyCode::Minus => self.engine.adjust_default_duration(-100),
            KeyCode::Equal => self.engine.adjust_default_duration(100),
            KeyCode::KeyF => {
                let on = !self.engine.flash().is_enabled();
                self.engine.set_flash_enabled(on);
                info!("flashing {}", if on { "on" } else { "off" });
            }
            _ if matches!(self.mode, Mode::Browse { .. }) => self.handle_browse_key(code),
            _ => {}
        }
    }

    fn toggle_run(&mut self) {
        if self.engine.state() == EngineState::Running {
            self.engine.stop();
        } else if let Err(e) = self.engine.start_pending() {
            warn!("nothing to start: {e}");
        }
    }

    fn handle_browse_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::ArrowUp => self.navigate(-1),
            KeyCode::ArrowDown => self.navigate(1),
            KeyCode::PageUp => self.navigate(-10),
            KeyCode::PageDown => self.navigate(10),
            KeyCode::KeyL => self.engine.assign_current_to_left(),
            KeyCode::KeyR => self.engine.assign_current_to_right(),
            KeyCode::KeyX => self.engine.assign_left(None),
            KeyCode::KeyY => self.engine.assign_right(None),
            KeyCode::KeyA => self.engine.add_current_pair(),
            KeyCode::KeyS => {
                if let Err(e) = self.engine.play_saved_pairs() {
                    warn!("{e}");
                }
            }
            KeyCode::KeyG => self.rescan(),
            _ => {}
        }
    }

    fn navigate(&mut self, delta: i64) {
        if self.nav_cooldown.is_armed() {
            return;
        }
        self.nav_cooldown.arm(NAV_COOLDOWN_SECS);
        self.engine.move_cursor(delta);
    }

    fn rescan(&mut self) {
        let Mode::Browse { folder, recursive } = &self.mode else {
            return;
        };
        match files::list_files(folder, &IMAGE_EXTENSIONS, *recursive) {
            Ok(list) => self.engine.rescan(list),
            Err(e) => error!("scan error: {e}"),
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                error!("failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                error!("failed to resize buffer: {e}");
            }
        }
        self.canvas = Pixmap::new(new_size.width, new_size.height);
        self.canvas_dirty = true;
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        let stats = self.clock.stats();
        info!(
            "frames: {:.3} ms avg, jitter {:.3} ms, {:.1} fps",
            stats.average_frame_secs * 1e3,
            stats.jitter_secs * 1e3,
            stats.effective_fps,
        );
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!("failed to create window and surface: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    error!("render error: {e}");
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                self.handle_input(event.physical_key, event_loop);
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}

fn print_help() {
    info!("controls:");
    info!("  Up/Down (PageUp/PageDown)  browse files");
    info!("  L / R                      assign current file to LEFT / RIGHT eye");
    info!("  X / Y                      set LEFT / RIGHT eye to black");
    info!("  A                          add current pair to the saved sequence");
    info!("  S                          play the saved sequence");
    info!("  G                          rescan the folder");
    info!("  [ / ]                      flash frequency -/+ 1 Hz");
    info!("  - / =                      default duration -/+ 100 ms");
    info!("  F                          toggle flashing");
    info!("  SPACE                      stop / restart playback");
    info!("  ESC                        quit");
}
