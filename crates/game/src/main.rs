//! Liminal: first-person horror in endless procedurally generated halls.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use audio::{AudioOutput, CaptionVoice, SoundOutput};
use game::{assets, GameConfig, GameState, Hud, HudFrame, Session};
use rand::rngs::StdRng;
use rand::SeedableRng;
use renderer::SceneGraph;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowId},
};

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;
const HEADLESS_STEP: Duration = Duration::from_millis(16);

/// Shows the HUD status line in the window title.
struct TitleHud {
    window: Arc<Window>,
    last: String,
}

impl Hud for TitleHud {
    fn present(&mut self, frame: &HudFrame) {
        let line = frame.status_line();
        if line != self.last {
            self.window.set_title(&format!("Liminal | {line}"));
            self.last = line;
        }
    }
}

/// Logs the HUD once a second of game time.
#[derive(Default)]
struct LogHud {
    frames: u64,
}

impl Hud for LogHud {
    fn present(&mut self, frame: &HudFrame) {
        if self.frames % 60 == 0 || frame.dead {
            log::info!("{}", frame.status_line());
        }
        self.frames += 1;
    }
}

fn build_session(config: GameConfig, hud: Box<dyn Hud>) -> Session {
    let assets = assets::preload(Path::new(&config.asset_dir));
    let audio: Box<dyn SoundOutput> = if config.audio.muted {
        Box::new(AudioOutput::Muted)
    } else {
        Box::new(AudioOutput::init(Path::new(&config.audio.sound_dir), config.audio.master_volume))
    };
    let state = GameState::new(config, assets, StdRng::from_entropy());
    let mut session = Session::new(state, Box::new(SceneGraph::new()), audio, Box::new(CaptionVoice), hud);
    session.start();
    session
}

fn grab_cursor(window: &Window, grab: bool) {
    if grab {
        let _ = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    } else {
        let _ = window.set_cursor_grab(CursorGrabMode::None);
    }
    window.set_cursor_visible(!grab);
}

struct App {
    config: Option<GameConfig>,
    window: Option<Arc<Window>>,
    session: Option<Session>,
}

impl App {
    fn new(config: GameConfig) -> Self {
        Self {
            config: Some(config),
            window: None,
            session: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }
        let Some(config) = self.config.take() else {
            return;
        };
        let attrs = Window::default_attributes()
            .with_title("Liminal")
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        grab_cursor(&window, true);
        let hud = TitleHud {
            window: window.clone(),
            last: String::new(),
        };
        self.session = Some(build_session(config, Box::new(hud)));
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let (Some(session), Some(window)) = (&mut self.session, &self.window) else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    session.input.process_keyboard(key, event.state);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if state == ElementState::Pressed && session.is_paused() {
                    // Clicking back into the window resumes.
                    session.toggle_pause();
                    grab_cursor(window, true);
                    return;
                }
                session.input.process_mouse_button(button, state);
            }
            WindowEvent::Focused(false) => session.input.release_all(),
            WindowEvent::RedrawRequested => {
                let was_paused = session.is_paused();
                session.frame();
                if session.is_paused() != was_paused {
                    grab_cursor(window, !session.is_paused());
                }
                window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let (Some(session), DeviceEvent::MouseMotion { delta }) = (&mut self.session, event) {
            if !session.is_paused() {
                session.input.process_mouse_motion(delta);
            }
        }
    }
}

/// Run without a window for `seconds` of game time.
fn run_headless(config: GameConfig, seconds: f32) {
    let mut session = build_session(config, Box::new(LogHud::default()));
    let steps = (seconds * 1000.0 / HEADLESS_STEP.as_millis() as f32).ceil() as u64;
    for _ in 0..steps {
        session.step(HEADLESS_STEP);
        if session.is_over() {
            break;
        }
    }
    log::info!(
        "Headless run finished at {} ms: level {}, {} kills, {} orbs",
        session.clock.now_ms(),
        session.state.progress.level,
        session.state.progress.kills,
        session.state.progress.collected
    );
}

fn parse_headless(args: &[String]) -> Result<Option<f32>> {
    let Some(pos) = args.iter().position(|a| a == "--headless") else {
        return Ok(None);
    };
    let Some(value) = args.get(pos + 1) else {
        bail!("--headless needs a duration in seconds");
    };
    let seconds = value
        .parse::<f32>()
        .with_context(|| format!("invalid --headless duration {value:?}"))?;
    Ok(Some(seconds))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let config = GameConfig::load();

    if let Some(seconds) = parse_headless(&args)? {
        log::info!("Starting Liminal headless for {seconds} s");
        run_headless(config, seconds);
        return Ok(());
    }

    println!("Liminal");
    println!("  WASD move | mouse look | LMB fire | RMB aim | R reload | 1-7 weapons");
    println!("  E truck | N night vision | F flashlight | Tab wall theme | Esc pause");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
