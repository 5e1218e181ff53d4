use std::any::Any;
use std::env;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{debug, error, info, trace, warn};
use pollster::block_on;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{
    DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton as WinitMouseButton, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use flycam::{AppState, Config, KeyCode, MouseButton, NamedKey, Renderer, CUBE_VERTICES};

const USAGE: &str = "Usage: flycam [--config <file.xml>] [--headless] [--frames <n>] \
     [--width <w>] [--height <h>] [--print-config]";

const HEADLESS_FRAMES: u64 = 120;
const HEADLESS_DT: f32 = 1.0 / 60.0;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }
    let config = options.load_config()?;
    if options.print_config {
        println!("{}", config.to_json().context("failed to serialize config")?);
        return Ok(());
    }
    info!(
        "Window {}x{}, {} key bindings",
        config.window.width,
        config.window.height,
        config.bindings.len()
    );

    let state = if options.headless {
        run_headless(&config, options.frames.unwrap_or(HEADLESS_FRAMES))
    } else {
        match run_interactive(&config, options.frames) {
            Ok(state) => state,
            Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
                eprintln!(
                    "{err}. Falling back to --headless mode (set DISPLAY or install X11/Wayland libs to enable rendering)."
                );
                run_headless(&config, options.frames.unwrap_or(HEADLESS_FRAMES))
            }
            Err(err) => return Err(err),
        }
    };

    print_final_state(&state);
    Ok(())
}

/// Steps the frame update with a fixed timestep and no input or GPU.
fn run_headless(config: &Config, frames: u64) -> AppState {
    let mut state = AppState::new(config);
    for _ in 0..frames {
        state.update(HEADLESS_DT);
    }
    state
}

fn run_interactive(config: &Config, frame_limit: Option<u64>) -> Result<AppState> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = FlycamApp::new(config.clone(), frame_limit);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    if let Some(err) = app.error {
        return Err(err);
    }
    Ok(app.state)
}

fn print_final_state(state: &AppState) {
    println!("{}", state.camera_summary());
    println!("{}", state.stats.summary());
}

struct FlycamApp {
    config: Config,
    state: AppState,
    renderer: Option<Renderer>,
    last_frame: Instant,
    frame_limit: Option<u64>,
    error: Option<anyhow::Error>,
}

impl FlycamApp {
    fn new(config: Config, frame_limit: Option<u64>) -> Self {
        let state = AppState::new(&config);
        Self {
            config,
            state,
            renderer: None,
            last_frame: Instant::now(),
            frame_limit,
            error: None,
        }
    }

    fn init_renderer(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(window_config.width),
                f64::from(window_config.height),
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );

        let renderer = block_on(Renderer::new(
            Arc::clone(&window),
            &CUBE_VERTICES,
            self.config.clear_color,
        ))?;
        let size = renderer.size();
        self.state.resize(size.width, size.height);
        self.renderer = Some(renderer);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:?}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.state.update(dt);

        match renderer.render(self.state.mvp()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = renderer.window().inner_size();
                renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("GPU is out of memory"));
            }
            Err(wgpu::SurfaceError::Timeout) => {
                info!("Surface timeout; retrying next frame");
            }
            Err(err) => {
                warn!("Surface error: {err}; skipping frame");
            }
        }

        let limit_reached = self
            .frame_limit
            .is_some_and(|limit| self.state.stats.frames() >= limit);
        if self.state.should_quit() || limit_reached {
            event_loop.exit();
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, event: &KeyEvent) {
        if event.state == ElementState::Pressed {
            if let Some(text) = event.text.as_ref() {
                trace!("text input {text:?}");
            }
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(key) = map_keycode(code) else {
            return;
        };
        match event.state {
            ElementState::Pressed => self.state.input.key_down(key),
            ElementState::Released => self.state.input.key_up(key),
        }
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: WinitMouseButton) {
        let Some(button) = map_mouse_button(button) else {
            return;
        };
        match state {
            ElementState::Pressed => self.state.input.mouse_button_down(button),
            ElementState::Released => self.state.input.mouse_button_up(button),
        }
    }
}

impl ApplicationHandler for FlycamApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(err) = self.init_renderer(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.renderer.as_ref().map(Renderer::window_id) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.input.request_quit();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                debug!("resized to {}x{}", size.width, size.height);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
                self.state.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_keyboard(&event);
                if self.state.should_quit() {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_button(state, button);
            }
            WindowEvent::Focused(false) => {
                debug!("focus lost; releasing held input");
                self.state.input.release_all();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(event_loop) {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.state.input.mouse_moved(Vec2::new(dx as f32, dy as f32));
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }
}

#[derive(Debug, Error)]
#[error("failed to initialize {stage}: {message}")]
struct WindowInitError {
    stage: &'static str,
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &'static str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            stage,
            message: panic_message(panic),
        }
    }

    fn from_error(stage: &'static str, err: impl fmt::Display) -> Self {
        Self {
            stage,
            message: err.to_string(),
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

fn map_keycode(code: winit::keyboard::KeyCode) -> Option<KeyCode> {
    use winit::keyboard::KeyCode as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Enter => KeyCode::Named(NamedKey::Enter),
        Key::Tab => KeyCode::Named(NamedKey::Tab),
        Key::ArrowLeft => KeyCode::Named(NamedKey::Left),
        Key::ArrowRight => KeyCode::Named(NamedKey::Right),
        Key::ArrowUp => KeyCode::Named(NamedKey::Up),
        Key::ArrowDown => KeyCode::Named(NamedKey::Down),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::Backspace => KeyCode::Named(NamedKey::Backspace),
        Key::Home => KeyCode::Named(NamedKey::Home),
        Key::End => KeyCode::Named(NamedKey::End),
        Key::PageUp => KeyCode::Named(NamedKey::PageUp),
        Key::PageDown => KeyCode::Named(NamedKey::PageDown),
        Key::ShiftLeft => KeyCode::Named(NamedKey::LeftShift),
        Key::ShiftRight => KeyCode::Named(NamedKey::RightShift),
        Key::ControlLeft => KeyCode::Named(NamedKey::LeftCtrl),
        Key::ControlRight => KeyCode::Named(NamedKey::RightCtrl),
        Key::AltLeft => KeyCode::Named(NamedKey::LeftAlt),
        Key::AltRight => KeyCode::Named(NamedKey::RightAlt),
        Key::Digit0 => KeyCode::Digit(0),
        Key::Digit1 => KeyCode::Digit(1),
        Key::Digit2 => KeyCode::Digit(2),
        Key::Digit3 => KeyCode::Digit(3),
        Key::Digit4 => KeyCode::Digit(4),
        Key::Digit5 => KeyCode::Digit(5),
        Key::Digit6 => KeyCode::Digit(6),
        Key::Digit7 => KeyCode::Digit(7),
        Key::Digit8 => KeyCode::Digit(8),
        Key::Digit9 => KeyCode::Digit(9),
        Key::KeyA => KeyCode::Character('A'),
        Key::KeyB => KeyCode::Character('B'),
        Key::KeyC => KeyCode::Character('C'),
        Key::KeyD => KeyCode::Character('D'),
        Key::KeyE => KeyCode::Character('E'),
        Key::KeyF => KeyCode::Character('F'),
        Key::KeyG => KeyCode::Character('G'),
        Key::KeyH => KeyCode::Character('H'),
        Key::KeyI => KeyCode::Character('I'),
        Key::KeyJ => KeyCode::Character('J'),
        Key::KeyK => KeyCode::Character('K'),
        Key::KeyL => KeyCode::Character('L'),
        Key::KeyM => KeyCode::Character('M'),
        Key::KeyN => KeyCode::Character('N'),
        Key::KeyO => KeyCode::Character('O'),
        Key::KeyP => KeyCode::Character('P'),
        Key::KeyQ => KeyCode::Character('Q'),
        Key::KeyR => KeyCode::Character('R'),
        Key::KeyS => KeyCode::Character('S'),
        Key::KeyT => KeyCode::Character('T'),
        Key::KeyU => KeyCode::Character('U'),
        Key::KeyV => KeyCode::Character('V'),
        Key::KeyW => KeyCode::Character('W'),
        Key::KeyX => KeyCode::Character('X'),
        Key::KeyY => KeyCode::Character('Y'),
        Key::KeyZ => KeyCode::Character('Z'),
        Key::F1 => KeyCode::Function(1),
        Key::F2 => KeyCode::Function(2),
        Key::F3 => KeyCode::Function(3),
        Key::F4 => KeyCode::Function(4),
        Key::F5 => KeyCode::Function(5),
        Key::F6 => KeyCode::Function(6),
        Key::F7 => KeyCode::Function(7),
        Key::F8 => KeyCode::Function(8),
        Key::F9 => KeyCode::Function(9),
        Key::F10 => KeyCode::Function(10),
        Key::F11 => KeyCode::Function(11),
        Key::F12 => KeyCode::Function(12),
        _ => return None,
    })
}

fn map_mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    let index = match button {
        WinitMouseButton::Left => 0,
        WinitMouseButton::Right => 1,
        WinitMouseButton::Middle => 2,
        WinitMouseButton::Back => 3,
        WinitMouseButton::Forward => 4,
        WinitMouseButton::Other(value) => u8::try_from(value).ok()?,
    };
    Some(MouseButton::new(index))
}

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    config_path: Option<String>,
    headless: bool,
    frames: Option<u64>,
    width: Option<u32>,
    height: Option<u32>,
    print_config: bool,
    help: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => options.config_path = Some(flag_value(&mut args, "--config")?),
                "--headless" => options.headless = true,
                "--frames" => options.frames = Some(flag_value(&mut args, "--frames")?),
                "--width" => options.width = Some(flag_value(&mut args, "--width")?),
                "--height" => options.height = Some(flag_value(&mut args, "--height")?),
                "--print-config" => options.print_config = true,
                "--help" | "-h" => options.help = true,
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
            }
        }
        Ok(options)
    }

    fn load_config(&self) -> Result<Config> {
        let mut config = match self.config_path.as_deref() {
            Some(path) => {
                let xml = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {path}"))?;
                Config::from_xml(&xml).with_context(|| format!("failed to parse config {path}"))?
            }
            None => Config::default(),
        };
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn flag_value<T>(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = args
        .next()
        .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))?;
    raw.parse::<T>()
        .map_err(|err| anyhow!("invalid value {raw:?} for {flag}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse_from(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn parses_all_flags() {
        let options = parse(&[
            "--config",
            "cam.xml",
            "--headless",
            "--frames",
            "30",
            "--width",
            "640",
            "--height",
            "480",
            "--print-config",
        ])
        .unwrap();
        assert_eq!(
            options,
            CliOptions {
                config_path: Some("cam.xml".into()),
                headless: true,
                frames: Some(30),
                width: Some(640),
                height: Some(480),
                print_config: true,
                help: false,
            }
        );
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(parse(&["--fullscreen"]).is_err());
        assert!(parse(&["--frames"]).is_err());
        assert!(parse(&["--frames", "many"]).is_err());
    }

    #[test]
    fn cli_size_overrides_config() {
        let options = parse(&["--width", "320", "--height", "200"]).unwrap();
        let config = options.load_config().unwrap();
        assert_eq!((config.window.width, config.window.height), (320, 200));
        assert!(parse(&["--width", "0"]).unwrap().load_config().is_err());
    }

    #[test]
    fn maps_movement_keys() {
        use winit::keyboard::KeyCode as Key;
        assert_eq!(map_keycode(Key::KeyW), Some(KeyCode::Character('W')));
        assert_eq!(
            map_keycode(Key::ShiftLeft),
            Some(KeyCode::Named(NamedKey::LeftShift))
        );
        assert_eq!(map_keycode(Key::NumLock), None);
        assert_eq!(
            map_mouse_button(WinitMouseButton::Left),
            Some(MouseButton::LEFT)
        );
    }
}
