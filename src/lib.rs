//! Rotating cube with a first-person fly camera.
//!
//! The math lives in [`transform`], [`camera`] and [`projection`] and has no
//! dependency on the window or the GPU, so it can be exercised headless.
//! [`render`] holds the wgpu side and [`app`] ties a frame together.

pub mod app;
pub mod camera;
pub mod config;
pub mod input;
pub mod mesh;
pub mod projection;
pub mod render;
pub mod transform;

pub use app::{AppState, FrameStats};
pub use camera::{CameraSettings, FlyCamera, MoveDirection};
pub use config::{Config, ConfigError};
pub use input::{InputAction, InputState, KeyBindings, KeyCode, MouseButton, NamedKey};
pub use mesh::{ColorVertex, CUBE_VERTICES};
pub use projection::Projection;
pub use render::Renderer;
pub use transform::Transform;
