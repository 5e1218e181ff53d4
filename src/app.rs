use std::time::{Duration, Instant};

use glam::{Mat4, Vec2, Vec3};

use crate::camera::FlyCamera;
use crate::config::Config;
use crate::input::{InputAction, InputState};
use crate::projection::Projection;
use crate::transform::Transform;

/// State owned by the frame driver and handed to the update and draw steps.
#[derive(Debug)]
pub struct AppState {
    pub camera: FlyCamera,
    pub cube: Transform,
    pub spin: Vec3,
    pub projection: Projection,
    pub input: InputState,
    pub stats: FrameStats,
    key_look_delta: f32,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let camera_config = &config.camera;
        let mut projection = config.projection;
        projection.set_viewport(config.window.width, config.window.height);
        Self {
            camera: FlyCamera::new(
                camera_config.position,
                camera_config.yaw,
                camera_config.pitch,
                camera_config.settings,
            ),
            cube: config.cube.transform,
            spin: config.cube.spin,
            projection,
            input: InputState::new(config.bindings.clone()),
            stats: FrameStats::start(),
            key_look_delta: camera_config.key_look_delta,
        }
    }

    /// Advances one frame. Input for this frame must already be applied.
    pub fn update(&mut self, dt: f32) {
        let look = self.input.take_mouse_delta() + self.keyboard_look();
        self.camera.look(look.x, look.y, dt);

        for action in self.input.held_actions() {
            if let Some(direction) = action.move_direction() {
                self.camera.move_in(direction, dt);
            }
        }

        self.cube.rotation += self.spin * dt;
        self.stats.record_frame();
    }

    fn keyboard_look(&self) -> Vec2 {
        let axis = |negative, positive| {
            let mut value = 0.0_f32;
            if self.input.is_held(negative) {
                value -= 1.0;
            }
            if self.input.is_held(positive) {
                value += 1.0;
            }
            value
        };
        // Screen space: +y is down, so LookUp pushes a negative delta.
        Vec2::new(
            axis(InputAction::LookLeft, InputAction::LookRight),
            axis(InputAction::LookUp, InputAction::LookDown),
        ) * self.key_look_delta
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.set_viewport(width, height);
    }

    pub fn mvp(&self) -> Mat4 {
        self.projection.matrix() * self.camera.view_matrix() * self.cube.matrix()
    }

    pub fn should_quit(&self) -> bool {
        self.input.quit_requested()
    }

    pub fn camera_summary(&self) -> String {
        let eye = self.camera.eye();
        format!(
            "Final camera: eye=({:.2}, {:.2}, {:.2}) yaw={:.2} pitch={:.2}",
            eye.x,
            eye.y,
            eye.z,
            self.camera.yaw_degrees(),
            self.camera.pitch_degrees()
        )
    }
}

/// Frame counter and wall-clock timer for the end-of-run summary.
#[derive(Debug, Clone)]
pub struct FrameStats {
    frames: u64,
    started: Instant,
}

impl FrameStats {
    pub fn start() -> Self {
        Self {
            frames: 0,
            started: Instant::now(),
        }
    }

    pub fn record_frame(&mut self) {
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn summary(&self) -> String {
        format_summary(self.frames, self.elapsed())
    }
}

fn format_summary(frames: u64, elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    let fps = if seconds > 0.0 {
        frames as f64 / seconds
    } else {
        0.0
    };
    format!("Rendered {frames} frames in {seconds:.2}s ({fps:.1} fps average)")
}
