use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Pitch limit in degrees. Keeps `forward` away from the world up axis so
/// the basis never degenerates.
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// World up axis. Vertical movement and the view matrix both use it.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Tuning values for [`FlyCamera`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// World units per second.
    pub move_speed: f32,
    /// Degrees of yaw per unit of horizontal delta per second.
    pub horizontal_sensitivity: f32,
    /// Degrees of pitch per unit of vertical delta per second.
    pub vertical_sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            move_speed: 2.5,
            horizontal_sensitivity: 6.0,
            vertical_sensitivity: 6.0,
        }
    }
}

/// Direction requested by a movement input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
}

/// First-person camera driven by yaw/pitch angles in degrees.
///
/// `forward` and `right` are derived from the angles and are refreshed by
/// every method that changes them, so they are never stale.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    eye: Vec3,
    yaw: f32,
    pitch: f32,
    forward: Vec3,
    right: Vec3,
    settings: CameraSettings,
}

impl Default for FlyCamera {
    /// Three units back from the origin, looking down -Z.
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), -90.0, 0.0, CameraSettings::default())
    }
}

impl FlyCamera {
    pub fn new(eye: Vec3, yaw_degrees: f32, pitch_degrees: f32, settings: CameraSettings) -> Self {
        let mut camera = Self {
            eye,
            yaw: yaw_degrees,
            pitch: clamp_pitch(pitch_degrees),
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            settings,
        };
        camera.derive_basis();
        camera
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Yaw in degrees. Never wrapped, so it can grow without bound.
    pub fn yaw_degrees(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees, always within `[-89, 89]`.
    pub fn pitch_degrees(&self) -> f32 {
        self.pitch
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Applies a pointer delta scaled by sensitivity and elapsed time.
    /// Positive `dy` (pointer moving down) pitches the camera down.
    pub fn look(&mut self, dx: f32, dy: f32, dt: f32) {
        self.yaw += dx * self.settings.horizontal_sensitivity * dt;
        self.pitch = clamp_pitch(self.pitch + dy * -self.settings.vertical_sensitivity * dt);
        self.derive_basis();
    }

    /// Recomputes `forward` and `right` from the current yaw and pitch.
    pub fn derive_basis(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        self.forward = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        let flat = Vec3::new(self.forward.x, 0.0, self.forward.z);
        self.right = flat.cross(WORLD_UP).normalize();
    }

    /// Unit vector that `direction` moves the eye along.
    pub fn basis_vector(&self, direction: MoveDirection) -> Vec3 {
        match direction {
            MoveDirection::Forward => self.forward,
            MoveDirection::Back => -self.forward,
            MoveDirection::Left => -self.right,
            MoveDirection::Right => self.right,
            MoveDirection::Up => WORLD_UP,
            MoveDirection::Down => -WORLD_UP,
        }
    }

    pub fn move_in(&mut self, direction: MoveDirection, dt: f32) {
        self.eye += self.basis_vector(direction) * self.settings.move_speed * dt;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.eye + self.forward, WORLD_UP)
    }
}

fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn camera_at(eye: Vec3) -> FlyCamera {
        FlyCamera::new(eye, -90.0, 0.0, CameraSettings::default())
    }

    #[test]
    fn initial_camera_looks_down_negative_z() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 1.0));
        camera.look(0.0, 0.0, 0.016);
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Z, EPSILON));
        assert!(camera.right().abs_diff_eq(Vec3::X, EPSILON));
    }

    #[test]
    fn pitch_is_clamped_in_both_directions() {
        let mut camera = camera_at(Vec3::ZERO);
        for _ in 0..100 {
            camera.look(0.0, -10_000.0, 1.0);
            assert!(camera.pitch_degrees() <= PITCH_LIMIT_DEGREES);
        }
        assert_eq!(camera.pitch_degrees(), PITCH_LIMIT_DEGREES);

        for _ in 0..100 {
            camera.look(0.0, 10_000.0, 1.0);
            assert!(camera.pitch_degrees() >= -PITCH_LIMIT_DEGREES);
        }
        assert_eq!(camera.pitch_degrees(), -PITCH_LIMIT_DEGREES);
    }

    #[test]
    fn pitch_at_limit_is_stable() {
        let mut camera = FlyCamera::new(Vec3::ZERO, 0.0, 89.0, CameraSettings::default());
        let forward = camera.forward();
        for _ in 0..10 {
            camera.look(0.0, -1.0, 1.0);
            assert_eq!(camera.pitch_degrees(), PITCH_LIMIT_DEGREES);
            assert_eq!(camera.forward(), forward);
        }
    }

    #[test]
    fn constructor_clamps_pitch() {
        let camera = FlyCamera::new(Vec3::ZERO, 0.0, 90.0, CameraSettings::default());
        assert_eq!(camera.pitch_degrees(), PITCH_LIMIT_DEGREES);
        assert!(camera.right().is_finite());
    }

    #[test]
    fn yaw_is_not_wrapped() {
        let mut camera = camera_at(Vec3::ZERO);
        for _ in 0..50 {
            camera.look(100.0, 0.0, 1.0);
        }
        assert!(camera.yaw_degrees() > 360.0);
    }

    #[test]
    fn basis_stays_unit_length() {
        let mut camera = camera_at(Vec3::ZERO);
        let deltas = [
            (13.0, 7.0),
            (-250.0, 33.0),
            (0.5, -900.0),
            (1e4, 1e4),
            (-3.0, 0.0),
        ];
        for (dx, dy) in deltas.iter().cycle().take(40) {
            camera.look(*dx, *dy, 0.016);
            assert!((camera.forward().length() - 1.0).abs() < EPSILON);
            assert!((camera.right().length() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn vertical_movement_ignores_orientation() {
        let mut camera = camera_at(Vec3::new(1.0, 2.0, 3.0));
        camera.look(37.0, -12.0, 1.0);
        camera.move_in(MoveDirection::Up, 0.5);
        let expected_y = 2.0 + camera.settings().move_speed * 0.5;
        assert_eq!(camera.eye(), Vec3::new(1.0, expected_y, 3.0));

        camera.move_in(MoveDirection::Down, 0.5);
        assert!(camera.eye().abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), EPSILON));
    }

    #[test]
    fn forward_and_strafe_follow_basis() {
        let mut camera = camera_at(Vec3::ZERO);
        camera.move_in(MoveDirection::Forward, 1.0);
        assert!(camera.eye().abs_diff_eq(Vec3::new(0.0, 0.0, -2.5), EPSILON));
        camera.move_in(MoveDirection::Right, 2.0);
        assert!(camera.eye().abs_diff_eq(Vec3::new(5.0, 0.0, -2.5), EPSILON));
        camera.move_in(MoveDirection::Left, 2.0);
        camera.move_in(MoveDirection::Back, 1.0);
        assert!(camera.eye().abs_diff_eq(Vec3::ZERO, EPSILON));
    }

    #[test]
    fn view_matrix_places_target_on_negative_z() {
        let camera = camera_at(Vec3::new(0.0, 0.0, 1.0));
        let view = camera.view_matrix();
        let target = view.transform_point3(camera.eye() + camera.forward());
        assert!(target.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), EPSILON));
        assert!(view.transform_point3(camera.eye()).abs_diff_eq(Vec3::ZERO, EPSILON));
    }
}
