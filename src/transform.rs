use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Position, Euler rotation (radians, one angle per axis) and scale of a
/// drawable object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
        }
    }
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// World matrix composed as `T * Rz * Ry * Rx * S`: scale first, then
    /// rotate about X, Y and Z in that order, then translate.
    ///
    /// A zero scale component yields a singular matrix; that is not an error.
    pub fn matrix(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position);
        let rotation =
            rotation_z(self.rotation.z) * rotation_y(self.rotation.y) * rotation_x(self.rotation.x);
        let scale = Mat4::from_scale(self.scale);
        translation * rotation * scale
    }

    /// Writes [`Transform::matrix`] into `out` in column-major order.
    pub fn write_matrix(&self, out: &mut [f32; 16]) {
        *out = self.matrix().to_cols_array();
    }
}

/// Right-handed rotation about +X: +Y turns toward +Z.
pub fn rotation_x(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, c, s, 0.0),
        Vec4::new(0.0, -s, c, 0.0),
        Vec4::W,
    )
}

/// Right-handed rotation about +Y: +Z turns toward +X.
pub fn rotation_y(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::from_cols(
        Vec4::new(c, 0.0, -s, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(s, 0.0, c, 0.0),
        Vec4::W,
    )
}

/// Right-handed rotation about +Z: +X turns toward +Y.
pub fn rotation_z(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::from_cols(
        Vec4::new(c, s, 0.0, 0.0),
        Vec4::new(-s, c, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::W,
    )
}
