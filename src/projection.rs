use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Perspective projection parameters.
///
/// The matrix is right-handed and maps view-space depth onto `[0, 1]`, which
/// is what wgpu expects. `near > 0` and `far > near` are the caller's
/// responsibility; nothing here checks them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Updates the aspect ratio from a framebuffer size. A zero height keeps
    /// the previous ratio.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn near_and_far_planes_map_to_unit_depth() {
        let projection = Projection::default();
        let matrix = projection.matrix();
        let near = matrix.project_point3(Vec3::new(0.0, 0.0, -projection.near));
        let far = matrix.project_point3(Vec3::new(0.0, 0.0, -projection.far));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn viewport_updates_aspect() {
        let mut projection = Projection::default();
        projection.set_viewport(1600, 900);
        assert!((projection.aspect - 16.0 / 9.0).abs() < f32::EPSILON);
        projection.set_viewport(1600, 0);
        assert!((projection.aspect - 16.0 / 9.0).abs() < f32::EPSILON);
    }

    #[test]
    fn wider_aspect_narrows_horizontal_scale() {
        let square = Projection::default().matrix();
        let wide = Projection {
            aspect: 2.0,
            ..Projection::default()
        }
        .matrix();
        assert!((wide.x_axis.x * 2.0 - square.x_axis.x).abs() < 1e-5);
        assert_eq!(wide.y_axis.y, square.y_axis.y);
    }
}
