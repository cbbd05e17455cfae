/// Model placement in the scene
use nalgebra::{Matrix4, Vector3};

/// Where a loaded model sits: uniform scale, then a turn about `+Y`, then translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    /// Degrees about the vertical axis.
    pub yaw: f32,
    pub scale: f32,
}

impl Transform {
    pub fn new(position: Vector3<f32>, yaw: f32, scale: f32) -> Self {
        Self {
            position,
            yaw,
            scale,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), 0.0, 1.0)
    }

    /// Model matrix for this placement
    pub fn matrix(&self) -> Matrix4<f32> {
        let rotation = Matrix4::new_rotation(Vector3::new(0.0, self.yaw.to_radians(), 0.0));
        Matrix4::new_translation(&self.position) * rotation * Matrix4::new_scaling(self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_identity_matrix() {
        let matrix = Transform::identity().matrix();
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_scale_then_turn_then_translate() {
        let transform = Transform::new(Vector3::new(10.0, 0.0, 0.0), 90.0, 2.0);
        let moved = transform.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        // (1,0,0) scaled to (2,0,0), turned to (0,0,-2), shifted by +10 in x
        assert!((moved - Point3::new(10.0, 0.0, -2.0)).norm() < 1e-5);
    }
}
