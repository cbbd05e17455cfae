/// Circular arcs swept around an axis through the origin
use nalgebra::{Point3, Vector3};

use crate::error::{TrackError, TrackResult};

/// A circular arc: `start_point` swept by `angle` degrees around `up_vector`.
///
/// Rotation is right-handed: a positive angle turns counter-clockwise when
/// looking down `up_vector` toward the origin, so sweeping `(1, 0, 0)` by
/// 90 degrees around `+Y` ends at `(0, 0, -1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    /// Signed sweep in degrees. Any value, including several revolutions.
    pub angle: f32,
    /// Offset from the rotation axis; its length is the radius.
    pub start_point: Vector3<f32>,
    /// Rotation axis. Does not need to be normalized.
    pub up_vector: Vector3<f32>,
}

impl Arc {
    pub fn new(angle: f32, start_point: Vector3<f32>, up_vector: Vector3<f32>) -> Self {
        Self {
            angle,
            start_point,
            up_vector,
        }
    }

    /// Point reached after sweeping `angle * t` degrees.
    ///
    /// `t` is not clamped; values outside `[0, 1]` extrapolate along the circle.
    pub fn point_at(&self, t: f32) -> Point3<f32> {
        let theta = (self.angle * t).to_radians();
        Point3::from(rotate_about_axis(&self.start_point, &self.up_vector, theta))
    }

    /// Distance from the axis origin to the start point.
    pub fn radius(&self) -> f32 {
        self.start_point.norm()
    }

    /// Length of the curve between `t = 0` and `t = 1`, independent of direction.
    pub fn arc_length(&self) -> f32 {
        self.radius() * std::f32::consts::TAU * (self.angle.abs() / 360.0)
    }

    /// Reject arcs with infinite or NaN parameters, which have no sampling.
    pub fn check_finite(&self) -> TrackResult<()> {
        let finite = self.angle.is_finite()
            && self.start_point.iter().all(|c| c.is_finite())
            && self.up_vector.iter().all(|c| c.is_finite());
        if !finite {
            return Err(TrackError::DegenerateArc(format!(
                "non-finite arc parameters: {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Reject arcs whose mesh would have no area.
    pub fn validate(&self) -> TrackResult<()> {
        self.check_finite()?;
        if self.radius() == 0.0 {
            return Err(TrackError::DegenerateArc("radius is zero".to_string()));
        }
        if self.angle == 0.0 {
            return Err(TrackError::DegenerateArc("sweep angle is zero".to_string()));
        }
        Ok(())
    }
}

/// Rodrigues' rotation of `v` around `axis` by `theta` radians.
///
/// A zero axis leaves `v` unchanged.
fn rotate_about_axis(v: &Vector3<f32>, axis: &Vector3<f32>, theta: f32) -> Vector3<f32> {
    let k = axis.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros);
    let (sin, cos) = theta.sin_cos();
    v * cos + k.cross(v) * sin + k * k.dot(v) * (1.0 - cos)
}
