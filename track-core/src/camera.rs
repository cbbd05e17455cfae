/// Fly-around camera driven by per-frame input
use nalgebra::{Point3, Vector3};

use crate::projection::Camera;

pub const MIN_SPEED: f32 = 1.0;
pub const MAX_SPEED: f32 = 40.0;
/// Speed change per second while a speed key is held.
pub const SPEED_STEP: f32 = 10.0;
/// Degrees turned per second.
pub const TURN_RATE: f32 = 90.0;
pub const MAX_PITCH: f32 = 85.0;

/// Keys held during one update step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraInput {
    pub forward: bool,
    pub back: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub rise: bool,
    pub sink: bool,
    pub look_up: bool,
    pub look_down: bool,
    pub faster: bool,
    pub slower: bool,
}

impl CameraInput {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Position and heading of the camera. Updated by value each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Point3<f32>,
    /// Yaw in degrees, counter-clockwise seen from above; 0 looks down `-Z`.
    pub angle: f32,
    /// Degrees above the horizon.
    pub pitch: f32,
    /// Units per second.
    pub speed: f32,
}

impl CameraState {
    pub fn new(position: Point3<f32>, angle: f32, speed: f32) -> Self {
        Self {
            position,
            angle,
            pitch: 0.0,
            speed: speed.clamp(MIN_SPEED, MAX_SPEED),
        }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = self.angle.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        Vector3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    /// Projection camera looking along the current heading.
    pub fn camera(&self, width: u32, height: u32) -> Camera {
        let mut camera = Camera::new(width, height);
        camera.position = self.position;
        camera.target = self.position + self.forward();
        camera
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 4.0, 20.0), 0.0, 8.0)
    }
}

/// Advance the camera by `dt` seconds of `input`.
pub fn update(state: CameraState, input: &CameraInput, dt: f32) -> CameraState {
    let axis = |positive: bool, negative: bool| match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    };

    let speed = (state.speed + axis(input.faster, input.slower) * SPEED_STEP * dt)
        .clamp(MIN_SPEED, MAX_SPEED);
    let angle = (state.angle + axis(input.turn_left, input.turn_right) * TURN_RATE * dt) % 360.0;
    let pitch = (state.pitch + axis(input.look_up, input.look_down) * TURN_RATE * dt)
        .clamp(-MAX_PITCH, MAX_PITCH);

    let turned = CameraState {
        angle,
        pitch,
        speed,
        ..state
    };
    let travel = turned.forward() * axis(input.forward, input.back)
        + Vector3::y() * axis(input.rise, input.sink);

    CameraState {
        position: state.position + travel * speed * dt,
        ..turned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_input_keeps_state() {
        let state = CameraState::default();
        let input = CameraInput::default();
        assert!(input.is_idle());
        assert_eq!(update(state, &input, 0.5), state);
    }

    #[test]
    fn test_forward_moves_along_heading() {
        let state = CameraState::new(Point3::origin(), 0.0, 4.0);
        let input = CameraInput {
            forward: true,
            ..Default::default()
        };
        let next = update(state, &input, 0.5);
        assert!((next.position - Point3::new(0.0, 0.0, -2.0)).norm() < 1e-6);
    }

    #[test]
    fn test_turn_left_faces_negative_x() {
        let state = CameraState::new(Point3::origin(), 0.0, 4.0);
        let input = CameraInput {
            turn_left: true,
            ..Default::default()
        };
        let next = update(state, &input, 1.0);
        assert!((next.angle - 90.0).abs() < 1e-4);
        assert!((next.forward() - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_speed_and_pitch_are_clamped() {
        let mut state = CameraState::default();
        let input = CameraInput {
            faster: true,
            look_up: true,
            ..Default::default()
        };
        for _ in 0..100 {
            state = update(state, &input, 0.5);
        }
        assert_eq!(state.speed, MAX_SPEED);
        assert_eq!(state.pitch, MAX_PITCH);
    }

    #[test]
    fn test_camera_targets_heading() {
        let state = CameraState::new(Point3::new(1.0, 2.0, 3.0), 180.0, 4.0);
        let camera = state.camera(800, 600);
        assert_eq!(camera.position, state.position);
        assert!((camera.target - Point3::new(1.0, 2.0, 4.0)).norm() < 1e-6);
    }
}
