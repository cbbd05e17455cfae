/// Scene configuration (`scene.toml`)
///
/// Every field has a default, so a partial file only overrides what it names.
/// An empty file reproduces the built-in demo scene: two models and two tracks.
use std::path::{Path, PathBuf};

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::arc::Arc;
use crate::camera::CameraState;
use crate::error::{TrackError, TrackResult};
use crate::transform::Transform;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,
    #[serde(default = "default_tracks")]
    pub tracks: Vec<TrackConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub angle: f32,
    #[serde(default = "default_speed")]
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// STL file; a cube is used when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub yaw: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackConfig {
    pub angle: f32,
    pub start_point: [f32; 3],
    #[serde(default = "default_up")]
    pub up_vector: [f32; 3],
    #[serde(default)]
    pub position: [f32; 3],
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 4.0, 20.0]
}

fn default_speed() -> f32 {
    8.0
}

fn default_scale() -> f32 {
    1.0
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig {
            path: None,
            position: [4.0, 1.0, 0.0],
            yaw: 0.0,
            scale: 2.0,
        },
        ModelConfig {
            path: None,
            position: [-4.0, 1.0, -6.0],
            yaw: 45.0,
            scale: 2.0,
        },
    ]
}

fn default_tracks() -> Vec<TrackConfig> {
    vec![
        TrackConfig {
            angle: 60.0,
            start_point: [0.0, 0.0, 5.0],
            up_vector: default_up(),
            position: [-10.0, 0.0, 10.0],
        },
        TrackConfig {
            angle: -120.0,
            start_point: [8.0, 0.0, 0.0],
            up_vector: default_up(),
            position: [0.0, 0.0, 0.0],
        },
    ]
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            models: default_models(),
            tracks: default_tracks(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            angle: 0.0,
            speed: default_speed(),
        }
    }
}

impl SceneConfig {
    pub fn from_toml(content: &str) -> TrackResult<Self> {
        toml::from_str(content).map_err(|e| TrackError::Config(e.to_string()))
    }

    /// Load a scene file
    pub fn load(path: &Path) -> TrackResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> TrackResult<String> {
        toml::to_string_pretty(self).map_err(|e| TrackError::Config(e.to_string()))
    }
}

impl CameraConfig {
    pub fn state(&self) -> CameraState {
        CameraState::new(Point3::from(self.position), self.angle, self.speed)
    }
}

impl ModelConfig {
    pub fn transform(&self) -> Transform {
        Transform::new(Vector3::from(self.position), self.yaw, self.scale)
    }
}

impl TrackConfig {
    pub fn arc(&self) -> Arc {
        Arc::new(
            self.angle,
            Vector3::from(self.start_point),
            Vector3::from(self.up_vector),
        )
    }

    pub fn position(&self) -> Vector3<f32> {
        Vector3::from(self.position)
    }
}
