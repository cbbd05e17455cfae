/// Track Core Library - arc geometry and procedural track meshes
///
/// This library provides the stateless core of the track demo: circular arcs,
/// the curved track mesh builder, the fly camera, model loading and scene
/// configuration. Rendering backends plug in through [`MeshUploader`].

pub mod arc;
pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod stl;
pub mod track;
pub mod transform;

// Re-export commonly used types
pub use arc::Arc;
pub use camera::{CameraInput, CameraState};
pub use config::SceneConfig;
pub use error::{TrackError, TrackResult};
pub use geometry::{Mesh, Triangle, Vertex};
pub use projection::Camera;
pub use track::{MeshUploader, Track, TrackMesh};
pub use transform::Transform;
