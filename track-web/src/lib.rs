/// Track Web - WASM bindings for building tracks and uploading them to WebGL2
///
/// JavaScript builds a [`WebTrack`] from plain numbers and either reads the
/// flat buffers back or lets [`WebTrack::build`] upload them into two
/// `ARRAY_BUFFER`s of a WebGL2 context.
use log::debug;
use nalgebra::Vector3;
use track_core::{Arc, MeshUploader, Track, TrackError, TrackMesh, TrackResult};
use wasm_bindgen::prelude::*;
use web_sys::{WebGl2RenderingContext, WebGlBuffer};

/// GPU buffers holding one track mesh
#[wasm_bindgen]
pub struct GlTrackBuffers {
    positions: WebGlBuffer,
    texcoords: WebGlBuffer,
    vertex_count: usize,
}

#[wasm_bindgen]
impl GlTrackBuffers {
    /// Vertex positions, three floats per vertex
    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> WebGlBuffer {
        self.positions.clone()
    }

    /// Texture coordinates, two floats per vertex
    #[wasm_bindgen(getter)]
    pub fn texcoords(&self) -> WebGlBuffer {
        self.texcoords.clone()
    }

    /// Count to pass to `drawArrays(TRIANGLES, 0, count)`
    #[wasm_bindgen(getter = vertexCount)]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

/// Uploads track meshes into a WebGL2 context
pub struct WebGlUploader<'a> {
    gl: &'a WebGl2RenderingContext,
}

impl<'a> WebGlUploader<'a> {
    pub fn new(gl: &'a WebGl2RenderingContext) -> Self {
        Self { gl }
    }

    fn array_buffer(&self, data: &[f32]) -> TrackResult<WebGlBuffer> {
        let buffer = self
            .gl
            .create_buffer()
            .ok_or_else(|| TrackError::Upload("WebGL could not create a buffer".to_string()))?;
        self.gl
            .bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, Some(&buffer));
        self.gl.buffer_data_with_u8_array(
            WebGl2RenderingContext::ARRAY_BUFFER,
            bytemuck::cast_slice(data),
            WebGl2RenderingContext::STATIC_DRAW,
        );
        self.gl.bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, None);
        Ok(buffer)
    }
}

impl MeshUploader for WebGlUploader<'_> {
    type Handle = GlTrackBuffers;

    fn upload(&mut self, mesh: &TrackMesh) -> TrackResult<GlTrackBuffers> {
        debug!("uploading {} track vertices", mesh.vertex_count);
        Ok(GlTrackBuffers {
            positions: self.array_buffer(&mesh.vertices)?,
            texcoords: self.array_buffer(&mesh.texcoords)?,
            vertex_count: mesh.vertex_count,
        })
    }
}

/// A curved track exposed to JavaScript
#[wasm_bindgen]
pub struct WebTrack {
    track: Track,
}

#[wasm_bindgen]
impl WebTrack {
    /// Build a track without touching the GPU.
    ///
    /// `start_point`, `up_vector` and `position` are arrays of three numbers.
    #[wasm_bindgen(constructor)]
    pub fn new(
        angle: f32,
        start_point: &[f32],
        up_vector: &[f32],
        position: &[f32],
    ) -> Result<WebTrack, JsValue> {
        let (arc, position) = arc_and_position(angle, start_point, up_vector, position)
            .map_err(to_js)?;
        Ok(WebTrack {
            track: Track::from_arc(arc, position),
        })
    }

    /// Build a track and upload it into `gl`, returning the track's buffers.
    pub fn build(
        gl: &WebGl2RenderingContext,
        angle: f32,
        start_point: &[f32],
        up_vector: &[f32],
        position: &[f32],
    ) -> Result<GlTrackBuffers, JsValue> {
        let (arc, position) = arc_and_position(angle, start_point, up_vector, position)
            .map_err(to_js)?;
        let (_, buffers) =
            Track::create_from_arc(arc, position, &mut WebGlUploader::new(gl)).map_err(to_js)?;
        Ok(buffers)
    }

    /// Vertex positions, three floats per vertex
    pub fn positions(&self) -> Vec<f32> {
        self.track.mesh.vertices.clone()
    }

    /// Texture coordinates, two floats per vertex
    pub fn texcoords(&self) -> Vec<f32> {
        self.track.mesh.texcoords.clone()
    }

    #[wasm_bindgen(getter = vertexCount)]
    pub fn vertex_count(&self) -> usize {
        self.track.mesh.vertex_count
    }

    #[wasm_bindgen(getter = triangleCount)]
    pub fn triangle_count(&self) -> usize {
        self.track.mesh.triangle_count
    }

    #[wasm_bindgen(getter)]
    pub fn radius(&self) -> f32 {
        self.track.arc.radius()
    }

    #[wasm_bindgen(getter = arcLength)]
    pub fn arc_length(&self) -> f32 {
        self.track.arc.arc_length()
    }
}

fn arc_and_position(
    angle: f32,
    start_point: &[f32],
    up_vector: &[f32],
    position: &[f32],
) -> TrackResult<(Arc, Vector3<f32>)> {
    let arc = Arc::new(
        angle,
        vector3("start_point", start_point)?,
        vector3("up_vector", up_vector)?,
    );
    arc.check_finite()?;
    Ok((arc, vector3("position", position)?))
}

fn vector3(name: &str, values: &[f32]) -> TrackResult<Vector3<f32>> {
    match values {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(TrackError::Config(format!(
            "{} needs 3 components, got {}",
            name,
            values.len()
        ))),
    }
}

fn to_js(error: TrackError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector3_requires_three_components() {
        assert_eq!(
            vector3("position", &[1.0, 2.0, 3.0]).unwrap(),
            Vector3::new(1.0, 2.0, 3.0)
        );
        assert!(matches!(
            vector3("position", &[1.0, 2.0]),
            Err(TrackError::Config(_))
        ));
    }

    #[test]
    fn test_non_finite_arc_is_rejected() {
        let result = arc_and_position(
            f32::INFINITY,
            &[1.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[0.0, 0.0, 0.0],
        );
        assert!(matches!(result, Err(TrackError::DegenerateArc(_))));
        assert!(arc_and_position(0.0, &[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0; 3]).is_ok());
    }

    #[test]
    fn test_web_track_buffers() {
        let track = WebTrack::new(60.0, &[0.0, 0.0, 5.0], &[0.0, 1.0, 0.0], &[-10.0, 0.0, 10.0])
            .ok()
            .expect("valid track");
        assert_eq!(track.vertex_count(), 30);
        assert_eq!(track.triangle_count(), 10);
        assert_eq!(track.positions().len(), 90);
        assert_eq!(track.texcoords().len(), 60);
        assert!((track.radius() - 5.0).abs() < 1e-6);
    }
}
