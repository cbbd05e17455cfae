/// Procedural mesh for curved track segments.
///
/// A [`Track`] approximates an [`Arc`] with a strip of flat quads, one per unit
/// of arc length, each one unit wide. The mesh is a flat, non-indexed triangle
/// list laid out for direct upload into a vertex buffer:
///
/// - positions: 3 floats per vertex, 18 per segment
/// - texcoords: 2 floats per vertex, 12 per segment
///
/// Texture `u` runs across the strip (0 inner edge, 1 outer edge) and `v` runs
/// along each segment (0 at its first sample, 1 at its second).
use log::{debug, warn};
use nalgebra::{Point3, Vector3};

use crate::arc::Arc;
use crate::error::TrackResult;
use crate::geometry::{Mesh, Triangle, Vertex};

/// Half of the track width: cross sections span `±HALF_WIDTH` around the centerline.
pub const HALF_WIDTH: f32 = 0.5;

/// Vertices emitted per segment (two triangles, not indexed).
pub const VERTICES_PER_SEGMENT: usize = 6;

/// Texture coordinates in emission order, matching [`Quad::build`].
const QUAD_TEXCOORDS: [[f32; 2]; VERTICES_PER_SEGMENT] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
];

/// Number of quads used for a curve of the given length: one per unit, at least one.
pub fn segment_count(arc_length: f32) -> usize {
    // NaN and negative lengths saturate to 0 in the cast
    (arc_length.floor() as usize).max(1)
}

/// Flat triangle-list geometry of a track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMesh {
    /// Vertex positions, stride 3.
    pub vertices: Vec<f32>,
    /// Texture coordinates, stride 2.
    pub texcoords: Vec<f32>,
    pub vertex_count: usize,
    pub triangle_count: usize,
}

impl TrackMesh {
    fn from_quads(quads: &[Quad]) -> Self {
        let vertex_count = quads.len() * VERTICES_PER_SEGMENT;
        let mut vertices = Vec::with_capacity(vertex_count * 3);
        let mut texcoords = Vec::with_capacity(vertex_count * 2);
        for quad in quads {
            for (position, uv) in quad.positions.iter().zip(QUAD_TEXCOORDS.iter()) {
                vertices.extend_from_slice(&[position.x, position.y, position.z]);
                texcoords.extend_from_slice(uv);
            }
        }

        Self {
            vertices,
            texcoords,
            vertex_count,
            triangle_count: quads.len() * 2,
        }
    }

    /// Vertex positions as points.
    pub fn positions(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.vertices
            .chunks_exact(3)
            .map(|p| Point3::new(p[0], p[1], p[2]))
    }

    /// Convert to triangles with face normals for rendering alongside models.
    pub fn to_mesh(&self) -> Mesh {
        let vertices: Vec<Vertex> = self
            .positions()
            .zip(self.texcoords.chunks_exact(2))
            .map(|(p, uv)| Vertex::new(p, Vector3::zeros()).with_uv(uv[0], uv[1]))
            .collect();

        let mut mesh = Mesh::with_capacity(self.triangle_count);
        for corners in vertices.chunks_exact(3) {
            let mut triangle = Triangle::new(corners[0], corners[1], corners[2]);
            let normal = triangle.calculate_normal();
            for vertex in &mut triangle.vertices {
                vertex.normal = normal;
            }
            mesh.add_triangle(triangle);
        }
        mesh
    }
}

/// One segment of the strip: two triangles in emission order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Quad {
    positions: [Point3<f32>; VERTICES_PER_SEGMENT],
}

impl Quad {
    /// Quad between two centerline samples, placed at `position`.
    fn build(p0: Point3<f32>, p1: Point3<f32>, position: &Vector3<f32>) -> Self {
        let n0 = half_width_offset(&p0);
        let n1 = half_width_offset(&p1);
        let p0 = p0 + position;
        let p1 = p1 + position;

        let inner0 = p0 - n0;
        let outer0 = p0 + n0;
        let inner1 = p1 - n1;
        let outer1 = p1 + n1;

        Self {
            positions: [inner0, outer0, outer1, inner0, outer1, inner1],
        }
    }

    /// Quad with its samples ordered by sweep direction.
    ///
    /// Clockwise sweeps (negative angle) are emitted with the two samples
    /// swapped, which keeps front faces along `up_vector` for segments under
    /// 180°. The chord normal of a longer segment points the other way, so it
    /// cannot decide the swap.
    fn oriented(
        p0: Point3<f32>,
        p1: Point3<f32>,
        position: &Vector3<f32>,
        clockwise: bool,
    ) -> Self {
        if clockwise {
            Self::build(p1, p0, position)
        } else {
            Self::build(p0, p1, position)
        }
    }
}

/// Half of the unit direction from the axis origin to `point`.
fn half_width_offset(point: &Point3<f32>) -> Vector3<f32> {
    point
        .coords
        .try_normalize(0.0)
        .map(|dir| dir * HALF_WIDTH)
        .unwrap_or_else(Vector3::zeros)
}

/// Uploads finished track meshes to a renderer.
///
/// The builder calls [`upload`](MeshUploader::upload) once per track and never
/// touches the returned handle again.
pub trait MeshUploader {
    type Handle;

    fn upload(&mut self, mesh: &TrackMesh) -> TrackResult<Self::Handle>;
}

/// A curved track segment generated from an arc.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub arc: Arc,
    pub position: Vector3<f32>,
    pub mesh: TrackMesh,
}

impl Track {
    /// Build the track mesh for `arc` translated by `position`.
    ///
    /// Degenerate arcs are accepted and produce a zero-area mesh.
    pub fn from_arc(arc: Arc, position: Vector3<f32>) -> Self {
        let segments = segment_count(arc.arc_length());
        if arc.validate().is_err() {
            warn!("building degenerate track from {:?}", arc);
        }

        let clockwise = arc.angle < 0.0;
        let quads: Vec<Quad> = (0..segments)
            .map(|i| {
                let p0 = arc.point_at(i as f32 / segments as f32);
                let p1 = arc.point_at((i + 1) as f32 / segments as f32);
                Quad::oriented(p0, p1, &position, clockwise)
            })
            .collect();

        let mesh = TrackMesh::from_quads(&quads);
        debug!(
            "built track: angle={} radius={:.3} segments={} triangles={}",
            arc.angle,
            arc.radius(),
            segments,
            mesh.triangle_count
        );

        Self {
            arc,
            position,
            mesh,
        }
    }

    /// Like [`from_arc`](Self::from_arc) but rejects degenerate arcs.
    pub fn try_from_arc(arc: Arc, position: Vector3<f32>) -> TrackResult<Self> {
        arc.validate()?;
        Ok(Self::from_arc(arc, position))
    }

    /// Build the track and hand its mesh to `uploader`.
    ///
    /// Zero-radius and zero-angle arcs still upload a zero-area mesh, but
    /// non-finite arcs are rejected before anything is sampled.
    pub fn create_from_arc<U: MeshUploader>(
        arc: Arc,
        position: Vector3<f32>,
        uploader: &mut U,
    ) -> TrackResult<(Self, U::Handle)> {
        arc.check_finite()?;
        let track = Self::from_arc(arc, position);
        let handle = uploader.upload(&track.mesh)?;
        Ok((track, handle))
    }

    pub fn segment_count(&self) -> usize {
        self.mesh.vertex_count / VERTICES_PER_SEGMENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackError;

    fn flat_arc(angle: f32, radius: f32) -> Arc {
        Arc::new(angle, Vector3::new(radius, 0.0, 0.0), Vector3::y())
    }

    fn flatten(quad: &Quad) -> Vec<f32> {
        quad.positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }

    fn assert_close(actual: &[f32], expected: [f32; 3]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(segment_count(4.2), 4);
        assert_eq!(segment_count(0.3), 1);
        assert_eq!(segment_count(0.0), 1);
        assert_eq!(segment_count(7.0), 7);
        assert_eq!(segment_count(f32::NAN), 1);
    }

    #[test]
    fn test_quad_layout() {
        let quad = Quad::build(
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, -2.0),
            &Vector3::new(10.0, 1.0, 0.0),
        );
        let expected = [
            Point3::new(11.5, 1.0, 0.0),
            Point3::new(12.5, 1.0, 0.0),
            Point3::new(10.0, 1.0, -2.5),
            Point3::new(11.5, 1.0, 0.0),
            Point3::new(10.0, 1.0, -2.5),
            Point3::new(10.0, 1.0, -1.5),
        ];
        assert_eq!(quad.positions, expected);
    }

    #[test]
    fn test_offset_ignores_placement() {
        // half-width comes from the untranslated sample, so width stays 1
        let track = Track::from_arc(flat_arc(30.0, 3.0), Vector3::new(-50.0, 0.0, 80.0));
        let positions: Vec<_> = track.mesh.positions().collect();
        for tri in positions.chunks_exact(6) {
            assert!(((tri[1] - tri[0]).norm() - 1.0).abs() < 1e-4);
            assert!(((tri[2] - tri[5]).norm() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_positive_sweep_faces_up() {
        let track = Track::from_arc(flat_arc(90.0, 4.0), Vector3::zeros());
        for triangle in &track.mesh.to_mesh().triangles {
            assert!(triangle.calculate_normal().y > 0.99);
        }
    }

    #[test]
    fn test_negative_sweep_swaps_samples() {
        let arc = flat_arc(-90.0, 4.0);
        let track = Track::from_arc(arc, Vector3::zeros());
        let n = track.segment_count();
        let first = Quad::build(
            arc.point_at(1.0 / n as f32),
            arc.point_at(0.0),
            &Vector3::zeros(),
        );
        assert_eq!(&track.mesh.vertices[..18], flatten(&first).as_slice());
    }

    #[test]
    fn test_single_segment_reflex_sweep() {
        // 270 degrees at radius 0.1 is shorter than one unit: one segment
        // whose chord normal points the opposite way to the sweep
        let forward = flat_arc(270.0, 0.1);
        let track = Track::from_arc(forward, Vector3::zeros());
        assert_eq!(track.segment_count(), 1);
        let expected = Quad::build(
            forward.point_at(0.0),
            forward.point_at(1.0),
            &Vector3::zeros(),
        );
        assert_eq!(track.mesh.vertices, flatten(&expected));
        assert_close(&track.mesh.vertices[..3], [-0.4, 0.0, 0.0]);

        let backward = flat_arc(-270.0, 0.1);
        let track = Track::from_arc(backward, Vector3::zeros());
        assert_eq!(track.segment_count(), 1);
        let expected = Quad::build(
            backward.point_at(1.0),
            backward.point_at(0.0),
            &Vector3::zeros(),
        );
        assert_eq!(track.mesh.vertices, flatten(&expected));
        assert_close(&track.mesh.vertices[..3], [0.0, 0.0, 0.4]);
    }

    #[test]
    fn test_texcoords_follow_vertex_order() {
        let track = Track::from_arc(flat_arc(45.0, 2.0), Vector3::zeros());
        assert_eq!(
            &track.mesh.texcoords[..12],
            &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_degenerate_arcs_produce_finite_mesh() {
        let zero_radius = Track::from_arc(flat_arc(90.0, 0.0), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(zero_radius.segment_count(), 1);
        assert!(zero_radius.mesh.vertices.iter().all(|c| c.is_finite()));
        assert!(zero_radius
            .mesh
            .positions()
            .all(|p| p == Point3::new(1.0, 2.0, 3.0)));

        let zero_angle = Track::from_arc(flat_arc(0.0, 5.0), Vector3::zeros());
        assert_eq!(zero_angle.mesh.triangle_count, 2);
        assert!(zero_angle.mesh.vertices.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_try_from_arc_rejects_degenerate() {
        assert!(Track::try_from_arc(flat_arc(0.0, 5.0), Vector3::zeros()).is_err());
        assert!(Track::try_from_arc(flat_arc(10.0, 0.0), Vector3::zeros()).is_err());
        assert!(Track::try_from_arc(flat_arc(10.0, 5.0), Vector3::zeros()).is_ok());
    }

    struct CountingUploader {
        uploads: Vec<usize>,
    }

    impl MeshUploader for CountingUploader {
        type Handle = usize;

        fn upload(&mut self, mesh: &TrackMesh) -> TrackResult<usize> {
            self.uploads.push(mesh.vertex_count);
            Ok(self.uploads.len() - 1)
        }
    }

    #[test]
    fn test_create_uploads_once() {
        let mut uploader = CountingUploader { uploads: Vec::new() };
        let (track, handle) =
            Track::create_from_arc(flat_arc(120.0, 3.0), Vector3::zeros(), &mut uploader).unwrap();
        assert_eq!(handle, 0);
        assert_eq!(uploader.uploads, vec![track.mesh.vertex_count]);
    }

    #[test]
    fn test_create_rejects_non_finite_arc() {
        let mut uploader = CountingUploader { uploads: Vec::new() };
        let result =
            Track::create_from_arc(flat_arc(f32::INFINITY, 3.0), Vector3::zeros(), &mut uploader);
        assert!(matches!(result, Err(TrackError::DegenerateArc(_))));
        assert!(uploader.uploads.is_empty());

        // zero sweep is still built and uploaded
        let (track, _) =
            Track::create_from_arc(flat_arc(0.0, 3.0), Vector3::zeros(), &mut uploader).unwrap();
        assert_eq!(track.segment_count(), 1);
        assert_eq!(uploader.uploads.len(), 1);
    }
}
