/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Vector2, Vector3};
use std::io::Write;
use track_core::{Camera, Mesh, MeshUploader, Triangle, TrackMesh, TrackResult};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Minimum brightness so faces turned away from the light stay visible
const AMBIENT: f32 = 0.15;

/// Rails sit this far in from each edge of the track, in texture `u`
const RAIL_INSET: f32 = 0.2;
const RAIL_HALF_WIDTH: f32 = 0.07;
/// Sleepers per texture repeat along `v`
const TIES_PER_SEGMENT: f32 = 2.0;

/// Index of a mesh stored in the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHandle(usize);

/// How a stored mesh is turned into characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Lambert lighting mapped onto the luminosity ramp
    Lit,
    /// Rails and ties sampled from texture coordinates
    Track,
}

struct StoredMesh {
    mesh: Mesh,
    shading: Shading,
}

/// A projected vertex: screen position, depth and texture coordinate
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    uv: Vector2<f32>,
}

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    meshes: Vec<StoredMesh>,
    light_dir: Vector3<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            meshes: Vec::new(),
            light_dir: Vector3::new(0.4, 1.0, 0.3).normalize(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer.resize(size, f32::INFINITY);
        self.char_buffer.resize(size, ' ');
        self.color_buffer.resize(size, Color::Reset);
        self.clear();
    }

    /// Store a mesh for later drawing
    pub fn upload_mesh(&mut self, mesh: Mesh, shading: Shading) -> MeshHandle {
        self.meshes.push(StoredMesh { mesh, shading });
        MeshHandle(self.meshes.len() - 1)
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Character at a cell, mostly for tests
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn render(&mut self, handle: MeshHandle, model_matrix: &Matrix4<f32>, camera: &Camera) {
        let mvp = camera.view_projection() * model_matrix;

        // Take the mesh out so triangles can be rasterized while mutating the buffers
        let Some(stored) = self.meshes.get_mut(handle.0) else {
            return;
        };
        let mesh = std::mem::take(&mut stored.mesh);
        let shading = stored.shading;

        for triangle in &mesh.triangles {
            self.render_triangle(triangle, model_matrix, &mvp, shading);
        }

        self.meshes[handle.0].mesh = mesh;
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model_matrix: &Matrix4<f32>,
        mvp: &Matrix4<f32>,
        shading: Shading,
    ) {
        // Project vertices to screen space
        let mut screen = [ScreenVertex {
            x: 0.0,
            y: 0.0,
            depth: 0.0,
            uv: Vector2::zeros(),
        }; 3];
        for (out, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            let Some((x, y, depth)) = Camera::project_to_screen(
                mvp,
                &vertex.position,
                self.width as u32,
                self.height as u32,
            ) else {
                return; // Triangle crosses the near plane
            };
            *out = ScreenVertex {
                x,
                y,
                depth,
                uv: vertex.uv,
            };
        }

        // Counter-clockwise faces are front faces; screen y points down so they
        // come out with negative signed area here
        if signed_area(&screen[0], &screen[1], &screen[2]) >= 0.0 {
            return;
        }

        match shading {
            Shading::Lit => {
                let normal = model_matrix
                    .transform_vector(&triangle.calculate_normal())
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3::zeros);
                let brightness = normal.dot(&self.light_dir).max(0.0) * (1.0 - AMBIENT) + AMBIENT;

                // Map brightness to character
                let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
                let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];
                self.rasterize_triangle(&screen, |_| (character, ramp_color(character)));
            }
            Shading::Track => self.rasterize_triangle(&screen, track_texel),
        }
    }

    fn rasterize_triangle<F>(&mut self, v: &[ScreenVertex; 3], shade: F)
    where
        F: Fn(Vector2<f32>) -> (char, Color),
    {
        // Bounding box
        let min_x = v[0].x.min(v[1].x).min(v[2].x).floor().max(0.0) as usize;
        let max_x = v[0].x.max(v[1].x).max(v[2].x).ceil();
        let min_y = v[0].y.min(v[1].y).min(v[2].y).floor().max(0.0) as usize;
        let max_y = v[0].y.max(v[1].y).max(v[2].y).ceil();
        if max_x < 0.0 || max_y < 0.0 || self.width == 0 || self.height == 0 {
            return;
        }

        // Clip to screen bounds
        let max_x = (max_x as usize).min(self.width - 1);
        let max_y = (max_y as usize).min(self.height - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                let Some((w0, w1, w2)) = barycentric(
                    (v[0].x, v[0].y),
                    (v[1].x, v[1].y),
                    (v[2].x, v[2].y),
                    (px, py),
                ) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                // Interpolate depth
                let depth = w0 * v[0].depth + w1 * v[1].depth + w2 * v[2].depth;
                let idx = y * self.width + x;
                if depth < self.depth_buffer[idx] {
                    let uv = v[0].uv * w0 + v[1].uv * w1 + v[2].uv * w2;
                    let (character, color) = shade(uv);
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                    self.color_buffer[idx] = color;
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl MeshUploader for AsciiRenderer {
    type Handle = MeshHandle;

    fn upload(&mut self, mesh: &TrackMesh) -> TrackResult<MeshHandle> {
        Ok(self.upload_mesh(mesh.to_mesh(), Shading::Track))
    }
}

/// Color based on character intensity
fn ramp_color(c: char) -> Color {
    match c {
        ' ' | '.' | ':' => Color::DarkGrey,
        '-' | '=' => Color::Grey,
        '+' | '*' => Color::White,
        '#' | '%' | '@' => Color::Cyan,
        _ => Color::White,
    }
}

/// Track texture: two rails along the strip over evenly spaced ties
fn track_texel(uv: Vector2<f32>) -> (char, Color) {
    let on_rail = (uv.x - RAIL_INSET).abs() < RAIL_HALF_WIDTH
        || (uv.x - (1.0 - RAIL_INSET)).abs() < RAIL_HALF_WIDTH;
    if on_rail {
        ('#', Color::White)
    } else if (uv.y * TIES_PER_SEGMENT).fract() < 0.35 {
        ('=', Color::DarkYellow)
    } else {
        ('.', Color::DarkGrey)
    }
}

/// Twice the signed area of a screen-space triangle
fn signed_area(a: &ScreenVertex, b: &ScreenVertex, c: &ScreenVertex) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
