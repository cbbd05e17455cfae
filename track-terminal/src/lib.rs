/// Terminal demo: two models and curved tracks under a fly camera
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use nalgebra::Matrix4;
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use track_core::camera::{self, CameraInput, CameraState};
use track_core::config::{ModelConfig, SceneConfig};
use track_core::{stl, Mesh, Track, TrackResult, Transform};

pub mod renderer;

pub use renderer::{AsciiRenderer, MeshHandle, Shading};

/// Seconds of camera motion applied per key press or repeat
const KEY_STEP: f32 = 0.1;

const KEY_HELP: &str = "W/S move  A/D turn  R/F rise/sink  I/K look  +/- speed  Q quit";

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: u32 = 2;

/// A drawable object: a stored mesh and where to put it
struct SceneObject {
    handle: MeshHandle,
    transform: Transform,
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    tracks: Vec<(Track, MeshHandle)>,
    models: Vec<SceneObject>,
    camera: CameraState,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Build the scene from `config`. Paths in `model_overrides` replace the
    /// configured model files in order.
    pub fn new(config: &SceneConfig, model_overrides: &[PathBuf]) -> TrackResult<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(config, model_overrides, width as usize, height as usize)
    }

    pub fn with_size(
        config: &SceneConfig,
        model_overrides: &[PathBuf],
        width: usize,
        height: usize,
    ) -> TrackResult<Self> {
        let mut renderer = AsciiRenderer::new(width, height);

        let mut models = Vec::with_capacity(config.models.len());
        for (i, model) in config.models.iter().enumerate() {
            let path = model_overrides.get(i).or(model.path.as_ref());
            let mesh = load_model(path, model)?;
            models.push(SceneObject {
                handle: renderer.upload_mesh(mesh, Shading::Lit),
                transform: model.transform(),
            });
        }

        let mut tracks = Vec::with_capacity(config.tracks.len());
        for track in &config.tracks {
            tracks.push(Track::create_from_arc(
                track.arc(),
                track.position(),
                &mut renderer,
            )?);
        }
        info!(
            "scene ready: {} models, {} tracks, {} track triangles",
            models.len(),
            tracks.len(),
            tracks
                .iter()
                .map(|(t, _)| t.mesh.triangle_count)
                .sum::<usize>()
        );

        Ok(Self {
            tracks,
            models,
            camera: config.camera.state(),
            renderer,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn run(&mut self) -> TrackResult<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> TrackResult<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            let mut input = CameraInput::default();
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?, &mut input);
            }

            // Update
            if !input.is_idle() {
                self.camera = camera::update(self.camera, &input, KEY_STEP);
            }

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        info!("leaving at {:?}", self.camera.position);
        Ok(())
    }

    fn handle_event(&mut self, event: Event, input: &mut CameraInput) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                ..
            }) => {
                if matches!(code, KeyCode::Char('q') | KeyCode::Esc) {
                    self.running = false;
                } else {
                    apply_key(code, input);
                }
            }
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
            }
            _ => {}
        }
    }

    /// Draw every model and track into the renderer's buffers
    pub fn render_scene(&mut self) {
        let camera = self.camera.camera(
            self.renderer.width() as u32,
            self.renderer.height() as u32 * CELL_ASPECT,
        );

        self.renderer.clear();
        for model in &self.models {
            self.renderer
                .render(model.handle, &model.transform.matrix(), &camera);
        }
        // Track vertices are already placed in world space
        for (_, handle) in &self.tracks {
            self.renderer.render(*handle, &Matrix4::identity(), &camera);
        }
    }

    fn render(&mut self) -> TrackResult<()> {
        self.render_scene();

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let position = self.camera.position;
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Track Demo | FPS: {:.1} | pos ({:.1}, {:.1}, {:.1}) yaw {:.0} speed {:.0} | {}",
                self.fps,
                position.x,
                position.y,
                position.z,
                self.camera.angle,
                self.camera.speed,
                KEY_HELP
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }
}

/// Map a key to the camera control it holds for this frame
fn apply_key(code: KeyCode, input: &mut CameraInput) {
    match code {
        KeyCode::Char('w') | KeyCode::Up => input.forward = true,
        KeyCode::Char('s') | KeyCode::Down => input.back = true,
        KeyCode::Char('a') | KeyCode::Left => input.turn_left = true,
        KeyCode::Char('d') | KeyCode::Right => input.turn_right = true,
        KeyCode::Char('r') | KeyCode::PageUp => input.rise = true,
        KeyCode::Char('f') | KeyCode::PageDown => input.sink = true,
        KeyCode::Char('i') => input.look_up = true,
        KeyCode::Char('k') => input.look_down = true,
        KeyCode::Char('+') | KeyCode::Char('=') => input.faster = true,
        KeyCode::Char('-') => input.slower = true,
        _ => {}
    }
}

/// Load a model file, falling back to a cube, and fit it into a unit box
fn load_model(path: Option<&PathBuf>, model: &ModelConfig) -> TrackResult<Mesh> {
    let mesh = match path {
        Some(path) => stl::load_model(path)?,
        None => Mesh::cube(1.0),
    };
    if mesh.triangles.is_empty() {
        warn!("model at {:?} has no triangles", model.position);
    }
    Ok(mesh.fit_unit_box())
}
