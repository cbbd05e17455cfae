/// Track Terminal Demo - curved tracks and two models under a fly camera
///
/// Controls:
///   - W/S or Up/Down: Move forward / back
///   - A/D or Left/Right: Turn
///   - R/F: Rise / sink
///   - I/K: Look up / down
///   - +/-: Change speed
///   - Q/ESC: Quit
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use track_core::{SceneConfig, TrackResult};
use track_terminal::TerminalApp;

#[derive(Parser)]
#[command(name = "track-terminal")]
#[command(author, version, about = "Curved track demo rendered in the terminal")]
struct Args {
    /// Scene file (TOML); the built-in demo scene is used when omitted
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// STL model to show instead of a cube (repeat for the second model)
    #[arg(long, short = 'm')]
    model: Vec<PathBuf>,

    /// Where log output goes; the terminal itself is used for drawing
    #[arg(long, default_value = "track-terminal.log")]
    log_file: PathBuf,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("Could not open log file {}: {}", args.log_file.display(), e);
    }

    if let Err(e) = run(&args) {
        tracing::error!("Application error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(args: &Args) -> std::io::Result<()> {
    let file = File::create(&args.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run(args: &Args) -> TrackResult<()> {
    let config = match &args.config {
        Some(path) => {
            tracing::info!("Loading scene from {}", path.display());
            SceneConfig::load(path)?
        }
        None => SceneConfig::default(),
    };

    let mut app = TerminalApp::new(&config, &args.model)?;
    app.run()?;

    println!("Thank you for riding the Track Demo!");
    Ok(())
}
