use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use press_sentinel::camera::Camera;
use press_sentinel::inference::PoseDetector;
use press_sentinel::overlay::PreviewWindow;
use press_sentinel::{Config, PressAnalyzer, RepStateMachine, Session};

#[derive(Parser, Debug)]
#[command(name = "press-sentinel")]
#[command(about = "Counts shoulder press reps from a webcam with per-arm form feedback")]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "press-sentinel.toml")]
    config: PathBuf,

    /// Camera device index (overrides config)
    #[arg(long)]
    camera: Option<i32>,

    /// Path to the ONNX pose model (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Write the default config to this path and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let config = Config::load(path)?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    } else {
        warn!(path = %path.display(), "config not found, using defaults");
        Ok(Config::default())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("press_sentinel=info")),
        )
        .init();

    let args = Args::parse();

    if let Some(path) = args.write_config {
        Config::default().save(&path)?;
        println!("Default config written to {}", path.display());
        return Ok(());
    }

    let mut config = load_config(&args.config)?;
    if let Some(camera) = args.camera {
        config.camera_id = camera;
    }
    if let Some(model) = args.model {
        config.model_path = model;
    }
    config.validate()?;

    println!("Press Sentinel starting... press '{}' to quit", config.quit_key);

    let camera = Camera::open(config.camera_id).context("opening camera")?;
    let detector = PoseDetector::new(&config.model_path, config.detection_confidence)
        .context("loading pose model")?;
    let window = PreviewWindow::open(&config.window_title, config.quit_key)?;

    let analyzer = PressAnalyzer::new(config.landmarks, RepStateMachine::new(config.thresholds));
    let summary = Session::new(camera, detector, window, analyzer).run()?;

    println!("{summary}");
    Ok(())
}
