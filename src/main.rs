mod app;
mod input;
mod term;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use orbit_drawer::{
    settings::{default_settings_path, load_settings},
    system::{DEFAULT_LABEL, DEFAULT_STAR_MASS, MAX_PLANETS},
    PlanetarySystem,
};
use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(name = "orbit-drawer")]
#[command(about = "Animated orrery with periods from a simplified Kepler law")]
struct Cli {
    /// Star mass in solar masses (>= 0.1)
    #[arg(long, default_value_t = DEFAULT_STAR_MASS)]
    star_mass: f64,

    /// Number of planets, placed 1 AU apart
    #[arg(long, default_value_t = 3)]
    planets: usize,

    /// Explicit distances in AU; overrides --planets. Example: 0.39,0.72,1,1.52
    #[arg(long, value_delimiter = ',')]
    distances: Option<Vec<f64>>,

    /// Display name for the system
    #[arg(long, default_value = DEFAULT_LABEL)]
    label: String,

    /// Settings file (JSON). Defaults to the per-user config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs here; the terminal is busy drawing. Filter with RUST_LOG.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Override the frame-rate cap from settings
    #[arg(long)]
    fps: Option<u32>,
}

fn build_system(cli: &Cli) -> Result<PlanetarySystem> {
    ensure!(
        cli.star_mass.is_finite() && cli.star_mass >= app::MIN_STAR_MASS,
        "--star-mass must be at least {}",
        app::MIN_STAR_MASS
    );
    let system = match &cli.distances {
        Some(ds) => {
            ensure!(!ds.is_empty(), "--distances needs at least one value");
            ensure!(ds.len() <= MAX_PLANETS, "at most {MAX_PLANETS} planets");
            ensure!(
                ds.iter().all(|d| d.is_finite() && *d > 0.0),
                "--distances must all be positive"
            );
            PlanetarySystem::new(cli.star_mass, ds, cli.label.clone())?
        }
        None => {
            ensure!(
                (1..=MAX_PLANETS).contains(&cli.planets),
                "--planets must be between 1 and {MAX_PLANETS}"
            );
            PlanetarySystem::evenly_spaced(cli.star_mass, cli.planets, cli.label.clone())?
        }
    };
    Ok(system)
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let system = build_system(&cli)?;

    let settings_path = match &cli.config {
        Some(p) => p.clone(),
        None => default_settings_path()?,
    };
    let mut settings = load_settings(&settings_path);
    if let Some(fps) = cli.fps {
        settings.fps_cap = fps;
    }

    app::run(system, settings)
}
