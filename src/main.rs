use orbsim::{bench_gravity, run_frames, ClockSettings, LogSink, Simulation, SimulationClock, SimulationConfig};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, long, default_value = "solar_system.yaml")]
    file_name: String,

    /// Override the force algorithm (`pairwise` or `vectorized`)
    #[arg(long)]
    algorithm: Option<String>,

    /// Override the target logical step rate
    #[arg(long)]
    rate: Option<f64>,

    /// Number of frames to render before shutting down
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Time both force strategies instead of running a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_config(args: &Args) -> Result<SimulationConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(&args.file_name);
    let mut cfg = SimulationConfig::load(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;

    if let Some(name) = &args.algorithm {
        cfg.engine.algorithm = name.parse()?;
    }
    if let Some(rate) = args.rate {
        cfg.engine.target_rate = rate;
    }
    cfg.validate()?;

    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("orbsim=info".parse()?))
        .init();

    let args = Args::parse();

    if args.bench {
        bench_gravity();
        return Ok(());
    }

    let cfg = load_config(&args)?;
    tracing::info!(file = %args.file_name, preset = %cfg.scenario.preset, "starting run");

    let sim = Simulation::from_config(&cfg)?;
    let mut clock = SimulationClock::spawn(sim, ClockSettings::from_config(&cfg.engine))?;

    let mut sink = LogSink::default();
    let status = run_frames(&clock, &mut sink, args.frames, cfg.display.fps, &cfg.display.info);
    clock.shutdown();

    let last = clock.snapshot();
    tracing::info!(?status, steps = last.steps, days = last.elapsed_days(), "run finished");

    Ok(())
}
