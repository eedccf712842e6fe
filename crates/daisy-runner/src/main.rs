//! Headless driver for the Daisyworld simulation.

mod driver;
mod stats_log;
mod summary;
mod telemetry;

use anyhow::{bail, Context, Result};
use clap::Parser;
use daisy_core::{RunConfig, TemperatureEvent};
use daisy_world::Simulation;
use std::path::PathBuf;
use tokio::signal;
use tokio::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "daisy-runner")]
#[command(version)]
#[command(about = "Run the Daisyworld climate feedback simulation and log its statistics")]
struct Cli {
    /// Run configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<i32>,

    /// Grid height
    #[arg(long)]
    height: Option<i32>,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Starting world temperature
    #[arg(long, allow_hyphen_values = true)]
    initial_temperature: Option<f64>,

    /// Number of ticks to run; runs until interrupted when omitted
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Simulated time between ticks in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Frame cadence in milliseconds
    #[arg(long)]
    frame_ms: Option<u64>,

    /// Statistics CSV path
    #[arg(short, long)]
    output: Option<String>,

    /// Append to the statistics log instead of truncating it
    #[arg(long)]
    append: bool,

    /// Step as fast as possible instead of in real time
    #[arg(long)]
    batch: bool,

    /// Heat the world by one degree before this tick (repeatable)
    #[arg(long = "heat-at", value_name = "TICK")]
    heat_at: Vec<u64>,

    /// Cool the world by one degree before this tick (repeatable)
    #[arg(long = "cool-at", value_name = "TICK")]
    cool_at: Vec<u64>,

    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Trace every step
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Load the configuration file (or defaults) and apply command line overrides
    fn into_config(self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(width) = self.width {
            config.world.width = width;
        }
        if let Some(height) = self.height {
            config.world.height = height;
        }
        if let Some(seed) = self.seed {
            config.world.seed = seed;
        }
        if let Some(temperature) = self.initial_temperature {
            config.world.initial_temperature = temperature;
        }
        if self.ticks.is_some() {
            config.num_ticks = self.ticks;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.runner.tick_interval_ms = tick_ms;
        }
        if let Some(frame_ms) = self.frame_ms {
            config.runner.frame_interval_ms = frame_ms;
        }
        if let Some(output) = self.output {
            config.runner.stats_path = output;
        }
        if self.append {
            config.runner.append = true;
        }
        if self.batch {
            config.runner.realtime = false;
        }
        if self.summary.is_some() {
            config.runner.summary_path = self.summary;
        }

        config
            .events
            .extend(self.heat_at.into_iter().map(TemperatureEvent::heat));
        config
            .events
            .extend(self.cool_at.into_iter().map(TemperatureEvent::cool));

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize telemetry
    telemetry::init_telemetry(cli.json_logs, cli.verbose)?;

    let result = run(cli).await;
    if let Err(e) = &result {
        error!("Run failed: {:#}", e);
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config()?;

    info!("Starting Daisyworld simulation");
    info!(
        width = config.world.width,
        height = config.world.height,
        seed = config.world.seed,
        ticks = ?config.num_ticks,
        stats_path = %config.runner.stats_path,
        "Configuration loaded"
    );

    if !config.runner.realtime && config.num_ticks.is_none() {
        bail!("batch mode needs a tick count (--ticks)");
    }

    let sim = Simulation::new(&config.world, config.climate.clone())
        .context("failed to initialize the world")?;
    let log = stats_log::StatsLog::create(&config.runner.stats_path, config.runner.append)?;
    let mut driver = driver::Driver::new(sim, log, config.events.clone(), config.runner.log_every);

    match config.num_ticks {
        Some(ticks) if !config.runner.realtime => driver.run_batch(ticks)?,
        num_ticks => {
            driver
                .run_realtime(
                    num_ticks,
                    Duration::from_millis(config.runner.tick_interval_ms),
                    Duration::from_millis(config.runner.frame_interval_ms.max(1)),
                    shutdown_signal(),
                )
                .await?
        }
    }

    info!(ticks = driver.simulation().tick(), "Simulation stopped");

    let (run_summary, _) = driver.finish()?;
    summary::emit_summary(&run_summary);
    if let Some(path) = &config.runner.summary_path {
        run_summary.write_json(path)?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
