//! Tracing setup for the runner.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,daisy_runner=debug,daisy_world=debug";

pub fn init_telemetry(json: bool, verbose: bool) -> Result<()> {
    // RUST_LOG wins over the built-in defaults
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            "trace".into()
        } else {
            DEFAULT_FILTER.into()
        }
    });

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }

    info!(json, verbose, "Telemetry initialized");
    Ok(())
}
