//! # Observability
//!
//! Logging setup for the binary. The library itself only emits `log` and
//! `tracing` events; this module decides where they go.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};

/// Initialize logging for the binary
///
/// - `Plain`: env_logger lines; `tracing` events reach it through the `log` bridge
/// - `Json`: structured JSON through tracing-subscriber; `log` records are
///   forwarded to it
///
/// `RUST_LOG` overrides the configured level in both modes.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    match config.format {
        LogFormat::Plain => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.level))
                .try_init()
                .map_err(|e| anyhow!("Failed to initialize logger: {e}"))?;
        }
        LogFormat::Json => {
            let env_filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_filter(env_filter))
                .try_init()?;
        }
    }

    tracing::debug!(format = ?config.format, level = %config.level, "Logging initialized");
    Ok(())
}
