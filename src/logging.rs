//! Diagnostic logging
//!
//! Logs go to stderr so stdout stays reserved for command output and `--json`.
//! `RUST_LOG` takes precedence over `--log-level` when set.

use crate::core::error::{ShipError, ShipResult};
use std::io;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
  /// Single-line output
  #[default]
  Compact,
  /// Multi-line human-readable output
  Pretty,
  /// One JSON object per event
  Json,
}

/// Minimum level to log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
  Trace,
  Debug,
  Info,
  /// Warnings and above (default)
  #[default]
  Warn,
  Error,
}

impl From<LogLevel> for Level {
  fn from(level: LogLevel) -> Self {
    match level {
      LogLevel::Trace => Level::TRACE,
      LogLevel::Debug => Level::DEBUG,
      LogLevel::Info => Level::INFO,
      LogLevel::Warn => Level::WARN,
      LogLevel::Error => Level::ERROR,
    }
  }
}

fn filter_for(level: LogLevel) -> String {
  let level = Level::from(level).as_str().to_ascii_lowercase();
  format!("shipgate={}", level)
}

/// Install the global subscriber
pub fn init(level: LogLevel, format: LogFormat) -> ShipResult<()> {
  let env_filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(filter_for(level)))
    .map_err(|e| ShipError::message(format!("Failed to create log filter: {}", e)))?;

  let registry = tracing_subscriber::registry().with(env_filter);
  let installed = match format {
    LogFormat::Compact => registry
      .with(
        tracing_subscriber::fmt::layer()
          .compact()
          .with_writer(io::stderr)
          .with_target(false),
      )
      .try_init(),
    LogFormat::Pretty => registry
      .with(
        tracing_subscriber::fmt::layer()
          .pretty()
          .with_writer(io::stderr)
          .with_target(true),
      )
      .try_init(),
    LogFormat::Json => registry
      .with(
        tracing_subscriber::fmt::layer()
          .json()
          .with_writer(io::stderr)
          .with_current_span(true),
      )
      .try_init(),
  };
  installed.map_err(|e| ShipError::message(format!("Failed to install logger: {}", e)))?;

  tracing::debug!(version = env!("CARGO_PKG_VERSION"), ?format, "logging initialized");
  Ok(())
}
