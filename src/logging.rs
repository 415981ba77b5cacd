use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

const LOG_FILE: &str = "txreview.log";

/// Filter precedence: RUST_LOG, then the config file, then `info`.
fn filter_directive(config: &LogConfig) -> String {
  std::env::var("RUST_LOG")
    .ok()
    .filter(|f| !f.is_empty())
    .or_else(|| config.filter.clone())
    .unwrap_or_else(|| "info".to_string())
}

/// Install a file subscriber with daily rotation.
///
/// The terminal belongs to the UI, so nothing is written to stdout. Keep the
/// returned guard alive until exit or buffered lines are lost.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
  let directory = config.directory();
  std::fs::create_dir_all(&directory)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", directory.display(), e))?;

  let filter = EnvFilter::try_new(filter_directive(config))
    .map_err(|e| eyre!("Invalid log filter: {}", e))?;

  let appender = tracing_appender::rolling::daily(&directory, LOG_FILE);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::registry()
    .with(filter)
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false),
    )
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_filter_used_without_env() {
    if std::env::var("RUST_LOG").is_ok() {
      return;
    }
    let config = LogConfig {
      filter: Some("txreview=debug".to_string()),
      directory: None,
    };
    assert_eq!(filter_directive(&config), "txreview=debug");
    assert_eq!(filter_directive(&LogConfig::default()), "info");
  }
}
