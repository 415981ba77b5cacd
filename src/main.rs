mod api;
mod app;
mod cache;
mod config;
mod controller;
mod event;
mod logging;
mod store;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "txreview")]
#[command(about = "Review and approve employee card transactions from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/txreview/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Backend base URL, overrides api.base_url
  #[arg(short, long)]
  base_url: Option<String>,

  /// Serve the built-in demo data instead of a backend
  #[arg(long, conflicts_with = "base_url")]
  demo: bool,

  /// Load the first page, print it and exit
  #[arg(long)]
  once: bool,

  /// With --once, print every transaction of this employee id instead
  #[arg(long, value_name = "ID", requires = "once")]
  employee: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = config::Config::load(args.config.as_deref())?;

  // Override base URL if specified on command line
  if let Some(base_url) = args.base_url {
    let timeout_secs = config
      .api
      .as_ref()
      .map(|api| api.timeout_secs)
      .unwrap_or_else(config::default_timeout_secs);
    config.api = Some(config::ApiConfig {
      base_url,
      timeout_secs,
    });
  }

  let _log_guard = logging::init(&config.log)?;
  tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting txreview");

  let gateway = app::build_gateway(&config, args.demo)?;

  if args.once {
    return app::run_once(gateway, args.employee.as_deref(), &mut std::io::stdout()).await;
  }

  let mut app = app::App::new(config, gateway);
  app.run().await?;

  Ok(())
}
