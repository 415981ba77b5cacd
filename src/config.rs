use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// REST backend. Without it the built-in demo data is served.
  pub api: Option<ApiConfig>,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub demo: DemoConfig,
  /// Custom title for the header
  pub title: Option<String>,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
  pub base_url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

pub fn default_timeout_secs() -> u64 {
  10
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { enabled: true }
  }
}

fn default_true() -> bool {
  true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoConfig {
  pub page_size: Option<usize>,
  /// Artificial delay per demo request, to make loading states visible
  #[serde(default)]
  pub latency_ms: u64,
}

impl DemoConfig {
  pub fn latency(&self) -> Duration {
    Duration::from_millis(self.latency_ms)
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// `tracing` filter directive, overridden by RUST_LOG
  pub filter: Option<String>,
  /// Directory for txreview.log (defaults to the user data dir)
  pub directory: Option<PathBuf>,
}

impl LogConfig {
  pub fn directory(&self) -> PathBuf {
    self
      .directory
      .as_deref()
      .map(expand_home)
      .or_else(|| dirs::data_dir().map(|d| d.join("txreview")))
      .unwrap_or_else(|| PathBuf::from("."))
  }
}

fn expand_home(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), dirs::home_dir()) {
    (Ok(rest), Some(home)) => home.join(rest),
    _ => path.to_path_buf(),
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./txreview.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/txreview/config.yaml
  ///
  /// With no file at all the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("txreview.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("txreview").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file is a valid "all defaults" config
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  pub fn title(&self) -> &str {
    self.title.as_deref().unwrap_or("Approve transactions")
  }

  /// Get the API bearer token from the environment, if any.
  ///
  /// Checks TXREVIEW_API_TOKEN.
  pub fn get_api_token() -> Option<String> {
    std::env::var("TXREVIEW_API_TOKEN")
      .ok()
      .filter(|t| !t.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_full_config() {
    let config = Config::parse(
      r#"
api:
  base_url: http://localhost:3000
  timeout_secs: 3
cache:
  enabled: false
demo:
  page_size: 7
  latency_ms: 250
title: Expenses
log:
  filter: debug
  directory: /tmp/txreview
"#,
    )
    .unwrap();

    assert_eq!(
      config.api,
      Some(ApiConfig {
        base_url: "http://localhost:3000".to_string(),
        timeout_secs: 3,
      })
    );
    assert!(!config.cache.enabled);
    assert_eq!(config.demo.page_size, Some(7));
    assert_eq!(config.demo.latency(), Duration::from_millis(250));
    assert_eq!(config.title(), "Expenses");
    assert_eq!(config.log.filter.as_deref(), Some("debug"));
    assert_eq!(config.log.directory(), PathBuf::from("/tmp/txreview"));
  }

  #[test]
  fn test_defaults() {
    let config = Config::parse("").unwrap();
    assert!(config.api.is_none());
    assert!(config.cache.enabled);
    assert_eq!(config.demo.page_size, None);
    assert_eq!(config.title(), "Approve transactions");

    let config = Config::parse("api:\n  base_url: http://x\n").unwrap();
    assert_eq!(config.api.unwrap().timeout_secs, 10);
  }

  #[test]
  fn test_missing_explicit_file_is_an_error() {
    assert!(Config::load(Some(Path::new("/nonexistent/txreview.yaml"))).is_err());
  }

  #[test]
  fn test_home_expansion() {
    if let Some(home) = dirs::home_dir() {
      assert_eq!(expand_home(Path::new("~/logs")), home.join("logs"));
    }
    assert_eq!(expand_home(Path::new("/var/log")), PathBuf::from("/var/log"));
  }
}
