use crate::api::{Backend, FetchGateway, HttpBackend, MockBackend, Transaction};
use crate::cache::CacheLayer;
use crate::config::Config;
use crate::controller::ViewController;
use crate::event::{Event, EventHandler};
use crate::store::{EmployeeDirectory, EmployeeFilterStore, PaginationAccumulator};
use crate::ui;
use crate::ui::renderfns::format_amount;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::TransactionsView;
use color_eyre::{eyre::eyre, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::{stdout, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Pick the backend from config: REST when `api` is configured and demo
/// mode was not requested, the in-memory data set otherwise.
pub fn build_gateway(config: &Config, demo: bool) -> Result<FetchGateway> {
  let backend: Arc<dyn Backend> = match (&config.api, demo) {
    (Some(api), false) => Arc::new(HttpBackend::new(api)?),
    _ => {
      let mut mock = MockBackend::demo().with_latency(config.demo.latency());
      if let Some(page_size) = config.demo.page_size {
        if page_size == 0 {
          return Err(eyre!("demo.page_size must be at least 1"));
        }
        mock = mock.with_page_size(page_size);
      }
      Arc::new(mock)
    }
  };

  let cache = if config.cache.enabled {
    CacheLayer::memory()
  } else {
    CacheLayer::disabled()
  };

  info!(backend = %backend.describe(), cache = config.cache.enabled, "gateway ready");
  Ok(FetchGateway::new(backend, cache))
}

/// Headless run: load the employee list, then either the first page of
/// everyone's transactions or all of one employee's, print them and exit.
pub async fn run_once(
  gateway: FetchGateway,
  employee: Option<&str>,
  out: &mut impl Write,
) -> Result<()> {
  let mut directory = EmployeeDirectory::new();
  let employees = directory
    .fetch_all(&gateway)
    .await
    .map_err(|e| eyre!("Failed to load employees: {}", e))?
    .len();

  match employee {
    Some(id) => {
      if !directory.employees().iter().any(|e| e.id == id) {
        return Err(eyre!("Unknown employee: {}", id));
      }
      let mut store = EmployeeFilterStore::new();
      store
        .fetch_for(&gateway, id)
        .await
        .map_err(|e| eyre!("Failed to load transactions of {}: {}", id, e))?;
      let transactions = store.transactions().unwrap_or(&[]);
      writeln!(out, "{} employees, {} transactions", employees, transactions.len())?;
      print_transactions(out, transactions)
    }
    None => {
      let mut pages = PaginationAccumulator::new();
      pages
        .fetch_next(&gateway)
        .await
        .map_err(|e| eyre!("Failed to load transactions: {}", e))?;
      let transactions = pages.transactions().unwrap_or(&[]);
      writeln!(
        out,
        "{} employees, {} transactions{}",
        employees,
        transactions.len(),
        if pages.has_more() {
          " (more available)"
        } else {
          ""
        }
      )?;
      print_transactions(out, transactions)
    }
  }
}

fn print_transactions(out: &mut impl Write, transactions: &[Transaction]) -> Result<()> {
  for t in transactions {
    writeln!(
      out,
      "{}\t{}\t{}\t{}\t{}\t{}",
      t.id,
      t.date,
      t.merchant,
      format_amount(t.amount),
      t.employee.display_name(),
      if t.approved { "approved" } else { "pending" }
    )?;
  }
  Ok(())
}

/// Main application state
pub struct App {
  config: Config,
  backend: String,
  view: Box<dyn View>,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, gateway: FetchGateway) -> Self {
    let backend = gateway.describe_backend();
    let view = Box::new(TransactionsView::new(ViewController::new(gateway)));
    Self {
      config,
      backend,
      view,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(100));

    let result = self.event_loop(&mut terminal, &mut events).await;

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.view.tick(),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if self.view.handle_key(key) == ViewAction::Quit {
      self.should_quit = true;
    }
  }

  // Accessors for UI rendering
  pub fn title(&self) -> &str {
    self.config.title()
  }

  pub fn backend(&self) -> &str {
    &self.backend
  }

  pub fn view_mut(&mut self) -> &mut dyn View {
    self.view.as_mut()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_run_once_prints_first_page() {
    let config = Config {
      demo: crate::config::DemoConfig {
        page_size: Some(3),
        latency_ms: 0,
      },
      ..Config::default()
    };
    let gateway = build_gateway(&config, true).unwrap();

    let mut out = Vec::new();
    run_once(gateway, None, &mut out).await.unwrap();
    let out = String::from_utf8(out).unwrap();

    let mut lines = out.lines();
    assert_eq!(
      lines.next(),
      Some("4 employees, 3 transactions (more available)")
    );
    assert_eq!(lines.count(), 3);
  }

  #[tokio::test]
  async fn test_run_once_for_one_employee() {
    let gateway = build_gateway(&Config::default(), true).unwrap();

    let mut out = Vec::new();
    run_once(gateway, Some("emp-2"), &mut out).await.unwrap();
    let out = String::from_utf8(out).unwrap();

    let mut lines = out.lines();
    assert_eq!(lines.next(), Some("4 employees, 5 transactions"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|row| row.contains("Mary Johnson")));
  }

  #[tokio::test]
  async fn test_run_once_unknown_employee() {
    let gateway = build_gateway(&Config::default(), true).unwrap();
    let mut out = Vec::new();
    let err = run_once(gateway, Some("emp-99"), &mut out)
      .await
      .unwrap_err();
    assert!(err.to_string().contains("emp-99"));
    assert!(out.is_empty());
  }

  #[test]
  fn test_zero_page_size_rejected() {
    let config = Config {
      demo: crate::config::DemoConfig {
        page_size: Some(0),
        latency_ms: 0,
      },
      ..Config::default()
    };
    assert!(build_gateway(&config, true).is_err());
  }

  #[tokio::test]
  async fn test_ctrl_c_quits() {
    let gateway = build_gateway(&Config::default(), true).unwrap();
    let mut app = App::new(Config::default(), gateway);
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }
}
