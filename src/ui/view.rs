use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
  None,
  Quit,
}

/// Trait for view behavior
///
/// Views handle their own overlays and return actions for the App to
/// execute. Views that load data asynchronously poll it in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Breadcrumb segments shown in the footer
  fn breadcrumb(&self) -> Vec<String>;

  /// Message for the status line, if any
  fn status(&self) -> Option<String> {
    None
  }

  /// Where the shown data came from (network or cache), if known
  fn provenance(&self) -> Option<String> {
    None
  }

  /// Whether a request is in flight
  fn busy(&self) -> bool {
    false
  }

  /// Called on each tick to apply finished requests
  fn tick(&mut self) {}

  /// Keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "quit").with_priority(90)]
  }
}
