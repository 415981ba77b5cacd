pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let title = app.title().to_string();
  let backend = app.backend().to_string();
  let view = app.view_mut();

  renderfns::draw_header(
    frame,
    chunks[0],
    &title,
    &backend,
    view.busy(),
    &view.shortcuts(),
  );
  view.render(frame, chunks[1]);
  renderfns::draw_footer(
    frame,
    chunks[2],
    &view.breadcrumb(),
    view.provenance().as_deref(),
    view.status().as_deref(),
  );
}

/// Keep a list selection inside `0..len`, selecting the first row when
/// nothing is selected yet.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(idx) if idx >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}
