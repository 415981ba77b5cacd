use super::KeyResult;
use crate::api::Employee;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Events emitted by the employee picker that the parent view handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeePickerEvent {
  /// Employee chosen (may be the "All" sentinel)
  Selected(Employee),
  Cancelled,
}

/// Overlay for choosing which employee's transactions to show
#[derive(Debug, Clone, Default)]
pub struct EmployeePicker {
  active: bool,
  employees: Vec<Employee>,
  selected: usize,
}

impl EmployeePicker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the picker with the cursor on the current selection
  pub fn show(&mut self, employees: Vec<Employee>, current: &Employee) {
    self.selected = employees
      .iter()
      .position(|e| e.id == current.id)
      .unwrap_or(0);
    self.employees = employees;
    self.active = true;
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.employees.clear();
    self.selected = 0;
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<EmployeePickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(EmployeePickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        let event = match self.employees.get(self.selected) {
          Some(employee) => EmployeePickerEvent::Selected(employee.clone()),
          None => EmployeePickerEvent::Cancelled,
        };
        self.hide();
        KeyResult::Event(event)
      }
      KeyCode::Char('j') | KeyCode::Down => {
        if !self.employees.is_empty() {
          self.selected = (self.selected + 1) % self.employees.len();
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if !self.employees.is_empty() {
          self.selected = if self.selected == 0 {
            self.employees.len() - 1
          } else {
            self.selected - 1
          };
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active || self.employees.is_empty() {
      return;
    }

    let max_name_len = self
      .employees
      .iter()
      .map(|e| e.display_name().len())
      .max()
      .unwrap_or(10);
    let width = (max_name_len as u16 + 6)
      .min(area.width.saturating_sub(4))
      .max(20);
    let height = (self.employees.len() as u16 + 2)
      .min(area.height.saturating_sub(4))
      .max(3);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height).intersection(area);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Employee ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = self
      .employees
      .iter()
      .map(|employee| {
        let style = if employee.is_all() {
          Style::default().fg(Color::Yellow)
        } else {
          Style::default().fg(Color::Cyan)
        };
        ListItem::new(Line::from(Span::styled(employee.display_name(), style)))
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}
