use crate::api::Transaction;
use crate::controller::{ViewController, ViewState};
use crate::ui::components::{EmployeePicker, EmployeePickerEvent, KeyResult};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{approval_color, format_amount, provenance_label, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Transaction review screen: the active list, a trailing "load more" row
/// while the unfiltered list has more pages, and the employee picker.
pub struct TransactionsView {
  controller: ViewController,
  list_state: ListState,
  picker: EmployeePicker,
}

impl TransactionsView {
  pub fn new(mut controller: ViewController) -> Self {
    controller.mount();
    Self {
      controller,
      list_state: ListState::default(),
      picker: EmployeePicker::new(),
    }
  }

  #[cfg(test)]
  pub fn controller_mut(&mut self) -> &mut ViewController {
    &mut self.controller
  }

  fn row_count(&self) -> usize {
    self.controller.transactions().len() + usize::from(self.controller.show_load_more())
  }

  fn selected_transaction(&self) -> Option<&Transaction> {
    self
      .list_state
      .selected()
      .and_then(|idx| self.controller.transactions().get(idx))
  }

  fn on_load_more_row(&self) -> bool {
    self.controller.show_load_more()
      && self.list_state.selected() == Some(self.controller.transactions().len())
  }

  fn toggle_selected(&mut self) {
    if let Some(id) = self.selected_transaction().map(|t| t.id.clone()) {
      self.controller.toggle_approval(&id);
    }
  }

  fn open_picker(&mut self) {
    if self.controller.employees_loading() {
      return;
    }
    let items = self.controller.selector_items();
    if !items.is_empty() {
      self.picker.show(items, self.controller.selected());
    }
  }

  fn title(&self) -> String {
    let who = self.controller.selected().display_name();
    if self.controller.employees_loading() {
      " Transactions (loading employees...) ".to_string()
    } else if self.controller.is_loading() {
      format!(" Transactions [{}] (loading...) ", who)
    } else {
      format!(
        " Transactions [{}] ({}) ",
        who,
        self.controller.transactions().len()
      )
    }
  }

  fn transaction_item(&self, transaction: &Transaction) -> ListItem<'static> {
    let pending = self.controller.is_approval_pending(&transaction.id);
    let marker = match (pending, transaction.approved) {
      (true, _) => "[~]",
      (false, true) => "[x]",
      (false, false) => "[ ]",
    };

    let line = Line::from(vec![
      Span::styled(
        marker.to_string(),
        Style::default().fg(approval_color(transaction.approved, pending)),
      ),
      Span::raw(" "),
      Span::styled(
        format!("{:<10}", truncate(&transaction.date, 10)),
        Style::default().fg(Color::DarkGray),
      ),
      Span::raw(" "),
      Span::styled(
        format!("{:<24}", truncate(&transaction.merchant, 24)),
        Style::default().fg(Color::White),
      ),
      Span::styled(
        format!("{:>14}", format_amount(transaction.amount)),
        Style::default().fg(Color::Cyan),
      ),
      Span::raw("  "),
      Span::raw(truncate(&transaction.employee.display_name(), 28)),
    ]);
    ListItem::new(line)
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.row_count();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.controller.transactions().is_empty() {
      let content = if self.controller.employees_loading() || self.controller.is_loading() {
        "Loading..."
      } else if self.controller.last_error().is_some() {
        "Failed to load transactions. Press 'r' to retry."
      } else {
        "No transactions."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let mut items: Vec<ListItem> = self
      .controller
      .transactions()
      .iter()
      .map(|t| self.transaction_item(t))
      .collect();

    if self.controller.show_load_more() {
      let (label, color) = if self.controller.state() == ViewState::AllLoading {
        ("    Loading...", Color::DarkGray)
      } else {
        ("    Load more", Color::Yellow)
      };
      items.push(ListItem::new(Span::styled(label, Style::default().fg(color))));
    }

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for TransactionsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.picker.handle_key(key) {
      KeyResult::Event(EmployeePickerEvent::Selected(employee)) => {
        if self.controller.select(&employee) {
          self.list_state.select(Some(0));
        }
        return ViewAction::None;
      }
      KeyResult::Event(EmployeePickerEvent::Cancelled) | KeyResult::Handled => {
        return ViewAction::None;
      }
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Enter => {
        if self.on_load_more_row() {
          self.controller.load_more();
        } else {
          self.toggle_selected();
        }
      }
      KeyCode::Char(' ') | KeyCode::Char('a') => self.toggle_selected(),
      KeyCode::Char('m') => {
        self.controller.load_more();
      }
      KeyCode::Char('e') => self.open_picker(),
      KeyCode::Char('r') => {
        self.controller.refresh();
      }
      KeyCode::Char('R') => {
        if self.controller.reload_employees() {
          self.list_state.select(Some(0));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.picker.render_overlay(frame, area);
  }

  fn breadcrumb(&self) -> Vec<String> {
    let mut crumbs = vec!["Transactions".to_string()];
    if self.controller.state().is_filtered() {
      crumbs.push(self.controller.selected().display_name());
    }
    crumbs
  }

  fn status(&self) -> Option<String> {
    self.controller.last_error().map(|e| e.to_string())
  }

  fn provenance(&self) -> Option<String> {
    let directory = self.controller.directory();
    directory
      .source()
      .map(|source| provenance_label("employees", source, directory.cached_at()))
  }

  fn busy(&self) -> bool {
    self.controller.network_busy()
  }

  fn tick(&mut self) {
    self.controller.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new("space", "approve").with_priority(10),
      ShortcutInfo::new("r", "refresh").with_priority(40),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ];
    if !self.controller.employees_loading() {
      shortcuts.push(ShortcutInfo::new("e", "employee").with_priority(20));
      shortcuts.push(ShortcutInfo::new("R", "reload").with_priority(50));
    }
    if self.controller.show_load_more() {
      shortcuts.push(ShortcutInfo::new("m", "more").with_priority(30));
    }
    shortcuts
  }
}
