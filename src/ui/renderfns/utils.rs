use chrono::{DateTime, Local, Utc};
use ratatui::prelude::Color;

use crate::cache::CacheSource;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for a transaction's approval state
pub fn approval_color(approved: bool, pending: bool) -> Color {
  match (approved, pending) {
    (_, true) => Color::Yellow,
    (true, false) => Color::Green,
    (false, false) => Color::White,
  }
}

/// Footer text for where a data set was served from. Cached entries carry
/// the local time they were written.
pub fn provenance_label(
  what: &str,
  source: CacheSource,
  cached_at: Option<DateTime<Utc>>,
) -> String {
  match (source, cached_at) {
    (CacheSource::Network, _) => format!("{}: live", what),
    (CacheSource::Cache, Some(at)) => format!(
      "{}: cached {}",
      what,
      at.with_timezone(&Local).format("%H:%M:%S")
    ),
    (CacheSource::Cache, None) => format!("{}: cached", what),
  }
}

/// Format a currency amount with two decimals and thousands separators
pub fn format_amount(amount: f64) -> String {
  let cents = (amount.abs() * 100.0).round() as u64;
  let whole = (cents / 100).to_string();

  let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
  for (i, c) in whole.chars().enumerate() {
    if i > 0 && (whole.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(c);
  }

  let sign = if amount < 0.0 { "-" } else { "" };
  format!("{}${}.{:02}", sign, grouped, cents % 100)
}
