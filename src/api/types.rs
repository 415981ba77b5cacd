/// Id reserved for the "All employees" selector entry
pub const ALL_EMPLOYEES_ID: &str = "";

/// Employee record, immutable once fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
  pub id: String,
  pub first_name: String,
  pub last_name: String,
}

impl Employee {
  /// The synthetic "All employees" entry. Never returned by the backend,
  /// only used to select the unfiltered view.
  pub fn all() -> Self {
    Self {
      id: ALL_EMPLOYEES_ID.to_string(),
      first_name: "All".to_string(),
      last_name: "Employees".to_string(),
    }
  }

  /// Only the reserved id marks the sentinel. A real employee whose first
  /// name happens to be "All" is still selectable.
  pub fn is_all(&self) -> bool {
    self.id == ALL_EMPLOYEES_ID
  }

  pub fn display_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// A single card transaction awaiting review
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
  pub id: String,
  pub amount: f64,
  pub employee: Employee,
  pub merchant: String,
  pub date: String,
  pub approved: bool,
}

/// One page of a paginated resource.
///
/// `next_page` is an opaque cursor handed back verbatim on the next request;
/// `None` means the source is exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
  pub data: T,
  pub next_page: Option<u32>,
}

impl<T> Page<T> {
  pub fn is_last(&self) -> bool {
    self.next_page.is_none()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_all_sentinel() {
    let all = Employee::all();
    assert!(all.is_all());
    assert_eq!(all.display_name(), "All Employees");
  }

  #[test]
  fn test_real_employee_is_not_sentinel() {
    let e = Employee {
      id: "e1".to_string(),
      first_name: "James".to_string(),
      last_name: "Smith".to_string(),
    };
    assert!(!e.is_all());
  }

  #[test]
  fn test_employee_named_all_is_not_sentinel() {
    let e = Employee {
      id: "e7".to_string(),
      first_name: "All".to_string(),
      last_name: "Nguyen".to_string(),
    };
    assert!(!e.is_all());
  }
}
