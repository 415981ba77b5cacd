//! In-memory backend used by `--demo` and by tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::api_types::{ApiEmployee, ApiPage, ApiTransaction};
use super::backend::Backend;
use super::error::{FetchError, FetchResult};
use super::request::{Endpoint, Request};

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Default)]
struct MockState {
  employees: Vec<ApiEmployee>,
  transactions: Vec<ApiTransaction>,
  calls: HashMap<Endpoint, usize>,
  failing: HashSet<Endpoint>,
}

/// Backend that answers from a fixed data set.
///
/// Paging slices the transaction list into `page_size` chunks; approvals are
/// written back so later reads see them.
pub struct MockBackend {
  state: Mutex<MockState>,
  page_size: usize,
  latency: Duration,
}

impl MockBackend {
  pub fn new(employees: Vec<ApiEmployee>, transactions: Vec<ApiTransaction>) -> Self {
    Self {
      state: Mutex::new(MockState {
        employees,
        transactions,
        ..Default::default()
      }),
      page_size: DEFAULT_PAGE_SIZE,
      latency: Duration::ZERO,
    }
  }

  /// Built-in data set: four employees and their card spend.
  pub fn demo() -> Self {
    let (employees, transactions) = demo_data();
    Self::new(employees, transactions)
  }

  pub fn with_page_size(mut self, page_size: usize) -> Self {
    self.page_size = page_size.max(1);
    self
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  /// Make every call to `endpoint` fail with a transport error until `heal`.
  #[cfg(test)]
  pub fn fail(&self, endpoint: Endpoint) {
    self.state().failing.insert(endpoint);
  }

  #[cfg(test)]
  pub fn heal(&self, endpoint: Endpoint) {
    self.state().failing.remove(&endpoint);
  }

  /// Number of calls that reached this backend for `endpoint`.
  #[cfg(test)]
  pub fn calls(&self, endpoint: Endpoint) -> usize {
    self.state().calls.get(&endpoint).copied().unwrap_or(0)
  }

  #[cfg(test)]
  pub fn is_approved(&self, transaction_id: &str) -> Option<bool> {
    self
      .state()
      .transactions
      .iter()
      .find(|t| t.id == transaction_id)
      .map(|t| t.approved)
  }

  fn state(&self) -> MutexGuard<'_, MockState> {
    self
      .state
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn answer(&self, request: &Request) -> FetchResult<Value> {
    let endpoint = request.endpoint();
    let name = endpoint.name();
    let mut state = self.state();

    *state.calls.entry(endpoint).or_default() += 1;
    if state.failing.contains(&endpoint) {
      return Err(FetchError::transport(name, "simulated network failure"));
    }

    match request {
      Request::Employees => encode(name, &state.employees),
      Request::PaginatedTransactions { page } => {
        let start = *page as usize * self.page_size;
        let total = state.transactions.len();
        if start > 0 && start >= total {
          return Err(FetchError::invalid(name, format!("page {} out of range", page)));
        }
        let end = (start + self.page_size).min(total);
        let next_page = if end < total { Some(page + 1) } else { None };
        encode(
          name,
          &ApiPage {
            data: state.transactions[start..end].to_vec(),
            next_page,
          },
        )
      }
      Request::TransactionsByEmployee { employee_id } => {
        if !state.employees.iter().any(|e| &e.id == employee_id) {
          return Err(FetchError::invalid(
            name,
            format!("unknown employee '{}'", employee_id),
          ));
        }
        let matching: Vec<&ApiTransaction> = state
          .transactions
          .iter()
          .filter(|t| &t.employee.id == employee_id)
          .collect();
        encode(name, &matching)
      }
      Request::SetTransactionApproval {
        transaction_id,
        value,
      } => {
        let transaction = state
          .transactions
          .iter_mut()
          .find(|t| &t.id == transaction_id)
          .ok_or_else(|| {
            FetchError::invalid(name, format!("unknown transaction '{}'", transaction_id))
          })?;
        transaction.approved = *value;
        Ok(Value::Null)
      }
    }
  }
}

fn encode(endpoint: &'static str, value: &impl serde::Serialize) -> FetchResult<Value> {
  serde_json::to_value(value).map_err(|e| FetchError::malformed(endpoint, e.to_string()))
}

#[async_trait]
impl Backend for MockBackend {
  async fn call(&self, request: &Request) -> FetchResult<Value> {
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
    self.answer(request)
  }

  fn describe(&self) -> String {
    "demo data".to_string()
  }
}

fn demo_data() -> (Vec<ApiEmployee>, Vec<ApiTransaction>) {
  let employees: Vec<ApiEmployee> = [
    ("James", "Smith"),
    ("Mary", "Johnson"),
    ("Robert", "Williams"),
    ("Patricia", "Brown"),
  ]
  .iter()
  .enumerate()
  .map(|(i, (first, last))| ApiEmployee {
    id: format!("emp-{}", i + 1),
    first_name: first.to_string(),
    last_name: last.to_string(),
  })
  .collect();

  let spend = [
    ("Uber", 24.5),
    ("Delta Air Lines", 412.0),
    ("Blue Bottle Coffee", 6.75),
    ("AWS", 1290.33),
    ("Staples", 88.1),
    ("Hilton", 356.4),
    ("Lyft", 31.2),
    ("Zoom", 149.9),
    ("WeWork", 620.0),
    ("Sweetgreen", 14.35),
    ("Apple", 2199.0),
    ("Chipotle", 12.6),
    ("Marriott", 289.99),
    ("Slack", 87.5),
    ("FedEx", 45.0),
    ("Home Depot", 173.42),
    ("Amtrak", 98.0),
    ("Starbucks", 5.95),
  ];

  let transactions = spend
    .iter()
    .enumerate()
    .map(|(i, (merchant, amount))| ApiTransaction {
      id: format!("txn-{:03}", i + 1),
      amount: *amount,
      employee: employees[i % employees.len()].clone(),
      merchant: merchant.to_string(),
      date: format!("2024-03-{:02}", 28 - i),
      approved: i % 4 == 3,
    })
    .collect();

  (employees, transactions)
}
