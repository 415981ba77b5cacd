//! View controller: decides which data set is on screen and drives the
//! stores through their load sequences.
//!
//! Operations never block. Each one starts its requests on background tasks
//! and returns; results come back over a channel and are applied by `poll()`
//! (from the UI tick) or `settle()` (headless use and tests). Every result is
//! checked against the issuing store's ticket before it is applied, so a
//! response for a view the user already left is dropped instead of landing
//! in the wrong store.

use serde::de::DeserializeOwned;
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::api_types::{ApiEmployee, ApiPage, ApiTransaction};
use crate::api::{Employee, Endpoint, FetchError, FetchGateway, FetchResult, Request, Transaction};
use crate::store::{
  Applied, EmployeeDirectory, EmployeeFilterStore, PaginationAccumulator, Pending, Resolved,
};

/// Which data set is active and whether it is being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
  Unloaded,
  AllLoading,
  AllLoaded,
  FilterLoading,
  FilterLoaded,
}

impl ViewState {
  pub fn is_loading(&self) -> bool {
    matches!(self, Self::AllLoading | Self::FilterLoading)
  }

  pub fn is_filtered(&self) -> bool {
    matches!(self, Self::FilterLoading | Self::FilterLoaded)
  }
}

enum Outcome {
  Employees(Resolved<Vec<ApiEmployee>>),
  Page(Resolved<ApiPage<Vec<ApiTransaction>>>),
  ByEmployee(Resolved<Vec<ApiTransaction>>),
  Approval {
    transaction_id: String,
    value: bool,
    result: FetchResult<()>,
  },
}

pub struct ViewController {
  gateway: FetchGateway,
  directory: EmployeeDirectory,
  paginated: PaginationAccumulator,
  by_employee: EmployeeFilterStore,

  state: ViewState,
  employees_loading: bool,
  selected: Employee,
  approvals: HashSet<String>,
  last_error: Option<FetchError>,

  in_flight: usize,
  tx: mpsc::UnboundedSender<Outcome>,
  rx: mpsc::UnboundedReceiver<Outcome>,
}

impl ViewController {
  pub fn new(gateway: FetchGateway) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      gateway,
      directory: EmployeeDirectory::new(),
      paginated: PaginationAccumulator::new(),
      by_employee: EmployeeFilterStore::new(),
      state: ViewState::Unloaded,
      employees_loading: false,
      selected: Employee::all(),
      approvals: HashSet::new(),
      last_error: None,
      in_flight: 0,
      tx,
      rx,
    }
  }

  // ==========================================================================
  // Operations
  // ==========================================================================

  /// First render: load employees then the first page, once.
  pub fn mount(&mut self) {
    if self.state == ViewState::Unloaded && !self.directory.is_loaded() && !self.employees_loading
    {
      self.load_all();
    }
  }

  /// Full "all employees" sequence from scratch: directory (through the
  /// cache) then the first page.
  pub fn load_all(&mut self) {
    info!("loading all transactions");
    self.by_employee.invalidate();
    self.paginated.invalidate();
    self.selected = Employee::all();
    self.state = ViewState::AllLoading;
    self.employees_loading = true;
    self.last_error = None;

    let pending = self.directory.begin();
    self.spawn(pending, Outcome::Employees);
  }

  /// Append the next page. Refused while a list request is in flight, when
  /// a filter is active, or when the accumulator is exhausted.
  pub fn load_more(&mut self) -> bool {
    if self.state != ViewState::AllLoaded || !self.show_load_more() {
      debug!(state = ?self.state, "load more refused");
      return false;
    }
    self.last_error = None;
    self.fetch_page();
    true
  }

  /// Switch the view to one employee, or back to everyone for the sentinel.
  /// Refused while the employee list itself is loading.
  pub fn select(&mut self, employee: &Employee) -> bool {
    if self.employees_loading {
      debug!("employee selection refused while employees load");
      return false;
    }

    if employee.is_all() {
      self.load_all();
      return true;
    }

    let pending = match self.by_employee.begin(&employee.id) {
      Ok(pending) => pending,
      Err(e) => {
        self.fail(e);
        return false;
      }
    };

    info!(employee = %employee.id, "filtering by employee");
    self.paginated.invalidate();
    self.selected = employee.clone();
    self.state = ViewState::FilterLoading;
    self.last_error = None;
    self.spawn(pending, Outcome::ByEmployee);
    true
  }

  /// Re-run whatever produced the current view.
  pub fn refresh(&mut self) -> bool {
    if self.employees_loading {
      return false;
    }
    let selected = self.selected.clone();
    self.select(&selected)
  }

  /// Drop the cached employee list and run the full sequence again, so the
  /// directory comes from the network. Refused while employees are loading.
  pub fn reload_employees(&mut self) -> bool {
    if self.employees_loading {
      return false;
    }
    self.directory.invalidate(&self.gateway);
    self.load_all();
    true
  }

  /// Flip the approval flag of a displayed transaction. The new value is
  /// written to the owning store only once the backend confirms it.
  pub fn toggle_approval(&mut self, transaction_id: &str) -> bool {
    if self.approvals.contains(transaction_id) {
      return false;
    }

    let Some(current) = self
      .transactions()
      .iter()
      .find(|t| t.id == transaction_id)
      .map(|t| t.approved)
    else {
      return false;
    };

    let value = !current;
    let transaction_id = transaction_id.to_string();
    self.approvals.insert(transaction_id.clone());
    self.in_flight += 1;

    let gateway = self.gateway.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let request = Request::SetTransactionApproval {
        transaction_id: transaction_id.clone(),
        value,
      };
      let result = gateway.send(&request).await;
      if result.is_ok() {
        gateway.clear_cache_by_endpoint(&[
          Endpoint::PaginatedTransactions,
          Endpoint::TransactionsByEmployee,
        ]);
      }
      // Receiver lives as long as the controller
      let _ = tx.send(Outcome::Approval {
        transaction_id,
        value,
        result,
      });
    });
    true
  }

  // ==========================================================================
  // Driving
  // ==========================================================================

  /// Apply every result that has arrived. Returns whether anything changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok(outcome) = self.rx.try_recv() {
      self.handle(outcome);
      changed = true;
    }
    changed
  }

  /// Wait for the next result and apply it. Returns `false` if nothing was in
  /// flight.
  pub async fn step(&mut self) -> bool {
    if self.in_flight == 0 {
      return false;
    }
    match self.rx.recv().await {
      Some(outcome) => {
        self.handle(outcome);
        true
      }
      None => false,
    }
  }

  /// Wait until no request is in flight, applying results as they arrive.
  pub async fn settle(&mut self) {
    while self.step().await {}
  }

  // ==========================================================================
  // Derived state
  // ==========================================================================

  pub fn state(&self) -> ViewState {
    self.state
  }

  /// Filter data if present, else accumulated pages, else nothing.
  pub fn transactions(&self) -> &[Transaction] {
    self
      .by_employee
      .transactions()
      .or_else(|| self.paginated.transactions())
      .unwrap_or(&[])
  }

  /// "Load more" shows only for the accumulator's data set while it has
  /// another page.
  pub fn show_load_more(&self) -> bool {
    !self.by_employee.is_loaded() && self.paginated.has_more()
  }

  pub fn employees(&self) -> &[Employee] {
    self.directory.employees()
  }

  /// Entries for the employee selector: the "All" sentinel first, then the
  /// directory. Empty until the directory has loaded.
  pub fn selector_items(&self) -> Vec<Employee> {
    if !self.directory.is_loaded() {
      return Vec::new();
    }
    std::iter::once(Employee::all())
      .chain(self.directory.employees().iter().cloned())
      .collect()
  }

  pub fn selected(&self) -> &Employee {
    &self.selected
  }

  pub fn employees_loading(&self) -> bool {
    self.employees_loading
  }

  /// A list sequence is in flight.
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Any gateway request is in flight.
  pub fn network_busy(&self) -> bool {
    self.gateway.is_loading()
  }

  pub fn is_approval_pending(&self, transaction_id: &str) -> bool {
    self.approvals.contains(transaction_id)
  }

  pub fn last_error(&self) -> Option<&FetchError> {
    self.last_error.as_ref()
  }

  pub fn directory(&self) -> &EmployeeDirectory {
    &self.directory
  }

  #[cfg(test)]
  pub fn paginated(&self) -> &PaginationAccumulator {
    &self.paginated
  }

  #[cfg(test)]
  pub fn by_employee(&self) -> &EmployeeFilterStore {
    &self.by_employee
  }

  // ==========================================================================
  // Internals
  // ==========================================================================

  fn fetch_page(&mut self) {
    match self.paginated.begin() {
      Some(pending) => {
        self.state = ViewState::AllLoading;
        self.spawn(pending, Outcome::Page);
      }
      None => self.state = ViewState::AllLoaded,
    }
  }

  fn spawn<T, F>(&mut self, pending: Pending, wrap: F)
  where
    T: DeserializeOwned + Send + 'static,
    F: FnOnce(Resolved<T>) -> Outcome + Send + 'static,
  {
    debug!(request = ?pending.request(), "spawning request");
    self.in_flight += 1;
    let gateway = self.gateway.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let resolved = pending.run::<T>(&gateway).await;
      // Receiver lives as long as the controller
      let _ = tx.send(wrap(resolved));
    });
  }

  fn handle(&mut self, outcome: Outcome) {
    self.in_flight = self.in_flight.saturating_sub(1);

    match outcome {
      Outcome::Employees(resolved) => match self.directory.apply(resolved) {
        Ok(Applied::Stale) => {}
        Ok(Applied::Updated) => {
          self.employees_loading = false;
          self.fetch_page();
        }
        Err(e) => {
          self.employees_loading = false;
          self.state = ViewState::AllLoaded;
          self.fail(e);
        }
      },
      Outcome::Page(resolved) => match self.paginated.apply(resolved) {
        Ok(Applied::Stale) => {}
        Ok(Applied::Updated) => self.state = ViewState::AllLoaded,
        Err(e) => {
          self.state = ViewState::AllLoaded;
          self.fail(e);
        }
      },
      Outcome::ByEmployee(resolved) => match self.by_employee.apply(resolved) {
        Ok(Applied::Stale) => {}
        Ok(Applied::Updated) => self.state = ViewState::FilterLoaded,
        Err(e) => {
          self.restore_selection();
          self.fail(e);
        }
      },
      Outcome::Approval {
        transaction_id,
        value,
        result,
      } => {
        self.approvals.remove(&transaction_id);
        match result {
          Ok(()) => {
            let found = self.by_employee.set_approved(&transaction_id, value)
              || self.paginated.set_approved(&transaction_id, value);
            debug!(transaction = %transaction_id, value, found, "approval confirmed");
          }
          Err(e) => self.fail(e),
        }
      }
    }
  }

  /// Point the selection back at whoever the displayed rows belong to after
  /// a filter fetch failed. With no rows left, fall back to "All".
  fn restore_selection(&mut self) {
    let owner = self
      .by_employee
      .employee_id()
      .and_then(|id| self.directory.employees().iter().find(|e| e.id == id))
      .cloned();
    match owner {
      Some(employee) => {
        self.selected = employee;
        self.state = ViewState::FilterLoaded;
      }
      None => {
        self.selected = Employee::all();
        self.state = ViewState::AllLoaded;
      }
    }
  }

  fn fail(&mut self, error: FetchError) {
    warn!(error = %error, "fetch failed");
    self.last_error = Some(error);
  }
}
