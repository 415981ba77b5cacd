use tracing::debug;

use crate::api::api_types::ApiTransaction;
use crate::api::{
  FetchError, FetchGateway, FetchMode, FetchResult, Request, Transaction, ALL_EMPLOYEES_ID,
};

use super::{Applied, Generation, Loadable, Pending, Resolved};

/// Transactions of exactly one employee.
///
/// Each fetch replaces the contents wholesale; nothing from a previous
/// employee survives a successful fetch.
#[derive(Debug, Default)]
pub struct EmployeeFilterStore {
  data: Loadable<Vec<Transaction>>,
  /// Employee the held data belongs to
  employee_id: Option<String>,
  /// Employee of the newest request
  target: Option<String>,
  generation: Generation,
}

impl EmployeeFilterStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_loaded(&self) -> bool {
    self.data.is_loaded()
  }

  pub fn transactions(&self) -> Option<&[Transaction]> {
    self.data.as_ref().map(Vec::as_slice)
  }

  pub fn employee_id(&self) -> Option<&str> {
    self.employee_id.as_deref()
  }

  /// Start fetching one employee's transactions. The "All employees"
  /// sentinel is not an employee and is rejected here.
  pub fn begin(&mut self, employee_id: &str) -> FetchResult<Pending> {
    if employee_id == ALL_EMPLOYEES_ID {
      return Err(FetchError::invalid(
        "transactionsByEmployee",
        "the all-employees selector has no transactions of its own",
      ));
    }

    self.target = Some(employee_id.to_string());
    Ok(Pending {
      ticket: self.generation.bump(),
      request: Request::TransactionsByEmployee {
        employee_id: employee_id.to_string(),
      },
      mode: FetchMode::Fresh,
    })
  }

  /// Replace the contents with a fetched list. On error the previous
  /// contents are kept.
  pub fn apply(&mut self, resolved: Resolved<Vec<ApiTransaction>>) -> FetchResult<Applied> {
    if !self.generation.is_current(resolved.ticket) {
      debug!("dropping stale employee transactions");
      return Ok(Applied::Stale);
    }

    let list = resolved.result?.data;
    self.data = Loadable::Loaded(list.into_iter().map(Transaction::from).collect());
    self.employee_id = self.target.clone();
    Ok(Applied::Updated)
  }

  pub async fn fetch_for(&mut self, gateway: &FetchGateway, employee_id: &str) -> FetchResult<()> {
    let resolved = self.begin(employee_id)?.run(gateway).await;
    self.apply(resolved).map(|_| ())
  }

  pub fn invalidate(&mut self) {
    self.generation.bump();
    self.data = Loadable::NotLoaded;
    self.employee_id = None;
    self.target = None;
  }

  /// Set the approval flag of a held transaction. Returns whether it was found.
  pub fn set_approved(&mut self, transaction_id: &str, approved: bool) -> bool {
    self
      .data
      .as_mut()
      .and_then(|list| list.iter_mut().find(|t| t.id == transaction_id))
      .map(|t| t.approved = approved)
      .is_some()
  }
}
