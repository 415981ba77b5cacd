use chrono::{DateTime, Utc};
use tracing::debug;

use crate::api::api_types::ApiEmployee;
use crate::api::{Employee, FetchGateway, FetchMode, FetchResult, Request};
use crate::cache::CacheSource;

use super::{Applied, Generation, Loadable, Pending, Resolved};

/// The employee list, loaded once per session.
///
/// Goes through the request cache, so repeated loads are free until
/// `invalidate` drops both the store and the cached response.
#[derive(Debug, Default)]
pub struct EmployeeDirectory {
  data: Loadable<Vec<Employee>>,
  source: Option<CacheSource>,
  cached_at: Option<DateTime<Utc>>,
  generation: Generation,
}

impl EmployeeDirectory {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_loaded(&self) -> bool {
    self.data.is_loaded()
  }

  pub fn employees(&self) -> &[Employee] {
    self.data.as_ref().map(Vec::as_slice).unwrap_or(&[])
  }

  /// Where the current list came from, once loaded.
  pub fn source(&self) -> Option<CacheSource> {
    self.source
  }

  /// When the served cache entry was written; `None` for a network response.
  pub fn cached_at(&self) -> Option<DateTime<Utc>> {
    self.cached_at
  }

  pub fn begin(&mut self) -> Pending {
    Pending {
      ticket: self.generation.bump(),
      request: Request::Employees,
      mode: FetchMode::Cached,
    }
  }

  /// Apply a response. On error the previous list is kept.
  pub fn apply(&mut self, resolved: Resolved<Vec<ApiEmployee>>) -> FetchResult<Applied> {
    if !self.generation.is_current(resolved.ticket) {
      debug!("dropping stale employee list");
      return Ok(Applied::Stale);
    }

    let result = resolved.result?;
    self.source = Some(result.source);
    self.cached_at = result.cached_at;
    self.data = Loadable::Loaded(result.data.into_iter().map(Employee::from).collect());
    Ok(Applied::Updated)
  }

  pub async fn fetch_all(&mut self, gateway: &FetchGateway) -> FetchResult<&[Employee]> {
    let resolved = self.begin().run(gateway).await;
    self.apply(resolved)?;
    Ok(self.employees())
  }

  /// Forget the list, including its cached response, so the next load goes
  /// to the network.
  pub fn invalidate(&mut self, gateway: &FetchGateway) {
    self.generation.bump();
    self.data = Loadable::NotLoaded;
    self.source = None;
    self.cached_at = None;
    gateway.invalidate(&Request::Employees);
  }
}
