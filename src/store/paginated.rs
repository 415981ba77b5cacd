use tracing::debug;

use crate::api::api_types::{ApiPage, ApiTransaction};
use crate::api::{FetchGateway, FetchMode, FetchResult, Page, Request, Transaction};

use super::{Applied, Generation, Loadable, Pending, Resolved};

/// Cumulative "all transactions" list.
///
/// Holds the concatenation of every page fetched since the last reset, in
/// fetch order, plus the cursor for the next page.
#[derive(Debug, Default)]
pub struct PaginationAccumulator {
  data: Loadable<Page<Vec<Transaction>>>,
  generation: Generation,
}

impl PaginationAccumulator {
  pub fn new() -> Self {
    Self::default()
  }

  #[cfg(test)]
  pub fn data(&self) -> &Loadable<Page<Vec<Transaction>>> {
    &self.data
  }

  pub fn is_loaded(&self) -> bool {
    self.data.is_loaded()
  }

  pub fn transactions(&self) -> Option<&[Transaction]> {
    self.data.as_ref().map(|page| page.data.as_slice())
  }

  /// True when at least one page is loaded and the backend reported another.
  pub fn has_more(&self) -> bool {
    self
      .data
      .as_ref()
      .is_some_and(|page| !page.is_last())
  }

  /// Cursor the next request would use; `None` once exhausted.
  pub fn cursor(&self) -> Option<u32> {
    match &self.data {
      Loadable::NotLoaded => Some(0),
      Loadable::Loaded(page) => page.next_page,
    }
  }

  /// Start fetching the next page. Returns `None` when the source is
  /// exhausted.
  pub fn begin(&mut self) -> Option<Pending> {
    let page = self.cursor()?;
    Some(Pending {
      ticket: self.generation.bump(),
      request: Request::PaginatedTransactions { page },
      mode: FetchMode::Fresh,
    })
  }

  /// Append a fetched page. On error the accumulated list is left as it was.
  pub fn apply(
    &mut self,
    resolved: Resolved<ApiPage<Vec<ApiTransaction>>>,
  ) -> FetchResult<Applied> {
    if !self.generation.is_current(resolved.ticket) {
      debug!("dropping stale transaction page");
      return Ok(Applied::Stale);
    }

    let page: Page<Vec<Transaction>> = resolved.result?.data.into();

    match &mut self.data {
      Loadable::NotLoaded => self.data = Loadable::Loaded(page),
      Loadable::Loaded(accumulated) => {
        accumulated.data.extend(page.data);
        accumulated.next_page = page.next_page;
      }
    }

    Ok(Applied::Updated)
  }

  /// Fetch and append the next page. Returns `false` without a request when
  /// there is nothing left to fetch.
  pub async fn fetch_next(&mut self, gateway: &FetchGateway) -> FetchResult<bool> {
    let Some(pending) = self.begin() else {
      return Ok(false);
    };
    let resolved = pending.run(gateway).await;
    Ok(self.apply(resolved)? == Applied::Updated)
  }

  /// Drop everything; the next fetch starts again at the first page.
  pub fn invalidate(&mut self) {
    self.generation.bump();
    self.data = Loadable::NotLoaded;
  }

  /// Set the approval flag of a held transaction. Returns whether it was found.
  pub fn set_approved(&mut self, transaction_id: &str, approved: bool) -> bool {
    self
      .data
      .as_mut()
      .and_then(|page| page.data.iter_mut().find(|t| t.id == transaction_id))
      .map(|t| t.approved = approved)
      .is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::api_types::ApiEmployee;
  use crate::api::{Backend, Endpoint, FetchError, MockBackend};
  use crate::cache::CacheLayer;
  use async_trait::async_trait;
  use serde_json::json;
  use std::collections::VecDeque;
  use std::sync::{Arc, Mutex};

  fn employee() -> ApiEmployee {
    ApiEmployee {
      id: "e1".to_string(),
      first_name: "James".to_string(),
      last_name: "Smith".to_string(),
    }
  }

  fn transaction(id: &str) -> ApiTransaction {
    ApiTransaction {
      id: id.to_string(),
      amount: 10.0,
      employee: employee(),
      merchant: "Uber".to_string(),
      date: "2024-01-01".to_string(),
      approved: false,
    }
  }

  /// Serves a fixed script of pages and records the cursors asked for.
  struct ScriptedPages {
    pages: Mutex<VecDeque<serde_json::Value>>,
    cursors: Mutex<Vec<u32>>,
  }

  impl ScriptedPages {
    fn new(pages: Vec<serde_json::Value>) -> Self {
      Self {
        pages: Mutex::new(pages.into()),
        cursors: Mutex::new(Vec::new()),
      }
    }

    fn cursors(&self) -> Vec<u32> {
      self.cursors.lock().unwrap().clone()
    }
  }

  #[async_trait]
  impl Backend for ScriptedPages {
    async fn call(&self, request: &Request) -> FetchResult<serde_json::Value> {
      if let Request::PaginatedTransactions { page } = request {
        self.cursors.lock().unwrap().push(*page);
      }
      self
        .pages
        .lock()
        .unwrap()
        .pop_front()
        .ok_or_else(|| FetchError::transport("paginatedTransactions", "script exhausted"))
    }

    fn describe(&self) -> String {
      "scripted".to_string()
    }
  }

  fn page(ids: &[&str], next_page: Option<u32>) -> serde_json::Value {
    let data: Vec<ApiTransaction> = ids.iter().map(|id| transaction(id)).collect();
    json!({ "data": data, "nextPage": next_page })
  }

  fn ids(store: &PaginationAccumulator) -> Vec<String> {
    store
      .transactions()
      .unwrap_or(&[])
      .iter()
      .map(|t| t.id.clone())
      .collect()
  }

  #[tokio::test]
  async fn test_pages_accumulate_in_order() {
    let backend = Arc::new(ScriptedPages::new(vec![
      page(&["t1", "t2"], Some(1)),
      page(&["t3"], Some(2)),
      page(&["t4", "t5"], None),
    ]));
    let gateway = FetchGateway::new(backend.clone(), CacheLayer::memory());
    let mut store = PaginationAccumulator::new();

    assert!(store.fetch_next(&gateway).await.unwrap());
    assert!(store.has_more());
    assert!(store.fetch_next(&gateway).await.unwrap());
    assert!(store.fetch_next(&gateway).await.unwrap());

    assert_eq!(ids(&store), vec!["t1", "t2", "t3", "t4", "t5"]);
    assert_eq!(store.data().as_ref().unwrap().next_page, None);
    assert!(!store.has_more());
    assert_eq!(backend.cursors(), vec![0, 1, 2]);
  }

  #[tokio::test]
  async fn test_exhausted_store_makes_no_request() {
    let backend = Arc::new(ScriptedPages::new(vec![page(&["t1"], None)]));
    let gateway = FetchGateway::new(backend.clone(), CacheLayer::memory());
    let mut store = PaginationAccumulator::new();

    store.fetch_next(&gateway).await.unwrap();
    assert!(!store.fetch_next(&gateway).await.unwrap());
    assert_eq!(backend.cursors(), vec![0]);
  }

  #[tokio::test]
  async fn test_invalidate_restarts_from_first_page() {
    let backend = Arc::new(ScriptedPages::new(vec![
      page(&["t1", "t2"], Some(1)),
      page(&["t3"], None),
      page(&["t1", "t2"], Some(1)),
    ]));
    let gateway = FetchGateway::new(backend.clone(), CacheLayer::memory());
    let mut store = PaginationAccumulator::new();

    store.fetch_next(&gateway).await.unwrap();
    store.fetch_next(&gateway).await.unwrap();
    store.invalidate();
    assert!(!store.is_loaded());
    assert_eq!(store.cursor(), Some(0));

    store.fetch_next(&gateway).await.unwrap();
    assert_eq!(ids(&store), vec!["t1", "t2"]);
    assert_eq!(backend.cursors(), vec![0, 1, 0]);
  }

  #[tokio::test]
  async fn test_failed_page_leaves_state_untouched() {
    let backend = Arc::new(MockBackend::demo());
    let gateway = FetchGateway::new(backend.clone(), CacheLayer::memory());
    let mut store = PaginationAccumulator::new();

    store.fetch_next(&gateway).await.unwrap();
    let before = store.data().clone();

    backend.fail(Endpoint::PaginatedTransactions);
    assert!(store.fetch_next(&gateway).await.is_err());
    assert_eq!(store.data(), &before);
    assert_eq!(store.cursor(), Some(1));

    // The same cursor is retried once the backend recovers
    backend.heal(Endpoint::PaginatedTransactions);
    store.fetch_next(&gateway).await.unwrap();
    assert_eq!(store.transactions().unwrap().len(), 10);
  }

  #[tokio::test]
  async fn test_malformed_page_leaves_state_untouched() {
    let backend = Arc::new(ScriptedPages::new(vec![
      page(&["t1"], Some(1)),
      json!({ "data": [] }),
    ]));
    let gateway = FetchGateway::new(backend, CacheLayer::memory());
    let mut store = PaginationAccumulator::new();

    store.fetch_next(&gateway).await.unwrap();
    let err = store.fetch_next(&gateway).await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed { .. }));
    assert_eq!(ids(&store), vec!["t1"]);
    assert!(store.has_more());
  }

  #[tokio::test]
  async fn test_page_in_flight_during_invalidate_is_dropped() {
    let backend = Arc::new(MockBackend::demo());
    let gateway = FetchGateway::new(backend, CacheLayer::memory());
    let mut store = PaginationAccumulator::new();

    let pending = store.begin().unwrap();
    store.invalidate();
    let resolved = pending.run(&gateway).await;

    assert_eq!(store.apply(resolved), Ok(Applied::Stale));
    assert!(!store.is_loaded());
  }

  #[tokio::test]
  async fn test_set_approved_mutates_in_place() {
    let backend = Arc::new(ScriptedPages::new(vec![page(&["t1", "t2"], None)]));
    let gateway = FetchGateway::new(backend, CacheLayer::memory());
    let mut store = PaginationAccumulator::new();
    store.fetch_next(&gateway).await.unwrap();

    assert!(store.set_approved("t2", true));
    assert!(!store.set_approved("missing", true));
    let approved: Vec<bool> = store
      .transactions()
      .unwrap()
      .iter()
      .map(|t| t.approved)
      .collect();
    assert_eq!(approved, vec![false, true]);
  }
}
