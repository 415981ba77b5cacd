//! Fetch gateway: the single path from the stores to the backend.

use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{CacheError, CacheLayer, CacheResult, QueryKey};

use super::backend::Backend;
use super::error::{FetchError, FetchResult};
use super::request::{Endpoint, Request};

impl From<CacheError> for FetchError {
  fn from(err: CacheError) -> Self {
    match err {
      CacheError::KeyCollision {
        existing,
        requested,
      } => FetchError::KeyCollision {
        existing,
        requested,
      },
    }
  }
}

/// How a request treats the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
  /// Serve from cache when present, otherwise fetch and remember
  Cached,
  /// Always fetch, then overwrite the cache entry
  Fresh,
}

/// Backend client with a request cache in front and a shared loading flag.
///
/// Cheap to clone; clones share the backend, the cache and the flag.
#[derive(Clone)]
pub struct FetchGateway {
  backend: Arc<dyn Backend>,
  cache: CacheLayer,
  in_flight: Arc<AtomicUsize>,
}

/// Keeps the loading flag raised while alive.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
  fn enter(counter: &'a AtomicUsize) -> Self {
    counter.fetch_add(1, Ordering::SeqCst);
    Self(counter)
  }
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::SeqCst);
  }
}

impl FetchGateway {
  pub fn new(backend: Arc<dyn Backend>, cache: CacheLayer) -> Self {
    Self {
      backend,
      cache,
      in_flight: Arc::new(AtomicUsize::new(0)),
    }
  }

  /// True while any network call made through this gateway is in flight.
  pub fn is_loading(&self) -> bool {
    self.in_flight.load(Ordering::SeqCst) > 0
  }

  pub fn describe_backend(&self) -> String {
    self.backend.describe()
  }

  /// Return the cached response if there is one, otherwise fetch and cache.
  ///
  /// A cache hit makes no network call and leaves the loading flag alone.
  pub async fn fetch_with_cache<T: DeserializeOwned>(
    &self,
    request: &Request,
  ) -> FetchResult<CacheResult<T>> {
    if let Some(hit) = self.cache.get(request)? {
      debug!(endpoint = %request.endpoint(), "cache hit");
      let endpoint = request.endpoint().name();
      return hit.try_map(|body| decode(endpoint, body));
    }

    debug!(endpoint = %request.endpoint(), "cache miss");
    self.fetch_without_cache(request).await
  }

  /// Always fetch, then overwrite the cache entry for this request so a later
  /// `fetch_with_cache` sees the fresh body.
  pub async fn fetch_without_cache<T: DeserializeOwned>(
    &self,
    request: &Request,
  ) -> FetchResult<CacheResult<T>> {
    let body = self.call(request).await?;
    let data = decode(request.endpoint().name(), body.clone())?;
    self.cache.set(request, body);
    debug!(endpoint = %request.endpoint(), entries = self.cache.len(), "response cached");
    Ok(CacheResult::from_network(data))
  }

  pub async fn fetch<T: DeserializeOwned>(
    &self,
    request: &Request,
    mode: FetchMode,
  ) -> FetchResult<CacheResult<T>> {
    match mode {
      FetchMode::Cached => self.fetch_with_cache(request).await,
      FetchMode::Fresh => self.fetch_without_cache(request).await,
    }
  }

  /// Fire a mutating request. The response body is ignored and nothing is
  /// cached.
  pub async fn send(&self, request: &Request) -> FetchResult<()> {
    self.call(request).await.map(|_| ())
  }

  /// Forget every cached response of the given endpoints.
  pub fn clear_cache_by_endpoint(&self, endpoints: &[Endpoint]) {
    for endpoint in endpoints {
      self.cache.clear_scope(endpoint.name());
    }
  }

  /// Forget the cached response of one request.
  pub fn invalidate(&self, request: &Request) {
    self.cache.invalidate(request);
  }

  async fn call(&self, request: &Request) -> FetchResult<serde_json::Value> {
    let _loading = InFlight::enter(&self.in_flight);
    debug!(endpoint = %request.endpoint(), key = %request.canonical(), "request");

    let result = self.backend.call(request).await;
    if let Err(e) = &result {
      warn!(endpoint = %request.endpoint(), error = %e, "request failed");
    }
    result
  }
}

fn decode<T: DeserializeOwned>(endpoint: &'static str, body: serde_json::Value) -> FetchResult<T> {
  serde_json::from_value(body).map_err(|e| FetchError::malformed(endpoint, e.to_string()))
}
