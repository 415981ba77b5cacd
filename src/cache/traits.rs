//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Trait for request descriptions that can be used as cache keys.
///
/// Implementors provide a canonical string that encodes both the endpoint
/// identity and its parameters; two requests with different parameters must
/// never produce the same canonical string.
pub trait QueryKey {
  /// Deterministic serialization of (endpoint, parameters)
  fn canonical(&self) -> String;

  /// Group name used to clear all entries of one endpoint at once
  fn scope(&self) -> &'static str;

  /// SHA256 hash of the canonical form, for stable fixed-length keys
  fn cache_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.canonical().as_bytes());
    hex::encode(hasher.finalize())
  }
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }

  /// Convert the payload, keeping provenance.
  pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<CacheResult<U>, E> {
    Ok(CacheResult {
      data: f(self.data)?,
      source: self.source,
      cached_at: self.cached_at,
    })
  }
}

/// Indicates where returned data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from the backend
  Network,
  /// Served from the request cache without a network call
  Cache,
}
