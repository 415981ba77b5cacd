//! Request cache keyed by (endpoint, parameters).

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use super::storage::{CacheStorage, CachedEntry, MemoryStorage, NoopStorage};
use super::traits::{CacheResult, QueryKey};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
  /// Two distinct canonical requests produced the same hash. This is a key
  /// construction bug, never a runtime condition to recover from.
  #[error("cache key collision between {existing} and {requested}")]
  KeyCollision { existing: String, requested: String },
}

/// Memo of prior responses.
///
/// Stores raw JSON bodies; decoding into typed values is left to the caller
/// so one cache can hold every endpoint's responses. Cloning shares the
/// underlying storage.
pub struct CacheLayer {
  storage: Arc<dyn CacheStorage>,
}

impl CacheLayer {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: impl CacheStorage + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  /// In-memory cache for the lifetime of the session.
  pub fn memory() -> Self {
    Self::new(MemoryStorage::new())
  }

  /// Cache that never hits.
  pub fn disabled() -> Self {
    Self::new(NoopStorage)
  }

  /// Look up a previous response for `key`.
  pub fn get<K: QueryKey>(
    &self,
    key: &K,
  ) -> Result<Option<CacheResult<serde_json::Value>>, CacheError> {
    let Some(entry) = self.storage.get(&key.cache_hash()) else {
      return Ok(None);
    };

    let requested = key.canonical();
    if entry.canonical != requested {
      return Err(CacheError::KeyCollision {
        existing: entry.canonical,
        requested,
      });
    }

    Ok(Some(CacheResult::from_cache(entry.value, entry.cached_at)))
  }

  /// Store (or overwrite) the response for `key`.
  pub fn set<K: QueryKey>(&self, key: &K, value: serde_json::Value) {
    self.storage.set(
      &key.cache_hash(),
      CachedEntry {
        canonical: key.canonical(),
        scope: key.scope(),
        value,
        cached_at: Utc::now(),
      },
    );
  }

  /// Drop the entry for one request.
  pub fn invalidate<K: QueryKey>(&self, key: &K) {
    self.storage.remove(&key.cache_hash());
  }

  /// Drop every entry recorded for one endpoint.
  pub fn clear_scope(&self, scope: &str) {
    self.storage.clear_scope(scope);
  }

  pub fn len(&self) -> usize {
    self.storage.len()
  }
}

impl Clone for CacheLayer {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use serde_json::json;

  struct TestKey {
    canonical: &'static str,
    hash: &'static str,
  }

  impl QueryKey for TestKey {
    fn canonical(&self) -> String {
      self.canonical.to_string()
    }

    fn scope(&self) -> &'static str {
      "test"
    }

    fn cache_hash(&self) -> String {
      self.hash.to_string()
    }
  }

  #[test]
  fn test_miss_then_hit() {
    let cache = CacheLayer::memory();
    let key = TestKey {
      canonical: "a@{}",
      hash: "h1",
    };

    assert!(cache.get(&key).unwrap().is_none());
    cache.set(&key, json!([1, 2]));

    let hit = cache.get(&key).unwrap().unwrap();
    assert_eq!(hit.data, json!([1, 2]));
    assert_eq!(hit.source, CacheSource::Cache);
    assert!(hit.cached_at.is_some());
  }

  #[test]
  fn test_collision_is_reported() {
    let cache = CacheLayer::memory();
    let first = TestKey {
      canonical: "a@{}",
      hash: "same",
    };
    let second = TestKey {
      canonical: "b@{}",
      hash: "same",
    };

    cache.set(&first, json!(1));
    let err = cache.get(&second).unwrap_err();
    assert_eq!(
      err,
      CacheError::KeyCollision {
        existing: "a@{}".to_string(),
        requested: "b@{}".to_string(),
      }
    );
  }

  #[test]
  fn test_invalidate_drops_one_entry() {
    let cache = CacheLayer::memory();
    let a = TestKey {
      canonical: "a@{}",
      hash: "h1",
    };
    let b = TestKey {
      canonical: "b@{}",
      hash: "h2",
    };
    cache.set(&a, json!(1));
    cache.set(&b, json!(2));

    cache.invalidate(&a);
    assert!(cache.get(&a).unwrap().is_none());
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&b).unwrap().is_some());
  }

  #[test]
  fn test_clones_share_storage() {
    let cache = CacheLayer::memory();
    let other = cache.clone();
    let key = TestKey {
      canonical: "a@{}",
      hash: "h1",
    };
    other.set(&key, json!(true));
    assert!(cache.get(&key).unwrap().is_some());
  }

  #[test]
  fn test_disabled_cache_never_hits() {
    let cache = CacheLayer::disabled();
    let key = TestKey {
      canonical: "a@{}",
      hash: "h1",
    };
    cache.set(&key, json!(1));
    assert!(cache.get(&key).unwrap().is_none());
  }
}
