//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A single cached response.
#[derive(Debug, Clone)]
pub struct CachedEntry {
  /// Canonical request string the hash was computed from
  pub canonical: String,
  /// Endpoint group, for scoped clearing
  pub scope: &'static str,
  /// Raw response body
  pub value: serde_json::Value,
  /// When the entry was written
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Get an entry by hashed key.
  fn get(&self, key: &str) -> Option<CachedEntry>;

  /// Insert or overwrite an entry.
  fn set(&self, key: &str, entry: CachedEntry);

  /// Remove a single entry.
  fn remove(&self, key: &str);

  /// Remove every entry belonging to one endpoint group.
  fn clear_scope(&self, scope: &str);

  /// Number of stored entries.
  fn len(&self) -> usize;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Option<CachedEntry> {
    None // Always miss
  }

  fn set(&self, _key: &str, _entry: CachedEntry) {}

  fn remove(&self, _key: &str) {}

  fn clear_scope(&self, _scope: &str) {}

  fn len(&self) -> usize {
    0
  }
}

/// Session-scoped storage. Unbounded: the data set is small and lives only
/// as long as the process.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CachedEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<String, CachedEntry>> {
    // Entries are replaced whole, so a poisoned map is still consistent.
    self
      .entries
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Option<CachedEntry> {
    self.entries().get(key).cloned()
  }

  fn set(&self, key: &str, entry: CachedEntry) {
    self.entries().insert(key.to_string(), entry);
  }

  fn remove(&self, key: &str) {
    self.entries().remove(key);
  }

  fn clear_scope(&self, scope: &str) {
    self.entries().retain(|_, entry| entry.scope != scope);
  }

  fn len(&self) -> usize {
    self.entries().len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn entry(scope: &'static str, value: serde_json::Value) -> CachedEntry {
    CachedEntry {
      canonical: format!("{}@{{}}", scope),
      scope,
      value,
      cached_at: Utc::now(),
    }
  }

  #[test]
  fn test_memory_set_get_overwrite() {
    let storage = MemoryStorage::new();
    storage.set("k", entry("employees", json!([1])));
    storage.set("k", entry("employees", json!([2])));
    assert_eq!(storage.get("k").unwrap().value, json!([2]));
    assert_eq!(storage.len(), 1);
  }

  #[test]
  fn test_memory_clear_scope_only_touches_scope() {
    let storage = MemoryStorage::new();
    storage.set("a", entry("employees", json!([])));
    storage.set("b", entry("paginatedTransactions", json!({})));
    storage.clear_scope("paginatedTransactions");
    assert!(storage.get("a").is_some());
    assert!(storage.get("b").is_none());
  }

  #[test]
  fn test_noop_always_misses() {
    let storage = NoopStorage;
    storage.set("k", entry("employees", json!([])));
    assert!(storage.get("k").is_none());
    assert_eq!(storage.len(), 0);
  }
}
