//! Request caching for the data layer.
//!
//! This module is transport-agnostic:
//! - Keys are anything implementing `QueryKey` (endpoint + canonical params)
//! - Values are raw JSON response bodies
//! - Storage is pluggable (in-memory for the session, or disabled)

mod layer;
mod storage;
mod traits;

pub use layer::{CacheError, CacheLayer};
pub use traits::{CacheResult, CacheSource, QueryKey};
