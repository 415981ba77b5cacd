//! Typed failures surfaced by the data layer.

use thiserror::Error;

/// Failure of a single named request.
///
/// Nothing in the data layer retries or swallows these; every store hands
/// them back to its caller and keeps its last-known-good state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
  /// Connection refused, timeout, TLS failure, ...
  #[error("transport error on {endpoint}: {message}")]
  Transport {
    endpoint: &'static str,
    message: String,
  },

  /// The server answered with a non-success status
  #[error("{endpoint} returned HTTP {status}")]
  Status { endpoint: &'static str, status: u16 },

  /// The response body did not have the expected shape
  #[error("malformed response from {endpoint}: {message}")]
  Malformed {
    endpoint: &'static str,
    message: String,
  },

  /// Two different requests hashed to the same cache key
  #[error("cache key collision: {existing} and {requested}")]
  KeyCollision { existing: String, requested: String },

  /// The request was rejected before (or by) the backend
  #[error("invalid request to {endpoint}: {message}")]
  InvalidRequest {
    endpoint: &'static str,
    message: String,
  },
}

impl FetchError {
  pub fn transport(endpoint: &'static str, message: impl Into<String>) -> Self {
    Self::Transport {
      endpoint,
      message: message.into(),
    }
  }

  pub fn malformed(endpoint: &'static str, message: impl Into<String>) -> Self {
    Self::Malformed {
      endpoint,
      message: message.into(),
    }
  }

  pub fn invalid(endpoint: &'static str, message: impl Into<String>) -> Self {
    Self::InvalidRequest {
      endpoint,
      message: message.into(),
    }
  }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
