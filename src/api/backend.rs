use async_trait::async_trait;

use super::error::FetchResult;
use super::request::Request;

/// Transport seam between the gateway and whatever answers requests.
///
/// Implementations return the raw JSON body; decoding into typed responses
/// happens in the gateway so cached and fresh bodies go through the same
/// path.
#[async_trait]
pub trait Backend: Send + Sync {
  async fn call(&self, request: &Request) -> FetchResult<serde_json::Value>;

  /// Short human-readable description for the header bar
  fn describe(&self) -> String;
}
