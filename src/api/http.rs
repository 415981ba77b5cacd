use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::config::{ApiConfig, Config};

use super::backend::Backend;
use super::error::{FetchError, FetchResult};
use super::request::Request;

/// REST backend.
///
/// Route mapping:
/// - `employees` -> `GET /employees`
/// - `paginatedTransactions` -> `GET /transactions?page=N`
/// - `transactionsByEmployee` -> `GET /employees/{id}/transactions`
/// - `setTransactionApproval` -> `PATCH /transactions/{id}` `{"approved": bool}`
#[derive(Clone)]
pub struct HttpBackend {
  client: reqwest::Client,
  base_url: Url,
  token: Option<String>,
}

impl HttpBackend {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let base_url = Url::parse(&config.base_url)
      .map_err(|e| eyre!("Invalid api.base_url '{}': {}", config.base_url, e))?;

    if base_url.cannot_be_a_base() {
      return Err(eyre!("api.base_url '{}' cannot be a base URL", config.base_url));
    }

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .gzip(true)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      base_url,
      token: Config::get_api_token(),
    })
  }

  fn url(&self, endpoint: &'static str, segments: &[&str]) -> FetchResult<Url> {
    let mut url = self.base_url.clone();
    {
      let mut path = url
        .path_segments_mut()
        .map_err(|_| FetchError::invalid(endpoint, "base URL cannot have path segments"))?;
      path.pop_if_empty().extend(segments);
    }
    Ok(url)
  }

  fn build(&self, request: &Request) -> FetchResult<reqwest::RequestBuilder> {
    let endpoint = request.endpoint().name();

    let builder = match request {
      Request::Employees => self.client.get(self.url(endpoint, &["employees"])?),
      Request::PaginatedTransactions { page } => self
        .client
        .get(self.url(endpoint, &["transactions"])?)
        .query(&[("page", page)]),
      Request::TransactionsByEmployee { employee_id } => self.client.get(self.url(
        endpoint,
        &["employees", employee_id.as_str(), "transactions"],
      )?),
      Request::SetTransactionApproval {
        transaction_id,
        value,
      } => self
        .client
        .patch(self.url(endpoint, &["transactions", transaction_id.as_str()])?)
        .json(&json!({ "approved": value })),
    };

    Ok(match &self.token {
      Some(token) => builder.bearer_auth(token),
      None => builder,
    })
  }
}

#[async_trait]
impl Backend for HttpBackend {
  async fn call(&self, request: &Request) -> FetchResult<Value> {
    let endpoint = request.endpoint().name();

    let response = self
      .build(request)?
      .send()
      .await
      .map_err(|e| FetchError::transport(endpoint, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        endpoint,
        status: status.as_u16(),
      });
    }

    let body = response
      .bytes()
      .await
      .map_err(|e| FetchError::transport(endpoint, e.to_string()))?;

    // Mutations may answer 204 with no body
    if body.is_empty() {
      return Ok(Value::Null);
    }

    serde_json::from_slice(&body).map_err(|e| FetchError::malformed(endpoint, e.to_string()))
  }

  fn describe(&self) -> String {
    self
      .base_url
      .host_str()
      .map(|host| match self.base_url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
      })
      .unwrap_or_else(|| self.base_url.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn backend(base_url: &str) -> HttpBackend {
    HttpBackend::new(&ApiConfig {
      base_url: base_url.to_string(),
      timeout_secs: 5,
    })
    .unwrap()
  }

  #[test]
  fn test_url_joins_segments() {
    let backend = backend("http://localhost:3000/api/");
    let url = backend
      .url("transactionsByEmployee", &["employees", "e 1", "transactions"])
      .unwrap();
    assert_eq!(
      url.as_str(),
      "http://localhost:3000/api/employees/e%201/transactions"
    );
  }

  #[test]
  fn test_paginated_request_carries_page() {
    let backend = backend("http://localhost:3000");
    let request = backend
      .build(&Request::PaginatedTransactions { page: 3 })
      .unwrap()
      .build()
      .unwrap();
    assert_eq!(request.method(), reqwest::Method::GET);
    assert_eq!(request.url().as_str(), "http://localhost:3000/transactions?page=3");
  }

  #[test]
  fn test_approval_is_patch() {
    let backend = backend("http://localhost:3000");
    let request = backend
      .build(&Request::SetTransactionApproval {
        transaction_id: "t1".to_string(),
        value: true,
      })
      .unwrap()
      .build()
      .unwrap();
    assert_eq!(request.method(), reqwest::Method::PATCH);
    assert_eq!(request.url().path(), "/transactions/t1");
  }

  #[test]
  fn test_describe_uses_host_and_port() {
    assert_eq!(backend("http://localhost:3000").describe(), "localhost:3000");
    assert_eq!(backend("https://api.example.com/v1").describe(), "api.example.com");
  }

  #[test]
  fn test_invalid_base_url_is_rejected() {
    let result = HttpBackend::new(&ApiConfig {
      base_url: "not a url".to_string(),
      timeout_secs: 5,
    });
    assert!(result.is_err());
  }
}
