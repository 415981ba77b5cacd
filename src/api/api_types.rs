//! Serde types matching backend responses.
//!
//! These are kept apart from the domain types so the wire shape (camelCase,
//! required-but-nullable cursor) does not leak into the stores.

use serde::{Deserialize, Serialize};

use super::types::{Employee, Page, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEmployee {
  pub id: String,
  pub first_name: String,
  pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTransaction {
  pub id: String,
  pub amount: f64,
  pub employee: ApiEmployee,
  pub merchant: String,
  pub date: String,
  #[serde(default)]
  pub approved: bool,
}

/// Paginated response envelope.
///
/// `nextPage` must be present even when it is `null`; a body without it is
/// malformed rather than "last page".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPage<T> {
  pub data: T,
  #[serde(deserialize_with = "Option::deserialize")]
  pub next_page: Option<u32>,
}

// ============================================================================
// Request parameter bodies
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedRequestParams {
  pub page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequestParams {
  pub employee_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetApprovalParams {
  pub transaction_id: String,
  pub value: bool,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiEmployee> for Employee {
  fn from(e: ApiEmployee) -> Self {
    Employee {
      id: e.id,
      first_name: e.first_name,
      last_name: e.last_name,
    }
  }
}

impl From<ApiTransaction> for Transaction {
  fn from(t: ApiTransaction) -> Self {
    Transaction {
      id: t.id,
      amount: t.amount,
      employee: t.employee.into(),
      merchant: t.merchant,
      date: t.date,
      approved: t.approved,
    }
  }
}

impl From<ApiPage<Vec<ApiTransaction>>> for Page<Vec<Transaction>> {
  fn from(page: ApiPage<Vec<ApiTransaction>>) -> Self {
    Page {
      data: page.data.into_iter().map(Transaction::from).collect(),
      next_page: page.next_page,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn transaction_json(id: &str) -> serde_json::Value {
    json!({
      "id": id,
      "amount": 12.5,
      "employee": { "id": "e1", "firstName": "James", "lastName": "Smith" },
      "merchant": "Uber",
      "date": "2021-09-20",
      "approved": false
    })
  }

  #[test]
  fn test_page_with_null_cursor() {
    let body = json!({ "data": [transaction_json("t1")], "nextPage": null });
    let page: ApiPage<Vec<ApiTransaction>> = serde_json::from_value(body).unwrap();
    assert_eq!(page.next_page, None);
    assert_eq!(page.data.len(), 1);
  }

  #[test]
  fn test_page_without_cursor_is_rejected() {
    let body = json!({ "data": [transaction_json("t1")] });
    let result: serde_json::Result<ApiPage<Vec<ApiTransaction>>> = serde_json::from_value(body);
    assert!(result.is_err());
  }

  #[test]
  fn test_page_without_data_is_rejected() {
    let body = json!({ "nextPage": 1 });
    let result: serde_json::Result<ApiPage<Vec<ApiTransaction>>> = serde_json::from_value(body);
    assert!(result.is_err());
  }

  #[test]
  fn test_transaction_into_domain() {
    let api: ApiTransaction = serde_json::from_value(transaction_json("t9")).unwrap();
    let tx = Transaction::from(api);
    assert_eq!(tx.id, "t9");
    assert_eq!(tx.employee.id, "e1");
    assert_eq!(tx.employee.first_name, "James");
    assert!(!tx.approved);
  }
}
