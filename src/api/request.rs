//! Named requests understood by every backend, and their cache keys.

use serde::Serialize;
use serde_json::json;

use crate::cache::QueryKey;

use super::api_types::{EmployeeRequestParams, PaginatedRequestParams, SetApprovalParams};

/// Backend endpoint identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
  Employees,
  PaginatedTransactions,
  TransactionsByEmployee,
  SetTransactionApproval,
}

impl Endpoint {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Employees => "employees",
      Self::PaginatedTransactions => "paginatedTransactions",
      Self::TransactionsByEmployee => "transactionsByEmployee",
      Self::SetTransactionApproval => "setTransactionApproval",
    }
  }
}

impl std::fmt::Display for Endpoint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

/// A request: endpoint plus its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
  Employees,
  PaginatedTransactions { page: u32 },
  TransactionsByEmployee { employee_id: String },
  SetTransactionApproval { transaction_id: String, value: bool },
}

impl Request {
  pub fn endpoint(&self) -> Endpoint {
    match self {
      Self::Employees => Endpoint::Employees,
      Self::PaginatedTransactions { .. } => Endpoint::PaginatedTransactions,
      Self::TransactionsByEmployee { .. } => Endpoint::TransactionsByEmployee,
      Self::SetTransactionApproval { .. } => Endpoint::SetTransactionApproval,
    }
  }

  /// Parameter object as sent on the wire.
  pub fn params(&self) -> serde_json::Value {
    match self {
      Self::Employees => json!({}),
      Self::PaginatedTransactions { page } => to_value(PaginatedRequestParams { page: *page }),
      Self::TransactionsByEmployee { employee_id } => to_value(EmployeeRequestParams {
        employee_id: employee_id.clone(),
      }),
      Self::SetTransactionApproval {
        transaction_id,
        value,
      } => to_value(SetApprovalParams {
        transaction_id: transaction_id.clone(),
        value: *value,
      }),
    }
  }
}

fn to_value(params: impl Serialize) -> serde_json::Value {
  // Plain structs of strings/numbers/bools always serialize
  serde_json::to_value(params).unwrap_or(serde_json::Value::Null)
}

impl QueryKey for Request {
  fn canonical(&self) -> String {
    // serde_json maps are ordered by key, so the rendering is deterministic
    format!("{}@{}", self.endpoint().name(), self.params())
  }

  fn scope(&self) -> &'static str {
    self.endpoint().name()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_canonical_forms() {
    assert_eq!(Request::Employees.canonical(), "employees@{}");
    assert_eq!(
      Request::PaginatedTransactions { page: 2 }.canonical(),
      "paginatedTransactions@{\"page\":2}"
    );
    assert_eq!(
      Request::TransactionsByEmployee {
        employee_id: "e1".to_string()
      }
      .canonical(),
      "transactionsByEmployee@{\"employeeId\":\"e1\"}"
    );
  }

  #[test]
  fn test_keys_are_stable() {
    let a = Request::PaginatedTransactions { page: 1 };
    let b = Request::PaginatedTransactions { page: 1 };
    assert_eq!(a.cache_hash(), b.cache_hash());
    assert_eq!(a.cache_hash().len(), 64);
  }

  #[test]
  fn test_different_params_never_collide() {
    let keys = [
      Request::Employees.cache_hash(),
      Request::PaginatedTransactions { page: 0 }.cache_hash(),
      Request::PaginatedTransactions { page: 1 }.cache_hash(),
      Request::TransactionsByEmployee {
        employee_id: "e1".to_string(),
      }
      .cache_hash(),
      Request::TransactionsByEmployee {
        employee_id: "e2".to_string(),
      }
      .cache_hash(),
    ];
    let unique: std::collections::HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
  }

  #[test]
  fn test_approval_params_are_sorted() {
    let request = Request::SetTransactionApproval {
      transaction_id: "t1".to_string(),
      value: true,
    };
    assert_eq!(
      request.canonical(),
      "setTransactionApproval@{\"transactionId\":\"t1\",\"value\":true}"
    );
  }
}
