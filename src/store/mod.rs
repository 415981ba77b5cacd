//! Owned client-side stores for employees and transactions.
//!
//! Every store follows the same shape:
//! - state is a `Loadable<T>` (never "null means not loaded")
//! - starting a request hands out a `Pending` carrying a `Ticket`
//! - the response is `apply`-ed back with that ticket; if the store was
//!   invalidated or a newer request started in the meantime, the ticket no
//!   longer matches and the response is dropped
//!
//! This split lets the controller run requests on background tasks without
//! holding a borrow of the store across the await.

mod by_employee;
mod directory;
mod paginated;

pub use by_employee::EmployeeFilterStore;
pub use directory::EmployeeDirectory;
pub use paginated::PaginationAccumulator;

use serde::de::DeserializeOwned;

use crate::api::{FetchGateway, FetchMode, FetchResult, Request};
use crate::cache::CacheResult;

/// Explicit "not loaded yet" vs "loaded (possibly empty)".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Loadable<T> {
  #[default]
  NotLoaded,
  Loaded(T),
}

impl<T> Loadable<T> {
  pub fn is_loaded(&self) -> bool {
    matches!(self, Loadable::Loaded(_))
  }

  pub fn as_ref(&self) -> Option<&T> {
    match self {
      Loadable::Loaded(value) => Some(value),
      Loadable::NotLoaded => None,
    }
  }

  pub fn as_mut(&mut self) -> Option<&mut T> {
    match self {
      Loadable::Loaded(value) => Some(value),
      Loadable::NotLoaded => None,
    }
  }
}

/// Identifies which request a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic request counter owned by one store.
#[derive(Debug, Default)]
struct Generation(u64);

impl Generation {
  /// Supersede every outstanding ticket and issue a new one.
  fn bump(&mut self) -> Ticket {
    self.0 += 1;
    Ticket(self.0)
  }

  fn is_current(&self, ticket: Ticket) -> bool {
    self.0 == ticket.0
  }
}

/// What `apply` did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
  /// The store now reflects the response
  Updated,
  /// The response belonged to a superseded request and was discarded
  Stale,
}

/// A request that has been issued by a store but not yet executed.
#[derive(Debug, Clone)]
pub struct Pending {
  ticket: Ticket,
  request: Request,
  mode: FetchMode,
}

impl Pending {
  pub fn request(&self) -> &Request {
    &self.request
  }

  /// Execute through the gateway. Does not touch the store.
  pub async fn run<T: DeserializeOwned>(self, gateway: &FetchGateway) -> Resolved<T> {
    let result = gateway.fetch(&self.request, self.mode).await;
    Resolved {
      ticket: self.ticket,
      result,
    }
  }
}

/// Outcome of a `Pending`, ready to be applied to the store that issued it.
#[derive(Debug)]
pub struct Resolved<T> {
  ticket: Ticket,
  result: FetchResult<CacheResult<T>>,
}
