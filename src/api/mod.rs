//! Backend access: domain types, named requests, transports and the
//! caching gateway the stores fetch through.

pub mod api_types;
mod backend;
mod error;
mod gateway;
mod http;
mod mock;
mod request;
mod types;

pub use backend::Backend;
pub use error::{FetchError, FetchResult};
pub use gateway::{FetchGateway, FetchMode};
pub use http::HttpBackend;
pub use mock::MockBackend;
pub use request::{Endpoint, Request};
pub use types::{Employee, Page, Transaction, ALL_EMPLOYEES_ID};
