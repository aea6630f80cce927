//! HTTP surface over the repository and auth service.
//!
//! Routes are nested under `/api/v1/`. Account routes are open; everything
//! else passes the bearer token check, and every request is audit-logged.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
