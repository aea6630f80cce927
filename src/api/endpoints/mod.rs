//! API endpoint handlers.
//!
//! `entities` holds the generic CRUD handlers; the rest are the few
//! routes with their own shape.

pub mod auth;
pub mod entities;
pub mod lookups;
pub mod payments;
pub mod users;
