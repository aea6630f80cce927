//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator (protected routes only)
//! 2. Audit logger, which sees the caller injected by auth

pub mod audit;
pub mod auth;
