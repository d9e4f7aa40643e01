//! The HTTP route handlers, grouped by resource.

pub mod transaction;
pub mod user;
