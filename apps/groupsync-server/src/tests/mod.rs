//! Server tests.
//!
//! - `common` - Shared helpers: in-memory app, request driver, fixtures
//! - `handlers` - Route-level tests driven through the router

pub mod common;

mod handlers;
