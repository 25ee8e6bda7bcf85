//! Storage abstraction for groupsync.
//!
//! Backend crates (e.g., groupsync-store-sqlite) implement [`GroupStore`] and
//! [`SyncableStore`] so the linkage core doesn't depend on any specific database engine or
//! schema details.

mod store;
pub mod types;

pub use store::*;
pub use types::*;

use thiserror::Error;

/// Uniform error type for all storage backends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("conflict")]
    Conflict,
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}
