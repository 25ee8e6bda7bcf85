//! Type definitions for groupsync storage.

mod groups;
mod ids;
mod paging;
mod syncables;
mod users;

// Re-export all types from submodules
pub use groups::*;
pub use ids::*;
pub use paging::*;
pub use syncables::*;
pub use users::*;
