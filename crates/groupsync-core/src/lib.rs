//! Linking directory-provisioned groups to teams and channels.
//!
//! [`LinkageManager`] owns the link lifecycle, [`MembershipPager`] serves paged membership
//! reads, and [`GroupDirectory`] covers group lookups and edits. All three share one
//! [`Authorizer`], which applies the license gate before any capability check.

mod auth;
mod directory;
mod error;
mod license;
mod linkage;
mod locks;
mod membership;
mod policy;

pub use auth::Authorizer;
pub use directory::GroupDirectory;
pub use error::{EntityKind, GroupSyncError};
pub use license::{Feature, License};
pub use linkage::{Linkage, LinkageManager};
pub use membership::{MemberPage, MembershipPager};
pub use policy::{
    AccessPolicy, Capability, ChannelGrant, GrantTable, GrantsError, Requirement, TeamGrant,
};
