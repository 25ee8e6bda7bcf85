//! Errors surfaced by the linkage core.

use groupsync_storage::StoreError;
use thiserror::Error;

use crate::license::Feature;
use crate::policy::Capability;

/// Kind of record a [`GroupSyncError::NotFound`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Group,
    GroupSyncable,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityKind::Group => "group",
            EntityKind::GroupSyncable => "group syncable",
        })
    }
}

#[derive(Debug, Error)]
pub enum GroupSyncError {
    #[error("feature not enabled by the current license: {0}")]
    NotImplemented(Feature),

    #[error("permission denied: requires {capability}")]
    PermissionDenied { capability: Capability },

    #[error("invalid argument: {field}")]
    InvalidArgument { field: String },

    #[error("{entity} not found: {key}")]
    NotFound { entity: EntityKind, key: String },

    #[error("store failure: {0}")]
    StoreFailure(#[source] StoreError),
}

impl GroupSyncError {
    pub fn invalid_argument(field: impl Into<String>) -> Self {
        GroupSyncError::InvalidArgument {
            field: field.into(),
        }
    }

    /// Map a store error for a keyed lookup or write. Only `StoreError::NotFound` becomes
    /// `NotFound`; everything else stays an opaque store failure.
    pub(crate) fn from_store<K: std::fmt::Display>(
        entity: EntityKind,
        key: K,
    ) -> impl FnOnce(StoreError) -> Self {
        move |err| match err {
            StoreError::NotFound => GroupSyncError::NotFound {
                entity,
                key: key.to_string(),
            },
            other => GroupSyncError::StoreFailure(other),
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GroupSyncError::NotImplemented(_) => "not_implemented",
            GroupSyncError::PermissionDenied { .. } => "permission_denied",
            GroupSyncError::InvalidArgument { .. } => "invalid_argument",
            GroupSyncError::NotFound { .. } => "not_found",
            GroupSyncError::StoreFailure(_) => "store_failure",
        }
    }
}
