//! Link lifecycle between groups and teams/channels.
//!
//! A link record moves between three states: absent, active and tombstoned. Linking creates
//! or restores the single record for a `(group, syncable)` pair; unlinking only ever
//! tombstones it.

use std::sync::Arc;

use groupsync_storage::{
    GroupId, GroupStore, GroupSyncable, GroupSyncablePatch, StoreError, Syncable, SyncableStore,
    SyncableType, UserId,
};
use tracing::{debug, info};

use crate::auth::Authorizer;
use crate::error::{EntityKind, GroupSyncError};
use crate::locks::KeyedLocks;
use crate::policy::Requirement;

/// Current state of a link as read from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Linkage {
    Absent,
    Active(GroupSyncable),
    Tombstoned(GroupSyncable),
}

impl Linkage {
    /// Classify a lookup. Only `NotFound` counts as absent; other store errors pass through.
    pub fn from_lookup(result: Result<GroupSyncable, StoreError>) -> Result<Self, StoreError> {
        match result {
            Ok(record) if record.is_tombstoned() => Ok(Linkage::Tombstoned(record)),
            Ok(record) => Ok(Linkage::Active(record)),
            Err(StoreError::NotFound) => Ok(Linkage::Absent),
            Err(e) => Err(e),
        }
    }
}

fn link_key(group_id: &GroupId, syncable: &Syncable) -> String {
    format!("{}/{}", group_id, syncable)
}

pub struct LinkageManager {
    groups: Arc<dyn GroupStore>,
    syncables: Arc<dyn SyncableStore>,
    auth: Authorizer,
    locks: KeyedLocks<(GroupId, Syncable)>,
}

impl LinkageManager {
    pub fn new(
        groups: Arc<dyn GroupStore>,
        syncables: Arc<dyn SyncableStore>,
        auth: Authorizer,
    ) -> Self {
        Self {
            groups,
            syncables,
            auth,
            locks: KeyedLocks::new(),
        }
    }

    /// Make the link active, creating or restoring the record, and apply `patch`.
    ///
    /// Idempotent: linking an active pair again only re-applies the patch.
    pub async fn link(
        &self,
        actor: &UserId,
        group_id: &GroupId,
        syncable: Syncable,
        patch: &GroupSyncablePatch,
    ) -> Result<GroupSyncable, GroupSyncError> {
        self.auth.require_feature()?;
        self.auth.require(actor, Requirement::link(&syncable))?;
        self.require_live_group(group_id).await?;

        let key = link_key(group_id, &syncable);
        let _guard = self.locks.lock((*group_id, syncable)).await;

        let lookup = self.syncables.get_group_syncable(group_id, &syncable).await;
        let linkage = Linkage::from_lookup(lookup).map_err(GroupSyncError::StoreFailure)?;

        let record = match linkage {
            Linkage::Absent => {
                let mut record = GroupSyncable::new(*group_id, syncable);
                record.apply(patch);
                let created = self
                    .syncables
                    .create_group_syncable(&record)
                    .await
                    .map_err(GroupSyncError::StoreFailure)?;
                info!("Linked {}", key);
                created
            }
            Linkage::Tombstoned(mut record) => {
                record.deleted_at = None;
                record.apply(patch);
                let restored = self.write(&record, &key).await?;
                info!("Restored link {}", key);
                restored
            }
            Linkage::Active(mut record) => {
                record.apply(patch);
                let updated = self.write(&record, &key).await?;
                info!("Re-linked {} (already active)", key);
                updated
            }
        };
        Ok(record)
    }

    /// Tombstone an active link.
    pub async fn unlink(
        &self,
        actor: &UserId,
        group_id: &GroupId,
        syncable: Syncable,
    ) -> Result<GroupSyncable, GroupSyncError> {
        self.auth.require_feature()?;
        self.auth.require_system(actor)?;

        let key = link_key(group_id, &syncable);
        let _guard = self.locks.lock((*group_id, syncable)).await;

        let record = self
            .syncables
            .delete_group_syncable(group_id, &syncable)
            .await
            .map_err(GroupSyncError::from_store(EntityKind::GroupSyncable, &key))?;
        info!("Unlinked {}", key);
        Ok(record)
    }

    /// Update flags on an existing active link. Never creates or restores one.
    pub async fn patch(
        &self,
        actor: &UserId,
        group_id: &GroupId,
        syncable: Syncable,
        patch: &GroupSyncablePatch,
    ) -> Result<GroupSyncable, GroupSyncError> {
        self.auth.require_feature()?;
        self.auth.require_system(actor)?;

        let key = link_key(group_id, &syncable);
        let _guard = self.locks.lock((*group_id, syncable)).await;

        let mut record = self.get_active(group_id, &syncable, &key).await?;
        record.apply(patch);
        let updated = self.write(&record, &key).await?;
        info!("Patched link {}", key);
        Ok(updated)
    }

    pub async fn get(
        &self,
        actor: &UserId,
        group_id: &GroupId,
        syncable: Syncable,
    ) -> Result<GroupSyncable, GroupSyncError> {
        self.auth.require_feature()?;
        self.auth.require_system(actor)?;

        let key = link_key(group_id, &syncable);
        debug!("Getting link {}", key);
        self.get_active(group_id, &syncable, &key).await
    }

    /// Active links of one type for a group.
    pub async fn list(
        &self,
        actor: &UserId,
        group_id: &GroupId,
        syncable_type: SyncableType,
    ) -> Result<Vec<GroupSyncable>, GroupSyncError> {
        self.auth.require_feature()?;
        self.auth.require_system(actor)?;

        debug!("Listing {} links for group {}", syncable_type, group_id);
        self.syncables
            .list_group_syncables(group_id, syncable_type)
            .await
            .map_err(GroupSyncError::StoreFailure)
    }

    async fn require_live_group(&self, group_id: &GroupId) -> Result<(), GroupSyncError> {
        let group = self
            .groups
            .get_group(group_id)
            .await
            .map_err(GroupSyncError::from_store(EntityKind::Group, group_id))?;
        if group.is_deleted() {
            return Err(GroupSyncError::NotFound {
                entity: EntityKind::Group,
                key: group_id.to_string(),
            });
        }
        Ok(())
    }

    async fn get_active(
        &self,
        group_id: &GroupId,
        syncable: &Syncable,
        key: &str,
    ) -> Result<GroupSyncable, GroupSyncError> {
        let lookup = self.syncables.get_group_syncable(group_id, syncable).await;
        match Linkage::from_lookup(lookup).map_err(GroupSyncError::StoreFailure)? {
            Linkage::Active(record) => Ok(record),
            Linkage::Absent | Linkage::Tombstoned(_) => Err(GroupSyncError::NotFound {
                entity: EntityKind::GroupSyncable,
                key: key.to_string(),
            }),
        }
    }

    async fn write(
        &self,
        record: &GroupSyncable,
        key: &str,
    ) -> Result<GroupSyncable, GroupSyncError> {
        self.syncables
            .update_group_syncable(record)
            .await
            .map_err(GroupSyncError::from_store(EntityKind::GroupSyncable, key))
    }
}
