//! Group lookups and edits.

use std::sync::Arc;

use groupsync_storage::{Group, GroupId, GroupPatch, GroupSearchOpts, GroupStore, Page, UserId};
use tracing::{debug, info};

use crate::auth::Authorizer;
use crate::error::{EntityKind, GroupSyncError};
use crate::policy::{Capability, Requirement};

/// Search terms of a single character are ignored.
pub(crate) fn normalize_search(opts: &GroupSearchOpts) -> GroupSearchOpts {
    let mut opts = opts.clone();
    if opts.q.as_deref().is_some_and(|q| q.chars().count() <= 1) {
        opts.q = None;
    }
    opts
}

fn validate_patch(patch: &GroupPatch) -> Result<(), GroupSyncError> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(GroupSyncError::invalid_argument("name"));
    }
    if patch
        .display_name
        .as_deref()
        .is_some_and(|n| n.trim().is_empty())
    {
        return Err(GroupSyncError::invalid_argument("display_name"));
    }
    Ok(())
}

pub struct GroupDirectory {
    groups: Arc<dyn GroupStore>,
    auth: Authorizer,
}

impl GroupDirectory {
    pub fn new(groups: Arc<dyn GroupStore>, auth: Authorizer) -> Self {
        Self { groups, auth }
    }

    pub async fn get_group(
        &self,
        actor: &UserId,
        group_id: &GroupId,
    ) -> Result<Group, GroupSyncError> {
        self.auth.require_feature()?;
        self.auth.require_system(actor)?;

        debug!("Getting group {}", group_id);
        self.groups
            .get_group(group_id)
            .await
            .map_err(GroupSyncError::from_store(EntityKind::Group, group_id))
    }

    pub async fn patch_group(
        &self,
        actor: &UserId,
        group_id: &GroupId,
        patch: &GroupPatch,
    ) -> Result<Group, GroupSyncError> {
        self.auth.require_feature()?;
        validate_patch(patch)?;
        self.auth.require_system(actor)?;

        let mut group = self
            .groups
            .get_group(group_id)
            .await
            .map_err(GroupSyncError::from_store(EntityKind::Group, group_id))?;
        group.apply(patch);
        let updated = self
            .groups
            .update_group(&group)
            .await
            .map_err(GroupSyncError::from_store(EntityKind::Group, group_id))?;
        info!("Patched group {}", group_id);
        Ok(updated)
    }

    /// Any authenticated actor may list; narrowing to groups not yet on a team needs that
    /// team's capability, and seeing deleted groups needs system.
    pub async fn list_groups(
        &self,
        actor: &UserId,
        page: Page,
        opts: &GroupSearchOpts,
    ) -> Result<Vec<Group>, GroupSyncError> {
        self.auth.require_feature()?;
        if let Some(team_id) = opts.not_associated_to_team {
            self.auth
                .require(actor, Requirement::Team(team_id, Capability::ManageTeam))?;
        }
        if opts.include_deleted {
            self.auth.require_system(actor)?;
        }

        let opts = normalize_search(opts);
        debug!("Listing groups (page {}, query {:?})", page.page(), opts.q);
        self.groups
            .list_groups(page, &opts)
            .await
            .map_err(GroupSyncError::StoreFailure)
    }
}
