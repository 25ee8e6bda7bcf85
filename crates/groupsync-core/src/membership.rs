//! Paged reads of group members and of the groups linked to a team or channel.

use std::sync::Arc;

use groupsync_storage::{
    ChannelId, Group, GroupId, GroupSearchOpts, GroupStore, Page, TeamId, User, UserId,
};
use serde::Serialize;
use tracing::debug;

use crate::auth::Authorizer;
use crate::directory::normalize_search;
use crate::error::{EntityKind, GroupSyncError};
use crate::policy::{Capability, Requirement};

/// One page of members and the group's full member count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemberPage {
    pub members: Vec<User>,
    #[serde(rename = "total_member_count")]
    pub total_count: i64,
}

pub struct MembershipPager {
    groups: Arc<dyn GroupStore>,
    auth: Authorizer,
}

impl MembershipPager {
    pub fn new(groups: Arc<dyn GroupStore>, auth: Authorizer) -> Self {
        Self { groups, auth }
    }

    pub async fn page_group_members(
        &self,
        actor: &UserId,
        group_id: &GroupId,
        page: Page,
    ) -> Result<MemberPage, GroupSyncError> {
        self.auth.require_feature()?;
        self.auth.require_system(actor)?;

        self.groups
            .get_group(group_id)
            .await
            .map_err(GroupSyncError::from_store(EntityKind::Group, group_id))?;

        debug!(
            "Paging members of group {} (page {}, per_page {})",
            group_id,
            page.page(),
            page.per_page()
        );
        let (members, total_count) = self
            .groups
            .page_group_member_users(group_id, page)
            .await
            .map_err(GroupSyncError::StoreFailure)?;
        Ok(MemberPage {
            members,
            total_count,
        })
    }

    pub async fn list_groups_for_channel(
        &self,
        actor: &UserId,
        channel_id: &ChannelId,
        page: Page,
    ) -> Result<Vec<Group>, GroupSyncError> {
        self.auth.require_feature()?;
        self.auth.require_system(actor)?;

        debug!("Listing groups linked to channel {}", channel_id);
        self.groups
            .list_groups_by_channel(channel_id, page)
            .await
            .map_err(GroupSyncError::StoreFailure)
    }

    /// Groups linked to a team. `paginate == Some(false)` ignores `page` and returns all.
    /// `not_associated_to_team` needs `ManageTeam` on that team too, and `include_deleted`
    /// needs system.
    pub async fn list_groups_for_team(
        &self,
        actor: &UserId,
        team_id: &TeamId,
        page: Page,
        opts: &GroupSearchOpts,
    ) -> Result<Vec<Group>, GroupSyncError> {
        self.auth.require_feature()?;
        self.auth
            .require(actor, Requirement::Team(*team_id, Capability::ManageTeam))?;
        if let Some(other) = opts.not_associated_to_team {
            self.auth
                .require(actor, Requirement::Team(other, Capability::ManageTeam))?;
        }
        if opts.include_deleted {
            self.auth.require_system(actor)?;
        }

        let opts = normalize_search(opts);
        let page = if opts.wants_all() { None } else { Some(page) };
        debug!("Listing groups linked to team {} (page {:?})", team_id, page);
        self.groups
            .list_groups_by_team(team_id, page, &opts)
            .await
            .map_err(GroupSyncError::StoreFailure)
    }
}
