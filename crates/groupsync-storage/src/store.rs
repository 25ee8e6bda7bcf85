//! The store traits that backends implement.

use crate::types::*;
use crate::StoreError;

/// Groups, their members, and the users behind them.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait GroupStore: Send + Sync {
    // ───────────────────────────────────── Groups ─────────────────────────────────────────

    /// Create a group (returns the stored record with its generated ID).
    async fn create_group(&self, params: &CreateGroupParams) -> Result<Group, StoreError>;

    /// Get group by ID, including soft-deleted groups.
    async fn get_group(&self, group_id: &GroupId) -> Result<Group, StoreError>;

    /// Persist name, display name and description of an existing group.
    async fn update_group(&self, group: &Group) -> Result<Group, StoreError>;

    /// List groups matching `opts`, ordered by display name.
    async fn list_groups(
        &self,
        page: Page,
        opts: &GroupSearchOpts,
    ) -> Result<Vec<Group>, StoreError>;

    /// List groups with an active link to a channel.
    async fn list_groups_by_channel(
        &self,
        channel_id: &ChannelId,
        page: Page,
    ) -> Result<Vec<Group>, StoreError>;

    /// List groups with an active link to a team. `None` returns every match.
    async fn list_groups_by_team(
        &self,
        team_id: &TeamId,
        page: Option<Page>,
        opts: &GroupSearchOpts,
    ) -> Result<Vec<Group>, StoreError>;

    // ───────────────────────────────────── Users ──────────────────────────────────────────

    /// Create a new user.
    async fn create_user(&self, params: &CreateUserParams) -> Result<User, StoreError>;

    // ───────────────────────────────────── Members ────────────────────────────────────────

    /// Add a user to a group (re-activates a removed membership).
    async fn add_group_member(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<GroupMember, StoreError>;

    /// Soft-remove a user from a group.
    async fn remove_group_member(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<GroupMember, StoreError>;

    /// One page of the group's current member users, plus the total member count.
    async fn page_group_member_users(
        &self,
        group_id: &GroupId,
        page: Page,
    ) -> Result<(Vec<User>, i64), StoreError>;
}

/// Group-to-team/channel links keyed by `(group_id, syncable)`.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait SyncableStore: Send + Sync {
    /// Get the link for a pair, tombstoned or not.
    async fn get_group_syncable(
        &self,
        group_id: &GroupId,
        syncable: &Syncable,
    ) -> Result<GroupSyncable, StoreError>;

    /// Insert a new link. `AlreadyExists` if the pair has a record in any state.
    async fn create_group_syncable(
        &self,
        record: &GroupSyncable,
    ) -> Result<GroupSyncable, StoreError>;

    /// Overwrite flags and `deleted_at` of an existing link.
    async fn update_group_syncable(
        &self,
        record: &GroupSyncable,
    ) -> Result<GroupSyncable, StoreError>;

    /// Tombstone an active link. `NotFound` if absent or already tombstoned.
    async fn delete_group_syncable(
        &self,
        group_id: &GroupId,
        syncable: &Syncable,
    ) -> Result<GroupSyncable, StoreError>;

    /// Active links of one type for a group.
    async fn list_group_syncables(
        &self,
        group_id: &GroupId,
        syncable_type: SyncableType,
    ) -> Result<Vec<GroupSyncable>, StoreError>;
}
