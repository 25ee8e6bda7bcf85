//! Links between a group and the team or channel it is synchronised into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::{ChannelId, GroupId, TeamId};

/// Kind of unit a group can be linked to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncableType {
    Team,
    Channel,
}

/// Error type for parsing SyncableType from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSyncableTypeError(pub String);

impl std::fmt::Display for ParseSyncableTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid syncable type: {}", self.0)
    }
}

impl std::error::Error for ParseSyncableTypeError {}

impl FromStr for SyncableType {
    type Err = ParseSyncableTypeError;

    /// Accepts both the stored form (`team`) and the route form (`teams`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team" | "teams" => Ok(SyncableType::Team),
            "channel" | "channels" => Ok(SyncableType::Channel),
            _ => Err(ParseSyncableTypeError(s.to_string())),
        }
    }
}

impl SyncableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncableType::Team => "team",
            SyncableType::Channel => "channel",
        }
    }

    /// Capitalised name, used when naming invalid request payloads (`GroupTeam`).
    pub fn title(&self) -> &'static str {
        match self {
            SyncableType::Team => "Team",
            SyncableType::Channel => "Channel",
        }
    }
}

impl std::fmt::Display for SyncableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The target of a link: a syncable id tagged with its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "syncable_id", rename_all = "lowercase")]
pub enum Syncable {
    Team(TeamId),
    Channel(ChannelId),
}

impl Syncable {
    pub fn from_parts(kind: SyncableType, id: Uuid) -> Self {
        match kind {
            SyncableType::Team => Syncable::Team(TeamId(id)),
            SyncableType::Channel => Syncable::Channel(ChannelId(id)),
        }
    }

    pub fn kind(&self) -> SyncableType {
        match self {
            Syncable::Team(_) => SyncableType::Team,
            Syncable::Channel(_) => SyncableType::Channel,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Syncable::Team(id) => id.0,
            Syncable::Channel(id) => id.0,
        }
    }
}

impl From<TeamId> for Syncable {
    fn from(id: TeamId) -> Self {
        Syncable::Team(id)
    }
}

impl From<ChannelId> for Syncable {
    fn from(id: ChannelId) -> Self {
        Syncable::Channel(id)
    }
}

impl std::fmt::Display for Syncable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Group-to-syncable link record.
///
/// At most one record exists per `(group_id, syncable)`. A record with `deleted_at` set is a
/// tombstone: logically unlinked but kept so a later link restores the same record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSyncable {
    pub group_id: GroupId,
    #[serde(flatten)]
    pub syncable: Syncable,
    pub auto_add: bool,
    pub scheme_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl GroupSyncable {
    /// A fresh, unpersisted link with every flag off.
    pub fn new(group_id: GroupId, syncable: Syncable) -> Self {
        let now = Utc::now();
        Self {
            group_id,
            syncable,
            auto_add: false,
            scheme_admin: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_tombstoned(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Overwrite the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: &GroupSyncablePatch) {
        if let Some(auto_add) = patch.auto_add {
            self.auto_add = auto_add;
        }
        if let Some(scheme_admin) = patch.scheme_admin {
            self.scheme_admin = scheme_admin;
        }
    }
}

/// Partial update for a [`GroupSyncable`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSyncablePatch {
    #[serde(default)]
    pub auto_add: Option<bool>,
    #[serde(default)]
    pub scheme_admin: Option<bool>,
}
