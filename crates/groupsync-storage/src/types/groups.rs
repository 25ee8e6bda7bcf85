//! Group types for directory-provisioned user grouping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, TeamId, UserId};

/// Where a group's membership comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupSource {
    Ldap,
}

impl GroupSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupSource::Ldap => "ldap",
        }
    }
}

impl std::str::FromStr for GroupSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ldap" => Ok(GroupSource::Ldap),
            other => Err(format!("invalid group source: {}", other)),
        }
    }
}

/// Group record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub source: GroupSource,
    pub remote_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Only populated when a listing asks for it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<i64>,
}

impl Group {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Overwrite the fields present in `patch`.
    pub fn apply(&mut self, patch: &GroupPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(display_name) = &patch.display_name {
            self.display_name = display_name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = if description.is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
    }
}

/// Partial update for a [`Group`]. An empty description clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Parameters for creating a group
#[derive(Clone, Debug)]
pub struct CreateGroupParams {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub source: GroupSource,
    pub remote_id: String,
}

/// Group membership record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Filters understood by the group listings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupSearchOpts {
    /// Case-insensitive substring match on the display name.
    pub q: Option<String>,
    pub include_member_count: bool,
    /// Drop groups that already have an active link to this team.
    pub not_associated_to_team: Option<TeamId>,
    pub include_deleted: bool,
    /// `Some(false)` asks for the whole result in one go.
    pub paginate: Option<bool>,
}

impl GroupSearchOpts {
    pub fn wants_all(&self) -> bool {
        self.paginate == Some(false)
    }
}
