//! Capabilities, the requirement table for link operations, and the file-backed grant table.

use std::collections::HashSet;
use std::path::Path;

use groupsync_storage::{ChannelId, Syncable, TeamId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageSystem,
    ManageTeam,
    ManagePublicChannelMembers,
    ManagePrivateChannelMembers,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageSystem => "manage_system",
            Capability::ManageTeam => "manage_team",
            Capability::ManagePublicChannelMembers => "manage_public_channel_members",
            Capability::ManagePrivateChannelMembers => "manage_private_channel_members",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers capability questions for an actor.
#[cfg_attr(test, mockall::automock)]
pub trait AccessPolicy: Send + Sync {
    fn has_system_capability(&self, actor: &UserId, capability: Capability) -> bool;

    fn has_team_capability(&self, actor: &UserId, team_id: &TeamId, capability: Capability)
        -> bool;

    fn has_channel_capability(
        &self,
        actor: &UserId,
        channel_id: &ChannelId,
        capability: Capability,
    ) -> bool;
}

/// A capability, scoped to where it has to hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    System(Capability),
    Team(TeamId, Capability),
    Channel(ChannelId, Capability),
}

impl Requirement {
    /// What linking a group to `syncable` requires.
    pub fn link(syncable: &Syncable) -> Self {
        match *syncable {
            Syncable::Team(team_id) => Requirement::Team(team_id, Capability::ManageTeam),
            Syncable::Channel(channel_id) => {
                Requirement::Channel(channel_id, Capability::ManagePublicChannelMembers)
            }
        }
    }

    /// Capability reported back when the requirement is not met.
    pub fn capability(&self) -> Capability {
        match *self {
            Requirement::System(c) | Requirement::Team(_, c) | Requirement::Channel(_, c) => c,
        }
    }

    pub fn is_met_by(&self, policy: &dyn AccessPolicy, actor: &UserId) -> bool {
        match self {
            Requirement::System(c) => policy.has_system_capability(actor, *c),
            Requirement::Team(team_id, c) => policy.has_team_capability(actor, team_id, *c),
            Requirement::Channel(channel_id, c) => {
                policy.has_channel_capability(actor, channel_id, *c)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum GrantsError {
    #[error("failed to read grants file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse grants file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamGrant {
    pub user_id: UserId,
    pub team_id: TeamId,
    pub capabilities: Vec<Capability>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGrant {
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub capabilities: Vec<Capability>,
}

/// Static [`AccessPolicy`] loaded from JSON.
///
/// System admins hold every capability everywhere. Everyone else only holds what a team or
/// channel grant names for that exact team or channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantTable {
    #[serde(default)]
    pub system_admins: HashSet<UserId>,
    #[serde(default)]
    pub teams: Vec<TeamGrant>,
    #[serde(default)]
    pub channels: Vec<ChannelGrant>,
}

impl GrantTable {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, GrantsError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_system_admin(mut self, user_id: UserId) -> Self {
        self.system_admins.insert(user_id);
        self
    }

    pub fn with_team_grant(
        mut self,
        user_id: UserId,
        team_id: TeamId,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        self.teams.push(TeamGrant {
            user_id,
            team_id,
            capabilities: capabilities.into_iter().collect(),
        });
        self
    }

    pub fn with_channel_grant(
        mut self,
        user_id: UserId,
        channel_id: ChannelId,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        self.channels.push(ChannelGrant {
            user_id,
            channel_id,
            capabilities: capabilities.into_iter().collect(),
        });
        self
    }

    fn is_admin(&self, actor: &UserId) -> bool {
        self.system_admins.contains(actor)
    }
}

impl AccessPolicy for GrantTable {
    fn has_system_capability(&self, actor: &UserId, _capability: Capability) -> bool {
        self.is_admin(actor)
    }

    fn has_team_capability(
        &self,
        actor: &UserId,
        team_id: &TeamId,
        capability: Capability,
    ) -> bool {
        self.is_admin(actor)
            || self.teams.iter().any(|g| {
                g.user_id == *actor && g.team_id == *team_id && g.capabilities.contains(&capability)
            })
    }

    fn has_channel_capability(
        &self,
        actor: &UserId,
        channel_id: &ChannelId,
        capability: Capability,
    ) -> bool {
        self.is_admin(actor)
            || self.channels.iter().any(|g| {
                g.user_id == *actor
                    && g.channel_id == *channel_id
                    && g.capabilities.contains(&capability)
            })
    }
}
