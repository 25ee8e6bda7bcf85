use std::sync::Arc;

use groupsync_storage::UserId;
use tracing::warn;

use crate::error::GroupSyncError;
use crate::license::{Feature, License};
use crate::policy::{AccessPolicy, Capability, Requirement};

/// License gate plus capability checks, shared by every manager.
#[derive(Clone)]
pub struct Authorizer {
    policy: Arc<dyn AccessPolicy>,
    license: License,
}

impl Authorizer {
    pub fn new(policy: Arc<dyn AccessPolicy>, license: License) -> Self {
        Self { policy, license }
    }

    pub fn license(&self) -> &License {
        &self.license
    }

    pub fn require_feature(&self) -> Result<(), GroupSyncError> {
        self.license.require(Feature::LdapGroups).inspect_err(|_| {
            warn!("LDAP groups are not enabled by the license");
        })
    }

    pub fn require(&self, actor: &UserId, requirement: Requirement) -> Result<(), GroupSyncError> {
        if requirement.is_met_by(self.policy.as_ref(), actor) {
            return Ok(());
        }
        let capability = requirement.capability();
        warn!("Permission denied for {}: {:?}", actor, requirement);
        Err(GroupSyncError::PermissionDenied { capability })
    }

    pub fn require_system(&self, actor: &UserId) -> Result<(), GroupSyncError> {
        self.require(actor, Requirement::System(Capability::ManageSystem))
    }
}
