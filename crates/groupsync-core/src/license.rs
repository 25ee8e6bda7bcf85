//! License feature gate checked before any group operation.

use crate::error::GroupSyncError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    LdapGroups,
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Feature::LdapGroups => "ldap_groups",
        })
    }
}

/// Features unlocked for this installation. Everything is off by default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct License {
    pub ldap_groups: bool,
}

impl License {
    pub fn with_ldap_groups() -> Self {
        Self { ldap_groups: true }
    }

    pub fn allows(&self, feature: Feature) -> bool {
        match feature {
            Feature::LdapGroups => self.ldap_groups,
        }
    }

    pub fn require(&self, feature: Feature) -> Result<(), GroupSyncError> {
        if self.allows(feature) {
            Ok(())
        } else {
            Err(GroupSyncError::NotImplemented(feature))
        }
    }
}
