//! Server configuration.
//!
//! Supports configuration via environment variables:
//!
//! ```bash
//! # License: unlock LDAP group linkage (disabled by default)
//! GROUPSYNC_LDAP_GROUPS=true
//!
//! # JSON grant table (system admins, team and channel grants)
//! GROUPSYNC_GRANTS_FILE=/etc/groupsync/grants.json
//! ```

use std::env;
use std::path::PathBuf;

use groupsync_core::{GrantTable, GrantsError, License};
use thiserror::Error;

/// Server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub license: License,
    /// Where to load the grant table from. `None` means nobody holds any capability.
    pub grants_file: Option<PathBuf>,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid boolean for {var}: {value}. Expected true/false/1/0")]
    InvalidBool { var: &'static str, value: String },

    #[error(transparent)]
    Grants(#[from] GrantsError),
}

fn env_bool(var: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(v) => match v.to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::InvalidBool { var, value: v }),
        },
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let ldap_groups = env_bool("GROUPSYNC_LDAP_GROUPS", false)?;
        let grants_file = env::var("GROUPSYNC_GRANTS_FILE")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            license: License { ldap_groups },
            grants_file,
        })
    }

    pub fn load_grants(&self) -> Result<GrantTable, ConfigError> {
        match &self.grants_file {
            Some(path) => Ok(GrantTable::load_from(path)?),
            None => Ok(GrantTable::default()),
        }
    }
}
