//! Contract configuration.

use serde::{Deserialize, Serialize};
use tuple_ledger_core::assets::PERMISSIONS_ALL;
use tuple_ledger_core::{Error, Result};

/// Maximum accepted length of a worker-reported log, in bytes.
pub const DEFAULT_MAX_LOG_LENGTH: usize = 200;

/// Settings shared by every contract operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Logs longer than this are rejected
    pub max_log_length: usize,
    /// Permissions recorded on newly created tuples
    pub default_permissions: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            max_log_length: DEFAULT_MAX_LOG_LENGTH,
            default_permissions: PERMISSIONS_ALL.to_string(),
        }
    }
}

impl ContractConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_log_length(mut self, max_log_length: usize) -> Self {
        self.max_log_length = max_log_length;
        self
    }

    pub fn with_default_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.default_permissions = permissions.into();
        self
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reject a log longer than `max_log_length`.
    pub fn check_log(&self, log: &str) -> Result<()> {
        if log.len() > self.max_log_length {
            return Err(Error::bad_request(format!(
                "too long log, is {} and should be at most {}",
                log.len(),
                self.max_log_length
            )));
        }
        Ok(())
    }
}
