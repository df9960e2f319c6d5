//! Configuration types for the PDD solver
//!
//! [`SolverConfig`] is the per-issuer JSON block the host hands over with
//! every challenge; [`ReconcileSettings`] holds the solver-wide knobs.

use serde::{Deserialize, Serialize};

/// TTL applied to challenge records (seconds)
pub const DEFAULT_RECORD_TTL: u32 = 300;

/// Per-issuer solver configuration
///
/// ```json
/// { "pddTokenSecretRef": { "name": "pdd-token", "key": "token" } }
/// ```
///
/// Credentials are never embedded here; the block only names the secret
/// that holds them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    /// Secret holding the PDD token
    #[serde(default)]
    pub pdd_token_secret_ref: SecretKeySelector,
}

impl SolverConfig {
    /// Decode the raw issuer config
    ///
    /// A missing block decodes to the default configuration, which then
    /// fails [`SolverConfig::validate`].
    pub fn from_json(raw: Option<&serde_json::Value>) -> Result<Self, crate::Error> {
        match raw {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                crate::Error::config(format!("error decoding solver config: {}", e))
            }),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.pdd_token_secret_ref.validate()
    }
}

/// Reference to one key of a secret in the challenge's namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeySelector {
    /// Secret name
    #[serde(default)]
    pub name: String,

    /// Key within the secret
    #[serde(default)]
    pub key: String,
}

impl SecretKeySelector {
    /// Create a new selector
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Validate the selector
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.name.is_empty() {
            return Err(crate::Error::config("pddTokenSecretRef.name cannot be empty"));
        }
        if self.key.is_empty() {
            return Err(crate::Error::config("pddTokenSecretRef.key cannot be empty"));
        }
        Ok(())
    }
}

/// Solver-wide reconciliation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSettings {
    /// TTL for created and updated TXT records (seconds)
    #[serde(default = "default_record_ttl")]
    pub ttl: u32,
}

impl ReconcileSettings {
    /// Set the record TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.ttl == 0 {
            return Err(crate::Error::config("record TTL must be > 0"));
        }
        Ok(())
    }
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            ttl: default_record_ttl(),
        }
    }
}

fn default_record_ttl() -> u32 {
    DEFAULT_RECORD_TTL
}
