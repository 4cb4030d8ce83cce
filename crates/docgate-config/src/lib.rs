//! Configuration management for docgate
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (DOCGATE_* prefix, highest precedence)
//! 2. docgate.local.toml (gitignored, local overrides)
//! 3. docgate.toml (git-tracked, project config)
//! 4. ~/.config/docgate/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Namespace given to principals when none is configured.
pub const DEFAULT_NAMESPACE: &str = "Default";

/// Main docgate configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocgateConfig {
    pub authz: AuthzConfig,
}

/// Settings for building ACLs and logging authorization decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// Namespace assigned to principals created by connectors.
    pub namespace: String,
    /// Case sensitivity of ACLs created by connectors.
    pub case_sensitivity: CaseSensitivity,
    /// Whether decisions are written to the audit log.
    pub audit: bool,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            case_sensitivity: CaseSensitivity::EverythingCaseSensitive,
            audit: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CaseSensitivity {
    EverythingCaseSensitive,
    EverythingCaseInsensitive,
}

impl CaseSensitivity {
    pub fn is_case_sensitive(self) -> bool {
        self == CaseSensitivity::EverythingCaseSensitive
    }
}

impl DocgateConfig {
    /// Read a single TOML file without layering
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DocgateConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML, e.g. for `docgate.toml` scaffolding
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.authz.namespace.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "authz.namespace cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
