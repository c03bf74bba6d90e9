// crates/conformance-config/src/config.rs
// ============================================================================
// Module: Resource Conformance Configuration
// Description: Configuration loading and validation for conformance runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: conformance-core, serde, serde_json, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, else `CONFORMANCE_CONFIG`, else
//! `conformance.toml` in the working directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use conformance_core::ResourceType;
use conformance_core::runtime::MAX_PARALLELISM;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "conformance.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CONFORMANCE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of configured resource types.
pub(crate) const MAX_RESOURCE_TYPES: usize = 512;
/// Maximum length of a resource type name.
pub(crate) const MAX_RESOURCE_TYPE_LENGTH: usize = 64;
/// Maximum request timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 600_000;
/// Maximum response size limit in bytes.
pub(crate) const MAX_RESPONSE_BYTES: usize = 256 * 1024 * 1024;
/// Maximum length of the user agent string.
pub(crate) const MAX_USER_AGENT_LENGTH: usize = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Conformance run configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConformanceConfig {
    /// Server under test.
    pub server: ServerConfig,
    /// Run execution settings.
    #[serde(default)]
    pub run: RunConfig,
    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,
    /// Resource types to register, in run order.
    #[serde(default)]
    pub resource_types: Vec<ResourceTypeConfig>,
}

impl ConformanceConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::parse(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.run.validate()?;
        if self.resource_types.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one resource_types entry is required".to_string(),
            ));
        }
        if self.resource_types.len() > MAX_RESOURCE_TYPES {
            return Err(ConfigError::Invalid("too many resource_types entries".to_string()));
        }
        let mut seen = BTreeSet::new();
        for entry in &self.resource_types {
            entry.validate()?;
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "resource type registered twice: {}",
                    entry.name
                )));
            }
        }
        if !self.resource_types.iter().any(|entry| entry.root) {
            return Err(ConfigError::Invalid(
                "at least one resource type must be a root type".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the configured resource types with their root flag.
    #[must_use]
    pub fn catalog_entries(&self) -> Vec<(ResourceType, bool)> {
        self.resource_types
            .iter()
            .map(|entry| (ResourceType::new(entry.name.as_str()), entry.root))
            .collect()
    }
}

/// Server under test.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL of the resource server.
    pub base_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum accepted response size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ServerConfig {
    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|err| ConfigError::Invalid(format!("server.base_url is invalid: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(
                "server.base_url must be an absolute http or https url".to_string(),
            ));
        }
        if url.host_str().is_none() {
            return Err(ConfigError::Invalid("server.base_url requires a host".to_string()));
        }
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "server.timeout_ms must be between 1 and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES}"
            )));
        }
        if self.user_agent.trim().is_empty() || self.user_agent.len() > MAX_USER_AGENT_LENGTH {
            return Err(ConfigError::Invalid(
                "server.user_agent must be non-empty and at most 256 bytes".to_string(),
            ));
        }
        Ok(())
    }
}

/// Run execution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Number of resource types run concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Optional wall-clock deadline for the whole run, in milliseconds.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            deadline_ms: None,
        }
    }
}

impl RunConfig {
    /// Validates run settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism == 0 || self.parallelism > MAX_PARALLELISM {
            return Err(ConfigError::Invalid(format!(
                "run.parallelism must be between 1 and {MAX_PARALLELISM}"
            )));
        }
        if self.deadline_ms == Some(0) {
            return Err(ConfigError::Invalid("run.deadline_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Machine-readable JSON report.
    #[default]
    Json,
    /// Human-readable Markdown tables.
    Markdown,
}

/// Report output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Report format.
    #[serde(default)]
    pub format: ReportFormat,
    /// Report destination; standard output when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// One resource type entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceTypeConfig {
    /// Resource type name, used as the endpoint path segment.
    pub name: String,
    /// True when the type has its own endpoint and is tested.
    #[serde(default = "default_root")]
    pub root: bool,
    /// Optional JSON object used as the default payload.
    #[serde(default)]
    pub template: Option<Value>,
}

impl ResourceTypeConfig {
    /// Validates one entry.
    fn validate(&self) -> Result<(), ConfigError> {
        let name = self.name.as_str();
        if name.is_empty() || name.len() > MAX_RESOURCE_TYPE_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "resource type name must be 1..={MAX_RESOURCE_TYPE_LENGTH} bytes"
            )));
        }
        if !name.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(ConfigError::Invalid(format!(
                "resource type name must be ascii alphanumeric: {name}"
            )));
        }
        if let Some(template) = &self.template
            && !template.is_object()
        {
            return Err(ConfigError::Invalid(format!(
                "template for {name} must be a table"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    30_000
}

/// Default response size limit.
const fn default_max_response_bytes() -> usize {
    8 * 1024 * 1024
}

/// Default user agent.
fn default_user_agent() -> String {
    format!("resource-conformance/{}", env!("CARGO_PKG_VERSION"))
}

/// Default run parallelism.
const fn default_parallelism() -> usize {
    1
}

/// Resource types are root types unless stated otherwise.
const fn default_root() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
