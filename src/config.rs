//! Engine configuration
//!
//! Process-wide settings, loadable from YAML. Per-container settings
//! (page size, sort order, membership) live in RDF config graphs instead, see
//! [`crate::container::ContainerConfig`].

use crate::container::ContainerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML syntax or shape error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Value out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// URI of the root container
    pub base_uri: String,
    /// Directory holding non-RDF resource content
    pub binary_dir: PathBuf,
    /// Page size for containers that do not configure one
    pub default_page_size: usize,
    /// Prefix for counter-minted member names
    pub default_resource_prefix: String,
    /// Upper bound on counter attempts per mint before giving up
    pub max_mint_attempts: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_uri: "http://localhost:8080/ldp/".to_string(),
            binary_dir: PathBuf::from("./samyama_ldp_data/binary"),
            default_page_size: ContainerConfig::DEFAULT_PAGE_SIZE,
            default_resource_prefix: ContainerConfig::DEFAULT_RESOURCE_PREFIX.to_string(),
            max_mint_attempts: 10_000,
        }
    }
}

impl EngineConfig {
    /// Parse a YAML document; absent keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Check ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid("default_page_size must be at least 1".into()));
        }
        if self.max_mint_attempts == 0 {
            return Err(ConfigError::Invalid("max_mint_attempts must be at least 1".into()));
        }
        if oxrdf::NamedNode::new(self.base_uri.as_str()).is_err() {
            return Err(ConfigError::Invalid(format!("base_uri is not an IRI: {}", self.base_uri)));
        }
        Ok(())
    }

    /// Container settings every container starts from
    pub fn container_defaults(&self) -> ContainerConfig {
        ContainerConfig {
            page_size: self.default_page_size,
            resource_uri_prefix: self.default_resource_prefix.clone(),
            ..ContainerConfig::default()
        }
    }
}
