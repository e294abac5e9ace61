//! The cluster configuration document.
//!
//! ```yaml
//! cluster:
//!   name: packet
//!   config: { ... }
//! backend:
//!   name: s3
//!   config: { ... }
//! network:
//!   config: { ... }
//! flatcar:
//!   config: { ... }
//! components:
//!   - name: contour
//!     config: { ... }
//! ```
//!
//! Section bodies are kept as raw YAML; each extension decodes its own.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{LokoError, Result};

/// One `{ name, config }` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    pub name: Option<String>,
    #[serde(default)]
    pub config: serde_yaml::Value,
}

impl SectionConfig {
    pub fn named(name: &str, config: serde_yaml::Value) -> Self {
        Self {
            name: Some(name.to_string()),
            config,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClusterDocument {
    pub cluster: Option<SectionConfig>,
    pub backend: Option<SectionConfig>,
    pub network: Option<SectionConfig>,
    pub flatcar: Option<SectionConfig>,
    #[serde(default)]
    pub components: Vec<SectionConfig>,
}

impl ClusterDocument {
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| LokoError::decode("configuration document", &e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::parse(&content)
    }
}
