//! Generation configuration.
//!
//! A [`GenerationConfig`] can be built in code or loaded from a JSON or YAML
//! file. Keys are camelCase to match the document sections they feed:
//!
//! ```yaml
//! inputs: [src/handlers]
//! info:
//!   title: User API
//!   version: 1.0.0
//! basePath: /api/v1
//! servers:
//!   - url: https://api.example.com
//! options:
//!   hoistSchemas: true
//! ```

use crate::error::{Error, Result};
use crate::openapi_builder::{ExternalDocs, Info, SecurityRequirement, Server, Tag};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything the assembler needs besides the handlers themselves
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Files or directories scanned for annotated handlers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<PathBuf>,
    /// Document info section
    #[serde(default)]
    pub info: Info,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,
    /// Prefix prepended to every generated path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Document-wide security requirements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Document-level tag definitions, emitted before handler tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(default)]
    pub options: BehaviorOptions,
}

/// Switches that change how the document is assembled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorOptions {
    /// Move named schemas with known fields into `components.schemas`
    #[serde(default)]
    pub hoist_schemas: bool,
    /// Emit `components.securitySchemes` from handler security metadata
    #[serde(default)]
    pub emit_security_schemes: bool,
    /// Run the validator after assembly and treat issues as errors
    #[serde(default)]
    pub strict: bool,
}

impl GenerationConfig {
    /// Create a config with the given title and version
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: Info::new(title, version),
            ..Default::default()
        }
    }

    /// Load a config file; `.json` is read as JSON, anything else as YAML
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading generation config from {}", path.display());
        let content = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| Error::ConfigError {
            file: path.to_path_buf(),
            message,
        })
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn with_server(mut self, server: Server) -> Self {
        self.servers.get_or_insert_with(Vec::new).push(server);
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag);
        self
    }

    pub fn with_options(mut self, options: BehaviorOptions) -> Self {
        self.options = options;
        self
    }
}
