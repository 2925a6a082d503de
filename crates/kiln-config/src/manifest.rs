//! Project Manifest (manifest.json)
//!
//! Each buildable project carries a `manifest.json` at its root. The manifest
//! is deliberately loose: `id` and `type` are optional at this layer so that
//! a malformed project can be reported by the build layer with its path,
//! instead of aborting discovery of the whole workspace.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw project definition as written in `manifest.json`
///
/// Unknown keys are ignored so manifests may carry extra metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjectManifest {
    /// Project identifier, unique across the workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Project kind name: "lib", "app", "kernel" or "module"
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Projects this one links against
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libs: Vec<String>,

    /// Projects contributing header search paths only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,

    /// Treat compiler warnings as errors (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl ProjectManifest {
    /// Load a manifest from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::JsonParseError {
            file: path.to_path_buf(),
            error: e,
        })
    }

    /// Effective strict flag
    pub fn strict(&self) -> bool {
        self.strict.unwrap_or(true)
    }
}
