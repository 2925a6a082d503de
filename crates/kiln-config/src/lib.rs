//! Kiln Configuration System
//!
//! Provides configuration management for kiln workspaces including:
//! - Workspace configuration (kiln.toml)
//! - Per-project manifests (manifest.json)
//! - Project discovery under the configured search directories
//! - Environment variable overrides for toolchain programs
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Workspace config (./kiln.toml, found by walking up)
//! 3. Environment variables (KILN_*)
//! 4. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use kiln_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! let projects = config.discover_projects().unwrap();
//! ```

pub mod loader;
pub mod manifest;
pub mod workspace;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid JSON in {file}: {error}")]
    JsonParseError {
        file: PathBuf,
        error: serde_json::Error,
    },

    #[error("Failed to scan {path}: {error}")]
    ScanError {
        path: PathBuf,
        error: walkdir::Error,
    },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{Config, ConfigLoader, ProjectDefinition};
pub use manifest::ProjectManifest;
pub use workspace::{LinkConfig, ProjectsConfig, ToolchainConfig, WorkspaceConfig};
