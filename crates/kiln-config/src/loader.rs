//! Configuration Loader
//!
//! Finds the workspace root, applies environment overrides and discovers
//! project manifests.

use crate::manifest::ProjectManifest;
use crate::workspace::WorkspaceConfig;
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Name of the workspace configuration file
pub const WORKSPACE_FILE: &str = "kiln.toml";

/// Directories never scanned for manifests (build outputs)
const SKIPPED_DIRS: &[&str] = &["obj", "bin", "target"];

/// Configuration loader
///
/// Loads configuration with the following precedence:
/// 1. Built-in defaults - lowest priority
/// 2. Workspace config (kiln.toml) - overrides defaults
/// 3. Environment variables (KILN_*) - overrides workspace config
/// 4. CLI flags - highest priority (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader;

/// Merged configuration result
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace configuration
    pub workspace: WorkspaceConfig,

    /// Workspace root directory (where kiln.toml was found, or the start directory)
    pub root: PathBuf,

    /// Path of the kiln.toml that was loaded, if any
    pub config_file: Option<PathBuf>,
}

/// A manifest found on disk together with the project root it describes
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDefinition {
    /// Project root directory (the manifest's parent)
    pub root: PathBuf,
    /// Path of the manifest file
    pub manifest_path: PathBuf,
    /// Parsed manifest
    pub manifest: ProjectManifest,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find kiln.toml. When none exists the
    /// start directory becomes the workspace root and defaults apply.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (root, config_file) = match self.find_workspace_file(start_dir) {
            Some(path) => {
                let root = path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| start_dir.to_path_buf());
                (root, Some(path))
            }
            None => (start_dir.to_path_buf(), None),
        };

        let workspace = match &config_file {
            Some(path) => WorkspaceConfig::load_from_file(path)?,
            None => WorkspaceConfig::default(),
        };

        let workspace = self.apply_env_overrides(workspace)?;

        Ok(Config {
            workspace,
            root,
            config_file,
        })
    }

    /// Load configuration from a specific kiln.toml
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let workspace = WorkspaceConfig::load_from_file(config_path)?;
        let workspace = self.apply_env_overrides(workspace)?;

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ConfigError::ValidationError(format!(
                "{} has no parent directory",
                config_path.display()
            )))?;

        Ok(Config {
            workspace,
            root,
            config_file: Some(config_path.to_path_buf()),
        })
    }

    fn find_workspace_file(&self, start_dir: &Path) -> Option<PathBuf> {
        start_dir
            .ancestors()
            .map(|dir| dir.join(WORKSPACE_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Apply environment variable overrides to the toolchain programs
    ///
    /// Recognized: KILN_CC, KILN_AS, KILN_LD, KILN_AR, KILN_OBJDUMP
    fn apply_env_overrides(&self, mut config: WorkspaceConfig) -> ConfigResult<WorkspaceConfig> {
        let toolchain = &mut config.toolchain;
        let overrides: [(&str, &mut String); 5] = [
            ("KILN_CC", &mut toolchain.cc),
            ("KILN_AS", &mut toolchain.assembler),
            ("KILN_LD", &mut toolchain.ld),
            ("KILN_AR", &mut toolchain.ar),
            ("KILN_OBJDUMP", &mut toolchain.objdump),
        ];

        for (var, slot) in overrides {
            if let Ok(value) = env::var(var) {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: var.to_string(),
                        reason: "program cannot be empty".to_string(),
                    });
                }
                *slot = value;
            }
        }

        Ok(config)
    }
}

impl Config {
    /// Absolute path of the application linker script
    pub fn application_script(&self) -> PathBuf {
        self.root.join(&self.workspace.link.application_script)
    }

    /// Absolute path of the kernel linker script
    pub fn kernel_script(&self) -> PathBuf {
        self.root.join(&self.workspace.link.kernel_script)
    }

    /// Check if a kiln.toml was found
    pub fn has_workspace_file(&self) -> bool {
        self.config_file.is_some()
    }

    /// Discover every project manifest under the configured search directories
    ///
    /// Results are sorted by manifest path so registry construction and
    /// diagnostics are deterministic.
    pub fn discover_projects(&self) -> ConfigResult<Vec<ProjectDefinition>> {
        let manifest_name = self.workspace.projects.manifest.as_str();
        let mut definitions = Vec::new();

        for search in &self.workspace.projects.search {
            let dir = self.root.join(search);
            if !dir.is_dir() {
                return Err(ConfigError::NotFound(dir));
            }

            let walker = WalkDir::new(&dir)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));

            for entry in walker {
                let entry = entry.map_err(|e| ConfigError::ScanError {
                    path: dir.clone(),
                    error: e,
                })?;

                if !entry.file_type().is_file() || entry.file_name() != manifest_name {
                    continue;
                }

                let manifest_path = entry.path().to_path_buf();
                let manifest = ProjectManifest::load_from_file(&manifest_path)?;
                let root = manifest_path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| dir.clone());

                definitions.push(ProjectDefinition {
                    root,
                    manifest_path,
                    manifest,
                });
            }
        }

        definitions.sort_by(|a, b| a.manifest_path.cmp(&b.manifest_path));
        definitions.dedup_by(|a, b| a.manifest_path == b.manifest_path);
        Ok(definitions)
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}
