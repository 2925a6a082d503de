//! Loading the workspace shared by every command

use anyhow::{bail, Context, Result};
use kiln_build::{BuildConfig, CommandToolchain, ProjectRegistry};
use kiln_config::{Config, ConfigLoader};
use std::path::Path;

/// Loaded configuration and the project registry built from it
pub struct Workspace {
    pub config: Config,
    pub registry: ProjectRegistry,
}

impl Workspace {
    /// Find kiln.toml from `start`, then discover and register projects
    pub fn load(start: &Path) -> Result<Self> {
        let config = ConfigLoader::new()
            .load_from_directory(start)
            .with_context(|| format!("Failed to load configuration from {}", start.display()))?;

        if !config.has_workspace_file() {
            tracing::debug!(root = %config.root.display(), "no kiln.toml found, using defaults");
        }

        let registry = ProjectRegistry::load(&config).context("Failed to discover projects")?;
        tracing::debug!(projects = registry.len(), "workspace loaded");

        Ok(Self { config, registry })
    }

    pub fn toolchain(&self) -> CommandToolchain {
        CommandToolchain::new(self.config.workspace.toolchain.clone())
    }

    pub fn build_config(&self) -> BuildConfig {
        BuildConfig::from_config(&self.config)
    }

    /// Projects a command operates on: every project when no ids are
    /// given or `all` is set
    pub fn select(&self, ids: &[String], all: bool) -> Result<Selection> {
        if all || ids.is_empty() {
            return Ok(Selection::All);
        }

        for id in ids {
            if !self.registry.contains(id) {
                bail!("Unknown project '{}'", id);
            }
        }
        Ok(Selection::Ids(ids.to_vec()))
    }
}

/// Projects selected on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Ids(Vec<String>),
}
