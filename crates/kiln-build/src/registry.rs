//! Project registry: every project of the workspace keyed by id

use crate::error::{BuildError, BuildResult};
use crate::project::Project;
use kiln_config::{Config, ProjectDefinition};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Read-only mapping from project id to project
///
/// Ordered by id so listings and `build_all` are deterministic.
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    projects: BTreeMap<String, Project>,
}

impl ProjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from discovered manifests
    pub fn from_definitions(definitions: &[ProjectDefinition]) -> BuildResult<Self> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.insert(Project::from_definition(definition)?)?;
        }
        Ok(registry)
    }

    /// Discover and load every project of a workspace
    pub fn load(config: &Config) -> BuildResult<Self> {
        let definitions = config.discover_projects()?;
        let registry = Self::from_definitions(&definitions)?;
        tracing::debug!(
            root = %config.root.display(),
            projects = registry.len(),
            "loaded project registry"
        );
        Ok(registry)
    }

    /// Add a project; ids must be unique
    pub fn insert(&mut self, project: Project) -> BuildResult<()> {
        if let Some(existing) = self.projects.get(&project.id) {
            return Err(BuildError::DuplicateProject {
                project: project.id.clone(),
                first: manifest_or_root(existing),
                second: manifest_or_root(&project),
            });
        }
        self.projects.insert(project.id.clone(), project);
        Ok(())
    }

    /// Builder-style insert, for tests and programmatic registries
    pub fn with_project(mut self, project: Project) -> BuildResult<Self> {
        self.insert(project)?;
        Ok(self)
    }

    /// Get a project by id
    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }

    /// Get a project by id, failing when it is not registered
    pub fn require(&self, id: &str) -> BuildResult<&Project> {
        self.get(id).ok_or_else(|| BuildError::project_not_found(id))
    }

    /// Look up `dependency` on behalf of `project`
    pub fn dependency(&self, project: &str, dependency: &str) -> BuildResult<&Project> {
        self.get(dependency)
            .ok_or_else(|| BuildError::unresolved(project, dependency))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.projects.contains_key(id)
    }

    /// Iterate projects in id order
    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    /// Project ids in order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

fn manifest_or_root(project: &Project) -> PathBuf {
    project
        .manifest_path
        .clone()
        .unwrap_or_else(|| project.root().to_path_buf())
}
