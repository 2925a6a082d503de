/// Build system error types
use std::path::PathBuf;
use thiserror::Error;

use crate::project::ProjectKind;

pub type BuildResult<T> = Result<T, BuildError>;

/// Link step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStage {
    Archive,
    Link,
    Disassemble,
}

impl std::fmt::Display for LinkStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Archive => write!(f, "archive"),
            Self::Link => write!(f, "link"),
            Self::Disassemble => write!(f, "disassemble"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid project definition '{project}': {reason}")]
    InvalidProjectDefinition { project: String, reason: String },

    #[error("Project '{project}' is defined twice: {first} and {second}")]
    DuplicateProject {
        project: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Project not found: {project}")]
    ProjectNotFound { project: String },

    #[error("Project '{project}' depends on unknown project '{dependency}'")]
    UnresolvedDependency { project: String, dependency: String },

    #[error("Circular dependency detected: {cycle}")]
    CyclicDependency { cycle: String },

    #[error("Project '{project}' cannot be built: dependency '{dependency}' failed")]
    DependencyFailed {
        project: String,
        dependency: String,
        #[source]
        source: Box<BuildError>,
    },

    #[error("Project '{project}' already failed during this run")]
    PreviouslyFailed { project: String },

    #[error("Compilation failed for '{project}' at {unit} ({attempted} of {total} units attempted)")]
    CompileFailure {
        project: String,
        unit: PathBuf,
        attempted: usize,
        total: usize,
        #[source]
        source: Box<BuildError>,
    },

    #[error("Linking failed for '{project}' during {stage}")]
    LinkFailure {
        project: String,
        stage: LinkStage,
        #[source]
        source: Box<BuildError>,
    },

    #[error("Project '{project}' has kind '{kind}', which cannot be linked yet")]
    UnsupportedProjectKind { project: String, kind: ProjectKind },

    #[error("{tool} exited with {}: {stderr}", exit_status(*.status))]
    ToolFailed {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Failed to run {tool}: {error}")]
    ToolSpawn {
        tool: String,
        error: std::io::Error,
    },

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] kiln_config::ConfigError),
}

fn exit_status(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create an invalid project definition error
    pub fn invalid_project(project: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidProjectDefinition {
            project: project.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an unresolved dependency error
    pub fn unresolved(project: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::UnresolvedDependency {
            project: project.into(),
            dependency: dependency.into(),
        }
    }

    /// Create a project not found error
    pub fn project_not_found(project: impl Into<String>) -> Self {
        Self::ProjectNotFound {
            project: project.into(),
        }
    }

    /// Short name of the stage this error belongs to, for user-facing reports
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidProjectDefinition { .. }
            | Self::DuplicateProject { .. }
            | Self::Config(_) => "configuration",
            Self::ProjectNotFound { .. }
            | Self::UnresolvedDependency { .. }
            | Self::CyclicDependency { .. } => "dependency resolution",
            Self::DependencyFailed { .. } | Self::PreviouslyFailed { .. } => "dependencies",
            Self::CompileFailure { .. } => "compile",
            Self::LinkFailure { .. } | Self::UnsupportedProjectKind { .. } => "link",
            Self::ToolFailed { .. } | Self::ToolSpawn { .. } => "toolchain",
            Self::IoError { .. } | Self::Io(_) => "filesystem",
        }
    }
}
