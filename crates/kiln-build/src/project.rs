//! Project entity and the project kind table

use crate::error::{BuildError, BuildResult};
use kiln_config::ProjectDefinition;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Kind of project
///
/// Serializes as the manifest name (`lib`, `app`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProjectKind {
    /// Static library, archived and linked into dependents
    #[serde(rename = "lib")]
    Library,
    /// Userspace application
    #[serde(rename = "app")]
    Application,
    /// Kernel image
    #[serde(rename = "kernel")]
    Kernel,
    /// Loadable kernel module
    #[serde(rename = "module")]
    Module,
    /// Unrecognized kind name; never buildable
    #[serde(rename = "invalid")]
    Invalid,
}

/// How the objects of a project are turned into its output artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStrategy {
    /// Archive every object into a static library
    Archive,
    /// Link objects and libraries with the application script
    Application,
    /// Link with the kernel script, then disassemble the image
    KernelImage,
    /// No strategy exists yet
    Unsupported,
}

/// Per-kind behaviour, looked up once instead of branching on the kind everywhere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindInfo {
    /// Name used in manifests and generated headers
    pub name: &'static str,
    /// Output file extension, `None` when the kind produces nothing
    pub extension: Option<&'static str>,
    pub strategy: LinkStrategy,
    pub buildable: bool,
}

const LIBRARY: KindInfo = KindInfo {
    name: "lib",
    extension: Some("lib"),
    strategy: LinkStrategy::Archive,
    buildable: true,
};

const APPLICATION: KindInfo = KindInfo {
    name: "app",
    extension: Some("app"),
    strategy: LinkStrategy::Application,
    buildable: true,
};

const KERNEL: KindInfo = KindInfo {
    name: "kernel",
    extension: Some("bin"),
    strategy: LinkStrategy::KernelImage,
    buildable: true,
};

const MODULE: KindInfo = KindInfo {
    name: "module",
    extension: Some("mod"),
    strategy: LinkStrategy::Unsupported,
    buildable: true,
};

const INVALID: KindInfo = KindInfo {
    name: "invalid",
    extension: None,
    strategy: LinkStrategy::Unsupported,
    buildable: false,
};

impl ProjectKind {
    /// Every valid kind
    pub const VALID: [ProjectKind; 4] = [
        Self::Library,
        Self::Application,
        Self::Kernel,
        Self::Module,
    ];

    /// Resolve a manifest kind name; unknown names map to `Invalid`
    pub fn from_name(name: &str) -> Self {
        Self::VALID
            .into_iter()
            .find(|kind| kind.info().name == name)
            .unwrap_or(Self::Invalid)
    }

    /// Table entry for this kind
    pub fn info(&self) -> &'static KindInfo {
        match self {
            Self::Library => &LIBRARY,
            Self::Application => &APPLICATION,
            Self::Kernel => &KERNEL,
            Self::Module => &MODULE,
            Self::Invalid => &INVALID,
        }
    }

    pub fn name(&self) -> &'static str {
        self.info().name
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

impl std::fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Fixed directory layout below a project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub sources: PathBuf,
    pub includes: PathBuf,
    pub assets: PathBuf,
    pub obj: PathBuf,
    pub bin: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            sources: root.join("sources"),
            includes: root.join("includes"),
            assets: root.join("assets"),
            obj: root.join("obj"),
            bin: root.join("bin"),
            root,
        }
    }
}

/// A buildable unit of the workspace
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub kind: ProjectKind,
    pub paths: ProjectPaths,
    /// Projects linked into this one, in declaration order
    pub link_deps: Vec<String>,
    /// Projects contributing include paths only
    pub include_deps: Vec<String>,
    /// Treat warnings as errors
    pub strict: bool,
    /// Manifest this project was read from, if any
    pub manifest_path: Option<PathBuf>,
}

impl Project {
    /// Create a project with no dependencies
    pub fn new(id: impl Into<String>, kind: ProjectKind, root: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            kind,
            paths: ProjectPaths::new(root),
            link_deps: Vec::new(),
            include_deps: Vec::new(),
            strict: true,
            manifest_path: None,
        }
    }

    /// Set link dependencies
    pub fn with_link_deps<S: Into<String>>(mut self, deps: impl IntoIterator<Item = S>) -> Self {
        self.link_deps = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set include-only dependencies
    pub fn with_include_deps<S: Into<String>>(
        mut self,
        deps: impl IntoIterator<Item = S>,
    ) -> Self {
        self.include_deps = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Build a project from a discovered manifest
    ///
    /// A missing `id` or `type` is a definition error. An unknown `type`
    /// yields an `Invalid` project, which is registered but never built.
    pub fn from_definition(definition: &ProjectDefinition) -> BuildResult<Self> {
        let manifest = &definition.manifest;
        let location = definition.manifest_path.display().to_string();

        let id = match manifest.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(BuildError::invalid_project(location, "missing 'id'")),
        };

        let kind = match manifest.kind.as_deref() {
            Some(name) => ProjectKind::from_name(name),
            None => return Err(BuildError::invalid_project(id, "missing 'type'")),
        };

        let mut project = Project::new(id, kind, &definition.root)
            .with_link_deps(manifest.libs.iter().cloned())
            .with_include_deps(manifest.includes.iter().cloned())
            .with_strict(manifest.strict());
        project.manifest_path = Some(definition.manifest_path.clone());

        Ok(project)
    }

    /// Final artifact path: `bin/<id>.<ext>`; `None` for invalid projects
    pub fn output_path(&self) -> Option<PathBuf> {
        self.kind
            .info()
            .extension
            .map(|ext| self.paths.bin.join(format!("{}.{}", self.id, ext)))
    }

    /// Companion disassembly listing of the output
    pub fn disassembly_path(&self) -> Option<PathBuf> {
        self.output_path().map(|output| {
            let mut name = output.into_os_string();
            name.push(".asm");
            PathBuf::from(name)
        })
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }
}
