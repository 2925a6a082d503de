//! Artifact planning: compilation units, include search order and link set

use crate::codegen::ASSETS_SOURCE;
use crate::error::{BuildError, BuildResult};
use crate::project::{Project, ProjectKind};
use crate::registry::ProjectRegistry;
use crate::resolver::DependencyResolver;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of C sources
pub const C_EXTENSION: &str = "c";
/// Extension of assembly sources
pub const ASM_EXTENSION: &str = "s";
/// Suffix appended to a source name to form its object name
pub const OBJECT_SUFFIX: &str = ".o";

/// How a unit is turned into an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitLanguage {
    C,
    Assembly,
}

impl UnitLanguage {
    /// Classify a source path by extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(C_EXTENSION) => Some(Self::C),
            Some(ASM_EXTENSION) => Some(Self::Assembly),
            _ => None,
        }
    }
}

/// One source file and the object it compiles to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub source: PathBuf,
    pub object: PathBuf,
    pub language: UnitLanguage,
}

impl CompilationUnit {
    fn new(source: PathBuf, object: PathBuf, language: UnitLanguage) -> Self {
        Self {
            source,
            object,
            language,
        }
    }
}

/// Everything needed to compile and link one project
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPlan {
    pub project: String,
    pub kind: ProjectKind,
    /// Generated assets unit first, then sources in path order
    pub units: Vec<CompilationUnit>,
    pub include_paths: Vec<PathBuf>,
    /// Archives of Library projects in the link closure
    pub libraries: Vec<PathBuf>,
    pub output: PathBuf,
}

impl ArtifactPlan {
    /// Object paths of every unit, in unit order
    pub fn objects(&self) -> Vec<PathBuf> {
        self.units.iter().map(|unit| unit.object.clone()).collect()
    }
}

/// Derives artifact plans for projects of a registry
#[derive(Debug, Clone, Copy)]
pub struct ArtifactPlanner<'a> {
    registry: &'a ProjectRegistry,
    resolver: DependencyResolver<'a>,
}

impl<'a> ArtifactPlanner<'a> {
    pub fn new(registry: &'a ProjectRegistry) -> Self {
        Self {
            registry,
            resolver: DependencyResolver::new(registry),
        }
    }

    /// Plan a project, scanning its sources directory
    pub fn plan(&self, project: &Project) -> BuildResult<ArtifactPlan> {
        let output = project.output_path().ok_or_else(|| {
            BuildError::invalid_project(&project.id, "unknown project type has no output")
        })?;

        let sources = discover_sources(&project.paths.sources)?;
        let units = compilation_units(project, &sources);
        let include_paths = self.include_paths(project)?;
        let libraries = self.link_libraries(project)?;

        tracing::debug!(
            project = %project.id,
            units = units.len(),
            include_paths = include_paths.len(),
            libraries = libraries.len(),
            "planned artifact"
        );

        Ok(ArtifactPlan {
            project: project.id.clone(),
            kind: project.kind,
            units,
            include_paths,
            libraries,
            output,
        })
    }

    /// Header search order: own includes, own obj (generated headers), then
    /// link closure includes, then include closure includes
    ///
    /// Duplicate paths keep their first position.
    pub fn include_paths(&self, project: &Project) -> BuildResult<Vec<PathBuf>> {
        let mut paths = vec![project.paths.includes.clone(), project.paths.obj.clone()];

        let link_closure = self.resolver.link_closure(&project.id)?;
        let include_closure = self.resolver.include_closure(&project.id)?;

        for id in link_closure.iter().chain(&include_closure) {
            let dep = self.registry.dependency(&project.id, id)?;
            paths.push(dep.paths.includes.clone());
        }

        let mut unique = Vec::with_capacity(paths.len());
        for path in paths {
            if !unique.contains(&path) {
                unique.push(path);
            }
        }
        Ok(unique)
    }

    /// Archives to link: every Library in the link closure, closure order
    pub fn link_libraries(&self, project: &Project) -> BuildResult<Vec<PathBuf>> {
        let mut libraries = Vec::new();
        for id in self.resolver.link_closure(&project.id)? {
            let dep = self.registry.dependency(&project.id, &id)?;
            if dep.kind == ProjectKind::Library {
                libraries.extend(dep.output_path());
            }
        }
        Ok(libraries)
    }
}

/// Map sources to objects; the generated assets unit always comes first
///
/// `sources/a/b.c` becomes `obj/a/b.c.o`.
pub fn compilation_units(project: &Project, sources: &[PathBuf]) -> Vec<CompilationUnit> {
    let assets = project.paths.obj.join(ASSETS_SOURCE);
    let mut units = vec![CompilationUnit::new(
        assets.clone(),
        with_object_suffix(&assets),
        UnitLanguage::Assembly,
    )];

    for source in sources {
        let Some(language) = UnitLanguage::from_path(source) else {
            continue;
        };
        let object = match source.strip_prefix(&project.paths.sources) {
            Ok(relative) => with_object_suffix(&project.paths.obj.join(relative)),
            Err(_) => with_object_suffix(source),
        };
        units.push(CompilationUnit::new(source.clone(), object, language));
    }

    units
}

fn with_object_suffix(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(OBJECT_SUFFIX);
    PathBuf::from(name)
}

/// All `.c` and `.s` files below `dir`, sorted; empty when `dir` is missing
pub fn discover_sources(dir: &Path) -> BuildResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            BuildError::io(path, e.into())
        })?;
        if entry.file_type().is_file() && UnitLanguage::from_path(entry.path()).is_some() {
            sources.push(entry.path().to_path_buf());
        }
    }

    Ok(sources)
}
