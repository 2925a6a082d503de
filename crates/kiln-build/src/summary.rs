//! Resolved view of a project, used by `kiln info` and `kiln list`

use crate::error::BuildResult;
use crate::planner::ArtifactPlanner;
use crate::project::ProjectKind;
use crate::registry::ProjectRegistry;
use crate::resolver::DependencyResolver;
use serde::Serialize;
use std::path::PathBuf;

/// A project with its dependency closures and link inputs resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub kind: ProjectKind,
    pub root: PathBuf,
    pub output: Option<PathBuf>,
    pub strict: bool,
    pub link_deps: Vec<String>,
    pub include_deps: Vec<String>,
    pub link_closure: Vec<String>,
    pub include_closure: Vec<String>,
    pub include_paths: Vec<PathBuf>,
    pub libraries: Vec<PathBuf>,
}

impl ProjectSummary {
    /// Resolve `id` against `registry`
    ///
    /// Fails with the same errors a build would report during dependency
    /// resolution.
    pub fn describe(registry: &ProjectRegistry, id: &str) -> BuildResult<Self> {
        let project = registry.require(id)?;
        let resolver = DependencyResolver::new(registry);
        let planner = ArtifactPlanner::new(registry);

        Ok(Self {
            id: project.id.clone(),
            kind: project.kind,
            root: project.paths.root.clone(),
            output: project.output_path(),
            strict: project.strict,
            link_deps: project.link_deps.clone(),
            include_deps: project.include_deps.clone(),
            link_closure: resolver.link_closure(id)?,
            include_closure: resolver.include_closure(id)?,
            include_paths: planner.include_paths(project)?,
            libraries: planner.link_libraries(project)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use crate::project::Project;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_describe_application() {
        let registry = ProjectRegistry::new()
            .with_project(
                Project::new("app", ProjectKind::Application, "/ws/app")
                    .with_link_deps(["libc"])
                    .with_include_deps(["libgfx"]),
            )
            .and_then(|r| r.with_project(Project::new("libc", ProjectKind::Library, "/ws/libc")))
            .and_then(|r| {
                r.with_project(Project::new("libgfx", ProjectKind::Library, "/ws/libgfx"))
            })
            .unwrap();

        let summary = ProjectSummary::describe(&registry, "app").unwrap();

        assert_eq!(summary.link_closure, vec!["libc"]);
        assert_eq!(summary.include_closure, vec!["libc", "libgfx"]);
        assert_eq!(summary.libraries, vec![PathBuf::from("/ws/libc/bin/libc.lib")]);
        assert_eq!(summary.output, Some(PathBuf::from("/ws/app/bin/app.app")));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["kind"], "app");
    }

    #[test]
    fn test_describe_reports_cycle() {
        let registry = ProjectRegistry::new()
            .with_project(Project::new("a", ProjectKind::Library, "/ws/a").with_link_deps(["b"]))
            .and_then(|r| {
                r.with_project(Project::new("b", ProjectKind::Library, "/ws/b").with_link_deps(["a"]))
            })
            .unwrap();

        assert!(matches!(
            ProjectSummary::describe(&registry, "a"),
            Err(BuildError::CyclicDependency { .. })
        ));
    }
}
