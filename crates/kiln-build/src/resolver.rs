//! Transitive dependency closures over the project registry
//!
//! Two relations are resolved independently:
//! - the *link closure* follows `libs` only and is ordered dependencies
//!   first (post-order), which is the order archives must be built in;
//! - the *include closure* follows `libs` and `includes` and records ids
//!   in first-visit order (pre-order). It only feeds header search paths.
//!
//! Neither closure contains the root project. Both can be seeded with an
//! externally owned `found` list; ids already in it are not traversed again.

use crate::error::{BuildError, BuildResult};
use crate::project::Project;
use crate::registry::ProjectRegistry;

/// Computes dependency closures for projects of a registry
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    registry: &'a ProjectRegistry,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(registry: &'a ProjectRegistry) -> Self {
        Self { registry }
    }

    /// Link closure of `id`, dependencies before dependents
    pub fn link_closure(&self, id: &str) -> BuildResult<Vec<String>> {
        let mut found = Vec::new();
        self.extend_link_closure(id, &mut found)?;
        Ok(found)
    }

    /// Append the link closure of `id` to `found`, skipping ids already present
    ///
    /// Fails with `CyclicDependency` when an id still being visited is
    /// reached again.
    pub fn extend_link_closure(&self, id: &str, found: &mut Vec<String>) -> BuildResult<()> {
        let root = self.registry.require(id)?;
        let mut stack = vec![root.id.clone()];
        self.visit_link(root, found, &mut stack)
    }

    fn visit_link(
        &self,
        project: &Project,
        found: &mut Vec<String>,
        stack: &mut Vec<String>,
    ) -> BuildResult<()> {
        for dep_id in &project.link_deps {
            if let Some(start) = stack.iter().position(|id| id == dep_id) {
                let mut cycle = stack[start..].to_vec();
                cycle.push(dep_id.clone());
                return Err(BuildError::CyclicDependency {
                    cycle: cycle.join(" -> "),
                });
            }

            if found.contains(dep_id) {
                continue;
            }

            let dep = self.resolve(project, dep_id)?;

            stack.push(dep_id.clone());
            self.visit_link(dep, found, stack)?;
            stack.pop();

            found.push(dep_id.clone());
        }

        Ok(())
    }

    /// Include closure of `id`, in first-visit order
    pub fn include_closure(&self, id: &str) -> BuildResult<Vec<String>> {
        let mut found = Vec::new();
        self.extend_include_closure(id, &mut found)?;
        Ok(found)
    }

    /// Append the include closure of `id` to `found`, skipping ids already present
    ///
    /// Ids are recorded before descending, so cyclic include graphs terminate.
    pub fn extend_include_closure(&self, id: &str, found: &mut Vec<String>) -> BuildResult<()> {
        let root = self.registry.require(id)?;
        self.visit_include(root, &root.id, found)
    }

    fn visit_include(
        &self,
        project: &Project,
        root_id: &str,
        found: &mut Vec<String>,
    ) -> BuildResult<()> {
        for dep_id in project.link_deps.iter().chain(&project.include_deps) {
            if dep_id == root_id || found.contains(dep_id) {
                continue;
            }

            let dep = self.resolve(project, dep_id)?;
            found.push(dep_id.clone());
            self.visit_include(dep, root_id, found)?;
        }

        Ok(())
    }

    /// Look up a dependency, rejecting projects of an unknown kind
    fn resolve(&self, project: &Project, dep_id: &str) -> BuildResult<&'a Project> {
        let dep = self.registry.dependency(&project.id, dep_id)?;
        if !dep.kind.is_valid() {
            return Err(BuildError::invalid_project(
                dep_id,
                format!("unknown project type, required by '{}'", project.id),
            ));
        }
        Ok(dep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectKind;
    use pretty_assertions::assert_eq;

    fn lib(id: &str, libs: &[&str]) -> Project {
        Project::new(id, ProjectKind::Library, format!("/ws/{}", id)).with_link_deps(libs.to_vec())
    }

    fn registry(projects: Vec<Project>) -> ProjectRegistry {
        let mut registry = ProjectRegistry::new();
        for project in projects {
            registry.insert(project).unwrap();
        }
        registry
    }

    #[test]
    fn test_no_dependencies() {
        let registry = registry(vec![lib("libc", &[])]);
        let resolver = DependencyResolver::new(&registry);

        assert!(resolver.link_closure("libc").unwrap().is_empty());
        assert!(resolver.include_closure("libc").unwrap().is_empty());
    }

    #[test]
    fn test_link_closure_post_order() {
        let registry = registry(vec![
            lib("app", &["libwidget", "libc"]),
            lib("libwidget", &["libgraphic", "libc"]),
            lib("libgraphic", &["libc"]),
            lib("libc", &[]),
        ]);
        let resolver = DependencyResolver::new(&registry);

        assert_eq!(
            resolver.link_closure("app").unwrap(),
            vec!["libc", "libgraphic", "libwidget"]
        );
    }

    #[test]
    fn test_diamond_visited_once() {
        let registry = registry(vec![
            lib("a", &["b", "c"]),
            lib("b", &["d"]),
            lib("c", &["d"]),
            lib("d", &[]),
        ]);
        let resolver = DependencyResolver::new(&registry);

        assert_eq!(resolver.link_closure("a").unwrap(), vec!["d", "b", "c"]);
    }

    #[test]
    fn test_two_node_cycle() {
        let registry = registry(vec![lib("a", &["b"]), lib("b", &["a"])]);
        let resolver = DependencyResolver::new(&registry);

        match resolver.link_closure("a") {
            Err(BuildError::CyclicDependency { cycle }) => assert_eq!(cycle, "a -> b -> a"),
            other => panic!("Expected CyclicDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_below_root() {
        let registry = registry(vec![
            lib("app", &["x"]),
            lib("x", &["y"]),
            lib("y", &["z"]),
            lib("z", &["x"]),
        ]);
        let resolver = DependencyResolver::new(&registry);

        match resolver.link_closure("app") {
            Err(BuildError::CyclicDependency { cycle }) => assert_eq!(cycle, "x -> y -> z -> x"),
            other => panic!("Expected CyclicDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let registry = registry(vec![lib("a", &["a"])]);
        let resolver = DependencyResolver::new(&registry);

        assert!(matches!(
            resolver.link_closure("a"),
            Err(BuildError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_unresolved_dependency() {
        let registry = registry(vec![lib("app", &["libc"])]);
        let resolver = DependencyResolver::new(&registry);

        match resolver.link_closure("app") {
            Err(BuildError::UnresolvedDependency {
                project,
                dependency,
            }) => {
                assert_eq!(project, "app");
                assert_eq!(dependency, "libc");
            }
            other => panic!("Expected UnresolvedDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_dependency_rejected() {
        let registry = registry(vec![
            lib("app", &["weird"]),
            Project::new("weird", ProjectKind::Invalid, "/ws/weird"),
        ]);
        let resolver = DependencyResolver::new(&registry);

        assert!(matches!(
            resolver.link_closure("app"),
            Err(BuildError::InvalidProjectDefinition { .. })
        ));
        assert!(matches!(
            resolver.include_closure("app"),
            Err(BuildError::InvalidProjectDefinition { .. })
        ));
    }

    #[test]
    fn test_unknown_root() {
        let registry = registry(vec![]);
        let resolver = DependencyResolver::new(&registry);

        assert!(matches!(
            resolver.link_closure("ghost"),
            Err(BuildError::ProjectNotFound { .. })
        ));
    }

    #[test]
    fn test_include_closure_pre_order_through_links() {
        let registry = registry(vec![
            lib("app", &["libwidget"]).with_include_deps(["libsettings"]),
            lib("libwidget", &["libc"]).with_include_deps(["libmath"]),
            lib("libc", &[]),
            lib("libmath", &[]),
            lib("libsettings", &[]),
        ]);
        let resolver = DependencyResolver::new(&registry);

        assert_eq!(
            resolver.include_closure("app").unwrap(),
            vec!["libwidget", "libc", "libmath", "libsettings"]
        );
    }

    #[test]
    fn test_include_cycle_terminates_without_root() {
        let registry = registry(vec![
            lib("a", &[]).with_include_deps(["b"]),
            lib("b", &[]).with_include_deps(["a", "c"]),
            lib("c", &[]).with_include_deps(["b"]),
        ]);
        let resolver = DependencyResolver::new(&registry);

        assert_eq!(resolver.include_closure("a").unwrap(), vec!["b", "c"]);
    }

    #[test]
    fn test_include_deps_not_in_link_closure() {
        let registry = registry(vec![
            lib("app", &["libc"]).with_include_deps(["libheaders"]),
            lib("libc", &[]),
            lib("libheaders", &[]),
        ]);
        let resolver = DependencyResolver::new(&registry);

        assert_eq!(resolver.link_closure("app").unwrap(), vec!["libc"]);
    }

    #[test]
    fn test_seeded_link_closure_skips_known_ids() {
        let registry = registry(vec![
            lib("app", &["libwidget", "libc"]),
            lib("libwidget", &["libc"]),
            lib("libc", &[]),
        ]);
        let resolver = DependencyResolver::new(&registry);

        let mut found = vec!["libc".to_string()];
        resolver.extend_link_closure("app", &mut found).unwrap();

        assert_eq!(found, vec!["libc", "libwidget"]);
    }

    #[test]
    fn test_seeded_include_closure_skips_known_ids() {
        let registry = registry(vec![
            lib("app", &["libwidget"]),
            lib("libwidget", &["libc"]),
            lib("libc", &[]),
        ]);
        let resolver = DependencyResolver::new(&registry);

        let mut found = vec!["libwidget".to_string()];
        resolver.extend_include_closure("app", &mut found).unwrap();

        // libwidget was already known, so its own dependencies are not revisited
        assert_eq!(found, vec!["libwidget"]);
    }
}
