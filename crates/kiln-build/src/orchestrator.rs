//! Build orchestration across the project graph
//!
//! `build(id)` is a depth-first state machine over link dependencies. Each
//! project moves from `NotBuilt` to `Built` or `Failed` at most once per
//! run; the state map lives here, not on the projects, so the registry
//! stays read-only.
//!
//! A project is marked `Built` before its dependencies and objects are
//! compiled. That marker is what stops a shared dependency from being
//! entered twice; a later failure overwrites it with `Failed`. Cycles never
//! reach the recursion because the link closure is validated first. The
//! include closure is validated at the same point, so an unknown include
//! fails the project before any dependency is built.
//!
//! Partially written objects and binaries are left on disk when a step
//! fails. `clean` removes them.

use crate::codegen::Codegen;
use crate::error::{BuildError, BuildResult, LinkStage};
use crate::planner::{ArtifactPlan, ArtifactPlanner, CompilationUnit, UnitLanguage};
use crate::progress::{BuildObserver, SilentObserver};
use crate::project::{LinkStrategy, Project};
use crate::registry::ProjectRegistry;
use crate::resolver::DependencyResolver;
use crate::toolchain::Toolchain;
use kiln_config::Config;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

static SILENT: SilentObserver = SilentObserver;

/// Build state of one project within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildState {
    #[default]
    NotBuilt,
    Built,
    Failed,
}

/// Link scripts used by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Script for Application projects
    pub application_script: PathBuf,
    /// Script for the Kernel project
    pub kernel_script: PathBuf,
}

impl BuildConfig {
    /// Resolve link scripts against the workspace root
    pub fn from_config(config: &Config) -> Self {
        Self {
            application_script: config.application_script(),
            kernel_script: config.kernel_script(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            application_script: PathBuf::from("common/userspace.ld"),
            kernel_script: PathBuf::from("common/kernel.ld"),
        }
    }
}

/// Run statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildStats {
    /// Projects that finished successfully
    pub projects_built: usize,
    /// Projects that ended in the Failed state
    pub projects_failed: usize,
    /// Units compiled or assembled successfully
    pub units_compiled: usize,
    /// Time since the orchestrator was created
    pub elapsed: Duration,
}

/// Result of building one project in `build_all`
#[derive(Debug)]
pub struct BuildOutcome {
    pub project: String,
    pub result: BuildResult<()>,
}

/// Drives builds of projects in a registry
pub struct Orchestrator<'a> {
    registry: &'a ProjectRegistry,
    toolchain: &'a dyn Toolchain,
    observer: &'a dyn BuildObserver,
    config: BuildConfig,
    codegen: Codegen,
    states: HashMap<String, BuildState>,
    stats: BuildStats,
    started: Instant,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a ProjectRegistry, toolchain: &'a dyn Toolchain) -> Self {
        Self {
            registry,
            toolchain,
            observer: &SILENT,
            config: BuildConfig::default(),
            codegen: Codegen::new(),
            states: HashMap::new(),
            stats: BuildStats::default(),
            started: Instant::now(),
        }
    }

    /// Set link scripts
    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the progress observer
    pub fn with_observer(mut self, observer: &'a dyn BuildObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Set the code generator (e.g. with a fixed build date)
    pub fn with_codegen(mut self, codegen: Codegen) -> Self {
        self.codegen = codegen;
        self
    }

    /// Current state of a project; never-entered projects are `NotBuilt`
    pub fn state(&self, id: &str) -> BuildState {
        self.states.get(id).copied().unwrap_or_default()
    }

    pub fn stats(&self) -> BuildStats {
        BuildStats {
            elapsed: self.started.elapsed(),
            ..self.stats
        }
    }

    /// Build a project and, first, its link dependencies
    pub fn build(&mut self, id: &str) -> BuildResult<()> {
        let registry = self.registry;
        let project = registry.require(id)?;

        self.toolchain.make_directory(&project.paths.obj)?;
        self.toolchain.make_directory(&project.paths.bin)?;

        match self.state(id) {
            BuildState::Built => return Ok(()),
            BuildState::Failed => {
                return Err(BuildError::PreviouslyFailed {
                    project: id.to_string(),
                })
            }
            BuildState::NotBuilt => {}
        }

        match self.run(project) {
            Ok(()) => {
                self.stats.projects_built += 1;
                self.observer.project_finished(id, true);
                tracing::info!(project = id, "built");
                Ok(())
            }
            Err(err) => {
                self.states.insert(id.to_string(), BuildState::Failed);
                self.stats.projects_failed += 1;
                self.observer.project_finished(id, false);
                tracing::error!(project = id, stage = err.stage(), "{}", err);
                Err(err)
            }
        }
    }

    fn run(&mut self, project: &'a Project) -> BuildResult<()> {
        if !project.kind.info().buildable {
            return Err(BuildError::invalid_project(
                &project.id,
                "unknown project type",
            ));
        }

        let resolver = DependencyResolver::new(self.registry);
        resolver.link_closure(&project.id)?;
        resolver.include_closure(&project.id)?;

        self.codegen.generate(project)?;
        self.states.insert(project.id.clone(), BuildState::Built);

        for dep in &project.link_deps {
            self.build(dep).map_err(|source| BuildError::DependencyFailed {
                project: project.id.clone(),
                dependency: dep.clone(),
                source: Box::new(source),
            })?;
        }

        let plan = ArtifactPlanner::new(self.registry).plan(project)?;
        self.compile_objects(project, &plan)?;
        self.link_output(project, &plan)
    }

    fn compile_objects(&mut self, project: &Project, plan: &ArtifactPlan) -> BuildResult<()> {
        let total = plan.units.len();
        tracing::info!(project = %project.id, units = total, "compiling");
        self.observer.project_started(&project.id, total);

        for (index, unit) in plan.units.iter().enumerate() {
            self.compile_unit(project, plan, unit)
                .map_err(|source| BuildError::CompileFailure {
                    project: project.id.clone(),
                    unit: unit.source.clone(),
                    attempted: index + 1,
                    total,
                    source: Box::new(source),
                })?;

            self.stats.units_compiled += 1;
            self.observer.unit_finished(&project.id, index + 1, total);
        }

        Ok(())
    }

    fn compile_unit(
        &self,
        project: &Project,
        plan: &ArtifactPlan,
        unit: &CompilationUnit,
    ) -> BuildResult<()> {
        if let Some(parent) = unit.object.parent() {
            self.toolchain.make_directory(parent)?;
        }

        match unit.language {
            UnitLanguage::C => self.toolchain.compile(
                &unit.source,
                &unit.object,
                &plan.include_paths,
                &[],
                project.strict,
            ),
            UnitLanguage::Assembly => self.toolchain.assemble(&unit.source, &unit.object),
        }
    }

    fn link_output(&self, project: &Project, plan: &ArtifactPlan) -> BuildResult<()> {
        let objects = plan.objects();
        let failure = |stage: LinkStage| {
            let project = project.id.clone();
            move |source: BuildError| BuildError::LinkFailure {
                project,
                stage,
                source: Box::new(source),
            }
        };

        match project.kind.info().strategy {
            LinkStrategy::Archive => self
                .toolchain
                .archive(&objects, &plan.output)
                .map_err(failure(LinkStage::Archive)),
            LinkStrategy::Application => self
                .toolchain
                .link(
                    &objects,
                    &plan.libraries,
                    &plan.output,
                    &self.config.application_script,
                )
                .map_err(failure(LinkStage::Link)),
            LinkStrategy::KernelImage => {
                self.toolchain
                    .link(
                        &objects,
                        &plan.libraries,
                        &plan.output,
                        &self.config.kernel_script,
                    )
                    .map_err(failure(LinkStage::Link))?;

                let listing = project.disassembly_path().ok_or_else(|| {
                    BuildError::invalid_project(&project.id, "kernel has no output path")
                })?;
                self.toolchain
                    .disassemble(&plan.output, &listing)
                    .map_err(failure(LinkStage::Disassemble))
            }
            LinkStrategy::Unsupported => Err(BuildError::UnsupportedProjectKind {
                project: project.id.clone(),
                kind: project.kind,
            }),
        }
    }

    /// Build every valid project in id order, continuing past failures
    pub fn build_all(&mut self) -> Vec<BuildOutcome> {
        let registry = self.registry;
        let mut outcomes = Vec::new();

        for project in registry.iter() {
            if !project.kind.is_valid() {
                tracing::warn!(project = %project.id, "skipping project with unknown type");
                continue;
            }
            outcomes.push(BuildOutcome {
                project: project.id.clone(),
                result: self.build(&project.id),
            });
        }

        outcomes
    }

    /// Remove a project's `obj/` and `bin/` trees and forget its state
    pub fn clean(&mut self, id: &str) -> BuildResult<()> {
        let project = self.registry.require(id)?;
        self.toolchain.remove_directory_tree(&project.paths.obj)?;
        self.toolchain.remove_directory_tree(&project.paths.bin)?;
        self.states.remove(id);
        tracing::info!(project = id, "cleaned");
        Ok(())
    }

    /// Clean every project
    pub fn clean_all(&mut self) -> BuildResult<()> {
        let registry = self.registry;
        for id in registry.ids() {
            self.clean(id)?;
        }
        Ok(())
    }
}
