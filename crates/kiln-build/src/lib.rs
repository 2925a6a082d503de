//! Kiln build system
//!
//! Builds a workspace of native projects (libraries, applications and a
//! kernel) described by per-project manifests:
//! - Project registry keyed by id
//! - Link and include dependency closures with cycle detection
//! - Artifact planning (objects, include search order, link set)
//! - Generated `__meta.h`, `__assets.h` and `__assets.s` per project
//! - Recursive build orchestration with per-run memoized state
//!
//! External programs are reached only through the [`Toolchain`] trait.
//!
//! # Example
//!
//! ```no_run
//! use kiln_build::{CommandToolchain, Orchestrator, ProjectRegistry};
//! use kiln_config::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::new().load_from_directory(Path::new(".")).unwrap();
//! let registry = ProjectRegistry::load(&config).unwrap();
//! let toolchain = CommandToolchain::new(config.workspace.toolchain.clone());
//!
//! let mut orchestrator = Orchestrator::new(&registry, &toolchain);
//! orchestrator.build("kernel").unwrap();
//! ```

pub mod codegen;
pub mod error;
pub mod orchestrator;
pub mod planner;
pub mod progress;
pub mod project;
pub mod registry;
pub mod resolver;
pub mod summary;
pub mod toolchain;

pub use codegen::{asset_symbol, Codegen, GeneratedFiles};
pub use error::{BuildError, BuildResult, LinkStage};
pub use orchestrator::{BuildConfig, BuildOutcome, BuildState, BuildStats, Orchestrator};
pub use planner::{ArtifactPlan, ArtifactPlanner, CompilationUnit, UnitLanguage};
pub use progress::{BuildObserver, SilentObserver};
pub use project::{KindInfo, LinkStrategy, Project, ProjectKind, ProjectPaths};
pub use registry::ProjectRegistry;
pub use resolver::DependencyResolver;
pub use summary::ProjectSummary;
pub use toolchain::{CommandToolchain, Toolchain};
