//! Build command - build projects and their link dependencies

use crate::progress::ProgressObserver;
use crate::workspace::{Selection, Workspace};
use anyhow::{bail, Result};
use colored::Colorize;
use kiln_build::{BuildError, BuildOutcome, Orchestrator};
use std::collections::HashMap;
use std::error::Error as _;

/// Run the build command
pub fn run(workspace: &Workspace, selection: &Selection) -> Result<()> {
    let toolchain = workspace.toolchain();
    let observer = ProgressObserver::new();
    let mut orchestrator = Orchestrator::new(&workspace.registry, &toolchain)
        .with_config(workspace.build_config())
        .with_observer(&observer);

    let outcomes = match selection {
        Selection::All => orchestrator.build_all(),
        Selection::Ids(ids) => ids
            .iter()
            .map(|id| BuildOutcome {
                project: id.clone(),
                result: orchestrator.build(id),
            })
            .collect(),
    };

    let mut failed = 0;
    let mut stages = FailedStages::default();
    for outcome in &outcomes {
        match &outcome.result {
            Ok(()) => println!("{:>10} {}", "Built".green().bold(), outcome.project),
            Err(err) => {
                failed += 1;
                eprintln!(
                    "{:>10} {} during {}: {}",
                    "Failed".red().bold(),
                    outcome.project,
                    stages.record(&outcome.project, err),
                    error_chain(err)
                );
            }
        }
    }

    let stats = orchestrator.stats();
    println!(
        "{:>10} {} project(s), {} object(s) in {:.2}s",
        "Finished".green().bold(),
        stats.projects_built,
        stats.units_compiled,
        stats.elapsed.as_secs_f64()
    );

    if failed > 0 {
        bail!("{} project(s) failed to build", failed);
    }
    Ok(())
}

/// Failing stage per project id, consulted when an error is only
/// `PreviouslyFailed`
#[derive(Debug, Default)]
struct FailedStages {
    stages: HashMap<String, &'static str>,
}

impl FailedStages {
    /// Innermost failing stage of `err`, remembered for `project` and every
    /// dependency along its chain
    fn record(&mut self, project: &str, err: &BuildError) -> &'static str {
        let stage = self.stage_of(err);

        let mut current = err;
        while let BuildError::DependencyFailed {
            dependency, source, ..
        } = current
        {
            self.stages.entry(dependency.clone()).or_insert(stage);
            current = &**source;
        }
        self.stages.entry(project.to_string()).or_insert(stage);

        stage
    }

    fn stage_of(&self, err: &BuildError) -> &'static str {
        match err {
            BuildError::DependencyFailed { source, .. } => self.stage_of(source),
            BuildError::PreviouslyFailed { project } => self
                .stages
                .get(project)
                .copied()
                .unwrap_or("an earlier dependency failure"),
            other => other.stage(),
        }
    }
}

fn error_chain(err: &BuildError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
