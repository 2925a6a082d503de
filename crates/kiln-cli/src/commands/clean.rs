//! Clean command - remove build outputs

use crate::workspace::{Selection, Workspace};
use anyhow::{Context, Result};
use colored::Colorize;
use kiln_build::Orchestrator;

/// Run the clean command
pub fn run(workspace: &Workspace, selection: &Selection) -> Result<()> {
    let toolchain = workspace.toolchain();
    let mut orchestrator = Orchestrator::new(&workspace.registry, &toolchain);

    let count = match selection {
        Selection::All => {
            orchestrator
                .clean_all()
                .context("Failed to clean build artifacts")?;
            workspace.registry.len()
        }
        Selection::Ids(ids) => {
            for id in ids {
                orchestrator
                    .clean(id)
                    .with_context(|| format!("Failed to clean '{}'", id))?;
            }
            ids.len()
        }
    };

    println!("{:>10} {} project(s)", "Cleaned".green().bold(), count);
    Ok(())
}
