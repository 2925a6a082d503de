//! Info command - a project with its dependency closures resolved

use crate::workspace::Workspace;
use anyhow::{Context, Result};
use colored::Colorize;
use kiln_build::ProjectSummary;
use std::path::PathBuf;

/// Run the info command
pub fn run(workspace: &Workspace, id: &str, json: bool) -> Result<()> {
    let summary = ProjectSummary::describe(&workspace.registry, id)
        .with_context(|| format!("Failed to resolve project '{}'", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} ({})", summary.id.bold(), summary.kind.name());
    println!("  root:    {}", summary.root.display());
    if let Some(output) = &summary.output {
        println!("  output:  {}", output.display());
    }
    println!("  strict:  {}", summary.strict);
    print_ids("libs", &summary.link_deps);
    print_ids("includes", &summary.include_deps);
    print_ids("link closure", &summary.link_closure);
    print_ids("include closure", &summary.include_closure);
    print_paths("include paths", &summary.include_paths);
    print_paths("libraries", &summary.libraries);

    Ok(())
}

fn print_ids(label: &str, ids: &[String]) {
    if ids.is_empty() {
        println!("  {}: {}", label, "none".dimmed());
    } else {
        println!("  {}: {}", label, ids.join(", "));
    }
}

fn print_paths(label: &str, paths: &[PathBuf]) {
    println!("  {}:", label);
    for path in paths {
        println!("    {}", path.display());
    }
}
