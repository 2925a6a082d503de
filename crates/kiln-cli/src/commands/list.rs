//! List command - every discovered project with its kind and output

use crate::workspace::Workspace;
use anyhow::Result;
use colored::Colorize;
use serde_json::json;

/// Run the list command
pub fn run(workspace: &Workspace, json: bool) -> Result<()> {
    let registry = &workspace.registry;

    if json {
        let projects: Vec<_> = registry
            .iter()
            .map(|project| {
                json!({
                    "id": project.id,
                    "kind": project.kind,
                    "root": project.paths.root,
                    "output": project.output_path(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if registry.is_empty() {
        println!("No projects found under {}", workspace.config.root.display());
        return Ok(());
    }

    let width = registry.ids().map(str::len).max().unwrap_or(0);
    for project in registry.iter() {
        let id = format!("{:<width$}", project.id, width = width);
        let kind = format!("{:<6}", project.kind.name());
        let kind = if project.kind.is_valid() {
            kind.normal()
        } else {
            kind.red()
        };
        let output = project
            .output_path()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "-".to_string());

        println!("{}  {}  {}", id.bold(), kind, output.dimmed());
    }

    Ok(())
}
