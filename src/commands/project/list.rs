use anyhow::Result;
use colored::Colorize;
use log::info;

use crate::commands::Workspace;

/// List every project in the document store
///
/// Projects with editing state in this session are marked with their
/// save state.
pub async fn list_command(workspace: &Workspace) -> Result<()> {
    info!("Listing projects");

    let ids = workspace.controller.list_projects().await?;
    if ids.is_empty() {
        println!("No projects in the document store.");
        return Ok(());
    }

    println!("{}", "Projects:".bold());
    for id in &ids {
        match workspace.controller.status(id) {
            Some(status) if status.is_dirty => println!("  {} {}", id, "(unsaved)".yellow()),
            Some(_) => println!("  {} {}", id, "(open)".green()),
            None => println!("  {}", id),
        }
    }

    println!("\nTotal projects: {}", ids.len());
    Ok(())
}
