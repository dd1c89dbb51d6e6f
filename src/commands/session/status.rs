use anyhow::Result;
use colored::Colorize;
use log::info;

use crate::commands::{Workspace, print_status};

/// Show every project with cached editing state
pub async fn status_command(workspace: &Workspace) -> Result<()> {
    info!("Showing session status");

    let statuses = workspace.controller.statuses();
    if statuses.is_empty() {
        println!("No projects open in this session.");
        return Ok(());
    }

    println!("{}", "Session:".bold());
    for status in &statuses {
        print_status(status);
    }

    let unsaved = statuses.iter().filter(|status| status.is_dirty).count();
    println!("\n{} open, {} unsaved", statuses.len(), unsaved);
    Ok(())
}
