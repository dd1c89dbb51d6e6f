use anyhow::Result;
use colored::Colorize;
use log::info;

use crate::commands::Workspace;

/// Write a project's draft to the document store
///
/// On failure the draft stays cached and marked unsaved.
///
/// # Returns
/// * `Ok(())` - Draft persisted
/// * `Err(anyhow::Error)` - Store unreachable, timed out or rejected the write
pub async fn save_command(workspace: &mut Workspace, project_id: String) -> Result<()> {
    info!("Saving project '{}'", project_id);

    workspace.controller.activate_project(&project_id).await?;
    if let Err(err) = workspace.controller.persist(&project_id).await {
        println!(
            "{} '{}' was not saved; changes are kept for the next attempt.",
            "Error:".red().bold(),
            project_id
        );
        return Err(err);
    }

    println!("{} '{}'", "Saved".green().bold(), project_id);
    Ok(())
}
