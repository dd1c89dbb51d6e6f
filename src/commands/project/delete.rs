use anyhow::Result;
use colored::Colorize;
use log::info;

use crate::commands::Workspace;
use crate::ui::confirm;

/// Delete a project from the store and forget its session state
///
/// # Arguments
/// * `workspace` - Controller and providers for this run
/// * `project_id` - Project to delete
/// * `force` - Skip confirmation prompt
///
/// # Returns
/// * `Ok(())` - Project deleted or user cancelled
/// * `Err(anyhow::Error)` - Store failure
pub async fn delete_command(workspace: &mut Workspace, project_id: String, force: bool) -> Result<()> {
    info!("Deleting project '{}'", project_id);

    if !force {
        let unsaved = workspace
            .controller
            .status(&project_id)
            .is_some_and(|status| status.is_dirty);
        let message = if unsaved {
            format!("Delete project '{}' and discard its unsaved changes?", project_id)
        } else {
            format!("Delete project '{}'?", project_id)
        };
        if !confirm(&message, false)? {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    workspace.controller.delete_project(&project_id).await?;
    println!("{} {}", "Deleted".red().bold(), project_id);
    Ok(())
}
