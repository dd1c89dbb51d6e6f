use anyhow::Result;
use log::info;

use crate::commands::Workspace;

/// Apply a named theme preset to a project's draft
pub async fn theme_command(workspace: &mut Workspace, project_id: String, preset: String) -> Result<()> {
    info!("Applying theme '{}' to '{}'", preset, project_id);

    workspace.controller.activate_project(&project_id).await?;
    workspace.controller.apply_theme_preset(&project_id, &preset)?;
    println!("Applied theme '{}' to '{}'.", preset, project_id);
    Ok(())
}
