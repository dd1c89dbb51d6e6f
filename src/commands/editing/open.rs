use anyhow::Result;
use log::info;

use crate::commands::{Workspace, print_activation};

/// Open a project for editing
///
/// Cached session state wins over the store, so unsaved edits from an
/// earlier run come back as they were left.
pub async fn open_command(workspace: &mut Workspace, project_id: String) -> Result<()> {
    info!("Opening project '{}'", project_id);

    let activation = workspace.controller.activate_project(&project_id).await?;
    print_activation(&activation);

    if let Some(status) = workspace.controller.status(&project_id) {
        if !status.collisions.is_empty() {
            println!("  Duplicate names: {}", status.collisions);
        }
    }
    Ok(())
}
