use anyhow::Result;
use log::info;

use crate::commands::Workspace;
use crate::reconcile::LAST_TAB_INDEX;

pub async fn tab_command(workspace: &mut Workspace, project_id: String, index: usize) -> Result<()> {
    info!("Switching '{}' to step {}", project_id, index);

    workspace.controller.activate_project(&project_id).await?;
    let applied = workspace.controller.set_active_tab(&project_id, index)?;
    if applied != index {
        println!("Step {} is out of range, using {}.", index, LAST_TAB_INDEX);
    }
    println!("'{}' is on step {}.", project_id, applied);
    Ok(())
}
