use anyhow::Result;
use log::info;

use crate::commands::Workspace;

pub async fn duplicate_page_command(
    workspace: &mut Workspace,
    project_id: String,
    index: usize,
) -> Result<()> {
    info!("Duplicating page {} of '{}'", index, project_id);

    workspace.controller.activate_project(&project_id).await?;
    let copy_index = workspace.controller.duplicate_page(&project_id, index)?;
    println!("Duplicated page {} as page {}.", index, copy_index);
    Ok(())
}
