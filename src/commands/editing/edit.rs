use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use std::path::PathBuf;

use crate::commands::Workspace;
use crate::survey::SurveyDocument;

/// Replace a project's draft with a survey document read from a file
///
/// # Arguments
/// * `workspace` - Controller and providers for this run
/// * `project_id` - Project to edit
/// * `file` - Survey document JSON
///
/// # Returns
/// * `Ok(())` - Draft replaced; dirty state printed
/// * `Err(anyhow::Error)` - Unreadable file, invalid document or load failure
pub async fn edit_command(workspace: &mut Workspace, project_id: String, file: PathBuf) -> Result<()> {
    info!("Editing project '{}' from {:?}", project_id, file);

    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read survey document: {:?}", file))?;
    let draft = SurveyDocument::from_json_str(&content)
        .with_context(|| format!("Invalid survey document: {:?}", file))?;

    workspace.controller.activate_project(&project_id).await?;
    let is_dirty = workspace.controller.record_edit(&project_id, draft)?;

    if is_dirty {
        println!(
            "{} draft of '{}' ({})",
            "Updated".green(),
            project_id,
            "unsaved".yellow()
        );
    } else {
        println!("Draft of '{}' matches the saved document.", project_id);
    }
    Ok(())
}
