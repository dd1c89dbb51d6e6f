use anyhow::Result;
use colored::Colorize;
use log::info;

use crate::commands::{Workspace, print_activation};

/// Create a project with the default survey and open it
///
/// # Arguments
/// * `workspace` - Controller and providers for this run
/// * `name` - Human-readable project name
///
/// # Returns
/// * `Ok(())` - Project written to the store and activated
/// * `Err(anyhow::Error)` - Empty name or store failure
pub async fn create_command(workspace: &mut Workspace, name: String) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Project name cannot be empty");
    }
    info!("Creating project '{}'", name);

    let activation = workspace.controller.create_project(&name).await?;
    println!("{} {}", "Created".green().bold(), activation.project.id);
    print_activation(&activation);
    Ok(())
}
