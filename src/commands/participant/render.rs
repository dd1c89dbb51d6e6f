use anyhow::{Context, Result};
use log::info;

use super::draw_rng;
use crate::commands::Workspace;
use crate::participant::load_runtime;

/// Materialize a project's stored survey and print the runtime JSON
///
/// # Arguments
/// * `workspace` - Controller and providers for this run
/// * `project_id` - Published project to render
/// * `seed` - Seed for the image draw; random when omitted
pub async fn render_command(workspace: &Workspace, project_id: String, seed: Option<u64>) -> Result<()> {
    info!("Rendering project '{}'", project_id);

    let mut rng = draw_rng(seed);
    let runtime = load_runtime(
        workspace.controller.store(),
        &workspace.images,
        &project_id,
        &mut rng,
    )
    .await?;

    let json = serde_json::to_string_pretty(&runtime).context("Failed to serialize survey")?;
    println!("{}", json);
    Ok(())
}
