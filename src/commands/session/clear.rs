use anyhow::Result;
use log::info;

use crate::commands::Workspace;
use crate::ui::confirm;

/// Forget all cached editing state
///
/// # Arguments
/// * `workspace` - Controller and providers for this run
/// * `force` - Skip confirmation prompt
pub async fn clear_command(workspace: &mut Workspace, force: bool) -> Result<()> {
    let unsaved: Vec<String> = workspace
        .controller
        .statuses()
        .into_iter()
        .filter(|status| status.is_dirty)
        .map(|status| status.project_id)
        .collect();
    info!("Clearing session ({} unsaved projects)", unsaved.len());

    if !force {
        let message = if unsaved.is_empty() {
            "Clear all session state?".to_string()
        } else {
            format!("Clear session state and discard unsaved changes to {}?", unsaved.join(", "))
        };
        if !confirm(&message, false)? {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    workspace.controller.clear_session()?;
    println!("Session cleared.");
    Ok(())
}
