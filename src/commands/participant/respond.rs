use anyhow::{Context, Result};
use colored::Colorize;
use log::{info, warn};
use serde_json::{Map, Value};
use std::path::PathBuf;

use super::draw_rng;
use crate::commands::Workspace;
use crate::participant::{ResponseRecord, load_runtime, submit_response};

/// Render a project for one participant and submit their answers
///
/// # Arguments
/// * `workspace` - Controller and providers for this run
/// * `project_id` - Published project
/// * `answers` - JSON object of answers keyed by question name
/// * `participant` - Participant id; generated when omitted
///
/// # Returns
/// * `Ok(())` - Response stored; its key is printed
/// * `Err(anyhow::Error)` - Unreadable answers, load failure or store failure
pub async fn respond_command(
    workspace: &Workspace,
    project_id: String,
    answers: PathBuf,
    participant: Option<String>,
) -> Result<()> {
    info!("Submitting response for project '{}'", project_id);

    let content = std::fs::read_to_string(&answers)
        .with_context(|| format!("Failed to read answers: {:?}", answers))?;
    let responses: Map<String, Value> = serde_json::from_str(&content)
        .with_context(|| format!("Answers must be a JSON object: {:?}", answers))?;

    let mut rng = draw_rng(None);
    let runtime = load_runtime(
        workspace.controller.store(),
        &workspace.images,
        &project_id,
        &mut rng,
    )
    .await?;

    let record = ResponseRecord::new(&project_id, &runtime, responses, participant);
    let unknown = record.unknown_answers(&runtime);
    if !unknown.is_empty() {
        warn!("Answers for unknown questions: {}", unknown.join(", "));
        println!("{} answers for unknown questions: {}", "Warning:".yellow(), unknown.join(", "));
    }

    let key = submit_response(workspace.controller.store(), &record).await?;
    println!("{} {}", "Stored response".green().bold(), key);
    Ok(())
}
