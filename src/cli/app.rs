use super::commands::page::PageCommands;
use super::commands::project::ProjectCommands;
use super::commands::session::SessionCommands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "survey-studio")]
#[command(about = "Author image-based surveys and render them for participants")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project management in the document store
    Project(ProjectCommands),
    /// Open a project for editing, resuming cached edits when present
    Open {
        /// Project id
        project_id: String,
    },
    /// Replace a project's draft with a survey document from a JSON file
    Edit {
        /// Project id
        project_id: String,
        /// Path to the survey document JSON
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Switch the authoring step of a project
    Tab {
        /// Project id
        project_id: String,
        /// Step index (0-3)
        index: usize,
    },
    /// Write a project's draft to the document store
    Save {
        /// Project id
        project_id: String,
    },
    /// Show every project with editing state in this session
    Status,
    /// Session state management
    Session(SessionCommands),
    /// Apply a theme preset to a project's draft
    Theme {
        /// Project id
        project_id: String,
        /// Preset name (research, professional, nature, warm, default)
        preset: String,
    },
    /// Page editing in a project's draft
    Page(PageCommands),
    /// Materialize a project's stored survey and print it as JSON
    Render {
        /// Project id
        project_id: String,
        /// Seed for the image draw
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Render a project and submit answers as one participant
    Respond {
        /// Project id
        project_id: String,
        /// Path to a JSON object of answers keyed by question name
        #[arg(short, long)]
        answers: PathBuf,
        /// Participant id (generated when omitted)
        #[arg(short, long)]
        participant: Option<String>,
    },
}
