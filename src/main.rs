use anyhow::Result;
use clap::Parser;
use log::info;

use survey_studio::cli::commands::{PageSubcommands, ProjectSubcommands, SessionSubcommands};
use survey_studio::cli::{Cli, Commands};
use survey_studio::commands::{Workspace, editing, participant, project, session};
use survey_studio::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("survey-studio.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    info!("Starting survey-studio");

    let mut config = Config::load()?;
    config.apply_env_overrides();
    let mut workspace = Workspace::open(&config)?;

    match cli.command {
        Commands::Project(project_cmd) => match project_cmd.command {
            ProjectSubcommands::List => project::list_command(&workspace).await,
            ProjectSubcommands::Create { name } => {
                project::create_command(&mut workspace, name).await
            }
            ProjectSubcommands::Delete { project_id, force } => {
                project::delete_command(&mut workspace, project_id, force).await
            }
        },
        Commands::Open { project_id } => editing::open_command(&mut workspace, project_id).await,
        Commands::Edit { project_id, file } => {
            editing::edit_command(&mut workspace, project_id, file).await
        }
        Commands::Tab { project_id, index } => {
            editing::tab_command(&mut workspace, project_id, index).await
        }
        Commands::Save { project_id } => editing::save_command(&mut workspace, project_id).await,
        Commands::Status => session::status_command(&workspace).await,
        Commands::Session(session_cmd) => match session_cmd.command {
            SessionSubcommands::Clear { force } => {
                session::clear_command(&mut workspace, force).await
            }
        },
        Commands::Theme { project_id, preset } => {
            editing::theme_command(&mut workspace, project_id, preset).await
        }
        Commands::Page(page_cmd) => match page_cmd.command {
            PageSubcommands::Duplicate { project_id, index } => {
                editing::duplicate_page_command(&mut workspace, project_id, index).await
            }
        },
        Commands::Render { project_id, seed } => {
            participant::render_command(&workspace, project_id, seed).await
        }
        Commands::Respond {
            project_id,
            answers,
            participant: participant_id,
        } => participant::respond_command(&workspace, project_id, answers, participant_id).await,
    }
}
