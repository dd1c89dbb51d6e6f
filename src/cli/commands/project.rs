use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ProjectCommands {
    #[command(subcommand)]
    pub command: ProjectSubcommands,
}

#[derive(Subcommand)]
pub enum ProjectSubcommands {
    /// List every project in the document store
    List,
    /// Create a project with the default survey and open it
    Create {
        /// Human-readable project name
        name: String,
    },
    /// Delete a project from the store and forget its session state
    Delete {
        /// Project id
        project_id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}
