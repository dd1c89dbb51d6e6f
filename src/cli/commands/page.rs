use clap::{Args, Subcommand};

#[derive(Args)]
pub struct PageCommands {
    #[command(subcommand)]
    pub command: PageSubcommands,
}

#[derive(Subcommand)]
pub enum PageSubcommands {
    /// Duplicate a page, suffixing the copy's page and question names
    Duplicate {
        /// Project id
        project_id: String,
        /// Zero-based page index
        index: usize,
    },
}
