use clap::{Args, Subcommand};

#[derive(Args)]
pub struct SessionCommands {
    #[command(subcommand)]
    pub command: SessionSubcommands,
}

#[derive(Subcommand)]
pub enum SessionSubcommands {
    /// Forget all cached editing state, including unsaved drafts
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}
