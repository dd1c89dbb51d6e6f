pub mod page;
pub mod project;
pub mod session;

pub use page::{PageCommands, PageSubcommands};
pub use project::{ProjectCommands, ProjectSubcommands};
pub use session::{SessionCommands, SessionSubcommands};
