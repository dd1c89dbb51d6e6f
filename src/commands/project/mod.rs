pub mod create;
pub mod delete;
pub mod list;

pub use create::create_command;
pub use delete::delete_command;
pub use list::list_command;
