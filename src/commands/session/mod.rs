pub mod clear;
pub mod status;

pub use clear::clear_command;
pub use status::status_command;
