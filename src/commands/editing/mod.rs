pub mod edit;
pub mod open;
pub mod page;
pub mod save;
pub mod tab;
pub mod theme;

pub use edit::edit_command;
pub use open::open_command;
pub use page::duplicate_page_command;
pub use save::save_command;
pub use tab::tab_command;
pub use theme::theme_command;
