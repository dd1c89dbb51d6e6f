//! Authoring schema: projects, survey documents, questions and themes

pub mod document;
pub mod editing;
pub mod project;
pub mod question;
pub mod theme;

pub use document::{DisplaySettings, DocumentError, NameCollisions, Page, SurveyDocument};
pub use project::{ImageDatasetConfig, PreloadedImage, Project, ResponseStorageConfig};
pub use question::{
    ImageBoolean, ImageChoice, ImageDisplay, ImageKind, ImageMatrix, ImagePicker, ImageRanking,
    ImageRating, ImageSource, ImageSpec, PlainQuestion, Question,
};
pub use theme::{RuntimeTheme, ThemeTokens};
