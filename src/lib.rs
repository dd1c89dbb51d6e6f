pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod images;
pub mod materialize;
pub mod participant;
pub mod reconcile;
pub mod session;
pub mod survey;
pub mod ui;
