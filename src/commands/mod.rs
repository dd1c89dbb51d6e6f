//! Command handlers behind the CLI

pub mod editing;
pub mod participant;
pub mod project;
pub mod session;

use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;

use crate::api::HttpDocumentStore;
use crate::config::Config;
use crate::images::HttpImageProvider;
use crate::reconcile::{Activation, ProjectController, ProjectStatus};
use crate::session::{FileMirror, SessionCache};

/// Everything a command needs: the controller over the configured store,
/// backed by the on-disk session mirror, and the image provider
pub struct Workspace {
    pub controller: ProjectController<HttpDocumentStore>,
    pub images: HttpImageProvider,
}

impl Workspace {
    pub fn open(config: &Config) -> Result<Self> {
        let mirror_path = config.mirror_path(&Config::session_dir());
        debug!("Session mirror at {:?}", mirror_path);

        let store = HttpDocumentStore::new(config.store.base_url.clone(), &config.resilience())
            .context("Failed to create document store client")?;
        let cache = SessionCache::load(Box::new(FileMirror::new(mirror_path)));
        let images =
            HttpImageProvider::new(config.images.dataset_server_url.clone(), config.image_timeout())?;

        Ok(Self {
            controller: ProjectController::new(store, cache)
                .with_persist_timeout(config.persist_timeout()),
            images,
        })
    }
}

pub(crate) fn print_activation(activation: &Activation) {
    let origin = if activation.resumed {
        "resumed from session".yellow()
    } else {
        "loaded from store".green()
    };
    println!(
        "{} '{}' ({}), {}",
        "Project".bold(),
        activation.project.name,
        activation.project.id,
        origin
    );
    println!(
        "  Pages: {}  Questions: {}  Step: {}",
        activation.document.pages.len(),
        activation.document.question_count(),
        activation.active_tab_index
    );
    if activation.is_dirty {
        println!("  {}", "Unsaved changes".yellow());
    }
}

pub(crate) fn print_status(status: &ProjectStatus) {
    let marker = if status.is_active { "*" } else { " " };
    let state = if status.is_dirty {
        "unsaved".yellow()
    } else {
        "saved".green()
    };
    println!(
        "{} {:<24} {:<24} {:<8} step {}  {} pages  {} questions",
        marker,
        status.project_id,
        status.name,
        state,
        status.active_tab_index,
        status.page_count,
        status.question_count
    );
    if status.image_dataset_dirty {
        println!("    {}", "Image dataset changes pending".yellow());
    }
    if !status.collisions.is_empty() {
        println!("    {} {}", "Duplicate names:".red(), status.collisions);
    }
}
