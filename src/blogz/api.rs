//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for blogz operations, whether driven by CLI arguments or the
//! interactive menu.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Supplies context** the commands need (configuration, data root)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: That belongs in `commands/*.rs`
//! - **Presentation**: No stdout, stderr, or formatting
//!
//! ## Generic Over DataStore
//!
//! `BlogApi<S: DataStore>` is generic over the storage backend:
//! - Production: `BlogApi<FileStore>`
//! - Testing: `BlogApi<InMemoryStore>`

use crate::commands;
use crate::config::BlogConfig;
use crate::error::Result;
use crate::model::PostStatus;
use crate::store::DataStore;
use std::path::{Path, PathBuf};

/// The main API facade for blogz operations.
pub struct BlogApi<S: DataStore> {
    store: S,
    config: BlogConfig,
    data_root: PathBuf,
}

impl<S: DataStore> BlogApi<S> {
    pub fn new(store: S, config: BlogConfig, data_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            config,
            data_root: data_root.into(),
        }
    }

    pub fn create_post(&mut self, draft: NewPost) -> Result<CmdResult> {
        commands::create::run(&mut self.store, draft, &self.config)
    }

    pub fn get_post(&self, id: &str) -> Result<CmdResult> {
        commands::get::run(&self.store, id)
    }

    pub fn update_post(&mut self, id: &str, changes: &PostUpdate) -> Result<CmdResult> {
        commands::update::run(&mut self.store, id, changes)
    }

    pub fn publish_post(&mut self, id: &str) -> Result<CmdResult> {
        commands::update::set_status(&mut self.store, id, PostStatus::Published)
    }

    pub fn unpublish_post(&mut self, id: &str) -> Result<CmdResult> {
        commands::update::set_status(&mut self.store, id, PostStatus::Draft)
    }

    pub fn delete_post(&mut self, id: &str) -> Result<CmdResult> {
        commands::delete::run(&mut self.store, id)
    }

    pub fn list_posts(&self, filter: &PostFilter) -> Result<CmdResult> {
        commands::list::run(&self.store, filter)
    }

    pub fn search_posts(&self, term: &str) -> Result<CmdResult> {
        commands::search::run(&self.store, term)
    }

    pub fn stats(&self) -> Result<CmdResult> {
        commands::stats::run(&self.store)
    }

    pub fn export_posts(&self, options: &ExportOptions) -> Result<CmdResult> {
        commands::export::run(&self.store, &self.config, options)
    }

    pub fn doctor(&mut self) -> Result<CmdResult> {
        commands::doctor::run(&mut self.store)
    }

    /// Show or change configuration. A successful `Set` also takes effect for
    /// the rest of this session.
    pub fn config_action(&mut self, action: ConfigAction) -> Result<CmdResult> {
        let result = commands::config::run(&self.data_root, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }

    pub fn config(&self) -> &BlogConfig {
        &self.config
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::export::ExportOptions;
pub use crate::commands::{
    BlogStats, CmdMessage, CmdResult, MatchKind, MessageLevel, NewPost, PostFilter, PostUpdate,
    SearchHit,
};
