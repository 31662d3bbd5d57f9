//! # Storage Layer
//!
//! This module defines the storage abstraction for blogz. The [`DataStore`] trait
//! lets the API work against the filesystem in production and against memory
//! in tests.
//!
//! ## Files and Index
//!
//! Blogz keeps two representations of every post:
//! 1. **Truth**: one JSON file per post under `posts/`.
//! 2. **Cache**: `index.json`, holding every post's metadata minus the content.
//!
//! The index is treated as *potentially stale* and is healed lazily.
//!
//! ### Philosophy
//! - **Files are Truth**: a readable post file is a post, even without an index entry.
//! - **Index never resurrects**: an index entry without its file is dropped.
//! - **Write order**: saving writes the file before the index; deleting removes
//!   the file before the index entry. An interrupted operation therefore leaves
//!   at worst an orphan file or a zombie entry, both of which the next sync fixes.
//!
//! ## Reconciliation Logic
//!
//! The cheap `sync` pass runs automatically before listing:
//!
//! 1. **Orphan Adoption**: `posts/X.json` exists but `X` is not indexed → parse and index it.
//! 2. **Zombie Cleanup**: `X` is indexed but `posts/X.json` is missing → drop the entry.
//!
//! The deep pass ([`DataStore::reconcile`], used by `doctor`) also re-reads every
//! indexed file and refreshes entries that drifted from their file, e.g. after
//! the file was edited by hand.
//!
//! Files that cannot be parsed are never deleted. They are counted as
//! unreadable and left for the user to fix.
//!
//! ## Implementations
//!
//! - [`FileStore`]: [`PostStore`] over [`fs_backend::FsBackend`], used by the CLI.
//! - [`InMemoryStore`]: [`PostStore`] over [`mem_backend::MemBackend`], for tests.
//!
//! ## Storage Layout
//!
//! ```text
//! <data-root>/
//! ├── index.json         # Metadata cache
//! ├── config.json        # User configuration
//! └── posts/
//!     └── <id>.json      # One post per file
//! ```

use crate::error::Result;
use crate::index::IndexEntry;
use crate::model::Post;

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod post_store;

pub use post_store::PostStore;

pub type FileStore = PostStore<fs_backend::FsBackend>;
pub type InMemoryStore = PostStore<mem_backend::MemBackend>;

impl InMemoryStore {
    pub fn new() -> Self {
        PostStore::with_backend(mem_backend::MemBackend::new())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore {
    pub fn open(root: impl Into<std::path::PathBuf>) -> Self {
        PostStore::with_backend(fs_backend::FsBackend::new(root))
    }
}

/// What a reconciliation pass found and fixed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Post files that had no index entry and were indexed.
    pub recovered_entries: usize,
    /// Index entries whose post file was missing.
    pub removed_entries: usize,
    /// Index entries rewritten because they no longer matched their file.
    pub refreshed_entries: usize,
    /// Post files that could not be parsed and were left untouched.
    pub unreadable_files: usize,
    /// Index entries that failed to decode and were discarded.
    pub discarded_index_entries: usize,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        *self == ReconcileReport::default()
    }

    /// Number of repairs applied to the index.
    pub fn repairs(&self) -> usize {
        self.recovered_entries
            + self.removed_entries
            + self.refreshed_entries
            + self.discarded_index_entries
    }
}

/// Abstract interface for post storage.
///
/// Implementations own the on-disk layout and keep the index consistent with
/// the set of post files.
pub trait DataStore {
    /// Write a post (create or update): post file first, then its index entry.
    fn save(&mut self, post: &Post) -> Result<()>;

    /// Read a post by id.
    fn load(&self, id: &str) -> Result<Post>;

    /// Remove a post's file and index entry.
    fn delete(&mut self, id: &str) -> Result<()>;

    /// Sync, then return every index entry, newest first.
    fn list_all(&self) -> Result<Vec<IndexEntry>>;

    /// Whether the index knows about `id`.
    fn exists(&self, id: &str) -> Result<bool>;

    /// Full consistency check of the index against the post files.
    fn reconcile(&mut self) -> Result<ReconcileReport>;
}
