use super::backend::StorageBackend;
use crate::error::{BlogError, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since blogz is single-threaded.
/// Holds the same raw JSON text a filesystem would, so malformed records can
/// be planted directly.
#[derive(Default)]
pub struct MemBackend {
    index: RefCell<Option<String>>,
    posts: RefCell<BTreeMap<String, String>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(BlogError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn read_index(&self) -> Result<Option<String>> {
        Ok(self.index.borrow().clone())
    }

    fn write_index(&self, text: &str) -> Result<()> {
        self.check_writable()?;
        *self.index.borrow_mut() = Some(text.to_string());
        Ok(())
    }

    fn read_post(&self, id: &str) -> Result<Option<String>> {
        Ok(self.posts.borrow().get(id).cloned())
    }

    fn write_post(&self, id: &str, text: &str) -> Result<()> {
        self.check_writable()?;
        self.posts
            .borrow_mut()
            .insert(id.to_string(), text.to_string());
        Ok(())
    }

    fn delete_post(&self, id: &str) -> Result<bool> {
        self.check_writable()?;
        Ok(self.posts.borrow_mut().remove(id).is_some())
    }

    fn list_post_ids(&self) -> Result<Vec<String>> {
        Ok(self.posts.borrow().keys().cloned().collect())
    }
}
