use crate::error::Result;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while PostStore handles the "what" (validation, index upkeep, reconciliation).
///
/// Backends move text around; they never parse it.
pub trait StorageBackend {
    // --- Index Operations ---

    /// Read the raw index text (index.json). Ok(None) if there is no index yet.
    fn read_index(&self) -> Result<Option<String>>;

    /// Replace the index text.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write_index(&self, text: &str) -> Result<()>;

    // --- Post Operations ---

    /// Read the raw JSON for a post.
    /// Returns Ok(None) if the file does not exist (useful for zombie detection).
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read_post(&self, id: &str) -> Result<Option<String>>;

    /// Write a post's JSON. MUST be atomic.
    fn write_post(&self, id: &str, text: &str) -> Result<()>;

    /// Delete a post file. Returns whether a file was actually removed.
    fn delete_post(&self, id: &str) -> Result<bool>;

    // --- Discovery ---

    /// List the ids of all post files found in storage (for reconciliation).
    fn list_post_ids(&self) -> Result<Vec<String>>;
}
