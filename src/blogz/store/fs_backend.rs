use super::backend::StorageBackend;
use crate::error::{BlogError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const POSTS_DIR: &str = "posts";
pub const INDEX_FILE: &str = "index.json";
const POST_EXT: &str = "json";

/// Filesystem backend rooted at a data directory:
///
/// ```text
/// <root>/
/// ├── index.json
/// └── posts/
///     └── <id>.json
/// ```
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.root.join(POSTS_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn post_path(&self, id: &str) -> PathBuf {
        self.posts_dir().join(format!("{}.{}", id, POST_EXT))
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(BlogError::Io)?;
        }
        Ok(())
    }

    /// Writes via a uniquely named temp file in the same directory, then renames.
    fn atomic_write(&self, dir: &Path, target: &Path, text: &str) -> Result<()> {
        self.ensure_dir(dir)?;
        let tmp_path = dir.join(format!(".blogz-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_path, text).map_err(BlogError::Io)?;
        if let Err(e) = fs::rename(&tmp_path, target) {
            let _ = fs::remove_file(&tmp_path);
            return Err(BlogError::Io(e));
        }
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BlogError::Io(e)),
    }
}

impl StorageBackend for FsBackend {
    fn read_index(&self) -> Result<Option<String>> {
        read_optional(&self.index_path())
    }

    fn write_index(&self, text: &str) -> Result<()> {
        self.atomic_write(&self.root, &self.index_path(), text)
    }

    fn read_post(&self, id: &str) -> Result<Option<String>> {
        read_optional(&self.post_path(id))
    }

    fn write_post(&self, id: &str, text: &str) -> Result<()> {
        self.atomic_write(&self.posts_dir(), &self.post_path(id), text)
    }

    fn delete_post(&self, id: &str) -> Result<bool> {
        match fs::remove_file(self.post_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BlogError::Io(e)),
        }
    }

    fn list_post_ids(&self) -> Result<Vec<String>> {
        let dir = self.posts_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir).map_err(BlogError::Io)? {
            let path = entry.map_err(BlogError::Io)?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(POST_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
