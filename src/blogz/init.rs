//! # Data Root Resolution
//!
//! Everything blogz stores lives under a single data root:
//!
//! ```text
//! <data-root>/
//! ├── config.json
//! ├── index.json
//! └── posts/
//! ```
//!
//! The root is resolved once at startup, in priority order:
//! 1. **Explicit override**: the `--data <DIR>` flag.
//! 2. **Environment**: `$BLOGZ_HOME`, when set and non-empty.
//! 3. **Platform default**: the OS data directory via the `directories` crate
//!    (e.g. `~/.local/share/blogz` on Linux).
//!
//! The resolved path is handed to the backend and the config loader; nothing
//! below this module looks at the environment.

use crate::api::BlogApi;
use crate::config::BlogConfig;
use crate::error::{BlogError, Result};
use crate::store::FileStore;
use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};

pub const DATA_ENV_VAR: &str = "BLOGZ_HOME";

pub struct BlogContext {
    pub api: BlogApi<FileStore>,
    pub data_root: PathBuf,
}

pub fn resolve_data_root(data_override: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = env::var_os(DATA_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    ProjectDirs::from("com", "blogz", "blogz")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            BlogError::Store(format!(
                "Could not determine a data directory. Set ${} or pass --data.",
                DATA_ENV_VAR
            ))
        })
}

pub fn initialize(data_override: Option<&Path>) -> Result<BlogContext> {
    let data_root = resolve_data_root(data_override)?;

    let config = match BlogConfig::load(&data_root) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable config, using defaults");
            BlogConfig::default()
        }
    };

    tracing::debug!(root = %data_root.display(), "Using data root");
    let store = FileStore::open(&data_root);
    let api = BlogApi::new(store, config, &data_root);

    Ok(BlogContext { api, data_root })
}
