//! # Configuration
//!
//! User settings live in `config.json` at the data root, next to `index.json`.
//! Every field has a default, so a missing file (or a missing key) is never an
//! error.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `default_author` | `Anonymous` | Author for new posts when none is given |
//! | `list_limit` | `10` | Rows shown by `list` when no `--limit` is passed (0 = all) |
//! | `export_format` | `markdown` | Format used by `export` when none is given |
//! | `blog_title` | `My Blog` | Title used in HTML exports and archive names |
//!
//! ## CLI Usage
//!
//! - `blogz config`: Show all configuration values.
//! - `blogz config <key>`: Show one value.
//! - `blogz config <key> <value>`: Set a value.
//!
//! Keys are accepted with either underscores or hyphens.

use crate::error::{BlogError, Result};
use crate::model::DEFAULT_AUTHOR;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const CONFIG_FILENAME: &str = "config.json";

pub const CONFIG_KEYS: &[&str] = &["default_author", "list_limit", "export_format", "blog_title"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Html,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = BlogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "html" | "htm" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            other => Err(BlogError::Validation(format!(
                "unknown export format '{}' (expected markdown, html or json)",
                other
            ))),
        }
    }
}

/// Configuration for blogz, stored in `<data-root>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BlogConfig {
    /// Author applied to new posts that don't name one
    pub default_author: String,

    /// Default number of rows for `list`; 0 shows everything
    pub list_limit: usize,

    pub export_format: ExportFormat,

    pub blog_title: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            default_author: DEFAULT_AUTHOR.to_string(),
            list_limit: 10,
            export_format: ExportFormat::Markdown,
            blog_title: "My Blog".to_string(),
        }
    }
}

fn canonical_key(key: &str) -> Result<&'static str> {
    let normalized = key.trim().to_lowercase().replace('-', "_");
    CONFIG_KEYS
        .iter()
        .copied()
        .find(|k| *k == normalized)
        .ok_or_else(|| {
            BlogError::Validation(format!(
                "unknown config key '{}' (expected one of: {})",
                key,
                CONFIG_KEYS.join(", ")
            ))
        })
}

impl BlogConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(BlogError::Io)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).map_err(|e| BlogError::malformed(CONFIG_FILENAME, e))
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(BlogError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(BlogError::Serialization)?;
        fs::write(config_path, content).map_err(BlogError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        Ok(match canonical_key(key)? {
            "default_author" => self.default_author.clone(),
            "list_limit" => self.list_limit.to_string(),
            "export_format" => self.export_format.to_string(),
            _ => self.blog_title.clone(),
        })
    }

    /// Set a value from its string form, validating it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match canonical_key(key)? {
            "default_author" => {
                if value.is_empty() {
                    return Err(BlogError::Validation("default_author cannot be empty".into()));
                }
                self.default_author = value.to_string();
            }
            "list_limit" => {
                self.list_limit = value.parse().map_err(|_| {
                    BlogError::Validation(format!("list_limit must be a number, got '{}'", value))
                })?;
            }
            "export_format" => self.export_format = value.parse()?,
            _ => {
                if value.is_empty() {
                    return Err(BlogError::Validation("blog_title cannot be empty".into()));
                }
                self.blog_title = value.to_string();
            }
        }
        Ok(())
    }

    /// All settings as `(key, value)` pairs, in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .map(|k| (*k, self.get(k).unwrap_or_default()))
            .collect()
    }
}
