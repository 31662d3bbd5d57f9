//! # The Post Index
//!
//! `index.json` caches every post's metadata (everything but the content) so
//! that listing, filtering and stats never need to open the post files.
//!
//! The index is a cache, not the source of truth: the post files are. It is
//! therefore decoded leniently. Each entry is checked on its own, and an entry
//! that fails is dropped with a warning instead of failing the whole read. The
//! store rebuilds such entries from their post file during reconciliation.
//!
//! ## File Format
//!
//! Written as a JSON object keyed by id:
//!
//! ```text
//! {
//!   "hello-world": { "id": "hello-world", "title": "Hello World", ... },
//!   "second-post": { ... }
//! }
//! ```
//!
//! A plain JSON array of entries is accepted on read as well.

use crate::error::{BlogError, Result};
use crate::model::{deserialize_timestamp, resolve_timestamps, Post, PostStatus, DEFAULT_AUTHOR};
use crate::slug::is_valid_id;
use crate::tags::normalize_tags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The in-memory form of `index.json`, keyed by post id.
pub type Index = BTreeMap<String, IndexEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntryRecord")]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    pub author: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: PostStatus,
}

impl From<&Post> for IndexEntry {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            author: post.author.clone(),
            tags: post.tags.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            status: post.status,
        }
    }
}

impl IndexEntry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Deserialize)]
struct EntryRecord {
    id: String,
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    status: PostStatus,
}

impl TryFrom<EntryRecord> for IndexEntry {
    type Error = String;

    fn try_from(record: EntryRecord) -> std::result::Result<Self, Self::Error> {
        if !is_valid_id(&record.id) {
            return Err(format!("invalid id '{}'", record.id));
        }
        if record.created_at.is_none() {
            return Err("created_at is missing".to_string());
        }
        let (created_at, updated_at) = resolve_timestamps(record.created_at, record.updated_at);

        Ok(IndexEntry {
            id: record.id,
            title: record.title,
            author: record.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            tags: normalize_tags(record.tags),
            created_at,
            updated_at,
            status: record.status,
        })
    }
}

/// Result of decoding `index.json`.
#[derive(Debug, Default)]
pub struct DecodedIndex {
    pub entries: Index,
    /// Number of entries dropped because they failed validation.
    pub skipped: usize,
}

/// Decodes index text, skipping individual entries that fail validation.
///
/// Fails with `MalformedRecord` only when the text is not a JSON object or
/// array at all.
pub fn decode_index(text: &str) -> Result<DecodedIndex> {
    if text.trim().is_empty() {
        return Ok(DecodedIndex::default());
    }

    let value: Value =
        serde_json::from_str(text).map_err(|e| BlogError::malformed("index.json", e))?;

    let candidates: Vec<(Option<String>, Value)> = match value {
        Value::Object(map) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        Value::Array(items) => items.into_iter().map(|v| (None, v)).collect(),
        _ => {
            return Err(BlogError::malformed(
                "index.json",
                "expected a JSON object or array",
            ))
        }
    };

    let mut decoded = DecodedIndex::default();
    for (key, raw) in candidates {
        let label = key.clone().unwrap_or_else(|| "<array entry>".to_string());
        match serde_json::from_value::<IndexEntry>(raw) {
            Ok(entry) if key.as_deref().is_some_and(|k| k != entry.id) => {
                tracing::warn!(key = %label, id = %entry.id, "Index key does not match entry id, skipping");
                decoded.skipped += 1;
            }
            Ok(entry) => {
                decoded.entries.insert(entry.id.clone(), entry);
            }
            Err(e) => {
                tracing::warn!(key = %label, error = %e, "Skipping malformed index entry");
                decoded.skipped += 1;
            }
        }
    }

    Ok(decoded)
}

/// Encodes the index as a pretty JSON object keyed by id.
pub fn encode_index(index: &Index) -> Result<String> {
    serde_json::to_string_pretty(index).map_err(BlogError::Serialization)
}

/// Index entries sorted newest first, ties broken by id.
pub fn sorted_newest_first(index: Index) -> Vec<IndexEntry> {
    let mut entries: Vec<IndexEntry> = index.into_values().collect();
    entries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    entries
}
