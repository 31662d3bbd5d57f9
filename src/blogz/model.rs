//! # Domain Model
//!
//! This module defines the [`Post`] entity and its [`PostStatus`], plus the
//! schema checks applied whenever a post is read back from JSON.
//!
//! ## Record Format
//!
//! A post serializes to a flat JSON object:
//!
//! ```text
//! {
//!   "id": "hello-world",
//!   "title": "Hello World",
//!   "content": "first post",
//!   "author": "Anonymous",
//!   "tags": ["intro"],
//!   "created_at": "2024-01-15T14:30:00.123456789Z",
//!   "updated_at": "2024-01-15T14:30:00.123456789Z",
//!   "status": "draft"
//! }
//! ```
//!
//! ## Deserialization Boundary
//!
//! Records are validated on the way in rather than trusted:
//!
//! - `id` and `title` are required strings; `id` must be a valid slug and
//!   `title` must not be blank.
//! - `content`, `author`, `tags` and `status` fall back to the same defaults
//!   used by [`Post::new`].
//! - Timestamps accept RFC 3339 as well as naive ISO-8601 (read as UTC). A
//!   missing timestamp borrows the other one; both missing means the epoch.
//! - `updated_at` is never earlier than `created_at` once loaded.
//!
//! Anything that fails these checks surfaces as
//! [`BlogError::MalformedRecord`](crate::error::BlogError::MalformedRecord).

use crate::error::{BlogError, Result};
use crate::slug::is_valid_id;
use crate::tags::normalize_tags;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Author used when neither the caller nor the config provides one.
pub const DEFAULT_AUTHOR: &str = "Anonymous";

const WORDS_PER_MINUTE: usize = 200;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = BlogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" | "d" => Ok(PostStatus::Draft),
            "published" | "publish" | "p" => Ok(PostStatus::Published),
            other => Err(BlogError::Validation(format!(
                "unknown status '{}' (expected draft or published)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PostRecord")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: PostStatus,
}

impl Post {
    /// Creates a draft post stamped with the current time.
    ///
    /// The caller is responsible for handing in a unique, valid id; see
    /// [`crate::slug::slugify`].
    pub fn new(id: String, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            content,
            author: DEFAULT_AUTHOR.to_string(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            status: PostStatus::Draft,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    /// Replaces the tag list, normalizing it.
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
    }

    /// Marks the post as modified at `now`.
    ///
    /// `updated_at` always moves forward, even when the clock has not.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::nanoseconds(1)
        };
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Estimated reading time, never less than a minute.
    pub fn reading_minutes(&self) -> usize {
        (self.word_count() / WORDS_PER_MINUTE).max(1)
    }

    /// First `max_chars` characters of the content on a single line.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let flat = self.content.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() <= max_chars {
            return flat;
        }
        let mut cut: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(BlogError::Serialization)
    }

    /// Parses a post record. `record` names the source in error messages.
    pub fn from_json(record: &str, text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| BlogError::malformed(record, e))
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(BlogError::Serialization)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let record = value
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>")
            .to_string();
        serde_json::from_value(value).map_err(|e| BlogError::malformed(record, e))
    }
}

/// Raw shape of a post on disk, before validation.
#[derive(Deserialize)]
struct PostRecord {
    id: String,
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    status: PostStatus,
}

impl TryFrom<PostRecord> for Post {
    type Error = String;

    fn try_from(record: PostRecord) -> std::result::Result<Self, Self::Error> {
        if !is_valid_id(&record.id) {
            return Err(format!("invalid id '{}'", record.id));
        }
        if record.title.trim().is_empty() {
            return Err("title is empty".to_string());
        }

        let (created_at, updated_at) = resolve_timestamps(record.created_at, record.updated_at);

        Ok(Post {
            id: record.id,
            title: record.title,
            content: record.content,
            author: record
                .author
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            tags: normalize_tags(record.tags),
            created_at,
            updated_at,
            status: record.status,
        })
    }
}

pub(crate) fn resolve_timestamps(
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let created = created_at
        .or(updated_at)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let updated = updated_at.unwrap_or(created).max(created);
    (created, updated)
}

/// Parses RFC 3339, falling back to naive ISO-8601 read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub(crate) fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| {
        parse_timestamp(&s).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", s)))
    })
    .transpose()
}
