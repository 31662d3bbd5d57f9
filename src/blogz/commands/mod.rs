use crate::config::BlogConfig;
use crate::index::IndexEntry;
use crate::model::{Post, PostStatus};
use std::path::PathBuf;

pub mod config;
pub mod create;
pub mod delete;
pub mod doctor;
pub mod export;
pub mod get;
pub mod list;
pub mod search;
pub mod stats;
pub mod update;

pub use list::PostFilter;
pub use search::{MatchKind, SearchHit};
pub use stats::BlogStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_posts: Vec<Post>,
    pub listed_posts: Vec<IndexEntry>,
    pub search_hits: Vec<SearchHit>,
    pub stats: Option<BlogStats>,
    pub exported_paths: Vec<PathBuf>,
    pub config: Option<BlogConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_posts(mut self, posts: Vec<Post>) -> Self {
        self.affected_posts = posts;
        self
    }

    pub fn with_listed_posts(mut self, entries: Vec<IndexEntry>) -> Self {
        self.listed_posts = entries;
        self
    }

    pub fn with_search_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.search_hits = hits;
        self
    }

    pub fn with_stats(mut self, stats: BlogStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_exported_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.exported_paths = paths;
        self
    }

    pub fn with_config(mut self, config: BlogConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Input for `create`. Only the title is required.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub status: Option<PostStatus>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// A partial update. `None` leaves the field alone.
///
/// `id` and `created_at` are fixed at creation and have no slot here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<PostStatus>,
}

impl PostUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == PostUpdate::default()
    }
}
