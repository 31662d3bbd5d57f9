use crate::commands::CmdResult;
use crate::error::{BlogError, Result};
use crate::index::IndexEntry;
use crate::model::PostStatus;
use crate::store::DataStore;
use crate::tags::normalize_tag;

/// Narrows a listing. Every criterion is optional; they combine with AND.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    /// Exact match after normalization.
    pub tag: Option<String>,
    /// Case-insensitive exact match.
    pub author: Option<String>,
    /// Maximum rows; `None` or `Some(0)` means no limit.
    pub limit: Option<usize>,
}

impl PostFilter {
    pub fn status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

pub fn run<S: DataStore>(store: &S, filter: &PostFilter) -> Result<CmdResult> {
    let tag = match &filter.tag {
        Some(raw) => Some(
            normalize_tag(raw)
                .ok_or_else(|| BlogError::Validation(format!("'{}' is not a valid tag", raw)))?,
        ),
        None => None,
    };
    let author = filter.author.as_deref().map(|a| a.trim().to_lowercase());

    let matches = |entry: &IndexEntry| {
        filter.status.map_or(true, |s| entry.status == s)
            && tag.as_deref().map_or(true, |t| entry.has_tag(t))
            && author
                .as_deref()
                .map_or(true, |a| entry.author.to_lowercase() == a)
    };

    let mut entries: Vec<IndexEntry> = store.list_all()?.into_iter().filter(matches).collect();
    if let Some(limit) = filter.limit.filter(|l| *l > 0) {
        entries.truncate(limit);
    }

    Ok(CmdResult::default().with_listed_posts(entries))
}
