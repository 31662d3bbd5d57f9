use crate::commands::{CmdMessage, CmdResult};
use crate::error::{BlogError, Result};
use crate::model::Post;
use crate::store::DataStore;
use std::cmp::Reverse;

/// Where a search term was found. Variants are ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    Title,
    Tag,
    Content,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Title => "title",
            MatchKind::Tag => "tag",
            MatchKind::Content => "content",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub post: Post,
    pub matched: MatchKind,
}

/// Case-insensitive substring search over every post.
///
/// Ranking: title matches, then tag matches, then content-only matches.
/// Within a rank, newest first, then by id.
pub fn run<S: DataStore>(store: &S, term: &str) -> Result<CmdResult> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Err(BlogError::Validation("search term cannot be empty".to_string()));
    }

    let mut result = CmdResult::default();
    let mut hits = Vec::new();

    for entry in store.list_all()? {
        let post = match store.load(&entry.id) {
            Ok(post) => post,
            Err(BlogError::MalformedRecord { record, reason }) => {
                tracing::warn!(record = %record, error = %reason, "Skipping unreadable post during search");
                result.add_message(CmdMessage::warning(format!(
                    "Skipped unreadable post '{}'",
                    record
                )));
                continue;
            }
            // Vanished since listing
            Err(BlogError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        };

        if let Some(matched) = match_kind(&post, &needle) {
            hits.push(SearchHit { post, matched });
        }
    }

    hits.sort_by_key(|hit| (hit.matched, Reverse(hit.post.created_at), hit.post.id.clone()));

    if hits.is_empty() {
        result.add_message(CmdMessage::info(format!("No posts match '{}'", term.trim())));
    }
    Ok(result.with_search_hits(hits))
}

fn match_kind(post: &Post, needle: &str) -> Option<MatchKind> {
    if post.title.to_lowercase().contains(needle) {
        Some(MatchKind::Title)
    } else if post.tags.iter().any(|t| t.contains(needle)) {
        Some(MatchKind::Tag)
    } else if post.content.to_lowercase().contains(needle) {
        Some(MatchKind::Content)
    } else {
        None
    }
}
