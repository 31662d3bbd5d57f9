use crate::commands::CmdResult;
use crate::error::{BlogError, Result};
use crate::index::IndexEntry;
use crate::model::PostStatus;
use crate::store::DataStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlogStats {
    pub total: usize,
    pub drafts: usize,
    pub published: usize,
    /// Most used first, then alphabetical.
    pub by_tag: Vec<Count>,
    pub by_author: Vec<Count>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
    /// Mean word count over the posts that could be read.
    pub avg_words: usize,
}

pub fn run<S: DataStore>(store: &S) -> Result<CmdResult> {
    let entries = store.list_all()?;

    let mut stats = BlogStats {
        total: entries.len(),
        ..Default::default()
    };
    let mut tags: BTreeMap<String, usize> = BTreeMap::new();
    let mut authors: BTreeMap<String, usize> = BTreeMap::new();

    for entry in &entries {
        match entry.status {
            PostStatus::Draft => stats.drafts += 1,
            PostStatus::Published => stats.published += 1,
        }
        for tag in &entry.tags {
            *tags.entry(tag.clone()).or_default() += 1;
        }
        *authors.entry(entry.author.clone()).or_default() += 1;
    }

    stats.earliest = entries.iter().map(|e| e.created_at).min();
    stats.latest = entries.iter().map(|e| e.created_at).max();
    stats.by_tag = ranked(tags);
    stats.by_author = ranked(authors);
    stats.avg_words = average_words(store, &entries)?;

    Ok(CmdResult::default().with_stats(stats))
}

fn average_words<S: DataStore>(store: &S, entries: &[IndexEntry]) -> Result<usize> {
    let mut words = 0;
    let mut read = 0;
    for entry in entries {
        match store.load(&entry.id) {
            Ok(post) => {
                words += post.word_count();
                read += 1;
            }
            Err(BlogError::MalformedRecord { record, reason }) => {
                tracing::warn!(record = %record, error = %reason, "Leaving unreadable post out of averages");
            }
            Err(BlogError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(if read == 0 { 0 } else { words / read })
}

fn ranked(counts: BTreeMap<String, usize>) -> Vec<Count> {
    let mut ranked: Vec<Count> = counts
        .into_iter()
        .map(|(name, count)| Count { name, count })
        .collect();
    // Stable sort: names stay alphabetical within equal counts
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, NewPost};
    use crate::config::BlogConfig;
    use crate::store::backend::StorageBackend;
    use crate::store::InMemoryStore;

    #[test]
    fn empty_store_has_zero_stats() {
        let store = InMemoryStore::new();
        let stats = run(&store).unwrap().stats.unwrap();
        assert_eq!(stats, BlogStats::default());
    }

    #[test]
    fn counts_status_tags_and_authors() {
        let mut store = InMemoryStore::new();
        let config = BlogConfig::default();
        let first = create::run(
            &mut store,
            NewPost::new("One", "").tags(["rust", "cli"]).author("Ada"),
            &config,
        )
        .unwrap()
        .affected_posts
        .remove(0);
        create::run(
            &mut store,
            NewPost::new("Two", "")
                .tags(["rust"])
                .status(PostStatus::Published),
            &config,
        )
        .unwrap();
        let last = create::run(
            &mut store,
            NewPost::new("Three", "one two three four five six").author("Ada"),
            &config,
        )
            .unwrap()
            .affected_posts
            .remove(0);

        let stats = run(&store).unwrap().stats.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.drafts, 2);
        assert_eq!(stats.published, 1);
        assert_eq!(
            stats.by_tag,
            vec![
                Count { name: "rust".into(), count: 2 },
                Count { name: "cli".into(), count: 1 },
            ]
        );
        assert_eq!(stats.by_author[0], Count { name: "Ada".into(), count: 2 });
        assert_eq!(stats.by_author[1], Count { name: "Anonymous".into(), count: 1 });
        assert_eq!(stats.earliest, Some(first.created_at));
        assert_eq!(stats.latest, Some(last.created_at));
        assert_eq!(stats.avg_words, 2);
    }

    #[test]
    fn average_skips_unreadable_posts() {
        let mut store = InMemoryStore::new();
        let config = BlogConfig::default();
        create::run(&mut store, NewPost::new("Words", "a b c d"), &config).unwrap();
        create::run(&mut store, NewPost::new("Broken", "x"), &config).unwrap();
        store.backend.write_post("broken", "{ nope").unwrap();

        let stats = run(&store).unwrap().stats.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.avg_words, 4);
    }
}
