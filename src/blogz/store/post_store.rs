use super::backend::StorageBackend;
use super::{DataStore, ReconcileReport};
use crate::error::{BlogError, Result};
use crate::index::{decode_index, encode_index, sorted_newest_first, Index, IndexEntry};
use crate::model::Post;
use crate::slug::is_valid_id;
use std::collections::BTreeSet;

pub struct PostStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
}

/// Index as read from the backend, plus whether it needs rewriting
/// regardless of what reconciliation finds.
struct LoadedIndex {
    entries: Index,
    discarded: usize,
    dirty: bool,
}

impl<B: StorageBackend> PostStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Explicitly run the cheap reconciliation pass (orphans and zombies).
    /// This is automatically called by `list_all`.
    pub fn sync(&self) -> Result<ReconcileReport> {
        let (report, _) = self.reconcile_pass(false)?;
        Ok(report)
    }

    fn load_index(&self) -> Result<LoadedIndex> {
        let Some(text) = self.backend.read_index()? else {
            return Ok(LoadedIndex {
                entries: Index::new(),
                discarded: 0,
                dirty: false,
            });
        };

        match decode_index(&text) {
            Ok(decoded) => Ok(LoadedIndex {
                dirty: decoded.skipped > 0,
                discarded: decoded.skipped,
                entries: decoded.entries,
            }),
            Err(BlogError::MalformedRecord { reason, .. }) => {
                tracing::warn!(error = %reason, "Index is unreadable, rebuilding it from post files");
                Ok(LoadedIndex {
                    entries: Index::new(),
                    discarded: 0,
                    dirty: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Index to mutate and write back. A dirty index is reconciled first so
    /// the write does not drop entries for posts that still have files.
    fn current_index(&self) -> Result<Index> {
        let loaded = self.load_index()?;
        if !loaded.dirty {
            return Ok(loaded.entries);
        }
        let (_, index) = self.reconcile_pass(false)?;
        Ok(index)
    }

    fn save_index(&self, index: &Index) -> Result<()> {
        self.backend.write_index(&encode_index(index)?)
    }

    /// Reads and parses a post file. The record's id must match its file name.
    fn read_post(&self, id: &str) -> Result<Option<Post>> {
        let Some(text) = self.backend.read_post(id)? else {
            return Ok(None);
        };
        let post = Post::from_json(id, &text)?;
        if post.id != id {
            return Err(BlogError::malformed(
                id,
                format!("record id '{}' does not match its file name", post.id),
            ));
        }
        Ok(Some(post))
    }

    /// Internal reconciliation used by `sync`, `list_all` and `reconcile`.
    ///
    /// The cheap pass only reads files that have no index entry. The deep pass
    /// re-reads every file and refreshes entries that drifted.
    fn reconcile_pass(&self, deep: bool) -> Result<(ReconcileReport, Index)> {
        let loaded = self.load_index()?;
        let mut index = loaded.entries;
        let mut changes = loaded.dirty;
        let mut report = ReconcileReport {
            discarded_index_entries: loaded.discarded,
            ..ReconcileReport::default()
        };

        // 1. Walk the post files: adopt orphans, refresh drifted entries
        let found_ids: BTreeSet<String> = self.backend.list_post_ids()?.into_iter().collect();

        for id in &found_ids {
            let indexed = index.contains_key(id);
            if indexed && !deep {
                continue;
            }

            if !is_valid_id(id) {
                tracing::warn!(file = %id, "Post file name is not a valid id, ignoring");
                report.unreadable_files += 1;
                continue;
            }

            let post = match self.read_post(id) {
                Ok(Some(post)) => post,
                // Removed between listing and reading
                Ok(None) => continue,
                Err(BlogError::MalformedRecord { record, reason }) => {
                    tracing::warn!(record = %record, error = %reason, "Skipping unreadable post file");
                    report.unreadable_files += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let entry = IndexEntry::from(&post);
            match index.get(id) {
                None => {
                    tracing::info!(id = %id, "Recovered index entry for orphaned post file");
                    report.recovered_entries += 1;
                }
                Some(existing) if *existing != entry => {
                    tracing::info!(id = %id, "Refreshed stale index entry");
                    report.refreshed_entries += 1;
                }
                Some(_) => continue,
            }
            index.insert(id.clone(), entry);
            changes = true;
        }

        // 2. Remove index entries that have no files (Zombies)
        let zombies: Vec<String> = index
            .keys()
            .filter(|id| !found_ids.contains(*id))
            .cloned()
            .collect();
        for id in zombies {
            tracing::warn!(id = %id, "Dropping index entry whose post file is missing");
            index.remove(&id);
            report.removed_entries += 1;
            changes = true;
        }

        if changes {
            self.save_index(&index)?;
        }

        Ok((report, index))
    }
}

impl<B: StorageBackend> DataStore for PostStore<B> {
    fn save(&mut self, post: &Post) -> Result<()> {
        if !is_valid_id(&post.id) {
            return Err(BlogError::Validation(format!(
                "'{}' is not a valid post id",
                post.id
            )));
        }

        // 1. Write the post file FIRST (atomic) so the index never points at nothing
        self.backend.write_post(&post.id, &post.to_json()?)?;

        // 2. Update the index
        let mut index = self.current_index()?;
        index.insert(post.id.clone(), IndexEntry::from(post));
        self.save_index(&index)?;

        tracing::debug!(id = %post.id, "Saved post");
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Post> {
        if !is_valid_id(id) {
            return Err(BlogError::NotFound(id.to_string()));
        }

        let post = self.read_post(id)?;
        let mut index = self.current_index()?;

        match post {
            None => {
                if index.remove(id).is_some() {
                    tracing::warn!(id = %id, "Dropping index entry whose post file is missing");
                    self.save_index(&index)?;
                }
                Err(BlogError::NotFound(id.to_string()))
            }
            Some(post) => {
                if !index.contains_key(id) {
                    tracing::info!(id = %id, "Rebuilding missing index entry");
                    index.insert(id.to_string(), IndexEntry::from(&post));
                    // The post itself was read fine; a failed repair is retried on next sync
                    if let Err(e) = self.save_index(&index) {
                        tracing::warn!(id = %id, error = %e, "Could not repair index entry");
                    }
                }
                Ok(post)
            }
        }
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        if !is_valid_id(id) {
            return Err(BlogError::NotFound(id.to_string()));
        }

        let mut index = self.current_index()?;
        let indexed = index.contains_key(id);

        // 1. Remove the file FIRST; an interrupted delete leaves a zombie entry for sync to drop
        let removed_file = self.backend.delete_post(id)?;
        if !indexed && !removed_file {
            return Err(BlogError::NotFound(id.to_string()));
        }

        // 2. Update the index
        if index.remove(id).is_some() {
            self.save_index(&index)?;
        }

        tracing::debug!(id = %id, "Deleted post");
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<IndexEntry>> {
        let (_, index) = self.reconcile_pass(false)?;
        Ok(sorted_newest_first(index))
    }

    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.current_index()?.contains_key(id))
    }

    fn reconcile(&mut self) -> Result<ReconcileReport> {
        let (report, _) = self.reconcile_pass(true)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use crate::store::InMemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn make_store() -> InMemoryStore {
        PostStore::with_backend(MemBackend::new())
    }

    fn post(id: &str, title: &str) -> Post {
        Post::new(id.to_string(), title.to_string(), format!("{} body", title))
    }

    fn post_at(id: &str, minutes: i64) -> Post {
        let mut p = post(id, id);
        p.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        p.updated_at = p.created_at;
        p
    }

    fn plant_file(store: &InMemoryStore, p: &Post) {
        store
            .backend
            .write_post(&p.id, &p.to_json().unwrap())
            .unwrap();
    }

    fn indexed_ids(store: &InMemoryStore) -> Vec<String> {
        let text = store.backend.read_index().unwrap().unwrap_or_default();
        decode_index(&text).unwrap().entries.into_keys().collect()
    }

    // --- Basic CRUD ---

    #[test]
    fn test_save_then_load_roundtrip() {
        let mut store = make_store();
        let p = post("hello-world", "Hello World").with_tags(["intro"]);
        store.save(&p).unwrap();

        assert_eq!(store.load("hello-world").unwrap(), p);
        assert!(store.exists("hello-world").unwrap());
        assert_eq!(indexed_ids(&store), vec!["hello-world"]);
    }

    #[test]
    fn test_save_overwrites_existing_post() {
        let mut store = make_store();
        let mut p = post("a", "First");
        store.save(&p).unwrap();

        p.title = "Second".to_string();
        p.touch(Utc::now());
        store.save(&p).unwrap();

        let entries = store.list_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Second");
        assert_eq!(store.load("a").unwrap().title, "Second");
    }

    #[test]
    fn test_save_rejects_invalid_id() {
        let mut store = make_store();
        let p = post("../escape", "Escape");
        assert!(matches!(store.save(&p), Err(BlogError::Validation(_))));
        assert!(store.backend.list_post_ids().unwrap().is_empty());
    }

    #[test]
    fn test_load_unknown_is_not_found() {
        let store = make_store();
        assert!(matches!(store.load("missing"), Err(BlogError::NotFound(_))));
        assert!(matches!(store.load("Not An Id"), Err(BlogError::NotFound(_))));
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let store = make_store();
        store.backend.write_post("broken", "{ not json").unwrap();
        assert!(matches!(
            store.load("broken"),
            Err(BlogError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_load_rejects_id_mismatch() {
        let store = make_store();
        let p = post("real", "Real");
        store
            .backend
            .write_post("other", &p.to_json().unwrap())
            .unwrap();
        assert!(matches!(
            store.load("other"),
            Err(BlogError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_delete_removes_file_and_entry() {
        let mut store = make_store();
        store.save(&post("gone", "Gone")).unwrap();

        store.delete("gone").unwrap();

        assert!(store.backend.read_post("gone").unwrap().is_none());
        assert!(!store.exists("gone").unwrap());
        assert!(matches!(store.load("gone"), Err(BlogError::NotFound(_))));
        assert!(matches!(store.delete("gone"), Err(BlogError::NotFound(_))));
    }

    #[test]
    fn test_delete_zombie_entry_clears_it() {
        let mut store = make_store();
        store.save(&post("zombie", "Zombie")).unwrap();
        store.backend.delete_post("zombie").unwrap();

        store.delete("zombie").unwrap();
        assert!(!store.exists("zombie").unwrap());
    }

    // --- Lazy Repair on Load ---

    #[test]
    fn test_load_rebuilds_missing_index_entry() {
        let store = make_store();
        let p = post("orphan", "Orphan");
        plant_file(&store, &p);
        assert!(!store.exists("orphan").unwrap());

        assert_eq!(store.load("orphan").unwrap(), p);
        assert!(store.exists("orphan").unwrap());
    }

    #[test]
    fn test_load_drops_zombie_entry() {
        let mut store = make_store();
        store.save(&post("zombie", "Zombie")).unwrap();
        store.backend.delete_post("zombie").unwrap();

        assert!(matches!(store.load("zombie"), Err(BlogError::NotFound(_))));
        assert!(!store.exists("zombie").unwrap());
    }

    // --- Sync / Listing ---

    #[test]
    fn test_list_adopts_orphans_and_drops_zombies() {
        let mut store = make_store();
        store.save(&post("kept", "Kept")).unwrap();
        store.save(&post("zombie", "Zombie")).unwrap();
        store.backend.delete_post("zombie").unwrap();
        plant_file(&store, &post("orphan", "Orphan"));

        let ids: Vec<String> = store.list_all().unwrap().into_iter().map(|e| e.id).collect();
        assert!(ids.contains(&"kept".to_string()));
        assert!(ids.contains(&"orphan".to_string()));
        assert!(!ids.contains(&"zombie".to_string()));

        // The repair was persisted
        assert_eq!(indexed_ids(&store), vec!["kept", "orphan"]);
    }

    #[test]
    fn test_list_orders_newest_first_then_id() {
        let mut store = make_store();
        for p in [post_at("old", 0), post_at("new", 20), post_at("b-tie", 10), post_at("a-tie", 10)] {
            store.save(&p).unwrap();
        }
        let ids: Vec<String> = store.list_all().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["new", "a-tie", "b-tie", "old"]);
    }

    #[test]
    fn test_list_skips_unreadable_orphans() {
        let mut store = make_store();
        store.save(&post("good", "Good")).unwrap();
        store.backend.write_post("bad", "{ nope").unwrap();

        let report = store.sync().unwrap();
        assert_eq!(report.unreadable_files, 1);
        let ids: Vec<String> = store.list_all().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["good"]);
        // Unreadable files are left for the user
        assert!(store.backend.read_post("bad").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_index_is_rebuilt() {
        let mut store = make_store();
        store.save(&post("one", "One")).unwrap();
        store.save(&post("two", "Two")).unwrap();
        store.backend.write_index("this is not json").unwrap();

        let entries = store.list_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(indexed_ids(&store), vec!["one", "two"]);
    }

    #[test]
    fn test_malformed_index_entry_is_rebuilt_from_file() {
        let mut store = make_store();
        let p = post("entry", "Entry");
        store.save(&p).unwrap();
        store
            .backend
            .write_index(&json!({ "entry": { "id": "entry" } }).to_string())
            .unwrap();

        let report = store.sync().unwrap();
        assert_eq!(report.discarded_index_entries, 1);
        assert_eq!(report.recovered_entries, 1);
        assert_eq!(store.list_all().unwrap()[0].title, "Entry");
    }

    #[test]
    fn test_save_into_corrupt_index_keeps_other_posts() {
        let mut store = make_store();
        store.save(&post("a", "A")).unwrap();
        store.save(&post("b", "B")).unwrap();
        store.backend.write_index("not json").unwrap();

        store.save(&post("c", "C")).unwrap();

        assert_eq!(indexed_ids(&store), vec!["a", "b", "c"]);
        assert!(store.exists("a").unwrap());
        assert!(store.exists("b").unwrap());
    }

    #[test]
    fn test_delete_from_corrupt_index_keeps_other_posts() {
        let mut store = make_store();
        store.save(&post("a", "A")).unwrap();
        store.save(&post("b", "B")).unwrap();
        store.backend.write_index("not json").unwrap();

        store.delete("b").unwrap();

        assert_eq!(indexed_ids(&store), vec!["a"]);
        assert!(store.backend.read_post("b").unwrap().is_none());
    }

    #[test]
    fn test_load_with_partly_bad_index_keeps_other_posts() {
        let mut store = make_store();
        store.save(&post("a", "A")).unwrap();
        store.save(&post("b", "B")).unwrap();
        store
            .backend
            .write_index(&json!({ "a": { "id": "a" } }).to_string())
            .unwrap();

        assert_eq!(store.load("b").unwrap().title, "B");
        assert_eq!(indexed_ids(&store), vec!["a", "b"]);
    }

    #[test]
    fn test_exists_sees_posts_behind_corrupt_index() {
        let mut store = make_store();
        store.save(&post("a", "A")).unwrap();
        store.backend.write_index("[[[").unwrap();

        assert!(store.exists("a").unwrap());
    }

    #[test]
    fn test_sync_is_clean_when_consistent() {
        let mut store = make_store();
        store.save(&post("a", "A")).unwrap();
        assert!(store.sync().unwrap().is_clean());
    }

    // --- Deep Reconcile ---

    #[test]
    fn test_reconcile_refreshes_stale_entries() {
        let mut store = make_store();
        let mut p = post("edited", "Before");
        store.save(&p).unwrap();

        // Simulate a hand edit of the post file
        p.title = "After".to_string();
        plant_file(&store, &p);

        // The cheap pass does not look at indexed files
        assert!(store.sync().unwrap().is_clean());
        assert_eq!(store.list_all().unwrap()[0].title, "Before");

        let report = store.reconcile().unwrap();
        assert_eq!(report.refreshed_entries, 1);
        assert_eq!(store.list_all().unwrap()[0].title, "After");
    }

    #[test]
    fn test_reconcile_reports_everything() {
        let mut store = make_store();
        store.save(&post("zombie", "Zombie")).unwrap();
        store.backend.delete_post("zombie").unwrap();
        plant_file(&store, &post("orphan", "Orphan"));
        store.backend.write_post("broken", "[]").unwrap();

        let report = store.reconcile().unwrap();
        assert_eq!(report.recovered_entries, 1);
        assert_eq!(report.removed_entries, 1);
        assert_eq!(report.unreadable_files, 1);
        assert_eq!(report.repairs(), 2);

        assert!(store.reconcile().unwrap().repairs() == 0);
    }

    // --- Error Handling ---

    #[test]
    fn test_failed_write_leaves_store_untouched() {
        let mut store = make_store();
        store.save(&post("existing", "Existing")).unwrap();
        store.backend.set_simulate_write_error(true);

        let result = store.save(&post("new", "New"));
        assert!(matches!(result, Err(BlogError::Store(_))));

        store.backend.set_simulate_write_error(false);
        let ids: Vec<String> = store.list_all().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["existing"]);
    }

    #[test]
    fn test_failed_delete_keeps_post() {
        let mut store = make_store();
        store.save(&post("keep", "Keep")).unwrap();
        store.backend.set_simulate_write_error(true);

        assert!(store.delete("keep").is_err());

        store.backend.set_simulate_write_error(false);
        assert!(store.load("keep").is_ok());
    }
}
