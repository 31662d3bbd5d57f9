use crate::commands::{CmdMessage, CmdResult, NewPost};
use crate::config::BlogConfig;
use crate::error::{BlogError, Result};
use crate::model::Post;
use crate::slug::slugify;
use crate::store::DataStore;
use std::collections::HashSet;

pub fn run<S: DataStore>(store: &mut S, draft: NewPost, config: &BlogConfig) -> Result<CmdResult> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(BlogError::Validation("title cannot be empty".to_string()));
    }

    let id = next_free_id(store, title)?;
    let author = draft
        .author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(config.default_author.as_str())
        .to_string();

    let post = Post::new(id, title.to_string(), draft.content)
        .with_author(author)
        .with_tags(&draft.tags)
        .with_status(draft.status.unwrap_or_default());
    store.save(&post)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Created post '{}' ({})",
        post.title, post.id
    )));
    Ok(result.with_affected_posts(vec![post]))
}

/// Slugifies `title` against the indexed ids. A candidate that still has a
/// file on disk (an unreadable one, say) is treated as taken too, so create
/// never overwrites a file.
fn next_free_id<S: DataStore>(store: &S, title: &str) -> Result<String> {
    let mut taken: HashSet<String> = store.list_all()?.into_iter().map(|e| e.id).collect();
    loop {
        let candidate = slugify(title, &taken);
        match store.load(&candidate) {
            Err(BlogError::NotFound(_)) => return Ok(candidate),
            Ok(_) | Err(BlogError::MalformedRecord { .. }) => {
                taken.insert(candidate);
            }
            Err(e) => return Err(e),
        }
    }
}
