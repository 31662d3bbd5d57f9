use crate::commands::{CmdMessage, CmdResult, PostUpdate};
use crate::error::{BlogError, Result};
use crate::model::{Post, PostStatus};
use crate::store::DataStore;
use chrono::Utc;

pub fn run<S: DataStore>(store: &mut S, id: &str, changes: &PostUpdate) -> Result<CmdResult> {
    let mut post = store.load(id.trim())?;
    let mut result = CmdResult::default();

    if changes.is_empty() {
        result.add_message(CmdMessage::info(format!("Nothing to update for '{}'", post.id)));
        return Ok(result.with_affected_posts(vec![post]));
    }

    apply(&mut post, changes)?;
    post.touch(Utc::now());
    store.save(&post)?;

    result.add_message(CmdMessage::success(format!(
        "Updated post '{}' ({})",
        post.title, post.id
    )));
    Ok(result.with_affected_posts(vec![post]))
}

/// Shortcut for publish/unpublish. A post already in `status` is left untouched.
pub fn set_status<S: DataStore>(store: &mut S, id: &str, status: PostStatus) -> Result<CmdResult> {
    let post = store.load(id.trim())?;
    if post.status == status {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info(format!(
            "Post '{}' is already {}",
            post.id, status
        )));
        return Ok(result.with_affected_posts(vec![post]));
    }
    run(store, &post.id, &PostUpdate::new().status(status))
}

/// Validates every change before touching the post, so a rejected update
/// leaves it as it was.
fn apply(post: &mut Post, changes: &PostUpdate) -> Result<()> {
    let title = match &changes.title {
        Some(t) if t.trim().is_empty() => {
            return Err(BlogError::Validation("title cannot be empty".to_string()))
        }
        Some(t) => Some(t.trim().to_string()),
        None => None,
    };
    let author = match &changes.author {
        Some(a) if a.trim().is_empty() => {
            return Err(BlogError::Validation("author cannot be empty".to_string()))
        }
        Some(a) => Some(a.trim().to_string()),
        None => None,
    };

    if let Some(title) = title {
        post.title = title;
    }
    if let Some(author) = author {
        post.author = author;
    }
    if let Some(content) = &changes.content {
        post.content = content.clone();
    }
    if let Some(tags) = &changes.tags {
        post.set_tags(tags);
    }
    if let Some(status) = changes.status {
        post.status = status;
    }
    Ok(())
}
