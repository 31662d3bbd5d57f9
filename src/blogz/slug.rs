//! # Identifiers
//!
//! Every post is addressed by a slug derived from its title when the post is
//! created. The slug doubles as the post's filename stem (`posts/<id>.json`),
//! so the same rules that make it URL-friendly also keep it filesystem-safe.
//!
//! ## Slug Rules
//!
//! - Lowercase ASCII letters, digits and hyphens only
//! - Runs of anything else collapse into a single hyphen
//! - No leading or trailing hyphen
//! - At most [`MAX_ID_LEN`] characters
//!
//! Titles that reduce to nothing (`"!!!"`, `"日本語"`) fall back to a
//! timestamp placeholder such as `post-20240115143000`.
//!
//! ## Collisions
//!
//! When the candidate is taken, a numeric suffix is appended starting at 2:
//! `hello-world`, `hello-world-2`, `hello-world-3`, ...

use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Upper bound on id length, suffix included.
pub const MAX_ID_LEN: usize = 80;

/// Upper bound on sanitized filename components.
pub const MAX_FILENAME_LEN: usize = 100;

/// Derives a unique id for `title` that does not collide with `existing_ids`.
pub fn slugify(title: &str, existing_ids: &HashSet<String>) -> String {
    slugify_at(title, existing_ids, Utc::now())
}

/// Same as [`slugify`], with an explicit clock for the placeholder fallback.
pub fn slugify_at(title: &str, existing_ids: &HashSet<String>, now: DateTime<Utc>) -> String {
    let mut base = slug_base(title);
    if base.is_empty() {
        base = format!("post-{}", now.format("%Y%m%d%H%M%S"));
    }

    if !existing_ids.contains(&base) {
        return base;
    }

    let mut counter = 2usize;
    loop {
        let suffix = format!("-{}", counter);
        let stem = truncate_slug(&base, MAX_ID_LEN - suffix.len());
        let candidate = format!("{}{}", stem, suffix);
        if !existing_ids.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Returns true if `id` satisfies the id invariant.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && !id.starts_with('-')
        && !id.ends_with('-')
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Turns free-form text into a safe filename component.
///
/// Keeps ASCII alphanumerics, `-` and `_`; whitespace runs become a single
/// hyphen and everything else is dropped. Case is preserved.
pub fn sanitize_filename(input: &str) -> String {
    let mut out = String::new();
    let mut pending_dash = false;

    for ch in input.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            out.push(ch);
            pending_dash = false;
        } else if ch == '-' || ch.is_whitespace() {
            pending_dash = true;
        }
    }

    if out.is_empty() {
        return "untitled".to_string();
    }

    let truncated: String = out.chars().take(MAX_FILENAME_LEN).collect();
    truncated.trim_end_matches('-').to_string()
}

fn slug_base(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    truncate_slug(&slug, MAX_ID_LEN)
}

fn truncate_slug(slug: &str, max: usize) -> String {
    // slugs are pure ASCII, so byte slicing is safe
    let cut = &slug[..slug.len().min(max)];
    cut.trim_end_matches('-').to_string()
}
