//! Tag normalization.
//!
//! Tags are free-form labels typed by the user, usually as a comma separated
//! list (`"Rust, CLI tools, rust"`). They are stored normalized:
//! - Lowercase
//! - Only alphanumerics, hyphens, underscores and single spaces survive
//! - Surrounding whitespace trimmed, inner whitespace runs collapsed
//! - Empty tags dropped, duplicates collapsed keeping the first occurrence

/// Normalizes a single tag, returning `None` if nothing is left.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .flat_map(char::to_lowercase)
        .collect();

    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Normalizes a list of tags, preserving first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if let Some(normalized) = normalize_tag(tag.as_ref()) {
            if !out.contains(&normalized) {
                out.push(normalized);
            }
        }
    }
    out
}

/// Parses comma separated tag input (`"rust, cli"`).
pub fn parse_tag_list(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}
