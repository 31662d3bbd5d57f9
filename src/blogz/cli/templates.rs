//! Terminal output templates.
//!
//! Templates live in standalone `templates/*.tmp` files and are pulled in as
//! string constants here. They are minijinja templates rendered with
//! `trim_blocks` and `lstrip_blocks` on, so a block tag on its own line
//! produces no output line; every printed line is an expression line.
//!
//! Layout math (column widths, truncation, padding) is done in Rust and handed
//! to the templates as ready strings. Templates only pick styles by name.

pub const LIST_TEMPLATE: &str = include_str!("templates/list.tmp");
pub const SEARCH_TEMPLATE: &str = include_str!("templates/search.tmp");
pub const POST_TEMPLATE: &str = include_str!("templates/post.tmp");
pub const STATS_TEMPLATE: &str = include_str!("templates/stats.tmp");
pub const CONFIG_TEMPLATE: &str = include_str!("templates/config.tmp");
pub const MESSAGES_TEMPLATE: &str = include_str!("templates/messages.tmp");
