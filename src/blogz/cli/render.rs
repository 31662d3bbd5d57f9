//! # Rendering
//!
//! Turns command results into terminal text through the templates in
//! [`super::templates`], with styles from [`super::styles::BLOG_THEME`].
//!
//! Layout calculations (width, truncation, padding) stay in Rust because they
//! need Unicode-aware processing. Templates choose styles and line structure.
//!
//! Every public `render_*` function detects color support on stdout; the
//! `*_with` variants take the decision explicitly, which is what tests and the
//! interactive menu use.

use super::styles::{names, BLOG_THEME};
use super::templates::{
    CONFIG_TEMPLATE, LIST_TEMPLATE, MESSAGES_TEMPLATE, POST_TEMPLATE, SEARCH_TEMPLATE,
    STATS_TEMPLATE,
};
use blogz::api::{BlogStats, CmdMessage, MessageLevel, SearchHit};
use blogz::commands::stats::Count;
use blogz::index::IndexEntry;
use blogz::model::{Post, PostStatus};
use chrono::{DateTime, Utc};
use console::Term;
use minijinja::{Environment, Value};
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const TIME_WIDTH: usize = 14;
const STATUS_WIDTH: usize = 9;
const MATCH_WIDTH: usize = 9;
const MAX_ID_WIDTH: usize = 32;
const RULE_WIDTH: usize = 40;

#[derive(Serialize)]
struct PostLineData {
    id: String,
    id_padding: String,
    title: String,
    title_style: &'static str,
    padding: String,
    status: &'static str,
    status_style: &'static str,
    status_padding: String,
    time_ago: String,
}

#[derive(Serialize)]
struct ListData {
    posts: Vec<PostLineData>,
    empty: bool,
    empty_message: String,
}

#[derive(Serialize)]
struct SearchLineData {
    id: String,
    id_padding: String,
    title: String,
    padding: String,
    matched: String,
}

#[derive(Serialize)]
struct SearchData {
    hits: Vec<SearchLineData>,
}

#[derive(Serialize)]
struct PostData {
    title: String,
    meta: String,
    tags: String,
    rule: String,
    content: String,
}

#[derive(Serialize)]
struct CountRow {
    name: String,
    padding: String,
    count: usize,
}

#[derive(Serialize)]
struct StatsData {
    total: usize,
    published: usize,
    drafts: usize,
    earliest: Option<String>,
    latest: Option<String>,
    avg_words: usize,
    tags: Vec<CountRow>,
    authors: Vec<CountRow>,
}

#[derive(Serialize)]
struct ConfigEntry {
    key: String,
    padding: String,
    value: String,
}

#[derive(Serialize)]
struct ConfigData {
    entries: Vec<ConfigEntry>,
}

#[derive(Serialize)]
struct MessageData {
    content: String,
    style: &'static str,
}

#[derive(Serialize)]
struct MessagesData {
    messages: Vec<MessageData>,
}

/// Whether stdout can show colors.
pub fn use_color() -> bool {
    Term::stdout().features().colors_supported()
}

fn render_template<T: Serialize>(
    name: &'static str,
    source: &'static str,
    data: &T,
    use_color: bool,
) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_filter("style", move |value: Value, style: String| -> String {
        BLOG_THEME.apply(&style, &value.to_string(), use_color)
    });
    env.add_template(name, source)?;
    env.get_template(name)?.render(data)
}

pub fn render_post_list(entries: &[IndexEntry], empty_message: &str) -> String {
    render_post_list_with(entries, empty_message, use_color())
}

pub fn render_post_list_with(entries: &[IndexEntry], empty_message: &str, use_color: bool) -> String {
    let id_width = id_column_width(entries.iter().map(|e| e.id.as_str()));
    let fixed = 2 + id_width + 2 + 2 + STATUS_WIDTH + 1 + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed);

    let posts = entries
        .iter()
        .map(|entry| {
            let (id, id_padding) = fit(&entry.id, id_width);
            let (title, padding) = fit(&entry.title, available);
            let status = entry.status.as_str();
            PostLineData {
                id,
                id_padding,
                title,
                title_style: match entry.status {
                    PostStatus::Draft => names::TITLE_DRAFT,
                    PostStatus::Published => names::TITLE,
                },
                padding,
                status,
                status_style: status_style(entry.status),
                status_padding: " ".repeat(STATUS_WIDTH.saturating_sub(status.width())),
                time_ago: format_time_ago(entry.created_at),
            }
        })
        .collect::<Vec<_>>();

    let data = ListData {
        empty: posts.is_empty(),
        posts,
        empty_message: empty_message.to_string(),
    };

    render_template("list", LIST_TEMPLATE, &data, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

pub fn render_search_hits(hits: &[SearchHit]) -> String {
    render_search_hits_with(hits, use_color())
}

pub fn render_search_hits_with(hits: &[SearchHit], use_color: bool) -> String {
    let id_width = id_column_width(hits.iter().map(|h| h.post.id.as_str()));
    let available = LINE_WIDTH.saturating_sub(2 + id_width + 2 + 2 + MATCH_WIDTH);

    let lines = hits
        .iter()
        .map(|hit| {
            let (id, id_padding) = fit(&hit.post.id, id_width);
            let (title, padding) = fit(&hit.post.title, available);
            SearchLineData {
                id,
                id_padding,
                title,
                padding,
                matched: format!("[{}]", hit.matched.as_str()),
            }
        })
        .collect();

    render_template("search", SEARCH_TEMPLATE, &SearchData { hits: lines }, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

pub fn render_post(post: &Post) -> String {
    render_post_with(post, use_color())
}

pub fn render_post_with(post: &Post, use_color: bool) -> String {
    let mut meta = format!(
        "{} · {} · {} · {}",
        post.id,
        post.author,
        post.status,
        post.created_at.format("%Y-%m-%d %H:%M")
    );
    if post.updated_at != post.created_at {
        meta.push_str(&format!(" (updated {})", post.updated_at.format("%Y-%m-%d %H:%M")));
    }
    meta.push_str(&format!(
        " · {} words, {} min read",
        post.word_count(),
        post.reading_minutes()
    ));

    let data = PostData {
        title: post.title.clone(),
        meta,
        tags: post
            .tags
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" "),
        rule: "─".repeat(RULE_WIDTH),
        content: post.content.trim_end().to_string(),
    };

    render_template("post", POST_TEMPLATE, &data, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

pub fn render_stats(stats: &BlogStats) -> String {
    render_stats_with(stats, use_color())
}

pub fn render_stats_with(stats: &BlogStats, use_color: bool) -> String {
    let data = StatsData {
        total: stats.total,
        published: stats.published,
        drafts: stats.drafts,
        earliest: stats.earliest.map(|d| d.format("%Y-%m-%d").to_string()),
        latest: stats.latest.map(|d| d.format("%Y-%m-%d").to_string()),
        avg_words: stats.avg_words,
        tags: count_rows(&stats.by_tag),
        authors: count_rows(&stats.by_author),
    };

    render_template("stats", STATS_TEMPLATE, &data, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

pub fn render_config(entries: &[(&str, String)]) -> String {
    render_config_with(entries, use_color())
}

pub fn render_config_with(entries: &[(&str, String)], use_color: bool) -> String {
    let width = entries.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    let data = ConfigData {
        entries: entries
            .iter()
            .map(|(key, value)| ConfigEntry {
                key: key.to_string(),
                padding: " ".repeat(width - key.width()),
                value: value.clone(),
            })
            .collect(),
    };

    render_template("config", CONFIG_TEMPLATE, &data, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    render_messages_with(messages, use_color())
}

pub fn render_messages_with(messages: &[CmdMessage], use_color: bool) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let data = MessagesData {
        messages: messages
            .iter()
            .map(|msg| MessageData {
                content: msg.content.clone(),
                style: match msg.level {
                    MessageLevel::Info => names::INFO,
                    MessageLevel::Success => names::SUCCESS,
                    MessageLevel::Warning => names::WARNING,
                    MessageLevel::Error => names::ERROR,
                },
            })
            .collect(),
    };

    render_template("messages", MESSAGES_TEMPLATE, &data, use_color).unwrap_or_else(|_| {
        messages
            .iter()
            .map(|m| format!("{}\n", m.content))
            .collect()
    })
}

fn status_style(status: PostStatus) -> &'static str {
    match status {
        PostStatus::Draft => names::STATUS_DRAFT,
        PostStatus::Published => names::STATUS_PUBLISHED,
    }
}

fn id_column_width<'a>(ids: impl Iterator<Item = &'a str>) -> usize {
    ids.map(|id| id.width()).max().unwrap_or(0).min(MAX_ID_WIDTH)
}

fn count_rows(counts: &[Count]) -> Vec<CountRow> {
    let width = counts.iter().map(|c| c.name.width()).max().unwrap_or(0).max(10);
    counts
        .iter()
        .map(|c| CountRow {
            name: c.name.clone(),
            padding: " ".repeat(width - c.name.width()),
            count: c.count,
        })
        .collect()
}

/// Truncates `s` to `width` columns and returns it with the padding that
/// fills the rest of the column.
fn fit(s: &str, width: usize) -> (String, String) {
    let text = if s.width() > width {
        truncate_to_width(s, width)
    } else {
        s.to_string()
    };
    let padding = " ".repeat(width.saturating_sub(text.width()));
    (text, padding)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = timeago::Formatter::new().convert(duration.to_std().unwrap_or_default());

    // Align the unit words on "seconds" (7 chars)
    let time_str = time_str
        .replace("hours ago", "  hours ago")
        .replace("hour ago", "   hour ago")
        .replace("days ago", "   days ago")
        .replace("day ago", "    day ago")
        .replace("weeks ago", "  weeks ago")
        .replace("week ago", "   week ago")
        .replace("months ago", " months ago")
        .replace("month ago", "  month ago")
        .replace("years ago", "  years ago")
        .replace("year ago", "   year ago");

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
