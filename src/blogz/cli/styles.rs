//! Named terminal styles for the `style` template filter.
//!
//! Templates refer to styles by name (`{{ post.id | style("id") }}`), never by
//! color. The names live in [`names`] so Rust code and templates agree.

use console::Style;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Prepended to text whose style name is not registered, so template typos show up.
pub const MISSING_STYLE_INDICATOR: &str = "(!?)";

pub mod names {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const TITLE_DRAFT: &str = "title_draft";
    pub const STATUS_DRAFT: &str = "status_draft";
    pub const STATUS_PUBLISHED: &str = "status_published";
    pub const TIME: &str = "time";
    pub const META: &str = "meta";
    pub const TAGS: &str = "tags";
    pub const RULE: &str = "rule";
    pub const HEADING: &str = "heading";
    pub const MATCH: &str = "match";
    pub const EMPTY: &str = "empty";
    pub const KEY: &str = "key";
    pub const INFO: &str = "info";
    pub const SUCCESS: &str = "success";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";
}

#[derive(Clone, Default)]
pub struct Theme {
    styles: HashMap<&'static str, Style>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: &'static str, style: Style) -> Self {
        self.styles.insert(name, style);
        self
    }

    /// Styles `text`, or returns it unchanged when `use_color` is off.
    pub fn apply(&self, name: &str, text: &str, use_color: bool) -> String {
        match self.styles.get(name) {
            Some(style) if use_color => style.clone().force_styling(true).apply_to(text).to_string(),
            Some(_) => text.to_string(),
            None => format!("{} {}", MISSING_STYLE_INDICATOR, text),
        }
    }
}

/// Converts an RGB triplet to the nearest ANSI 256-color palette index.
pub fn rgb_to_ansi256((r, g, b): (u8, u8, u8)) -> u8 {
    if r == g && g == b {
        if r < 8 {
            16
        } else if r > 248 {
            231
        } else {
            232 + ((r as u16 - 8) * 24 / 247) as u8
        }
    } else {
        let red = (r as u16 * 5 / 255) as u8;
        let green = (g as u16 * 5 / 255) as u8;
        let blue = (b as u16 * 5 / 255) as u8;
        16 + 36 * red + 6 * green + blue
    }
}

pub static BLOG_THEME: Lazy<Theme> = Lazy::new(|| {
    let gray = Style::new().color256(rgb_to_ansi256((154, 154, 154)));
    Theme::new()
        .add(names::ID, Style::new().cyan())
        .add(names::TITLE, Style::new().bold())
        .add(names::TITLE_DRAFT, Style::new())
        .add(names::STATUS_DRAFT, Style::new().yellow())
        .add(names::STATUS_PUBLISHED, Style::new().green())
        .add(names::TIME, gray.clone().italic())
        .add(names::META, gray.clone())
        .add(names::TAGS, Style::new().magenta())
        .add(names::RULE, gray.clone())
        .add(names::HEADING, Style::new().bold().underlined())
        .add(names::MATCH, gray.italic())
        .add(names::EMPTY, Style::new().dim())
        .add(names::KEY, Style::new().cyan())
        .add(names::INFO, Style::new().dim())
        .add(names::SUCCESS, Style::new().green())
        .add(names::WARNING, Style::new().yellow())
        .add(names::ERROR, Style::new().red())
});
