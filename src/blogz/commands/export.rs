//! Export renders every post to a standalone file.
//!
//! - `markdown`: YAML-style front matter followed by the body.
//! - `html`: a self-contained page, body rendered from Markdown.
//! - `json`: the post record, exactly as stored.
//!
//! Files are named `YYYY-MM-DD-<id>.<ext>` after the creation date. With
//! `archive`, the rendered files are bundled into one
//! `<blog-title>-<timestamp>.tar.gz` instead of being written one by one.

use crate::commands::{CmdMessage, CmdResult};
use crate::config::{BlogConfig, ExportFormat};
use crate::error::{BlogError, Result};
use crate::model::{Post, PostStatus};
use crate::slug::sanitize_filename;
use crate::store::DataStore;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use minijinja::{context, Environment, Value};
use pulldown_cmark::{html, Options, Parser};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

const MARKDOWN_TEMPLATE: &str = include_str!("templates/post_markdown.tmp");
const HTML_TEMPLATE: &str = include_str!("templates/post_html.tmp");

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub format: ExportFormat,
    pub archive: bool,
}

/// A rendered post, ready to be written.
#[derive(Debug)]
struct ExportFile {
    name: String,
    contents: String,
}

pub fn run<S: DataStore>(store: &S, config: &BlogConfig, options: &ExportOptions) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    // 1. Resolve posts
    let posts = load_posts(store, &mut result)?;
    if posts.is_empty() {
        result.add_message(CmdMessage::info("No posts to export."));
        return Ok(result);
    }

    // 2. Render
    let env = template_env()?;
    let files = posts
        .iter()
        .map(|post| {
            Ok(ExportFile {
                name: export_file_name(post, options.format),
                contents: render_post(&env, post, options.format, &config.blog_title)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // 3. Write
    fs::create_dir_all(&options.output_dir).map_err(BlogError::Io)?;
    let paths = if options.archive {
        let base = sanitize_filename(&config.blog_title);
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let path = options
            .output_dir
            .join(format!("{}-{}.tar.gz", base, stamp));
        let file = File::create(&path).map_err(BlogError::Io)?;
        write_archive(file, &base, &files)?;
        vec![path]
    } else {
        let mut paths = Vec::with_capacity(files.len());
        for file in &files {
            let path = options.output_dir.join(&file.name);
            fs::write(&path, &file.contents).map_err(BlogError::Io)?;
            paths.push(path);
        }
        paths
    };

    tracing::debug!(count = files.len(), format = %options.format, "Exported posts");
    let target = if options.archive {
        paths[0].display().to_string()
    } else {
        options.output_dir.display().to_string()
    };
    result.add_message(CmdMessage::success(format!(
        "Exported {} post(s) as {} to {}",
        files.len(),
        options.format,
        target
    )));
    Ok(result.with_exported_paths(paths))
}

/// Oldest first, so exported files read in publication order.
fn load_posts<S: DataStore>(store: &S, result: &mut CmdResult) -> Result<Vec<Post>> {
    let mut posts = Vec::new();
    for entry in store.list_all()?.into_iter().rev() {
        match store.load(&entry.id) {
            Ok(post) => posts.push(post),
            Err(BlogError::MalformedRecord { record, reason }) => {
                tracing::warn!(record = %record, error = %reason, "Skipping unreadable post during export");
                result.add_message(CmdMessage::warning(format!(
                    "Skipped unreadable post '{}'",
                    record
                )));
            }
            Err(BlogError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(posts)
}

pub fn export_file_name(post: &Post, format: ExportFormat) -> String {
    format!(
        "{}-{}.{}",
        post.created_at.format("%Y-%m-%d"),
        post.id,
        format.extension()
    )
}

fn template_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    // The ".html" name turns on HTML auto-escaping for that template
    env.add_template("post.html", HTML_TEMPLATE)
        .map_err(render_error)?;
    env.add_template("post.md", MARKDOWN_TEMPLATE)
        .map_err(render_error)?;
    Ok(env)
}

fn render_error(e: minijinja::Error) -> BlogError {
    BlogError::Render(e.to_string())
}

fn render_post(env: &Environment<'_>, post: &Post, format: ExportFormat, blog_title: &str) -> Result<String> {
    match format {
        ExportFormat::Json => post.to_json(),
        ExportFormat::Markdown => {
            let tags_json = post
                .tags
                .iter()
                .map(serde_json::to_string)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let ctx = context! {
                id => &post.id,
                title => &post.title,
                title_json => serde_json::to_string(&post.title)?,
                author_json => serde_json::to_string(&post.author)?,
                status => post.status.as_str(),
                tags_json => tags_json,
                created_at => post.created_at.to_rfc3339(),
                updated_at => post.updated_at.to_rfc3339(),
                content => post.content.trim_end(),
            };
            let mut out = env
                .get_template("post.md")
                .and_then(|t| t.render(ctx))
                .map_err(render_error)?;
            out.push('\n');
            Ok(out)
        }
        ExportFormat::Html => {
            let ctx = context! {
                title => &post.title,
                author => &post.author,
                blog_title => blog_title,
                tags => &post.tags,
                is_draft => post.status == PostStatus::Draft,
                created_at => post.created_at.to_rfc3339(),
                date => post.created_at.format("%B %-d, %Y").to_string(),
                content_html => Value::from_safe_string(markdown_to_html(&post.content)),
            };
            let mut out = env
                .get_template("post.html")
                .and_then(|t| t.render(ctx))
                .map_err(render_error)?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn write_archive<W: Write>(writer: W, folder: &str, files: &[ExportFile]) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);
    let mtime = Utc::now().timestamp().max(0) as u64;

    for file in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(file.contents.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        header.set_cksum();

        tar.append_data(
            &mut header,
            format!("{}/{}", folder, file.name),
            file.contents.as_bytes(),
        )
        .map_err(BlogError::Io)?;
    }

    tar.into_inner()
        .and_then(|enc| enc.finish())
        .map_err(BlogError::Io)?;
    Ok(())
}
