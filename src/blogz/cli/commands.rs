//! # CLI Layer
//!
//! This module is **one possible UI client** for blogz; the library does not
//! depend on it.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Installs the tracing subscriber
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Structure
//!
//! - `run()`: main dispatch (called by `main.rs`)
//! - `handle_*()`: per-command handlers that call `BlogApi` and render the result
//!
//! Business logic stays in the command layer; handlers only gather input
//! (flags, piped stdin, the editor, confirmation prompts) and print.

use super::menu::{confirm, run_menu};
use super::render::{
    render_config, render_messages, render_post, render_post_list, render_search_hits,
    render_stats, use_color,
};
use super::setup::{get_command_help, get_grouped_help, Cli, Commands};
use blogz::api::{ConfigAction, ExportOptions, NewPost, PostFilter, PostUpdate};
use blogz::api::{BlogApi, CmdMessage};
use blogz::config::ExportFormat;
use blogz::editor::{edit_content, EditorContent};
use blogz::error::{BlogError, Result};
use blogz::init::{initialize, BlogContext};
use blogz::model::PostStatus;
use blogz::store::FileStore;
use blogz::tags::parse_tag_list;
use clap::Parser;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.help {
        let help = cli
            .command
            .as_ref()
            .and_then(|c| get_command_help(c.name()))
            .unwrap_or_else(get_grouped_help);
        print!("{}", help);
        return Ok(());
    }

    let mut ctx = initialize(cli.data.as_deref())?;

    match cli.command {
        Some(Commands::Create {
            title,
            content,
            tags,
            author,
            status,
            no_editor,
        }) => {
            let draft = NewPost {
                title: title.join(" "),
                content: String::new(),
                author,
                tags: tags.as_deref().map(parse_tag_list).unwrap_or_default(),
                status,
            };
            handle_create(&mut ctx, draft, content, no_editor)
        }
        Some(Commands::View { id }) => handle_view(&ctx, &id),
        Some(Commands::Edit {
            id,
            title,
            content,
            tags,
            author,
            status,
        }) => {
            let changes = PostUpdate {
                title,
                content,
                author,
                tags: tags.as_deref().map(parse_tag_list),
                status,
            };
            handle_edit(&mut ctx, &id, changes)
        }
        Some(Commands::Publish { id }) => handle_status(&mut ctx, &id, PostStatus::Published),
        Some(Commands::Unpublish { id }) => handle_status(&mut ctx, &id, PostStatus::Draft),
        Some(Commands::List {
            status,
            tag,
            author,
            limit,
        }) => {
            let filter = PostFilter {
                status,
                tag,
                author,
                limit: Some(limit.unwrap_or(ctx.api.config().list_limit)),
            };
            handle_list(&ctx, &filter)
        }
        Some(Commands::Search { term }) => handle_search(&ctx, &term.join(" ")),
        Some(Commands::Delete { id, yes }) => handle_delete(&mut ctx, &id, yes),
        Some(Commands::Export {
            format,
            output,
            archive,
        }) => handle_export(&ctx, format, output, archive),
        Some(Commands::Stats) => handle_stats(&ctx),
        Some(Commands::Doctor) => handle_doctor(&mut ctx),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        Some(Commands::Menu) => handle_menu(&mut ctx),
        None => {
            let filter = PostFilter::default().limit(ctx.api.config().list_limit);
            handle_list(&ctx, &filter)
        }
    }
}

/// Logs go to stderr. `RUST_LOG` wins unless `--verbose` forces debug.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("blogz=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_messages(messages: &[CmdMessage]) {
    let output = render_messages(messages);
    if !output.is_empty() {
        print!("{}", output);
    }
}

fn handle_create(
    ctx: &mut BlogContext,
    mut draft: NewPost,
    content: Option<String>,
    no_editor: bool,
) -> Result<()> {
    let mut should_open_editor = !no_editor;

    // 1. Explicit flag, then piped input
    if let Some(content) = content {
        draft.content = content;
        should_open_editor = false;
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        if io::stdin().read_to_string(&mut buffer).is_ok() && !buffer.trim().is_empty() {
            draft.content = buffer;
        }
        // Nobody is there to drive an editor
        should_open_editor = false;
    }

    // 2. Editor, seeded with the title so it can still be changed
    if should_open_editor {
        let edited = edit_content(&EditorContent::new(draft.title.trim(), ""))?;
        if !edited.title.is_empty() {
            draft.title = edited.title;
        }
        draft.content = edited.content;
    }

    let result = ctx.api.create_post(draft)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_view(ctx: &BlogContext, id: &str) -> Result<()> {
    let result = ctx.api.get_post(id)?;
    for post in &result.affected_posts {
        print!("{}", render_post(post));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_edit(ctx: &mut BlogContext, id: &str, changes: PostUpdate) -> Result<()> {
    let changes = if changes.is_empty() {
        editor_changes(&ctx.api, id)?
    } else {
        changes
    };

    let result = ctx.api.update_post(id, &changes)?;
    print_messages(&result.messages);
    Ok(())
}

/// Opens the post in the editor and keeps only the fields that changed.
fn editor_changes(api: &BlogApi<FileStore>, id: &str) -> Result<PostUpdate> {
    let mut current = api.get_post(id)?;
    let Some(post) = current.affected_posts.pop() else {
        return Ok(PostUpdate::new());
    };

    let edited = edit_content(&EditorContent::new(&post.title, &post.content))?;
    let mut changes = PostUpdate::new();
    if edited.title != post.title {
        changes.title = Some(edited.title);
    }
    if edited.content != post.content.trim() {
        changes.content = Some(edited.content);
    }
    Ok(changes)
}

fn handle_status(ctx: &mut BlogContext, id: &str, status: PostStatus) -> Result<()> {
    let result = match status {
        PostStatus::Published => ctx.api.publish_post(id)?,
        PostStatus::Draft => ctx.api.unpublish_post(id)?,
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &BlogContext, filter: &PostFilter) -> Result<()> {
    let result = ctx.api.list_posts(filter)?;
    let filtered = filter.status.is_some() || filter.tag.is_some() || filter.author.is_some();
    let empty_message = if filtered {
        "No posts match."
    } else {
        "No posts yet. Create one with `blogz create <title>`."
    };
    print!("{}", render_post_list(&result.listed_posts, empty_message));
    print_messages(&result.messages);
    Ok(())
}

fn handle_search(ctx: &BlogContext, term: &str) -> Result<()> {
    let result = ctx.api.search_posts(term)?;
    print!("{}", render_search_hits(&result.search_hits));
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut BlogContext, id: &str, yes: bool) -> Result<()> {
    if !yes {
        let post = ctx
            .api
            .get_post(id)?
            .affected_posts
            .pop()
            .ok_or_else(|| BlogError::NotFound(id.to_string()))?;
        let prompt = format!("Delete '{}' ({})? [y/N] ", post.title, post.id);
        let stdin = io::stdin();
        if !confirm(&prompt, &mut stdin.lock(), &mut io::stdout())? {
            print_messages(&[CmdMessage::info("Aborted.")]);
            return Ok(());
        }
    }

    let result = ctx.api.delete_post(id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(
    ctx: &BlogContext,
    format: Option<ExportFormat>,
    output: PathBuf,
    archive: bool,
) -> Result<()> {
    let options = ExportOptions {
        output_dir: output,
        format: format.unwrap_or(ctx.api.config().export_format),
        archive,
    };
    let result = ctx.api.export_posts(&options)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_stats(ctx: &BlogContext) -> Result<()> {
    let result = ctx.api.stats()?;
    if let Some(stats) = &result.stats {
        print!("{}", render_stats(stats));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_doctor(ctx: &mut BlogContext) -> Result<()> {
    let result = ctx.api.doctor()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut BlogContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let show_all = key.is_none();
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api.config_action(action)?;
    if show_all {
        if let Some(config) = &result.config {
            print!("{}", render_config(&config.entries()));
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_menu(ctx: &mut BlogContext) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_menu(&mut ctx.api, stdin.lock(), stdout.lock(), use_color())
}
