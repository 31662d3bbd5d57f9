//! Interactive menu.
//!
//! A numbered loop over the same `BlogApi` operations the subcommands use. It
//! reads lines from any `BufRead` and writes to any `Write`, so tests drive it
//! with in-memory buffers. End of input at any prompt cancels the current
//! action; at the main prompt it quits.

use super::render::{
    render_messages_with, render_post_list_with, render_post_with, render_search_hits_with,
    render_stats_with,
};
use blogz::api::{BlogApi, CmdMessage, CmdResult, ExportOptions, NewPost, PostFilter, PostUpdate};
use blogz::config::ExportFormat;
use blogz::error::Result;
use blogz::model::Post;
use blogz::store::DataStore;
use blogz::tags::parse_tag_list;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// A line holding only this ends multi-line content input.
const CONTENT_END: &str = ".";

const MENU: &str = "
Blogz
  1) Create post
  2) List posts
  3) View post
  4) Edit post
  5) Search
  6) Delete post
  7) Export
  8) Stats
  q) Quit
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Create,
    List,
    View,
    Edit,
    Search,
    Delete,
    Export,
    Stats,
    Quit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" | "create" => Some(Choice::Create),
            "2" | "list" => Some(Choice::List),
            "3" | "view" => Some(Choice::View),
            "4" | "edit" => Some(Choice::Edit),
            "5" | "search" => Some(Choice::Search),
            "6" | "delete" => Some(Choice::Delete),
            "7" | "export" => Some(Choice::Export),
            "8" | "stats" => Some(Choice::Stats),
            "q" | "quit" | "exit" => Some(Choice::Quit),
            _ => None,
        }
    }
}

/// Asks a yes/no question; anything but `y`/`yes` (including end of input) is no.
pub fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn run_menu<S, R, W>(api: &mut BlogApi<S>, input: R, output: W, color: bool) -> Result<()>
where
    S: DataStore,
    R: BufRead,
    W: Write,
{
    Session {
        api,
        input,
        output,
        color,
    }
    .run()
}

struct Session<'a, S: DataStore, R, W> {
    api: &'a mut BlogApi<S>,
    input: R,
    output: W,
    color: bool,
}

impl<S: DataStore, R: BufRead, W: Write> Session<'_, S, R, W> {
    fn run(&mut self) -> Result<()> {
        loop {
            write!(self.output, "{}", MENU)?;
            let Some(line) = self.prompt("Choice: ")? else {
                break;
            };
            let choice = match Choice::parse(&line) {
                Some(Choice::Quit) => break,
                Some(choice) => choice,
                None => {
                    self.show_messages(&[CmdMessage::warning(format!(
                        "Unknown choice '{}'",
                        line.trim()
                    ))])?;
                    continue;
                }
            };

            // A failed action is reported and the menu carries on
            if let Err(e) = self.dispatch(choice) {
                tracing::debug!(error = %e, "Menu action failed");
                writeln!(self.output, "Error: {}", e)?;
            }
        }
        writeln!(self.output, "Bye.")?;
        self.output.flush()?;
        Ok(())
    }

    fn dispatch(&mut self, choice: Choice) -> Result<()> {
        match choice {
            Choice::Create => self.create(),
            Choice::List => self.list(),
            Choice::View => self.view(),
            Choice::Edit => self.edit(),
            Choice::Search => self.search(),
            Choice::Delete => self.delete(),
            Choice::Export => self.export(),
            Choice::Stats => self.stats(),
            Choice::Quit => Ok(()),
        }
    }

    /// Reads one line without its terminator; `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn ask_yes_no(&mut self, label: &str) -> Result<bool> {
        Ok(confirm(label, &mut self.input, &mut self.output)?)
    }

    fn read_content(&mut self) -> Result<String> {
        writeln!(
            self.output,
            "Content (finish with a line containing only '{}'):",
            CONTENT_END
        )?;
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line == CONTENT_END {
                break;
            }
            lines.push(line.to_string());
        }
        Ok(lines.join("\n"))
    }

    fn show_messages(&mut self, messages: &[CmdMessage]) -> Result<()> {
        write!(self.output, "{}", render_messages_with(messages, self.color))?;
        Ok(())
    }

    fn finish(&mut self, result: &CmdResult) -> Result<()> {
        self.show_messages(&result.messages)
    }

    fn load(&mut self, id: &str) -> Result<Option<Post>> {
        Ok(self.api.get_post(id)?.affected_posts.pop())
    }

    fn create(&mut self) -> Result<()> {
        let Some(title) = self.prompt("Title: ")? else {
            return Ok(());
        };
        let Some(tags) = self.prompt("Tags (comma separated, optional): ")? else {
            return Ok(());
        };
        let content = self.read_content()?;

        let draft = NewPost::new(title, content).tags(parse_tag_list(&tags));
        let result = self.api.create_post(draft)?;
        self.finish(&result)
    }

    fn list(&mut self) -> Result<()> {
        let filter = PostFilter::default().limit(self.api.config().list_limit);
        let result = self.api.list_posts(&filter)?;
        let text = render_post_list_with(&result.listed_posts, "No posts yet.", self.color);
        write!(self.output, "{}", text)?;
        self.finish(&result)
    }

    fn view(&mut self) -> Result<()> {
        let Some(id) = self.prompt("Post id: ")? else {
            return Ok(());
        };
        if let Some(post) = self.load(&id)? {
            let text = render_post_with(&post, self.color);
            write!(self.output, "{}", text)?;
        }
        Ok(())
    }

    fn edit(&mut self) -> Result<()> {
        let Some(id) = self.prompt("Post id: ")? else {
            return Ok(());
        };
        let Some(post) = self.load(&id)? else {
            return Ok(());
        };

        let mut changes = PostUpdate::new();
        let Some(title) = self.prompt(&format!("Title [{}]: ", post.title))? else {
            return Ok(());
        };
        if !title.trim().is_empty() {
            changes.title = Some(title);
        }
        let Some(tags) = self.prompt(&format!("Tags [{}]: ", post.tags.join(", ")))? else {
            return Ok(());
        };
        if !tags.trim().is_empty() {
            changes.tags = Some(parse_tag_list(&tags));
        }
        if self.ask_yes_no("Replace content? [y/N] ")? {
            changes.content = Some(self.read_content()?);
        }

        let result = self.api.update_post(&post.id, &changes)?;
        self.finish(&result)
    }

    fn search(&mut self) -> Result<()> {
        let Some(term) = self.prompt("Search for: ")? else {
            return Ok(());
        };
        let result = self.api.search_posts(&term)?;
        let text = render_search_hits_with(&result.search_hits, self.color);
        write!(self.output, "{}", text)?;
        self.finish(&result)
    }

    fn delete(&mut self) -> Result<()> {
        let Some(id) = self.prompt("Post id: ")? else {
            return Ok(());
        };
        let Some(post) = self.load(&id)? else {
            return Ok(());
        };
        if !self.ask_yes_no(&format!("Delete '{}' ({})? [y/N] ", post.title, post.id))? {
            return self.show_messages(&[CmdMessage::info("Aborted.")]);
        }
        let result = self.api.delete_post(&post.id)?;
        self.finish(&result)
    }

    fn export(&mut self) -> Result<()> {
        let default_format = self.api.config().export_format;
        let Some(format) = self.prompt(&format!("Format [{}]: ", default_format))? else {
            return Ok(());
        };
        let format = if format.trim().is_empty() {
            default_format
        } else {
            format.parse::<ExportFormat>()?
        };
        let Some(dir) = self.prompt("Directory [.]: ")? else {
            return Ok(());
        };
        let output_dir = if dir.trim().is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(dir.trim())
        };
        let archive = self.ask_yes_no("Bundle into a .tar.gz? [y/N] ")?;

        let options = ExportOptions {
            output_dir,
            format,
            archive,
        };
        let result = self.api.export_posts(&options)?;
        self.finish(&result)
    }

    fn stats(&mut self) -> Result<()> {
        let result = self.api.stats()?;
        if let Some(stats) = &result.stats {
            let text = render_stats_with(stats, self.color);
            write!(self.output, "{}", text)?;
        }
        self.finish(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogz::config::BlogConfig;
    use blogz::model::PostStatus;
    use blogz::store::InMemoryStore;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn drive(api: &mut BlogApi<InMemoryStore>, script: &str) -> String {
        let mut output = Vec::new();
        run_menu(api, Cursor::new(script.as_bytes().to_vec()), &mut output, false).unwrap();
        String::from_utf8(output).unwrap()
    }

    fn make_api(root: &std::path::Path) -> BlogApi<InMemoryStore> {
        BlogApi::new(InMemoryStore::new(), BlogConfig::default(), root)
    }

    fn seed(api: &mut BlogApi<InMemoryStore>, title: &str, content: &str) {
        api.create_post(NewPost::new(title, content)).unwrap();
    }

    #[test]
    fn create_then_list() {
        let dir = tempdir().unwrap();
        let mut api = make_api(dir.path());

        let out = drive(&mut api, "1\nHello World\nrust, CLI\nFirst line\nSecond line\n.\n2\nq\n");

        assert!(out.contains("Created post 'Hello World' (hello-world)"));
        assert!(out.contains("  hello-world  Hello World"));
        assert!(out.trim_end().ends_with("Bye."));

        let post = api.get_post("hello-world").unwrap().affected_posts.remove(0);
        assert_eq!(post.content, "First line\nSecond line");
        assert_eq!(post.tags, vec!["rust", "cli"]);
    }

    #[test]
    fn end_of_input_quits() {
        let dir = tempdir().unwrap();
        let mut api = make_api(dir.path());
        let out = drive(&mut api, "");
        assert!(out.contains("1) Create post"));
        assert!(out.trim_end().ends_with("Bye."));
    }

    #[test]
    fn unknown_choice_is_reported() {
        let dir = tempdir().unwrap();
        let mut api = make_api(dir.path());
        let out = drive(&mut api, "42\nq\n");
        assert!(out.contains("Unknown choice '42'"));
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let dir = tempdir().unwrap();
        let mut api = make_api(dir.path());
        seed(&mut api, "Kept", "body");

        let out = drive(&mut api, "3\nmissing\n3\nkept\nq\n");

        assert!(out.contains("Error: Post not found: missing"));
        assert!(out.contains("Kept\nkept · Anonymous · draft"));
    }

    #[test]
    fn delete_asks_first() {
        let dir = tempdir().unwrap();
        let mut api = make_api(dir.path());
        seed(&mut api, "Doomed", "");

        let out = drive(&mut api, "6\ndoomed\nn\nq\n");
        assert!(out.contains("Aborted."));
        assert!(api.get_post("doomed").is_ok());

        let out = drive(&mut api, "6\ndoomed\ny\nq\n");
        assert!(out.contains("Deleted post 'doomed'"));
        assert!(api.get_post("doomed").is_err());
    }

    #[test]
    fn edit_keeps_blank_fields() {
        let dir = tempdir().unwrap();
        let mut api = make_api(dir.path());
        seed(&mut api, "Original", "old body");

        drive(&mut api, "4\noriginal\nRenamed\n\nn\nq\n");

        let post = api.get_post("original").unwrap().affected_posts.remove(0);
        assert_eq!(post.title, "Renamed");
        assert_eq!(post.content, "old body");
        assert_eq!(post.status, PostStatus::Draft);
    }

    #[test]
    fn search_and_stats_render() {
        let dir = tempdir().unwrap();
        let mut api = make_api(dir.path());
        seed(&mut api, "Python Tips", "");
        seed(&mut api, "Cooking", "");

        let out = drive(&mut api, "5\npython\n8\nq\n");
        assert!(out.contains("python-tips"));
        assert!(out.contains("[title]"));
        assert!(out.contains("total      2"));
    }

    #[test]
    fn export_writes_files() {
        let dir = tempdir().unwrap();
        let out_dir = tempdir().unwrap();
        let mut api = make_api(dir.path());
        seed(&mut api, "Exported", "text");

        let script = format!("7\njson\n{}\nn\nq\n", out_dir.path().display());
        let out = drive(&mut api, &script);

        assert!(out.contains("Exported 1 post(s) as json"));
        assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 1);
    }
}
