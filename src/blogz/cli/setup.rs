use blogz::config::ExportFormat;
use blogz::model::PostStatus;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "blogz",
    bin_name = "blogz",
    version,
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Terminal blog-post manager", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $BLOGZ_HOME, then the platform data dir)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Print help
    #[arg(short, long, global = true)]
    pub help: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new post
    #[command(alias = "new")]
    Create {
        /// Title words, joined with spaces
        title: Vec<String>,

        /// Post body (otherwise read from stdin or the editor)
        #[arg(long)]
        content: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// draft or published
        #[arg(long)]
        status: Option<PostStatus>,

        /// Skip the editor and create with whatever content was given
        #[arg(long)]
        no_editor: bool,
    },

    /// Show a post in full
    #[command(alias = "show")]
    View { id: String },

    /// Change a post; with no field flags, opens it in the editor
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        status: Option<PostStatus>,
    },

    /// Mark a post as published
    Publish { id: String },

    /// Move a post back to draft
    Unpublish { id: String },

    /// List posts, newest first
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        status: Option<PostStatus>,

        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Maximum rows (0 for all)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search titles, tags and content
    Search {
        term: Vec<String>,
    },

    /// Delete a post
    #[command(alias = "rm")]
    Delete {
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Export all posts to files
    Export {
        /// markdown, html or json (defaults to the configured format)
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Output directory
        #[arg(long, short = 'o', default_value = ".")]
        output: PathBuf,

        /// Bundle the files into a single .tar.gz
        #[arg(long)]
        archive: bool,
    },

    /// Show blog statistics
    Stats,

    /// Check and repair the post index
    Doctor,

    /// Get or set configuration
    Config {
        /// Configuration key
        key: Option<String>,
        /// Value to set
        value: Option<String>,
    },

    /// Interactive menu
    Menu,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Create { .. } => "create",
            Commands::View { .. } => "view",
            Commands::Edit { .. } => "edit",
            Commands::Publish { .. } => "publish",
            Commands::Unpublish { .. } => "unpublish",
            Commands::List { .. } => "list",
            Commands::Search { .. } => "search",
            Commands::Delete { .. } => "delete",
            Commands::Export { .. } => "export",
            Commands::Stats => "stats",
            Commands::Doctor => "doctor",
            Commands::Config { .. } => "config",
            Commands::Menu => "menu",
        }
    }
}

/// Command group definitions for help output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Write,
    Read,
    Data,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Write => "Writing:",
            CommandGroup::Read => "Reading:",
            CommandGroup::Data => "Data:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "create" | "edit" | "publish" | "unpublish" | "delete" => Some(CommandGroup::Write),
            "list" | "view" | "search" | "stats" => Some(CommandGroup::Read),
            "export" | "doctor" => Some(CommandGroup::Data),
            "config" | "menu" => Some(CommandGroup::Misc),
            _ => None,
        }
    }

    pub fn all() -> &'static [CommandGroup] {
        &[
            CommandGroup::Write,
            CommandGroup::Read,
            CommandGroup::Data,
            CommandGroup::Misc,
        ]
    }
}

pub fn get_grouped_help() -> String {
    let cmd = Cli::command();
    let version = cmd.get_version().unwrap_or("unknown");

    let mut output = String::new();
    output.push_str(&format!("blogz {version}\n"));
    output.push_str("Terminal blog-post manager\n");
    output.push('\n');
    output.push_str("Usage: blogz [OPTIONS] [COMMAND]\n");

    let subcommands: Vec<_> = cmd.get_subcommands().collect();

    for group in CommandGroup::all() {
        let group_cmds: Vec<_> = subcommands
            .iter()
            .filter(|sc| CommandGroup::for_command(sc.get_name()) == Some(*group))
            .collect();

        if !group_cmds.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for sc in group_cmds {
                let about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                output.push_str(&format!("  {:<12} {}\n", sc.get_name(), about));
            }
        }
    }

    output.push('\n');
    output.push_str("Options:\n");
    output.push_str("      --data <DIR>  Data directory\n");
    output.push_str("  -v, --verbose     Verbose output\n");
    output.push_str("  -h, --help        Print help\n");
    output.push_str("  -V, --version     Print version\n");

    output
}

/// Help for one subcommand, rendered by clap.
pub fn get_command_help(name: &str) -> Option<String> {
    let mut cmd = Cli::command();
    let help = cmd
        .get_subcommands_mut()
        .find(|sc| sc.get_name() == name)
        .map(|sc| sc.render_help().to_string());
    help
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("blogz").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn create_joins_title_words_and_parses_flags() {
        let cli = parse(&[
            "new", "Hello", "World", "--tags", "a,b", "--status", "published", "--no-editor",
        ]);
        match cli.command {
            Some(Commands::Create {
                title,
                tags,
                status,
                no_editor,
                ..
            }) => {
                assert_eq!(title.join(" "), "Hello World");
                assert_eq!(tags.as_deref(), Some("a,b"));
                assert_eq!(status, Some(PostStatus::Published));
                assert!(no_editor);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bad_status_is_rejected() {
        let err = Cli::try_parse_from(["blogz", "list", "--status", "archived"]);
        assert!(err.is_err());
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = parse(&["ls", "--data", "/tmp/blog", "-v"]);
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/blog")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::List { .. })));
    }

    #[test]
    fn export_format_accepts_short_names() {
        let cli = parse(&["export", "--format", "md", "--archive"]);
        match cli.command {
            Some(Commands::Export {
                format, archive, ..
            }) => {
                assert_eq!(format, Some(ExportFormat::Markdown));
                assert!(archive);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn every_command_belongs_to_a_group() {
        for sc in Cli::command().get_subcommands() {
            assert!(
                CommandGroup::for_command(sc.get_name()).is_some(),
                "{} has no help group",
                sc.get_name()
            );
        }
    }

    #[test]
    fn grouped_help_lists_commands() {
        let help = get_grouped_help();
        assert!(help.contains("Writing:"));
        assert!(help.contains("  create "));
        assert!(help.contains("  doctor "));
    }

    #[test]
    fn command_help_is_rendered_per_subcommand() {
        let help = get_command_help("create").unwrap();
        assert!(help.contains("--no-editor"));
        assert!(get_command_help("nope").is_none());
    }
}
