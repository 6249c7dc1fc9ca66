//! CLI entry point for taskrails.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Kanban tasks kept in a hand-editable markdown document.
#[derive(Parser, Debug)]
#[command(
    name = "taskrails",
    version,
    about = "taskrails: todo → doing → done, with rework forks, stored as markdown"
)]
struct Cli {
    /// Project directory holding `.taskrails/config.toml` (defaults to current).
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Board document to use instead of the configured one.
    #[arg(long)]
    board: Option<PathBuf>,

    /// Rewrite the board even when parts of the document could not be parsed.
    #[arg(long)]
    force: bool,

    #[command(subcommand)]
    cmd: Command,
}

/// Editable task fields shared by `new`, `edit` and `rework`.
#[derive(Args, Debug, Default, Clone)]
struct ContentArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    phase: Option<String>,
    #[arg(long)]
    priority: Option<String>,
    #[arg(long)]
    tag: Option<String>,
    #[arg(short = 'a', long)]
    assignee: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a todo task; unset fields come from the configured defaults.
    New {
        #[command(flatten)]
        content: ContentArgs,
    },

    /// Edit a todo task in place.
    Edit {
        #[arg(long)]
        task: String,
        #[command(flatten)]
        content: ContentArgs,
        /// Move the task to another column (todo, doing, done).
        #[arg(long)]
        status: Option<String>,
        #[arg(long, conflicts_with = "tag")]
        clear_tag: bool,
        #[arg(long, conflicts_with = "assignee")]
        clear_assignee: bool,
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,
    },

    /// Delete a todo task.
    Rm {
        #[arg(long)]
        task: String,
    },

    /// Move a task one column forward.
    Advance {
        #[arg(long)]
        task: String,
    },

    /// Lock a finished task and fork a new todo task from it.
    Rework {
        #[arg(long)]
        task: String,
        #[command(flatten)]
        content: ContentArgs,
    },

    /// Print one task as JSON.
    Show {
        #[arg(long)]
        task: String,
    },

    /// List tasks in display order.
    Ls {
        #[arg(long)]
        status: Option<String>,
        #[arg(short = 'a', long)]
        assignee: Option<String>,
        /// Case-insensitive text search over id, title, description, tag and assignee.
        #[arg(long)]
        text: Option<String>,
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Write the board as a markdown document.
    Export {
        /// Defaults to `taskrails-export-YYYY-MM-DD.md` in the project directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace the board with the tasks recovered from a markdown document.
    Import {
        #[arg(long)]
        input: PathBuf,
    },
}

/// Output format of `ls`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LsFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli { dir, board, force, cmd } = Cli::parse();
    install_tracing();

    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    commands::run(&dir, board, force, cmd, &mut std::io::stdout().lock())
}

fn install_tracing() {
    // RUST_LOG is honoured; INFO by default.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_new_command() {
        let cli = Cli::parse_from([
            "taskrails",
            "--dir",
            "/tmp/project",
            "new",
            "--title",
            "Improve docs",
            "--priority",
            "P1",
            "--assignee",
            "ai_codegen",
        ]);

        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/project")));
        match cli.cmd {
            Command::New { content } => {
                assert_eq!(content.title.as_deref(), Some("Improve docs"));
                assert_eq!(content.priority.as_deref(), Some("P1"));
                assert_eq!(content.assignee.as_deref(), Some("ai_codegen"));
                assert_eq!(content.tag, None);
            }
            _ => panic!("expected new command"),
        }
    }

    #[test]
    fn parse_edit_command_with_clears() {
        let cli = Cli::parse_from([
            "taskrails",
            "edit",
            "--task",
            "TSK-101",
            "--status",
            "doing",
            "--clear-tag",
            "--clear-description",
        ]);

        match cli.cmd {
            Command::Edit {
                task,
                status,
                clear_tag,
                clear_assignee,
                clear_description,
                ..
            } => {
                assert_eq!(task, "TSK-101");
                assert_eq!(status.as_deref(), Some("doing"));
                assert!(clear_tag && clear_description && !clear_assignee);
            }
            _ => panic!("expected edit command"),
        }
    }

    #[test]
    fn clear_flag_conflicts_with_value() {
        let result = Cli::try_parse_from(["taskrails", "edit", "--task", "TSK-1", "--tag", "UI", "--clear-tag"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_ls_defaults_to_table() {
        let cli = Cli::parse_from(["taskrails", "--board", "board.md", "ls", "--status", "done"]);
        assert_eq!(cli.board, Some(PathBuf::from("board.md")));
        assert!(!cli.force);
        match cli.cmd {
            Command::Ls { status, format, .. } => {
                assert_eq!(status.as_deref(), Some("done"));
                assert_eq!(format, LsFormat::Table);
            }
            _ => panic!("expected ls command"),
        }
    }

    #[test]
    fn parse_global_force_flag() {
        let cli = Cli::parse_from(["taskrails", "--force", "advance", "--task", "TSK-3"]);
        assert!(cli.force);
        assert!(matches!(cli.cmd, Command::Advance { task } if task == "TSK-3"));
    }

    #[test]
    fn parse_import_requires_input() {
        assert!(Cli::try_parse_from(["taskrails", "import"]).is_err());
        let cli = Cli::parse_from(["taskrails", "import", "--input", "backup.md"]);
        match cli.cmd {
            Command::Import { input } => assert_eq!(input, PathBuf::from("backup.md")),
            _ => panic!("expected import command"),
        }
    }
}
