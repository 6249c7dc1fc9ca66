use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result, bail};
use taskrails_app::{Board, DocumentStore, FileDocument, OptionalPatch, ProjectConfig, TaskService, TaskUpdate};
use taskrails_core::markdown::ImportOutcome;
use taskrails_core::{Task, TaskContent, TaskFilter, TaskId, TaskStatus, TextMatcher};
use time::{Date, OffsetDateTime, macros::format_description};
use tracing::debug;

use crate::{Command, ContentArgs, LsFormat};

/// Resolve configuration and the board document, then execute `command`.
pub fn run(
    dir: &Path,
    board_override: Option<PathBuf>,
    force: bool,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    let config = ProjectConfig::from_workdir(dir)?;
    let path = board_override.unwrap_or_else(|| config.document_path(dir));
    debug!(path = %path.display(), "Opening board");

    let board = Board::new(FileDocument::new(path), TaskService::new(config.defaults)).force(force);
    let today = OffsetDateTime::now_utc().date();
    dispatch(&board, dir, today, command, out)
}

fn dispatch<S: DocumentStore>(
    board: &Board<S>,
    dir: &Path,
    today: Date,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::New { content } => {
            let defaults = board.service().defaults().content();
            let task = board.create(content_with_defaults(content, defaults))?;
            writeln!(out, "created task: {} ({})", task.id, task.title)?;
        }
        Command::Edit {
            task,
            content,
            status,
            clear_tag,
            clear_assignee,
            clear_description,
        } => {
            let mut update = content_update(content);
            if clear_tag {
                update.tag = Some(OptionalPatch::Clear);
            }
            if clear_assignee {
                update.assignee = Some(OptionalPatch::Clear);
            }
            if clear_description {
                update.description = Some(OptionalPatch::Clear);
            }
            update.status = status.as_deref().map(TaskStatus::from);
            if update.is_empty() {
                bail!("nothing to change; pass at least one field flag");
            }
            let task = board.edit(&parse_task_id(&task)?, &update)?;
            writeln!(out, "updated task: {} [{}]", task.id, task.status)?;
        }
        Command::Rm { task } => {
            let removed = board.delete(&parse_task_id(&task)?)?;
            writeln!(out, "deleted task: {}", removed.id)?;
        }
        Command::Advance { task } => {
            let task = board.advance(&parse_task_id(&task)?)?;
            writeln!(out, "advanced task: {} -> {}", task.id, task.status)?;
        }
        Command::Rework { task, content } => {
            let rework = board.rework(&parse_task_id(&task)?, &content_update(content))?;
            writeln!(out, "locked task: {}", rework.locked.id)?;
            writeln!(out, "created task: {} ({})", rework.created.id, rework.created.title)?;
        }
        Command::Show { task } => {
            let task = board.show(&parse_task_id(&task)?)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&task)?)?;
        }
        Command::Ls {
            status,
            assignee,
            text,
            format,
        } => {
            let filter = TaskFilter {
                status: status.as_deref().map(TaskStatus::from),
                assignee: assignee.map(|role| role.trim().to_owned()).filter(|role| !role.is_empty()),
                text: text.as_deref().and_then(TextMatcher::new),
            };
            let tasks = board.list(&filter)?;
            if tasks.is_empty() {
                if filter.is_empty() {
                    writeln!(out, "No tasks found")?;
                } else {
                    writeln!(out, "No tasks matched the provided filters")?;
                }
                return Ok(());
            }
            match format {
                LsFormat::Table => render_task_table(&tasks, out)?,
                LsFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&tasks)?)?,
            }
        }
        Command::Export { output } => {
            let path = match output {
                Some(path) => path,
                None => dir.join(export_file_name(today)?),
            };
            let text = board.export()?;
            fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
            writeln!(out, "exported board to {}", path.display())?;
        }
        Command::Import { input } => {
            let text = fs::read_to_string(&input).with_context(|| format!("failed to read {}", input.display()))?;
            let report = board.import(&text)?;
            writeln!(out, "imported {} tasks from {}", report.count, input.display())?;
            if let ImportOutcome::Partial { recovered, expected } = report.outcome {
                writeln!(out, "warning: only {recovered} of {expected} task headers could be recovered")?;
            }
            for warning in &report.warnings {
                writeln!(out, "  {warning}")?;
            }
        }
    }
    Ok(())
}

fn content_update(args: ContentArgs) -> TaskUpdate {
    let ContentArgs {
        title,
        description,
        phase,
        priority,
        tag,
        assignee,
    } = args;
    TaskUpdate {
        title,
        description: description.map(OptionalPatch::Set),
        phase,
        priority,
        tag: tag.map(OptionalPatch::Set),
        assignee: assignee.map(OptionalPatch::Set),
        status: None,
    }
}

fn content_with_defaults(args: ContentArgs, defaults: TaskContent) -> TaskContent {
    content_update(args).apply_content(defaults)
}

fn render_task_table(tasks: &[Task], out: &mut impl Write) -> Result<()> {
    writeln!(out, "ID | Status | Phase | Priority | Title | Tag | Assignee")?;
    writeln!(out, "-- | ------ | ----- | -------- | ----- | --- | --------")?;

    for task in tasks {
        let status = if task.is_reworked {
            format!("{} (reworked)", task.status)
        } else {
            task.status.to_string()
        };
        writeln!(
            out,
            "{} | {} | {} | P{} | {} | {} | {}",
            task.id,
            status,
            task.phase,
            task.priority,
            task.title,
            task.tag.as_deref().unwrap_or("-"),
            task.assignee.as_deref().unwrap_or("-"),
        )?;
    }
    Ok(())
}

fn export_file_name(date: Date) -> Result<String> {
    let stamp = date
        .format(format_description!("[year]-[month]-[day]"))
        .context("failed to format export date")?;
    Ok(format!("taskrails-export-{stamp}.md"))
}

fn parse_task_id(raw: &str) -> Result<TaskId> {
    TaskId::from_str(raw).with_context(|| format!("Invalid task id: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskrails_core::TaskError;
    use tempfile::{TempDir, tempdir};
    use time::Month;

    fn date() -> Date {
        Date::from_calendar_date(2026, Month::March, 7).unwrap_or_else(|err| panic!("date: {err}"))
    }

    fn exec(dir: &TempDir, command: Command) -> Result<String> {
        let mut out = Vec::new();
        let config = ProjectConfig::from_workdir(dir.path())?;
        let board = Board::new(
            FileDocument::new(config.document_path(dir.path())),
            TaskService::new(config.defaults),
        );
        dispatch(&board, dir.path(), date(), command, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn new_task(title: &str) -> Command {
        Command::New {
            content: ContentArgs {
                title: Some(title.into()),
                ..ContentArgs::default()
            },
        }
    }

    fn task_cmd(make: fn(String) -> Command, id: &str) -> Command {
        make(id.to_owned())
    }

    #[test]
    fn new_fills_unset_fields_from_defaults() -> Result<()> {
        let dir = tempdir()?;
        let output = exec(&dir, new_task("Write docs"))?;
        assert_eq!(output, "created task: TSK-101 (Write docs)\n");

        let shown = exec(&dir, task_cmd(|task| Command::Show { task }, "TSK-101"))?;
        let task: Task = serde_json::from_str(&shown)?;
        assert_eq!(task.title, "Write docs");
        assert_eq!(task.tag.as_deref(), Some("General"));
        assert_eq!(task.priority, "3");
        Ok(())
    }

    #[test]
    fn edit_without_fields_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        exec(&dir, new_task("a"))?;
        let Err(err) = exec(
            &dir,
            Command::Edit {
                task: "TSK-101".into(),
                content: ContentArgs::default(),
                status: None,
                clear_tag: false,
                clear_assignee: false,
                clear_description: false,
            },
        ) else {
            panic!("empty edit must fail");
        };
        assert!(err.to_string().contains("nothing to change"));
        Ok(())
    }

    #[test]
    fn edit_clears_and_moves_status() -> Result<()> {
        let dir = tempdir()?;
        exec(&dir, new_task("a"))?;
        let output = exec(
            &dir,
            Command::Edit {
                task: "TSK-101".into(),
                content: ContentArgs::default(),
                status: Some("doing".into()),
                clear_tag: true,
                clear_assignee: false,
                clear_description: false,
            },
        )?;
        assert_eq!(output, "updated task: TSK-101 [doing]\n");

        let Err(err) = exec(&dir, task_cmd(|task| Command::Rm { task }, "TSK-101")) else {
            panic!("doing task must not be deleted");
        };
        assert!(matches!(err.downcast_ref::<TaskError>(), Some(TaskError::IllegalTransition { .. })));
        Ok(())
    }

    #[test]
    fn invalid_task_id_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let Err(err) = exec(&dir, task_cmd(|task| Command::Advance { task }, "task-1")) else {
            panic!("invalid id must fail");
        };
        assert!(err.to_string().contains("Invalid task id: task-1"));
        Ok(())
    }

    #[test]
    fn advance_and_rework_report_ids() -> Result<()> {
        let dir = tempdir()?;
        exec(&dir, new_task("ship"))?;
        exec(&dir, task_cmd(|task| Command::Advance { task }, "TSK-101"))?;
        let output = exec(&dir, task_cmd(|task| Command::Advance { task }, "TSK-101"))?;
        assert_eq!(output, "advanced task: TSK-101 -> done\n");

        let output = exec(
            &dir,
            Command::Rework {
                task: "TSK-101".into(),
                content: ContentArgs {
                    title: Some("ship again".into()),
                    ..ContentArgs::default()
                },
            },
        )?;
        assert_eq!(output, "locked task: TSK-101\ncreated task: TSK-102 (ship again)\n");
        Ok(())
    }

    #[test]
    fn ls_renders_sorted_table_and_filters() -> Result<()> {
        let dir = tempdir()?;
        exec(&dir, new_task("later"))?;
        exec(
            &dir,
            Command::New {
                content: ContentArgs {
                    title: Some("first".into()),
                    phase: Some("PHASE 0".into()),
                    assignee: Some("ai_review".into()),
                    ..ContentArgs::default()
                },
            },
        )?;

        let ls = |status: Option<&str>, assignee: Option<&str>| Command::Ls {
            status: status.map(str::to_owned),
            assignee: assignee.map(str::to_owned),
            text: None,
            format: LsFormat::Table,
        };

        let table = exec(&dir, ls(None, None))?;
        let rows: Vec<&str> = table.lines().skip(2).collect();
        assert_eq!(
            rows,
            [
                "TSK-102 | todo | PHASE 0 | P3 | first | General | ai_review",
                "TSK-101 | todo | PHASE 1 | P3 | later | General | -",
            ]
        );

        let filtered = exec(&dir, ls(None, Some("ai_review")))?;
        assert_eq!(filtered.lines().count(), 3);
        assert_eq!(exec(&dir, ls(Some("done"), None))?, "No tasks matched the provided filters\n");
        Ok(())
    }

    #[test]
    fn ls_on_empty_board() -> Result<()> {
        let dir = tempdir()?;
        let output = exec(
            &dir,
            Command::Ls {
                status: None,
                assignee: None,
                text: None,
                format: LsFormat::Json,
            },
        )?;
        assert_eq!(output, "No tasks found\n");
        Ok(())
    }

    #[test]
    fn export_uses_dated_default_name() -> Result<()> {
        let dir = tempdir()?;
        exec(&dir, new_task("a"))?;
        let output = exec(&dir, Command::Export { output: None })?;

        let expected = dir.path().join("taskrails-export-2026-03-07.md");
        assert_eq!(output, format!("exported board to {}\n", expected.display()));
        let text = fs::read_to_string(expected)?;
        assert!(text.contains("### TSK-101: a"));
        Ok(())
    }

    #[test]
    fn import_reports_partial_recovery() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("incoming.md");
        fs::write(&input, "## 進行中\n### TSK-5: kept\n---\n### lost header\n")?;

        let output = exec(&dir, Command::Import { input: input.clone() })?;
        assert!(output.starts_with(&format!("imported 1 tasks from {}\n", input.display())));
        assert!(output.contains("warning: only 1 of 2 task headers could be recovered"));
        assert!(output.contains("line 4: ignored malformed task header 'lost header'"));
        Ok(())
    }

    #[test]
    fn import_of_garbage_fails() -> Result<()> {
        let dir = tempdir()?;
        exec(&dir, new_task("keep me"))?;
        let input = dir.path().join("garbage.md");
        fs::write(&input, "nothing to see\n")?;

        assert!(exec(&dir, Command::Import { input }).is_err());
        let table = exec(
            &dir,
            Command::Ls {
                status: None,
                assignee: None,
                text: Some("keep".into()),
                format: LsFormat::Table,
            },
        )?;
        assert!(table.contains("keep me"));
        Ok(())
    }

    #[test]
    fn hand_edited_board_survives_unrelated_command() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("TASKS.md");
        let original = "## TODO\n### TSK-101: kept\n---\n### Draft idea without id\nimportant notes typed by hand\n---\n";
        fs::write(&path, original)?;

        let Err(err) = exec(&dir, new_task("unrelated")) else {
            panic!("new must not rewrite a partly parsed board");
        };
        assert!(err.to_string().contains("could not be parsed"));
        assert_eq!(fs::read_to_string(&path)?, original);
        Ok(())
    }

    #[test]
    fn forced_run_rewrites_partly_parsed_board() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("TASKS.md");
        fs::write(&path, "### TSK-4: kept\n---\n### broken\n")?;

        let mut out = Vec::new();
        run(dir.path(), None, true, new_task("next"), &mut out)?;
        assert_eq!(String::from_utf8(out)?, "created task: TSK-5 (next)\n");
        let text = fs::read_to_string(&path)?;
        assert!(text.contains("### TSK-4: kept") && text.contains("### TSK-5: next"));
        assert!(!text.contains("broken"));
        Ok(())
    }

    #[test]
    fn export_file_name_is_zero_padded() -> Result<()> {
        assert_eq!(export_file_name(date())?, "taskrails-export-2026-03-07.md");
        Ok(())
    }
}
