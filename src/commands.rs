use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};

use crate::error::{Result, TaskError};
use crate::store::{self, TaskStore};
use crate::table::{self, Column};
use crate::task::{Task, TaskId, TaskStatus};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const USAGE: &str = "USAGE: task [command] [args]

COMMANDS:
\thelp       show this message
\tadd        add a new task
\tupdate     update a task
\tdelete     delete a task
\tmark       change a task status
\tlist       list all tasks

EXAMPLES:
\ttask help

\ttask add \"Buy groceries\"
\ttask update 1 \"Buy groceries and cook dinner\"
\ttask delete 1

\ttask mark 1 done
\ttask mark 1 todo
\ttask mark 1 in-progress

\ttask list
\ttask list done
\ttask list todo
\ttask list in-progress
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Add,
    Update,
    Delete,
    Mark,
    List,
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Add => "add",
            Command::Update => "update",
            Command::Delete => "delete",
            Command::Mark => "mark",
            Command::List => "list",
        }
    }
}

impl FromStr for Command {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "help" => Ok(Command::Help),
            "add" => Ok(Command::Add),
            "update" => Ok(Command::Update),
            "delete" => Ok(Command::Delete),
            "mark" => Ok(Command::Mark),
            "list" => Ok(Command::List),
            other => Err(TaskError::UnknownCommand(other.to_string())),
        }
    }
}

/// What a handler gets to work with: the loaded store and the arguments
/// left after the command name.
pub struct CommandState {
    pub store: TaskStore,
    pub args: Vec<String>,
}

type Handler = fn(&mut CommandState, &mut dyn Write) -> Result<()>;

/// Resolves `name` to a handler and runs it. `help`, and no command at all,
/// never touch the store; everything else loads it from `data_file` or the
/// default location first.
pub fn dispatch(
    name: Option<&str>,
    args: Vec<String>,
    data_file: Option<PathBuf>,
    out: &mut dyn Write,
) -> Result<()> {
    let command = match name {
        Some(name) => name.parse::<Command>()?,
        None => Command::Help,
    };

    let handler: Handler = match command {
        Command::Help => return help(out),
        Command::Add => add,
        Command::Update => update,
        Command::Delete => delete,
        Command::Mark => mark,
        Command::List => list,
    };

    let path = match data_file {
        Some(path) => path,
        None => store::default_path()?,
    };
    log::debug!("running {} with {} args", command.name(), args.len());
    let mut state = CommandState {
        store: TaskStore::open(path)?,
        args,
    };
    handler(&mut state, out)
}

pub fn help(out: &mut dyn Write) -> Result<()> {
    out.write_all(USAGE.as_bytes())?;
    Ok(())
}

fn add(state: &mut CommandState, out: &mut dyn Write) -> Result<()> {
    let [description] = expect_args::<1>("add", &state.args)?;
    let task = state.store.create(description.as_str())?;
    writeln!(out, "Task added successfully: (ID: {})", task.id)?;
    Ok(())
}

fn update(state: &mut CommandState, out: &mut dyn Write) -> Result<()> {
    let [id, description] = expect_args::<2>("update", &state.args)?;
    let mut task = state.store.get_by_id(parse_id(id)?)?;
    task.description = description.clone();
    state.store.update(task)?;
    writeln!(out, "Task updated successfully")?;
    Ok(())
}

fn delete(state: &mut CommandState, out: &mut dyn Write) -> Result<()> {
    let [id] = expect_args::<1>("delete", &state.args)?;
    let task = state.store.get_by_id(parse_id(id)?)?;
    state.store.delete(task.id)?;
    writeln!(out, "Task deleted successfully")?;
    Ok(())
}

fn mark(state: &mut CommandState, out: &mut dyn Write) -> Result<()> {
    let [id, status] = expect_args::<2>("mark", &state.args)?;
    let id = parse_id(id)?;
    let status: TaskStatus = status.parse()?;
    let mut task = state.store.get_by_id(id)?;
    task.status = status;
    let task = state.store.update(task)?;
    writeln!(out, "Task status updated to {}", task.status)?;
    Ok(())
}

fn list(state: &mut CommandState, out: &mut dyn Write) -> Result<()> {
    let tasks: Vec<&Task> = match state.args.as_slice() {
        [] => state.store.tasks().iter().collect(),
        [status] => state.store.get_by_status(status.parse::<TaskStatus>()?),
        args => {
            return Err(TaskError::WrongArgumentCount {
                command: "list",
                expected: "at most one argument",
                got: args.len(),
            });
        }
    };

    out.write_all(render_tasks(&tasks, state.store.next_id()).as_bytes())?;
    Ok(())
}

/// The `list` table. Id width follows the digit count of `next_id`, so every
/// id issued so far fits. Control characters in descriptions are escaped to
/// keep one line per task.
pub fn render_tasks(tasks: &[&Task], next_id: TaskId) -> String {
    let status_width = TaskStatus::ALL.iter().map(|s| s.as_str().len()).max().unwrap_or(0);
    let date_width = format_timestamp(&Utc::now()).len();
    let columns = [
        Column::new("id", next_id.to_string().len()),
        Column::new("status", status_width),
        Column::new("created at", date_width),
        Column::new("updated at", date_width),
        Column::new("description", 0),
    ];

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|task| {
            vec![
                task.id.to_string(),
                task.status.to_string(),
                format_timestamp(&task.created_at),
                format_timestamp(&task.updated_at),
                single_line(&task.description),
            ]
        })
        .collect();

    table::render(&columns, &rows)
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

fn single_line(text: &str) -> String {
    let mut line = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() {
            line.extend(c.escape_default());
        } else {
            line.push(c);
        }
    }
    line
}

fn expect_args<'a, const N: usize>(
    command: &'static str,
    args: &'a [String],
) -> Result<&'a [String; N]> {
    args.try_into().map_err(|_| TaskError::WrongArgumentCount {
        command,
        expected: if N == 1 { "exactly one argument" } else { "exactly two arguments" },
        got: args.len(),
    })
}

fn parse_id(value: &str) -> Result<TaskId> {
    value.parse::<TaskId>().map_err(|source| TaskError::InvalidId {
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn run(dir: &TempDir, line: &[&str]) -> Result<String> {
        let mut out = Vec::new();
        let args = line[1..].iter().map(|s| s.to_string()).collect();
        dispatch(Some(line[0]), args, Some(dir.path().join("task.json")), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn load(dir: &TempDir) -> TaskStore {
        TaskStore::open(dir.path().join("task.json")).unwrap()
    }

    #[test]
    fn no_command_prints_help() {
        let mut out = Vec::new();
        dispatch(None, Vec::new(), None, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("USAGE: task"));
    }

    #[test]
    fn unknown_command_is_named_in_error() {
        let dir = tempdir().unwrap();
        let err = run(&dir, &["frobnicate"]).unwrap_err();
        assert_eq!(err.to_string(), "invalid command: frobnicate");
    }

    #[test]
    fn example_scenario() {
        let dir = tempdir().unwrap();
        assert_eq!(run(&dir, &["add", "Buy milk"]).unwrap(), "Task added successfully: (ID: 1)\n");
        assert!(matches!(run(&dir, &["add", "Buy milk"]), Err(TaskError::AlreadyExists(_))));
        run(&dir, &["add", "Walk dog"]).unwrap();
        assert_eq!(run(&dir, &["mark", "1", "done"]).unwrap(), "Task status updated to done\n");

        let listing = run(&dir, &["list", "done"]).unwrap();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        let cells: Vec<&str> = lines[1].split_whitespace().take(2).collect();
        assert_eq!(cells, vec!["1", "done"]);
        assert!(lines[1].ends_with("Buy milk"));
    }

    #[test]
    fn update_replaces_description() {
        let dir = tempdir().unwrap();
        run(&dir, &["add", "Buy milk"]).unwrap();
        assert_eq!(run(&dir, &["update", "1", "Buy oat milk"]).unwrap(), "Task updated successfully\n");
        assert_eq!(load(&dir).get_by_id(1).unwrap().description, "Buy oat milk");
    }

    #[test]
    fn update_and_delete_require_existing_task() {
        let dir = tempdir().unwrap();
        run(&dir, &["add", "Buy milk"]).unwrap();

        assert!(matches!(run(&dir, &["update", "5", "x"]), Err(TaskError::NotExist(5))));
        assert!(matches!(run(&dir, &["delete", "5"]), Err(TaskError::NotExist(5))));
        assert!(matches!(run(&dir, &["mark", "5", "done"]), Err(TaskError::NotExist(5))));
        assert_eq!(load(&dir).tasks().len(), 1);
    }

    #[test]
    fn delete_removes_task() {
        let dir = tempdir().unwrap();
        run(&dir, &["add", "a"]).unwrap();
        run(&dir, &["add", "b"]).unwrap();
        assert_eq!(run(&dir, &["delete", "1"]).unwrap(), "Task deleted successfully\n");

        let store = load(&dir);
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].id, 2);
    }

    #[test]
    fn bogus_status_leaves_task_untouched() {
        let dir = tempdir().unwrap();
        run(&dir, &["add", "Buy milk"]).unwrap();
        let before = load(&dir).get_by_id(1).unwrap();

        assert!(matches!(run(&dir, &["mark", "1", "bogus-status"]), Err(TaskError::InvalidStatus(_))));
        assert_eq!(load(&dir).get_by_id(1).unwrap(), before);
    }

    #[test]
    fn argument_checks() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            run(&dir, &["add"]),
            Err(TaskError::WrongArgumentCount { command: "add", got: 0, .. })
        ));
        assert!(matches!(run(&dir, &["add", "a", "b"]), Err(TaskError::WrongArgumentCount { .. })));
        assert!(matches!(run(&dir, &["update", "1"]), Err(TaskError::WrongArgumentCount { .. })));
        assert!(matches!(run(&dir, &["mark", "1", "done", "x"]), Err(TaskError::WrongArgumentCount { .. })));
        assert!(matches!(run(&dir, &["list", "todo", "done"]), Err(TaskError::WrongArgumentCount { .. })));
        assert!(matches!(run(&dir, &["delete", "one"]), Err(TaskError::InvalidId { .. })));
        assert!(matches!(run(&dir, &["list", "later"]), Err(TaskError::InvalidStatus(_))));
    }

    #[test]
    fn list_without_filter_keeps_insertion_order() {
        let dir = tempdir().unwrap();
        for d in ["c", "a", "b"] {
            run(&dir, &["add", d]).unwrap();
        }
        let listing = run(&dir, &["list"]).unwrap();
        let descriptions: Vec<&str> = listing
            .lines()
            .skip(1)
            .map(|l| l.rsplit(table::SEPARATOR).next().unwrap())
            .collect();
        assert_eq!(descriptions, vec!["c", "a", "b"]);
    }

    #[test]
    fn id_column_grows_with_counter() {
        let task = Task::new(3, "x");
        let table = render_tasks(&[&task], 100);
        let row = table.lines().nth(1).unwrap();
        assert!(row.starts_with("3      todo "));
        assert!(table.starts_with("id     status         created at"));
    }

    #[test]
    fn multiline_description_stays_on_one_row() {
        let task = Task::new(1, "first line\nsecond\tline");
        let table = render_tasks(&[&task], 2);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with("first line\\nsecond\\tline"));
    }
}
