pub mod commands;
pub mod error;
pub mod store;
pub mod table;
pub mod task;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

pub use error::{Result, TaskError};
pub use store::TaskStore;
pub use task::{Task, TaskId, TaskStatus};

// Struct CLI holds the raw command line. Options are only recognised before
// the command name; from the command name on, every word is kept verbatim
// (`--help` included) and each handler checks its own arguments, so argument
// errors come back as TaskError rather than clap usage errors.
#[derive(Parser, Debug)]
#[command(name = "task", version, about = "Track short text tasks from the command line")]
pub struct Cli {
    /// Read and write tasks here instead of <config dir>/task/task.json
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Command (help, add, update, delete, mark, list) followed by its arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command_line: Vec<String>,
}

impl Cli {
    pub fn run(self, out: &mut dyn Write) -> Result<()> {
        let mut words = self.command_line.into_iter();
        let command = words.next();
        commands::dispatch(command.as_deref(), words.collect(), self.data_file, out)
    }
}
