use std::num::ParseIntError;

use thiserror::Error;

use crate::task::TaskId;

/// Every way a command can fail. None of them are recovered from; the binary
/// logs the message and exits non-zero.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Another task already carries this description.
    #[error("task already exists: {0:?}")]
    AlreadyExists(String),

    #[error("task does not exist: {0}")]
    NotExist(TaskId),

    #[error("{command}: expected {expected}, got {got}")]
    WrongArgumentCount {
        command: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("invalid task status: {0:?} (expected todo, in-progress or done)")]
    InvalidStatus(String),

    #[error("invalid task id {value:?}: {source}")]
    InvalidId {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid command: {0}")]
    UnknownCommand(String),

    #[error("cannot determine the user config directory")]
    ConfigDir,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed task file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = TaskError> = std::result::Result<T, E>;
