use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

pub type TaskId = u64;

/// Workflow state of a task. Stored on disk as 1, 2 or 3; 0 is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskStatus {
    Todo = 1,
    InProgress = 2,
    Done = 3,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(TaskError::InvalidStatus(other.to_string())),
        }
    }
}

impl TryFrom<u8> for TaskStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(TaskStatus::Todo),
            2 => Ok(TaskStatus::InProgress),
            3 => Ok(TaskStatus::Done),
            other => Err(format!("invalid task status code {other}")),
        }
    }
}

impl From<TaskStatus> for u8 {
    fn from(status: TaskStatus) -> u8 {
        status as u8
    }
}

// Field names are part of the on-disk format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A fresh `todo` task whose two timestamps are identical.
    pub fn new(id: TaskId, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            description: description.into(),
            status: TaskStatus::Todo,
            created_at: now,
            updated_at: now,
        }
    }
}
