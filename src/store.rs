use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskError};
use crate::task::{Task, TaskId, TaskStatus};

pub const STORE_DIR: &str = "task";
pub const STORE_FILE: &str = "task.json";

/// `<user config dir>/task/task.json`
pub fn default_path() -> Result<PathBuf> {
    let dirs = BaseDirs::new().ok_or(TaskError::ConfigDir)?;
    Ok(dirs.config_dir().join(STORE_DIR).join(STORE_FILE))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoreMeta {
    /// Id handed to the next created task. Never goes down.
    pub current_id: TaskId,
}

impl Default for StoreMeta {
    fn default() -> Self {
        Self { current_id: 1 }
    }
}

/// All tasks plus the id counter, mirrored to a JSON file.
///
/// The in-memory copy is authoritative for the lifetime of the process;
/// every mutating call writes the whole store back before returning.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct TaskStore {
    #[serde(skip)]
    path: PathBuf,
    meta: StoreMeta,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// An empty store backed by `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn next_id(&self) -> TaskId {
        self.meta.current_id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Reads the backing file, replacing whatever is in memory. A missing
    /// file leaves the store at its defaults.
    pub fn load(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no task file at {}, starting empty", self.path.display());
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let loaded: TaskStore = serde_json::from_slice(&bytes)?;
        self.meta = loaded.meta;
        self.tasks = loaded.tasks;
        log::debug!("loaded {} tasks from {}", self.tasks.len(), self.path.display());
        Ok(())
    }

    /// Writes to a sibling temp file, then renames it over the real one.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("saved {} tasks to {}", self.tasks.len(), self.path.display());
        Ok(())
    }

    pub fn create(&mut self, description: impl Into<String>) -> Result<Task> {
        let task = Task::new(self.meta.current_id, description);
        if self.exists(&task) {
            return Err(TaskError::AlreadyExists(task.description));
        }

        self.meta.current_id += 1;
        self.tasks.push(task.clone());
        self.save()?;
        log::info!("created task {}", task.id);
        Ok(task)
    }

    /// Replaces the stored task that has `task.id`, refreshing `updated_at`.
    /// `created_at` is kept from the stored copy.
    pub fn update(&mut self, mut task: Task) -> Result<Task> {
        let index = self.index(task.id).ok_or(TaskError::NotExist(task.id))?;
        if self.exists(&task) {
            return Err(TaskError::AlreadyExists(task.description));
        }

        let stored = &mut self.tasks[index];
        task.created_at = stored.created_at;
        task.updated_at = Utc::now().max(stored.updated_at);
        *stored = task.clone();
        self.save()?;
        log::info!("updated task {}", task.id);
        Ok(task)
    }

    pub fn delete(&mut self, id: TaskId) -> Result<Task> {
        let index = self.index(id).ok_or(TaskError::NotExist(id))?;
        let removed = self.tasks.remove(index);
        self.save()?;
        log::info!("deleted task {id}");
        Ok(removed)
    }

    /// True when some *other* task already uses `candidate`'s description.
    pub fn exists(&self, candidate: &Task) -> bool {
        self.tasks
            .iter()
            .any(|t| t.id != candidate.id && t.description == candidate.description)
    }

    pub fn get_by_id(&self, id: TaskId) -> Result<Task> {
        self.index(id)
            .map(|i| self.tasks[i].clone())
            .ok_or(TaskError::NotExist(id))
    }

    pub fn get_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    fn index(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}
