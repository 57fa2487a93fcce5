use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use planner_core::Task;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;

/// Persistence seam for tasks; listings are ordered by date, then id.
pub trait TaskStore: Send + Sync {
    fn insert(&self, task: Task) -> Result<Task, StoreError>;
    fn get(&self, id: u64) -> Result<Option<Task>, StoreError>;
    fn replace(&self, task: Task) -> Result<bool, StoreError>;
    fn remove(&self, id: u64) -> Result<bool, StoreError>;
    fn list(&self) -> Result<Vec<Task>, StoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    next_id: u64,
    tasks: Vec<Task>,
}

#[derive(Debug, Clone, Default)]
struct TaskTable {
    next_id: u64,
    tasks: BTreeMap<u64, Task>,
}

impl TaskTable {
    fn from_file(path: &Path, file: StoreFile) -> Result<Self, StoreError> {
        let mut tasks = BTreeMap::new();
        for task in file.tasks {
            let Some(id) = task.id else {
                return Err(StoreError::MissingTaskId {
                    path: path.to_path_buf(),
                });
            };
            tasks.insert(id, task);
        }
        let after_highest = match tasks.keys().next_back() {
            Some(highest) => highest.checked_add(1).ok_or(StoreError::IdsExhausted)?,
            None => 1,
        };
        Ok(Self {
            next_id: file.next_id.max(after_highest),
            tasks,
        })
    }

    fn to_file(&self) -> StoreFile {
        StoreFile {
            next_id: self.next_id,
            tasks: self.tasks.values().cloned().collect(),
        }
    }

    fn insert(&mut self, mut task: Task) -> Result<Task, StoreError> {
        let id = self.next_id.max(1);
        self.next_id = id.checked_add(1).ok_or(StoreError::IdsExhausted)?;
        task.id = Some(id);
        self.tasks.insert(id, task.clone());
        Ok(task)
    }

    fn replace(&mut self, task: Task) -> bool {
        let Some(slot) = task.id.and_then(|id| self.tasks.get_mut(&id)) else {
            return false;
        };
        *slot = task;
        true
    }

    fn remove(&mut self, id: u64) -> bool {
        self.tasks.remove(&id).is_some()
    }

    fn ordered(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        tasks
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<TaskTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for MemoryStore {
    fn insert(&self, task: Task) -> Result<Task, StoreError> {
        self.table.write().insert(task)
    }

    fn get(&self, id: u64) -> Result<Option<Task>, StoreError> {
        Ok(self.table.read().tasks.get(&id).cloned())
    }

    fn replace(&self, task: Task) -> Result<bool, StoreError> {
        Ok(self.table.write().replace(task))
    }

    fn remove(&self, id: u64) -> Result<bool, StoreError> {
        Ok(self.table.write().remove(id))
    }

    fn list(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.table.read().ordered())
    }
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: RwLock<TaskTable>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let table = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => TaskTable::default(),
            Ok(raw) => {
                let file: StoreFile =
                    serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                        path: path.clone(),
                        source,
                    })?;
                TaskTable::from_file(&path, file)?
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "creating new task store");
                TaskTable::default()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!(path = %path.display(), tasks = table.tasks.len(), "task store loaded");
        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut TaskTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut table = self.table.write();
        let mut staged = table.clone();
        let outcome = apply(&mut staged)?;
        self.persist(&staged)?;
        *table = staged;
        Ok(outcome)
    }

    fn persist(&self, table: &TaskTable) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let payload = serde_json::to_string_pretty(&table.to_file())?;
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        fs::write(&staging, payload).map_err(io_err)?;
        fs::rename(&staging, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl TaskStore for JsonFileStore {
    fn insert(&self, task: Task) -> Result<Task, StoreError> {
        self.mutate(|table| table.insert(task))
    }

    fn get(&self, id: u64) -> Result<Option<Task>, StoreError> {
        Ok(self.table.read().tasks.get(&id).cloned())
    }

    fn replace(&self, task: Task) -> Result<bool, StoreError> {
        let exists = task
            .id
            .is_some_and(|id| self.table.read().tasks.contains_key(&id));
        if !exists {
            return Ok(false);
        }
        self.mutate(|table| Ok(table.replace(task)))
    }

    fn remove(&self, id: u64) -> Result<bool, StoreError> {
        if !self.table.read().tasks.contains_key(&id) {
            return Ok(false);
        }
        self.mutate(|table| Ok(table.remove(id)))
    }

    fn list(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.table.read().ordered())
    }
}
