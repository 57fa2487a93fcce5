use chrono::{NaiveDate, NaiveTime};
use planner_core::{normalize, CanonicalDate, Clock, SystemClock, Task};
use tracing::{debug, info, instrument};

use crate::error::ServiceError;
use crate::store::{MemoryStore, TaskStore};

pub const DEFAULT_LIST_LIMIT: usize = 50;

// e.g. `07.11.2025`
const SEARCH_DATE_FORMAT: &str = "%d.%m.%Y";

pub struct TaskService {
    store: Box<dyn TaskStore>,
    clock: Box<dyn Clock>,
    list_limit: usize,
}

pub struct TaskServiceBuilder {
    store: Option<Box<dyn TaskStore>>,
    clock: Option<Box<dyn Clock>>,
    list_limit: usize,
}

impl TaskServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            clock: None,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    pub fn with_store(mut self, store: impl TaskStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn with_list_limit(mut self, limit: usize) -> Self {
        self.list_limit = limit.max(1);
        self
    }

    pub fn build(self) -> TaskService {
        TaskService {
            store: self.store.unwrap_or_else(|| Box::new(MemoryStore::new())),
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock)),
            list_limit: self.list_limit,
        }
    }
}

impl Default for TaskServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskService {
    pub fn builder() -> TaskServiceBuilder {
        TaskServiceBuilder::new()
    }

    pub fn list_limit(&self) -> usize {
        self.list_limit
    }

    pub fn next_date(
        &self,
        now: Option<&str>,
        date: &str,
        repeat: &str,
    ) -> Result<String, ServiceError> {
        let reference = match now.filter(|raw| !raw.is_empty()) {
            Some(raw) => CanonicalDate::parse(raw)?.date().and_time(NaiveTime::MIN),
            None => self.clock.now(),
        };
        Ok(planner_core::next_date(reference, date, repeat)?)
    }

    #[instrument(skip(self, task), fields(title = %task.title))]
    pub fn add_task(&self, mut task: Task) -> Result<Task, ServiceError> {
        Self::require_title(&task)?;
        normalize(&mut task, &*self.clock)?;
        task.id = None;
        let stored = self.store.insert(task)?;
        info!(task_id = ?stored.id, date = %stored.date, "task added");
        Ok(stored)
    }

    pub fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        let id = parse_id(id)?;
        self.store.get(id)?.ok_or(ServiceError::NotFound(id))
    }

    #[instrument(skip(self, task), fields(task_id = ?task.id))]
    pub fn update_task(&self, mut task: Task) -> Result<Task, ServiceError> {
        Self::require_title(&task)?;
        normalize(&mut task, &*self.clock)?;
        let Some(id) = task.id else {
            return Err(ServiceError::MissingId);
        };
        if !self.store.replace(task.clone())? {
            return Err(ServiceError::NotFound(id));
        }
        debug!(date = %task.date, "task updated");
        Ok(task)
    }

    pub fn update_task_by_id(&self, id: &str, mut task: Task) -> Result<Task, ServiceError> {
        task.id = Some(parse_id(id)?);
        self.update_task(task)
    }

    #[instrument(skip(self))]
    pub fn delete_task(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_id(id)?;
        if !self.store.remove(id)? {
            return Err(ServiceError::NotFound(id));
        }
        info!(task_id = id, "task deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn complete_task(&self, id: &str) -> Result<Option<Task>, ServiceError> {
        let mut task = self.get_task(id)?;
        let id = task.id.ok_or(ServiceError::MissingId)?;
        if !task.is_recurring() {
            self.store.remove(id)?;
            info!(task_id = id, "one-off task completed and removed");
            return Ok(None);
        }

        let current = CanonicalDate::parse(&task.date)?;
        let reference = current.date().and_time(NaiveTime::MIN);
        task.date = planner_core::next_date(reference, &task.date, &task.repeat)?;
        if !self.store.replace(task.clone())? {
            return Err(ServiceError::NotFound(id));
        }
        info!(task_id = id, next = %task.date, repeat = %task.repeat, "recurring task advanced");
        Ok(Some(task))
    }

    pub fn list_tasks(&self, search: Option<&str>) -> Result<Vec<Task>, ServiceError> {
        let tasks = self.store.list()?;
        let filter = search.map(str::trim).filter(|term| !term.is_empty()).map(SearchFilter::new);
        let selected = tasks
            .into_iter()
            .filter(|task| filter.as_ref().map_or(true, |f| f.accepts(task)))
            .take(self.list_limit)
            .collect::<Vec<_>>();
        debug!(count = selected.len(), ?search, "listed tasks");
        Ok(selected)
    }

    fn require_title(task: &Task) -> Result<(), ServiceError> {
        if task.title.trim().is_empty() {
            return Err(ServiceError::MissingTitle);
        }
        Ok(())
    }
}

enum SearchFilter {
    Date(String),
    Text(String),
}

impl SearchFilter {
    fn new(term: &str) -> Self {
        match NaiveDate::parse_from_str(term, SEARCH_DATE_FORMAT)
            .ok()
            .and_then(|date| CanonicalDate::new(date).ok())
        {
            Some(date) => Self::Date(date.to_string()),
            None => Self::Text(term.to_lowercase()),
        }
    }

    fn accepts(&self, task: &Task) -> bool {
        match self {
            Self::Date(date) => task.date == *date,
            Self::Text(needle) => {
                task.title.to_lowercase().contains(needle.as_str())
                    || task.comment.to_lowercase().contains(needle.as_str())
            }
        }
    }
}

fn parse_id(raw: &str) -> Result<u64, ServiceError> {
    raw.trim()
        .parse()
        .map_err(|_| ServiceError::InvalidId(raw.to_string()))
}
