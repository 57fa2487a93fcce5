use std::path::PathBuf;

use planner_domain::DEFAULT_LIST_LIMIT;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub list_limit: usize,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup("TODO_DBFILE").filter(|p| !p.trim().is_empty()) {
            config.store_path = PathBuf::from(path.trim());
        }
        if let Some(limit) = lookup("TODO_LIST_LIMIT") {
            if let Ok(value) = limit.trim().parse::<usize>() {
                if value > 0 {
                    config.list_limit = value;
                }
            }
        }
        if let Some(filter) = lookup("TODO_LOG").filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter.trim().to_string();
        }
        config
    }

    pub fn apply_overrides(&mut self, store: Option<PathBuf>, limit: Option<usize>) {
        if let Some(path) = store {
            info!(path = %path.display(), "using task store from command line");
            self.store_path = path;
        }
        if let Some(limit) = limit.filter(|value| *value > 0) {
            self.list_limit = limit;
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("scheduler.json"),
            list_limit: DEFAULT_LIST_LIMIT,
            log_filter: "info".to_string(),
        }
    }
}
