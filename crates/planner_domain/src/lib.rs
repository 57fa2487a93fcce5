pub mod error;
pub mod service;
pub mod store;

pub use crate::error::{ServiceError, StoreError};
pub use crate::service::{TaskService, TaskServiceBuilder, DEFAULT_LIST_LIMIT};
pub use crate::store::{JsonFileStore, MemoryStore, TaskStore};
