//! Task list repository over a single key-value slot.
//!
//! # Responsibility
//! - Serialize the full task list on every save.
//! - Decode persisted payloads, including shapes written by older builds.
//!
//! # Invariants
//! - A missing key loads as an empty list, not an error.
//! - A payload that is not a JSON array is `RepoError::InvalidData`.
//! - Loaded lists never contain duplicate ids; the first occurrence wins.

use crate::logging::LogCode;
use crate::model::task::Task;
use crate::storage::{KeyValueStorage, StorageError};
use log::{info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage slot holding the serialized task list.
pub const TASK_LIST_KEY: &str = "MY_LIST_V1";

pub type RepoResult<T> = Result<T, RepoError>;

/// Task list persistence error.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    Encode(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode task list: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task list: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Whole-list persistence contract used by the task store.
pub trait TaskRepository {
    fn save(&self, tasks: &[Task]) -> RepoResult<()>;
    fn load(&self) -> RepoResult<Vec<Task>>;
}

/// Task repository writing a JSON array under one storage key.
pub struct KeyValueTaskRepository<S: KeyValueStorage> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> KeyValueTaskRepository<S> {
    /// Uses the default [`TASK_LIST_KEY`] slot.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, TASK_LIST_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<S: KeyValueStorage> TaskRepository for KeyValueTaskRepository<S> {
    fn save(&self, tasks: &[Task]) -> RepoResult<()> {
        let payload = serde_json::to_string(tasks).map_err(RepoError::Encode)?;
        self.storage.set_item(&self.key, &payload)?;
        Ok(())
    }

    fn load(&self) -> RepoResult<Vec<Task>> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            info!("event=task_list_load module=repo status=ok source=empty task_count=0");
            return Ok(Vec::new());
        };

        let tasks = decode_task_list(&raw)?;
        Ok(tasks)
    }
}

/// Decodes a persisted payload into a duplicate-free task list.
///
/// Elements that are not task records, or whose id is blank or repeated, are
/// skipped so one bad entry cannot hide the rest of the list.
pub fn decode_task_list(raw: &str) -> RepoResult<Vec<Task>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("payload is not valid JSON: {err}")))?;
    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            return Err(RepoError::InvalidData(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )));
        }
    };

    let total = elements.len();
    let mut seen = HashSet::with_capacity(total);
    let mut tasks = Vec::with_capacity(total);

    for (index, element) in elements.into_iter().enumerate() {
        let task = match serde_json::from_value::<Task>(element) {
            Ok(task) => task,
            Err(err) => {
                warn!(
                    "event=task_list_load module=repo status=skip index={index} reason=undecodable error_code={}",
                    err.log_code()
                );
                continue;
            }
        };
        if task.id.as_str().trim().is_empty() {
            warn!("event=task_list_load module=repo status=skip index={index} reason=empty_id");
            continue;
        }
        if !seen.insert(task.id.clone()) {
            warn!("event=task_list_load module=repo status=skip index={index} reason=duplicate_id");
            continue;
        }
        tasks.push(task);
    }

    info!(
        "event=task_list_load module=repo status=ok source=storage task_count={} skipped={}",
        tasks.len(),
        total - tasks.len()
    );
    Ok(tasks)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
