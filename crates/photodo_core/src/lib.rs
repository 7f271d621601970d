//! Core domain logic for Photodo, a photo to-do list.
//! This crate owns the task list invariants and their persistence.

pub mod date;
pub mod db;
pub mod logging;
pub mod model;
pub mod platform;
pub mod repo;
pub mod service;
pub mod storage;

pub use date::{format_date, format_ymd, parse_date, today};
pub use logging::{default_log_level, init_logging, LogCode};
pub use model::task::{Photo, Task, TaskId, TaskPatch, TaskValidationError};
pub use platform::capability::{parse_media_capability, MediaCapability, MediaCapabilityError};
pub use platform::date_picker::DatePicker;
pub use platform::media::{
    CaptureOptions, CaptureOutcome, MediaCapture, MediaPlatform, PermissionStatus,
};
pub use repo::task_repo::{
    KeyValueTaskRepository, RepoError, RepoResult, TaskRepository, TASK_LIST_KEY,
};
pub use service::composer::TaskComposer;
pub use service::task_store::{StoreError, StoreResult, TaskStore};
pub use storage::{
    KeyValueStorage, MemoryKeyValueStorage, SqliteKeyValueStorage, StorageError, StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
