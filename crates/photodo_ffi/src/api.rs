//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the task store to Dart via FRB as sync, envelope-returning calls.
//! - Resolve presentation-only details such as the placeholder image.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One process-wide store; calls are serialized behind a mutex.
//! - The store is loaded from storage at most once per process.

use log::{info, warn};
use photodo_core::{
    core_version as core_version_inner, format_date as format_date_inner, format_ymd,
    init_logging as init_logging_inner, parse_date, ping as ping_inner, today as today_inner,
    KeyValueTaskRepository, Photo, SqliteKeyValueStorage, Task, TaskId, TaskPatch, TaskStore,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

const DB_FILE_NAME: &str = "photodo_tasks.sqlite3";
const DB_PATH_ENV: &str = "PHOTODO_DB_PATH";
/// Bundled asset rendered for tasks without a photo.
pub const PLACEHOLDER_IMAGE_ASSET: &str = "assets/noimage.jpg";

type FfiStore = TaskStore<KeyValueTaskRepository<SqliteKeyValueStorage>>;

struct StoreState {
    db_path: PathBuf,
    store: FfiStore,
}

static STORE_STATE: Mutex<Option<StoreState>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive); blank
///   selects the build default.
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the to-do list as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Stored locator, `None` when the task has no photo.
    pub photo_uri: Option<String>,
    /// What to render: the locator, or [`PLACEHOLDER_IMAGE_ASSET`].
    pub image_source: String,
}

impl From<&Task> for TodoItem {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            date: task.date.clone(),
            photo_uri: task.photo.locator().map(str::to_string),
            image_source: image_source(&task.photo).to_string(),
        }
    }
}

/// List envelope, newest task first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    pub ok: bool,
    pub items: Vec<TodoItem>,
    pub message: String,
}

impl TodoListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message: message.into(),
        }
    }
}

/// Result envelope for list mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    /// Whether the call completed without error. A no-op is still `ok`.
    pub ok: bool,
    /// Affected task id, absent for no-ops and failures.
    pub task_id: Option<String>,
    pub message: String,
}

impl TodoActionResponse {
    fn success(message: impl Into<String>, task_id: Option<String>) -> Self {
        Self {
            ok: true,
            task_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Edit-modal envelope carrying the open draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraftResponse {
    pub ok: bool,
    pub draft: Option<TodoItem>,
    pub message: String,
}

impl TodoDraftResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            draft: None,
            message: message.into(),
        }
    }
}

/// Opens the task database and loads the list.
///
/// Path precedence: `db_path` argument, then `PHOTODO_DB_PATH`, then a file
/// in the system temp directory. Once a store is open, later calls return
/// the current list and ignore `db_path` unless it names a different file,
/// which is reported as an error.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_init(db_path: Option<String>) -> TodoListResponse {
    let requested = db_path
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from);

    let mut guard = lock_state();
    if let Some(state) = guard.as_ref() {
        if requested.as_ref().is_some_and(|path| *path != state.db_path) {
            return TodoListResponse::failure(format!(
                "todo_init failed: store already open at `{}`",
                state.db_path.display()
            ));
        }
        return list_response(&state.store);
    }

    let path = requested.unwrap_or_else(default_db_path);
    match open_state(path) {
        Ok(state) => list_response(&guard.insert(state).store),
        Err(err) => TodoListResponse::failure(format!("todo_init failed: {err}")),
    }
}

/// Returns the committed list, opening the default store when needed.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_list() -> TodoListResponse {
    match with_store(|store| list_response(store)) {
        Ok(response) => response,
        Err(err) => TodoListResponse::failure(format!("todo_list failed: {err}")),
    }
}

/// Adds a task at the top of the list.
///
/// - `date`: `YYYY-MM-DD` as selected in the date picker.
/// - `photo_uri`: captured/picked locator; `None` or blank for no photo.
///
/// A blank title is an `ok` no-op without `task_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_add(title: String, date: String, photo_uri: Option<String>) -> TodoActionResponse {
    let Some(date) = parse_date(date.trim()) else {
        return TodoActionResponse::failure(format!(
            "todo_add failed: date must be YYYY-MM-DD, got `{date}`"
        ));
    };
    let photo = Photo::from(photo_uri);

    match with_store(|store| store.add(&title, date, photo)) {
        Ok(Ok(Some(id))) => TodoActionResponse::success("Task added.", Some(id.into_inner())),
        Ok(Ok(None)) => TodoActionResponse::success("Nothing to add.", None),
        Ok(Err(err)) => TodoActionResponse::failure(format!("todo_add failed: {err}")),
        Err(err) => TodoActionResponse::failure(format!("todo_add failed: {err}")),
    }
}

/// Deletes a task. The UI asks for confirmation before calling this.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_remove(id: String) -> TodoActionResponse {
    let task_id = TaskId::from(id);
    match with_store(|store| store.remove(&task_id)) {
        Ok(Ok(true)) => TodoActionResponse::success("Task deleted.", Some(task_id.into_inner())),
        Ok(Ok(false)) => TodoActionResponse::success("Task not found.", None),
        Ok(Err(err)) => TodoActionResponse::failure(format!("todo_remove failed: {err}")),
        Err(err) => TodoActionResponse::failure(format!("todo_remove failed: {err}")),
    }
}

/// Opens the edit draft for `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_begin_edit(id: String) -> TodoDraftResponse {
    let task_id = TaskId::from(id);
    match with_store(|store| store.begin_edit(&task_id).map(TodoItem::from)) {
        Ok(Ok(draft)) => TodoDraftResponse {
            ok: true,
            draft: Some(draft),
            message: "Editing.".to_string(),
        },
        Ok(Err(err)) => TodoDraftResponse::failure(format!("todo_begin_edit failed: {err}")),
        Err(err) => TodoDraftResponse::failure(format!("todo_begin_edit failed: {err}")),
    }
}

/// Changes fields of the open draft without saving.
///
/// `None` keeps a field; a blank `photo_uri` removes the photo. The date is
/// free text here and is checked on save.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_update_draft(
    title: Option<String>,
    date: Option<String>,
    photo_uri: Option<String>,
) -> TodoDraftResponse {
    let patch = TaskPatch {
        title,
        date,
        photo: photo_uri.map(Photo::from_locator),
    };
    let result = with_store(|store| store.edit_draft(&patch).map(TodoItem::from));
    match result {
        Ok(Some(draft)) => TodoDraftResponse {
            ok: true,
            draft: Some(draft),
            message: "Draft updated.".to_string(),
        },
        Ok(None) => TodoDraftResponse::failure("todo_update_draft failed: no open draft"),
        Err(err) => TodoDraftResponse::failure(format!("todo_update_draft failed: {err}")),
    }
}

/// Saves the open draft over its task. The draft stays open on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_save_edit() -> TodoActionResponse {
    let result = with_store(|store| {
        let id = store.draft().map(|draft| draft.id.to_string());
        store.save_edit().map(|saved| saved.then_some(id).flatten())
    });
    match result {
        Ok(Ok(Some(id))) => TodoActionResponse::success("Task updated.", Some(id)),
        Ok(Ok(None)) => TodoActionResponse::success("No open draft.", None),
        Ok(Err(err)) => TodoActionResponse::failure(format!("todo_save_edit failed: {err}")),
        Err(err) => TodoActionResponse::failure(format!("todo_save_edit failed: {err}")),
    }
}

/// Closes the edit draft without saving.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_cancel_edit() -> TodoActionResponse {
    match with_store(|store| store.cancel_edit()) {
        Ok(Some(draft)) => {
            TodoActionResponse::success("Edit cancelled.", Some(draft.id.into_inner()))
        }
        Ok(None) => TodoActionResponse::success("No open draft.", None),
        Err(err) => TodoActionResponse::failure(format!("todo_cancel_edit failed: {err}")),
    }
}

/// Formats a calendar date as `YYYY-MM-DD`; `month` is 1-based.
///
/// Returns an empty string for impossible dates.
#[flutter_rust_bridge::frb(sync)]
pub fn format_date(year: i32, month: u32, day: u32) -> String {
    format_ymd(year, month, day).unwrap_or_default()
}

/// Today's local date as `YYYY-MM-DD`, the default for new tasks.
#[flutter_rust_bridge::frb(sync)]
pub fn today() -> String {
    format_date_inner(today_inner())
}

fn image_source(photo: &Photo) -> &str {
    photo.locator().unwrap_or(PLACEHOLDER_IMAGE_ASSET)
}

fn list_response(store: &FfiStore) -> TodoListResponse {
    let items = store.tasks().iter().map(TodoItem::from).collect::<Vec<_>>();
    let message = if items.is_empty() {
        "No tasks yet.".to_string()
    } else {
        format!("{} task(s).", items.len())
    };
    TodoListResponse {
        ok: true,
        items,
        message,
    }
}

fn lock_state() -> MutexGuard<'static, Option<StoreState>> {
    // Mutations commit by whole-vector replacement, so a poisoned guard still
    // holds a consistent list.
    STORE_STATE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_store<T>(f: impl FnOnce(&mut FfiStore) -> T) -> Result<T, String> {
    let mut guard = lock_state();
    let state = match guard.take() {
        Some(state) => state,
        None => open_state(default_db_path())?,
    };
    let state = guard.insert(state);
    Ok(f(&mut state.store))
}

fn open_state(db_path: PathBuf) -> Result<StoreState, String> {
    let storage = SqliteKeyValueStorage::open(&db_path)
        .map_err(|err| format!("task DB open failed: {err}"))?;
    let mut store = TaskStore::new(KeyValueTaskRepository::new(storage));
    let count = store.load_all();
    info!("event=ffi_store_open module=ffi status=ok task_count={count}");
    Ok(StoreState { db_path, store })
}

fn default_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
        warn!("event=ffi_store_open module=ffi status=fallback reason=blank_env_path");
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, default_db_path, format_date, image_source, init_logging, ping, todo_add,
        todo_begin_edit, todo_cancel_edit, todo_init, todo_list, todo_remove, todo_save_edit,
        todo_update_draft, PLACEHOLDER_IMAGE_ASSET,
    };
    use photodo_core::Photo;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn format_date_zero_pads_and_rejects_impossible_dates() {
        assert_eq!(format_date(2024, 3, 7), "2024-03-07");
        assert_eq!(format_date(2024, 13, 1), "");
    }

    #[test]
    fn missing_photo_renders_placeholder() {
        assert_eq!(image_source(&Photo::None), PLACEHOLDER_IMAGE_ASSET);
        assert_eq!(
            image_source(&Photo::from_locator("file:///x.jpg")),
            "file:///x.jpg"
        );
    }

    #[test]
    fn add_lists_newest_first_and_remove_deletes() {
        assert!(todo_init(None).ok);
        let first = todo_add(unique_token("first"), "2024-03-07".to_string(), None);
        let second = todo_add(
            unique_token("second"),
            "2024-03-08".to_string(),
            Some("file:///pic.jpg".to_string()),
        );
        assert!(first.ok, "{}", first.message);
        assert!(second.ok, "{}", second.message);
        let first_id = first.task_id.expect("first id");
        let second_id = second.task_id.expect("second id");

        let listed = todo_list();
        let position = |id: &str| listed.items.iter().position(|item| item.id == id);
        assert!(position(&second_id) < position(&first_id));
        let second_item = &listed.items[position(&second_id).expect("second listed")];
        assert_eq!(second_item.image_source, "file:///pic.jpg");

        let removed = todo_remove(first_id.clone());
        assert_eq!(removed.task_id.as_deref(), Some(first_id.as_str()));
        assert!(todo_list().items.iter().all(|item| item.id != first_id));
    }

    #[test]
    fn todo_init_rejects_switching_database_once_open() {
        assert!(todo_init(None).ok);

        let other = std::env::temp_dir().join(format!("{}.sqlite3", unique_token("other-db")));
        let rejected = todo_init(Some(other.display().to_string()));
        assert!(!rejected.ok);
        assert!(rejected.message.contains("already open"), "{}", rejected.message);
        assert!(rejected.items.is_empty());
        assert!(!other.exists());

        assert!(todo_init(Some("   ".to_string())).ok);
        assert!(todo_init(Some(default_db_path().display().to_string())).ok);
    }

    #[test]
    fn add_rejects_bad_date_and_skips_blank_title() {
        let bad = todo_add("task".to_string(), "03/07/2024".to_string(), None);
        assert!(!bad.ok);
        assert!(bad.message.contains("YYYY-MM-DD"));

        let blank = todo_add("   ".to_string(), "2024-03-07".to_string(), None);
        assert!(blank.ok);
        assert!(blank.task_id.is_none());
    }

    #[test]
    fn edit_flow_saves_and_cancels() {
        let added = todo_add(unique_token("edit"), "2024-03-07".to_string(), None);
        let id = added.task_id.expect("added id");

        let opened = todo_begin_edit(id.clone());
        assert!(opened.ok, "{}", opened.message);

        let title = unique_token("renamed");
        let updated = todo_update_draft(Some(title.clone()), Some("2024-12-25".to_string()), None);
        assert_eq!(updated.draft.expect("draft").title, title);

        let cancelled = todo_cancel_edit();
        assert_eq!(cancelled.task_id.as_deref(), Some(id.as_str()));

        assert!(todo_begin_edit(id.clone()).ok);
        todo_update_draft(Some(title.clone()), Some("not a date".to_string()), None);
        let rejected = todo_save_edit();
        assert!(!rejected.ok);

        todo_update_draft(None, Some("2024-12-25".to_string()), None);
        let saved = todo_save_edit();
        assert!(saved.ok, "{}", saved.message);

        let item = todo_list()
            .items
            .into_iter()
            .find(|item| item.id == id)
            .expect("edited task listed");
        assert_eq!(item.title, title);
        assert_eq!(item.date, "2024-12-25");
        assert_eq!(item.image_source, PLACEHOLDER_IMAGE_ASSET);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
