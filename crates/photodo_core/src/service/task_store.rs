//! In-memory task list with write-through persistence.
//!
//! # Responsibility
//! - Own the ordered task list and the single edit draft.
//! - Persist the full list on every mutation before committing it in memory.
//!
//! # Invariants
//! - List order is newest-first; update keeps position, remove keeps the
//!   relative order of the rest.
//! - Task ids are unique within the list.
//! - A failed write leaves the in-memory list untouched.
//! - Load failures never reach callers; they degrade to an empty list.

use crate::logging::LogCode;
use crate::model::task::{Photo, Task, TaskId, TaskPatch, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskRepository};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Task store operation error.
#[derive(Debug)]
pub enum StoreError {
    /// Persisting the new list failed; memory was not changed.
    Repo(RepoError),
    Validation(TaskValidationError),
    TaskNotFound(TaskId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::TaskNotFound(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Open edit draft, pinned to the task it was opened for.
struct EditDraft {
    target: TaskId,
    task: Task,
}

/// Single-owner task list backed by a [`TaskRepository`].
pub struct TaskStore<R: TaskRepository> {
    repo: R,
    tasks: Vec<Task>,
    draft: Option<EditDraft>,
    loaded: bool,
}

impl<R: TaskRepository> TaskStore<R> {
    /// Creates an empty, not-yet-loaded store.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            tasks: Vec::new(),
            draft: None,
            loaded: false,
        }
    }

    /// Loads the persisted list once and returns the resulting task count.
    ///
    /// Missing, unreadable or malformed payloads all yield an empty list.
    /// Calls after the first are no-ops so a late reload cannot clobber
    /// unsaved memory state.
    pub fn load_all(&mut self) -> usize {
        if self.loaded {
            debug!("event=task_load module=store status=skip reason=already_loaded");
            return self.tasks.len();
        }
        self.loaded = true;

        let started_at = Instant::now();
        match self.repo.load() {
            Ok(tasks) => {
                self.tasks = tasks;
                info!(
                    "event=task_load module=store status=ok task_count={} duration_ms={}",
                    self.tasks.len(),
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => {
                self.tasks = Vec::new();
                error!(
                    "event=task_load module=store status=recovered task_count=0 duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    err.log_code()
                );
            }
        }
        self.tasks.len()
    }

    /// Adds a task at the front of the list.
    ///
    /// Returns `Ok(None)` without writing when the trimmed title is empty.
    ///
    /// # Errors
    /// - `StoreError::Repo` when persisting fails; the list is unchanged.
    pub fn add(
        &mut self,
        title: &str,
        date: NaiveDate,
        photo: Photo,
    ) -> StoreResult<Option<TaskId>> {
        if title.trim().is_empty() {
            debug!("event=task_add module=store status=skip reason=empty_title");
            return Ok(None);
        }

        let mut task = Task::new(title, date, photo);
        while self.contains(&task.id) {
            task.id = TaskId::generate();
        }
        task.validate()?;

        let id = task.id.clone();
        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(task);
        next.extend(self.tasks.iter().cloned());

        self.commit(next, "task_add")?;
        Ok(Some(id))
    }

    /// Removes the task with `id`.
    ///
    /// Confirmation is the caller's job; this always removes. Returns
    /// `Ok(false)` without writing when no task matches. An open draft for
    /// the removed task is discarded.
    pub fn remove(&mut self, id: &TaskId) -> StoreResult<bool> {
        if !self.contains(id) {
            debug!("event=task_remove module=store status=skip reason=not_found");
            return Ok(false);
        }

        let next = self
            .tasks
            .iter()
            .filter(|task| task.id != *id)
            .cloned()
            .collect::<Vec<_>>();
        self.commit(next, "task_remove")?;

        if self.draft.as_ref().is_some_and(|draft| draft.target == *id) {
            self.draft = None;
        }
        Ok(true)
    }

    /// Opens a draft copy of the task with `id`, replacing any open draft.
    ///
    /// The draft stays bound to `id` until it is saved or discarded.
    pub fn begin_edit(&mut self, id: &TaskId) -> StoreResult<&Task> {
        let task = self
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;
        let draft = self.draft.insert(EditDraft {
            target: id.clone(),
            task,
        });
        Ok(&draft.task)
    }

    pub fn draft(&self) -> Option<&Task> {
        self.draft.as_ref().map(|draft| &draft.task)
    }

    /// Applies `patch` to the open draft without saving it.
    ///
    /// Changes stay out of the list until [`TaskStore::save_edit`] or
    /// [`TaskStore::update`] succeeds. Returns `None` when no draft is open.
    pub fn edit_draft(&mut self, patch: &TaskPatch) -> Option<&Task> {
        let draft = self.draft.as_mut()?;
        patch.apply_to(&mut draft.task);
        Some(&draft.task)
    }

    /// Discards the open draft, returning it.
    pub fn cancel_edit(&mut self) -> Option<Task> {
        self.draft.take().map(|draft| draft.task)
    }

    /// Saves the open draft with `patch` applied, replacing the whole record.
    ///
    /// Returns `Ok(false)` when no draft is open or its id differs from `id`.
    /// On success the draft is closed. On validation or write failure the
    /// draft stays open, unpatched, so the caller can fix it and retry.
    ///
    /// # Errors
    /// - `StoreError::Validation` for an empty title or a non `YYYY-MM-DD` date.
    /// - `StoreError::TaskNotFound` when the task vanished; the draft is closed.
    /// - `StoreError::Repo` when persisting fails; the list is unchanged.
    pub fn update(&mut self, id: &TaskId, patch: TaskPatch) -> StoreResult<bool> {
        let Some(draft) = self.draft.as_ref() else {
            debug!("event=task_update module=store status=skip reason=no_draft");
            return Ok(false);
        };
        if draft.target != *id {
            warn!("event=task_update module=store status=skip reason=draft_mismatch");
            return Ok(false);
        }

        let mut edited = draft.task.clone();
        edited.id = draft.target.clone();
        patch.apply_to(&mut edited);
        edited.title = edited.title.trim().to_string();
        edited.validate()?;

        let Some(position) = self.position(id) else {
            self.draft = None;
            return Err(StoreError::TaskNotFound(id.clone()));
        };

        let mut next = self.tasks.clone();
        next[position] = edited;
        self.commit(next, "task_update")?;
        self.draft = None;
        Ok(true)
    }

    /// Saves the open draft as-is. Returns `Ok(false)` when none is open.
    pub fn save_edit(&mut self) -> StoreResult<bool> {
        match self.draft.as_ref().map(|draft| draft.target.clone()) {
            Some(id) => self.update(&id, TaskPatch::default()),
            None => Ok(false),
        }
    }

    /// Committed tasks, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == *id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == *id)
    }

    fn commit(&mut self, next: Vec<Task>, event: &'static str) -> StoreResult<()> {
        let started_at = Instant::now();
        if let Err(err) = self.repo.save(&next) {
            error!(
                "event={event} module=store status=error task_count={} duration_ms={} error_code={}",
                self.tasks.len(),
                started_at.elapsed().as_millis(),
                err.log_code()
            );
            return Err(err.into());
        }

        self.tasks = next;
        info!(
            "event={event} module=store status=ok task_count={} duration_ms={}",
            self.tasks.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStore;
    use crate::model::task::{Photo, TaskId, TaskPatch};
    use crate::repo::task_repo::KeyValueTaskRepository;
    use crate::storage::MemoryKeyValueStorage;
    use chrono::NaiveDate;

    fn store() -> TaskStore<KeyValueTaskRepository<MemoryKeyValueStorage>> {
        let mut store = TaskStore::new(KeyValueTaskRepository::new(MemoryKeyValueStorage::new()));
        store.load_all();
        store
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).expect("date")
    }

    #[test]
    fn load_all_runs_once() {
        let mut store = store();
        store.add("kept", date(), Photo::None).expect("add");
        assert!(store.is_loaded());
        assert_eq!(store.load_all(), 1);
        assert_eq!(store.tasks()[0].title, "kept");
    }

    #[test]
    fn begin_edit_unknown_id_fails() {
        let mut store = store();
        let err = store
            .begin_edit(&TaskId::from("missing"))
            .expect_err("unknown id must fail");
        assert!(err.to_string().contains("missing"));
        assert!(store.draft().is_none());
    }

    #[test]
    fn removing_the_edited_task_discards_the_draft() {
        let mut store = store();
        let id = store
            .add("doomed", date(), Photo::None)
            .expect("add")
            .expect("id");
        store.begin_edit(&id).expect("edit");

        assert!(store.remove(&id).expect("remove"));
        assert!(store.draft().is_none());
    }

    #[test]
    fn draft_stays_bound_to_the_task_it_was_opened_for() {
        let mut store = store();
        let a = store.add("A", date(), Photo::None).expect("add").expect("id");
        let b = store.add("B", date(), Photo::None).expect("add").expect("id");
        store.begin_edit(&a).expect("edit");

        let patch = TaskPatch {
            title: Some("A edited".to_string()),
            ..TaskPatch::default()
        };
        assert!(!store.update(&b, patch.clone()).expect("mismatch is a no-op"));
        store.edit_draft(&patch).expect("draft open");
        assert!(store.save_edit().expect("save"));

        assert_eq!(store.get(&a).expect("a").title, "A edited");
        assert_eq!(store.get(&b).expect("b").title, "B");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn edit_draft_without_open_draft_returns_none() {
        let mut store = store();
        assert!(store.edit_draft(&TaskPatch::default()).is_none());
    }
}
