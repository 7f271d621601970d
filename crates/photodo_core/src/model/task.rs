//! Task record, photo attachment and edit patch.
//!
//! # Invariants
//! - `title` is non-empty and already trimmed for any task created or saved
//!   through the store.
//! - `date` is `YYYY-MM-DD` for any task created or saved through the store.
//! - Payloads from older builds are accepted as-is on load (see `Photo`).

use crate::date::{format_date, parse_date};
use chrono::NaiveDate;
use log::warn;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque, list-unique task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generates a fresh time-ordered identifier (UUIDv7).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Optional image attached to a task.
///
/// Persisted as a locator string or `null`. Older payloads may also carry
/// `{ "uri": "..." }` objects or numeric bundled-asset references; numbers
/// mean "placeholder" and load as `Photo::None`.
///
/// A `Remote` with a blank locator is treated as `None` everywhere, including
/// equality and serialization. Prefer [`Photo::from_locator`] to build values.
#[derive(Debug, Clone, Default)]
pub enum Photo {
    #[default]
    None,
    /// File path or content URI produced by the camera or gallery.
    Remote(String),
}

impl Photo {
    /// Wraps a locator; blank input means no photo.
    pub fn from_locator(locator: impl Into<String>) -> Self {
        let locator = locator.into();
        if locator.trim().is_empty() {
            Self::None
        } else {
            Self::Remote(locator)
        }
    }

    pub fn locator(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Remote(locator) if locator.trim().is_empty() => None,
            Self::Remote(locator) => Some(locator.as_str()),
        }
    }

    pub fn is_none(&self) -> bool {
        self.locator().is_none()
    }
}

impl PartialEq for Photo {
    fn eq(&self, other: &Self) -> bool {
        self.locator() == other.locator()
    }
}

impl Eq for Photo {}

impl From<Option<String>> for Photo {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::None, Self::from_locator)
    }
}

impl Serialize for Photo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.locator() {
            None => serializer.serialize_none(),
            Some(locator) => serializer.serialize_str(locator),
        }
    }
}

impl<'de> Deserialize<'de> for Photo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) | Some(Value::Number(_)) => Self::None,
            Some(Value::String(locator)) => Self::from_locator(locator),
            Some(Value::Object(mut fields)) => match fields.remove("uri") {
                Some(Value::String(locator)) => Self::from_locator(locator),
                _ => {
                    warn!("event=photo_decode module=model status=fallback reason=object_without_uri");
                    Self::None
                }
            },
            Some(_) => {
                warn!("event=photo_decode module=model status=fallback reason=unsupported_shape");
                Self::None
            }
        })
    }
}

/// One to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    #[serde(default, alias = "photos")]
    pub photo: Photo,
}

impl Task {
    /// Creates a task with a generated id and a formatted date.
    ///
    /// The title is trimmed but not checked; call [`Task::validate`].
    pub fn new(title: &str, date: NaiveDate, photo: Photo) -> Self {
        Self::with_id(TaskId::generate(), title.trim(), format_date(date), photo)
    }

    /// Creates a task with a caller-provided id, e.g. when importing.
    pub fn with_id(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        date: impl Into<String>,
        photo: Photo,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date: date.into(),
            photo,
        }
    }

    /// Checks the invariants required of any task written by the store.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.title.trim() != self.title {
            return Err(TaskValidationError::UntrimmedTitle);
        }
        if parse_date(&self.date).is_none() {
            return Err(TaskValidationError::InvalidDate(self.date.clone()));
        }
        Ok(())
    }
}

/// Field replacement applied to a draft before it is saved.
///
/// `None` keeps the draft's current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub photo: Option<Photo>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.date.is_none() && self.photo.is_none()
    }

    /// Applies the patch. Never touches `id`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(date) = &self.date {
            task.date = date.clone();
        }
        if let Some(photo) = &self.photo {
            task.photo = photo.clone();
        }
    }
}

/// Rejected task field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyId,
    EmptyTitle,
    UntrimmedTitle,
    InvalidDate(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id must not be empty"),
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::UntrimmedTitle => {
                write!(f, "task title must not have leading or trailing whitespace")
            }
            Self::InvalidDate(value) => {
                write!(f, "task date must be YYYY-MM-DD, got `{value}`")
            }
        }
    }
}

impl Error for TaskValidationError {}
