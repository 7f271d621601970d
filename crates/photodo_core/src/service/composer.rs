//! Add-form state: pending title, selected date and attached photo.
//!
//! # Invariants
//! - Submitting a blank title changes nothing.
//! - A successful submit clears title and photo but keeps the selected date.
//! - Dismissed pickers and failed captures leave the current selection as is.

use crate::date::{format_date, today};
use crate::model::task::{Photo, TaskId};
use crate::platform::date_picker::DatePicker;
use crate::platform::media::CaptureOutcome;
use crate::repo::task_repo::TaskRepository;
use crate::service::task_store::{StoreResult, TaskStore};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskComposer {
    title: String,
    date: NaiveDate,
    photo: Photo,
}

impl Default for TaskComposer {
    fn default() -> Self {
        Self::new(today())
    }
}

impl TaskComposer {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            title: String::new(),
            date,
            photo: Photo::None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Selected date as shown on the date button.
    pub fn date_label(&self) -> String {
        format_date(self.date)
    }

    pub fn photo(&self) -> &Photo {
        &self.photo
    }

    /// Applies a picker result; `None` (dismissed) keeps the current date.
    pub fn apply_picked_date(&mut self, picked: Option<NaiveDate>) -> bool {
        match picked {
            Some(date) => {
                self.date = date;
                true
            }
            None => false,
        }
    }

    /// Opens the host picker seeded with the current selection.
    pub async fn pick_date<D: DatePicker>(&mut self, picker: &D) -> bool {
        let picked = picker.pick(self.date).await;
        self.apply_picked_date(picked)
    }

    /// Attaches a captured photo. Cancelled or denied captures keep the
    /// previous attachment.
    pub fn attach(&mut self, outcome: CaptureOutcome) -> bool {
        match outcome {
            CaptureOutcome::Captured(locator) => {
                self.photo = Photo::from_locator(locator);
                !self.photo.is_none()
            }
            CaptureOutcome::Cancelled | CaptureOutcome::PermissionDenied => false,
        }
    }

    pub fn clear_photo(&mut self) {
        self.photo = Photo::None;
    }

    /// Adds the pending task to `store`.
    ///
    /// Form state is reset only when the task was actually stored, so a
    /// failed write keeps the user's input.
    pub fn submit<R: TaskRepository>(
        &mut self,
        store: &mut TaskStore<R>,
    ) -> StoreResult<Option<TaskId>> {
        let added = store.add(&self.title, self.date, self.photo.clone())?;
        if added.is_some() {
            self.title.clear();
            self.photo = Photo::None;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::TaskComposer;
    use crate::model::task::Photo;
    use crate::platform::media::CaptureOutcome;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).expect("date")
    }

    #[test]
    fn dismissed_picker_keeps_date() {
        let mut composer = TaskComposer::new(date(7));
        assert!(!composer.apply_picked_date(None));
        assert_eq!(composer.date_label(), "2024-03-07");

        assert!(composer.apply_picked_date(Some(date(9))));
        assert_eq!(composer.date_label(), "2024-03-09");
    }

    #[test]
    fn failed_capture_keeps_previous_photo() {
        let mut composer = TaskComposer::new(date(7));
        assert!(composer.attach(CaptureOutcome::Captured("a.jpg".to_string())));

        assert!(!composer.attach(CaptureOutcome::Cancelled));
        assert!(!composer.attach(CaptureOutcome::PermissionDenied));
        assert_eq!(composer.photo(), &Photo::Remote("a.jpg".to_string()));

        composer.clear_photo();
        assert!(composer.photo().is_none());
    }
}
