use async_trait::async_trait;
use chrono::NaiveDate;
use futures::executor::block_on;
use photodo_core::{
    CaptureOptions, CaptureOutcome, DatePicker, KeyValueTaskRepository, MediaCapability,
    MediaCapture, MediaPlatform, MemoryKeyValueStorage, PermissionStatus, Photo, TaskComposer,
    TaskStore,
};
use std::cell::RefCell;

/// Platform double replaying a fixed permission answer and picker result.
struct ScriptedPlatform {
    permission: PermissionStatus,
    picked: Option<String>,
    alerts: RefCell<Vec<String>>,
    launches: RefCell<Vec<(MediaCapability, CaptureOptions)>>,
}

impl ScriptedPlatform {
    fn new(permission: PermissionStatus, picked: Option<&str>) -> Self {
        Self {
            permission,
            picked: picked.map(str::to_string),
            alerts: RefCell::new(Vec::new()),
            launches: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl MediaPlatform for ScriptedPlatform {
    async fn request_permission(&self, _capability: MediaCapability) -> PermissionStatus {
        self.permission
    }

    async fn launch(&self, capability: MediaCapability, options: CaptureOptions) -> Option<String> {
        self.launches.borrow_mut().push((capability, options));
        self.picked.clone()
    }

    fn show_alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

struct FixedPicker(Option<NaiveDate>);

#[async_trait(?Send)]
impl DatePicker for FixedPicker {
    async fn pick(&self, _initial: NaiveDate) -> Option<NaiveDate> {
        self.0
    }
}

#[test]
fn granted_camera_returns_locator() {
    let capture = MediaCapture::new(ScriptedPlatform::new(
        PermissionStatus::Granted,
        Some("file:///cam/1.jpg"),
    ));
    let platform = capture.platform();

    let outcome = block_on(capture.capture_photo());

    assert_eq!(
        outcome,
        CaptureOutcome::Captured("file:///cam/1.jpg".to_string())
    );
    let launches = platform.launches.borrow();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].0, MediaCapability::Camera);
    assert_eq!(launches[0].1, CaptureOptions::default());
    assert!(platform.alerts.borrow().is_empty());
}

#[test]
fn denied_permission_alerts_and_never_launches() {
    for status in [PermissionStatus::Denied, PermissionStatus::Undetermined] {
        let capture = MediaCapture::new(ScriptedPlatform::new(status, Some("file:///never.jpg")));
        let platform = capture.platform();

        let outcome = block_on(capture.pick_from_gallery());

        assert_eq!(outcome, CaptureOutcome::PermissionDenied);
        assert!(platform.launches.borrow().is_empty());
        assert_eq!(
            *platform.alerts.borrow(),
            vec![MediaCapability::MediaLibrary.permission_message().to_string()]
        );
    }
}

#[test]
fn cancelled_or_blank_selection_is_cancelled() {
    for picked in [None, Some("   ")] {
        let capture = MediaCapture::new(ScriptedPlatform::new(PermissionStatus::Granted, picked));

        assert_eq!(
            block_on(capture.pick_from_gallery()),
            CaptureOutcome::Cancelled
        );
        assert!(capture.platform().alerts.borrow().is_empty());
    }
}

#[test]
fn composer_submits_captured_photo_and_resets_form() {
    let capture = MediaCapture::new(ScriptedPlatform::new(
        PermissionStatus::Granted,
        Some("content://media/42"),
    ));
    let mut store = TaskStore::new(KeyValueTaskRepository::new(MemoryKeyValueStorage::new()));
    store.load_all();

    let start = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
    let picked = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let mut composer = TaskComposer::new(start);

    assert!(!block_on(composer.pick_date(&FixedPicker(None))));
    assert_eq!(composer.date(), start);
    assert!(block_on(composer.pick_date(&FixedPicker(Some(picked)))));

    composer.set_title("  Frame the print ");
    assert!(composer.attach(block_on(capture.capture_photo())));

    let id = composer.submit(&mut store).unwrap().unwrap();

    let task = store.get(&id).unwrap();
    assert_eq!(task.title, "Frame the print");
    assert_eq!(task.date, "2024-04-01");
    assert_eq!(task.photo, Photo::Remote("content://media/42".to_string()));

    assert_eq!(composer.title(), "");
    assert!(composer.photo().is_none());
    assert_eq!(composer.date_label(), "2024-04-01");
}

#[test]
fn composer_ignores_blank_titles() {
    let mut store = TaskStore::new(KeyValueTaskRepository::new(MemoryKeyValueStorage::new()));
    store.load_all();
    let mut composer = TaskComposer::new(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
    composer.set_title("   ");
    composer.attach(CaptureOutcome::Captured("file:///keep.jpg".to_string()));

    assert_eq!(composer.submit(&mut store).unwrap(), None);
    assert!(store.is_empty());
    assert_eq!(composer.photo().locator(), Some("file:///keep.jpg"));
}
