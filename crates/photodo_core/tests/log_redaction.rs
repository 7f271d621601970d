use chrono::NaiveDate;
use log::{LevelFilter, Log, Metadata, Record};
use photodo_core::repo::task_repo::decode_task_list;
use photodo_core::{
    KeyValueTaskRepository, MemoryKeyValueStorage, Photo, TaskPatch, TaskStore, TASK_LIST_KEY,
};
use std::sync::{Mutex, Once};

const SECRET: &str = "Secret diary entry";

/// Keeps every formatted log line in memory.
struct CapturingLogger {
    lines: Mutex<Vec<String>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("{} {}", record.level(), record.args()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    lines: Mutex::new(Vec::new()),
};
static INSTALL: Once = Once::new();

fn capture() {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
}

fn captured() -> Vec<String> {
    LOGGER.lines.lock().unwrap().clone()
}

fn assert_no_secret(lines: &[String]) {
    let leaked = lines
        .iter()
        .filter(|line| line.contains("Secret"))
        .collect::<Vec<_>>();
    assert!(leaked.is_empty(), "user text reached the log: {leaked:?}");
}

#[test]
fn skipped_elements_are_logged_without_their_content() {
    capture();
    let raw = format!(
        r#"[
            {{"id": "1", "title": "kept", "date": "2024-01-01", "photo": null}},
            "{SECRET}",
            {{"id": "2", "title": "{SECRET} title", "date": 20240101}},
            {{"id": "3", "title": "obj", "date": "2024-01-01", "photo": {{"path": "{SECRET}"}}}},
            {{"id": "4", "title": "flag", "date": "2024-01-01", "photo": true}}
        ]"#
    );

    let tasks = decode_task_list(&raw).unwrap();
    assert_eq!(tasks.len(), 3);

    let lines = captured();
    assert_no_secret(&lines);
    assert!(lines
        .iter()
        .any(|line| line.contains("index=1 reason=undecodable error_code=json_shape")));
    assert!(lines
        .iter()
        .any(|line| line.contains("reason=object_without_uri")));
    assert!(lines.iter().any(|line| line.contains("reason=unsupported_shape")));
}

#[test]
fn recovered_loads_log_codes_not_payloads() {
    capture();
    for payload in [format!(r#""{SECRET}""#), format!(r#"[{{"title": "{SECRET}"#)] {
        let storage = MemoryKeyValueStorage::with_item(TASK_LIST_KEY, &payload);
        let mut store = TaskStore::new(KeyValueTaskRepository::new(storage));
        assert_eq!(store.load_all(), 0);
    }

    let lines = captured();
    assert_no_secret(&lines);
    assert!(lines.iter().any(|line| {
        line.contains("status=recovered") && line.contains("error_code=task_list_invalid")
    }));
}

#[test]
fn store_mutations_log_counts_only() {
    capture();
    let mut store = TaskStore::new(KeyValueTaskRepository::new(MemoryKeyValueStorage::new()));
    store.load_all();
    let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();

    let id = store
        .add(SECRET, date, Photo::from_locator("file:///Secret/photo.jpg"))
        .unwrap()
        .unwrap();
    store.begin_edit(&id).unwrap();
    let patch = TaskPatch {
        title: Some(format!("{SECRET} edited")),
        date: Some(format!("{SECRET} date")),
        ..TaskPatch::default()
    };
    assert!(store.update(&id, patch).is_err());
    store.cancel_edit();
    assert!(store.remove(&id).unwrap());

    assert_no_secret(&captured());
}
