//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `photodo_core` linkage and storage bootstrap without a UI host.
//! - Keep output deterministic apart from today's date.

use photodo_core::{
    format_date, today, KeyValueTaskRepository, SqliteKeyValueStorage, TaskStore, TASK_LIST_KEY,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("photodo_core ping={}", photodo_core::ping());
    println!("photodo_core version={}", photodo_core::core_version());
    println!("photodo_core today={}", format_date(today()));

    // In-memory only: the probe must never touch a real task list.
    let storage = match SqliteKeyValueStorage::open_in_memory() {
        Ok(storage) => storage,
        Err(err) => {
            eprintln!("photodo_core storage=error {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut store = TaskStore::new(KeyValueTaskRepository::new(storage));
    println!(
        "photodo_core storage=ok key={TASK_LIST_KEY} task_count={}",
        store.load_all()
    );
    ExitCode::SUCCESS
}
