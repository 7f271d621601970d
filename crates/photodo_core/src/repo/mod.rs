//! Persistence adapter between the task store and key-value storage.
//!
//! # Invariants
//! - The whole task list is written as one JSON array under one key.
//! - Load failures are returned as typed errors; recovery policy belongs to
//!   the store.

pub mod task_repo;
