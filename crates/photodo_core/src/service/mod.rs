//! Use-case services over the task repository.
//!
//! # Responsibility
//! - Own the in-memory task list and keep it consistent with storage.
//! - Hold add-form state for presentation layers.

pub mod composer;
pub mod task_store;
