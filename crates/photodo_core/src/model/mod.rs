//! Domain model for the to-do list.
//!
//! # Invariants
//! - Every task is identified by a `TaskId` that is unique within its list.
//! - Photo placeholders are a presentation concern; only locators persist.

pub mod task;
