//! Boundaries to host platform services.
//!
//! The host (mobile shell) implements the collaborator traits; core code only
//! encodes the permission/cancel flow and how results map onto tasks.

pub mod capability;
pub mod date_picker;
pub mod media;
