//! Flutter-facing bindings for Photodo core.

pub mod api;
