//! Flutter-facing bridge for the lucky draw core.

pub mod api;
