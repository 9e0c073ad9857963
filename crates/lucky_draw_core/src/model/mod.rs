//! Domain model for draw history, range settings and layout preferences.
//!
//! # Responsibility
//! - Define the persisted payload shapes and their JSON field names.
//! - Keep validation next to the data it protects.
//!
//! # Invariants
//! - Persisted JSON uses camelCase field names compatible with existing
//!   stored payloads.
//! - Records are immutable once appended to a history.

pub mod layout;
pub mod range;
pub mod spin;
