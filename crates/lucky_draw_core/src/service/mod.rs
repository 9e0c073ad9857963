//! Core use-case services.
//!
//! # Responsibility
//! - Keep random selection pure and I/O free (`draw_engine`).
//! - Orchestrate repositories and the engine into host-facing use-cases.
//! - Render history snapshots to downloadable files.

pub mod background_service;
pub mod draw_engine;
pub mod draw_service;
pub mod export_service;
