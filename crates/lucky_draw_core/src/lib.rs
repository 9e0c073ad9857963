//! Core domain logic for the lucky draw widget.
//! Owns draw invariants, persisted session state and history export.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, LuckyDrawConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::layout::ElementPosition;
pub use model::range::{DrawRange, InvalidRangeError, RangeSettings};
pub use model::spin::{slot_digits, HistoryValidationError, SpinHistory, SpinRecord};
pub use repo::history_repo::HistoryLedger;
pub use repo::layout_repo::LayoutRepository;
pub use repo::settings_repo::RangeSettingsRepository;
pub use service::background_service::{
    BackgroundError, BackgroundService, CropArea, ImageTransformer, TransformRequest,
};
pub use service::draw_engine::{compute_available, draw, DrawEngine, DrawError, DrawPhase};
pub use service::draw_service::LuckyDrawService;
pub use service::export_service::{export_file_name, ExportError, ExportFormat};
pub use store::{KeyValueStore, MemoryStore, PersistedStore, SqliteStore, StorageError, StoreError};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
