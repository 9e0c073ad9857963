//! Draw session use-case service.
//!
//! # Responsibility
//! - Combine range settings, the history ledger and the draw engine into the
//!   spin/commit/cancel flow a host UI drives.
//! - Keep storage failures local: they are logged and degrade to "no data".
//!
//! # Invariants
//! - The current range always comes from saved settings, else config defaults.
//! - A spin is appended to history only on `commit_spin`, never on `spin`.
//! - Range edits are rejected while a draw is being revealed.

use crate::config::LuckyDrawConfig;
use crate::model::range::DrawRange;
use crate::model::spin::{slot_digits, SpinHistory};
use crate::repo::history_repo::HistoryLedger;
use crate::repo::settings_repo::RangeSettingsRepository;
use crate::repo::KEY_PREFIX;
use crate::service::draw_engine::{available_in, DrawEngine, DrawError};
use crate::service::export_service::{self, ExportFormat, ExportResult};
use crate::store::{KeyValueStore, PersistedStore};
use log::{info, warn};
use rand::Rng;

/// Stateful draw session over an injected storage backend.
pub struct LuckyDrawService<S: KeyValueStore> {
    store: PersistedStore<S>,
    engine: DrawEngine,
    config: LuckyDrawConfig,
}

impl<S: KeyValueStore> LuckyDrawService<S> {
    pub fn new(backend: S) -> Self {
        Self::with_config(backend, LuckyDrawConfig::default())
    }

    pub fn with_config(backend: S, config: LuckyDrawConfig) -> Self {
        Self {
            store: PersistedStore::new(backend),
            engine: DrawEngine::new(),
            config,
        }
    }

    pub fn store(&self) -> &PersistedStore<S> {
        &self.store
    }

    pub fn config(&self) -> &LuckyDrawConfig {
        &self.config
    }

    fn ledger(&self) -> HistoryLedger<'_, S> {
        HistoryLedger::new(&self.store)
    }

    fn settings(&self) -> RangeSettingsRepository<'_, S> {
        RangeSettingsRepository::new(&self.store)
    }

    /// Currently configured range.
    pub fn range(&self) -> DrawRange {
        self.settings().resolve(self.config.default_range())
    }

    /// Validates and saves a new range.
    ///
    /// Already drawn records are kept even when they fall outside the new range.
    pub fn set_range(&mut self, min: i64, max: i64) -> Result<DrawRange, DrawError> {
        if self.engine.is_drawing() {
            return Err(DrawError::Busy);
        }
        let range = DrawRange::new(min, max)?;
        if let Err(err) = self.settings().save(range) {
            warn!("event=range_save module=service status=degraded range={range} error={err}");
        }
        Ok(range)
    }

    pub fn history(&self) -> Option<SpinHistory> {
        self.ledger().load()
    }

    pub fn spin_count(&self) -> usize {
        self.ledger().count()
    }

    /// Last committed number, shown on the slots after a reload.
    pub fn current_number(&self) -> Option<i64> {
        self.ledger().last_number()
    }

    pub fn slot_digits(&self) -> [u8; 3] {
        slot_digits(self.current_number())
    }

    /// Numbers still drawable in the current range.
    pub fn available(&self) -> Result<Vec<i64>, DrawError> {
        available_in(self.range(), self.history().as_ref())
    }

    pub fn available_count(&self) -> Result<usize, DrawError> {
        self.available().map(|available| available.len())
    }

    pub fn is_drawing(&self) -> bool {
        self.engine.is_drawing()
    }

    /// Starts a draw and returns the number to reveal. Nothing is persisted
    /// until `commit_spin`.
    pub fn spin<R: Rng>(&mut self, rng: &mut R) -> Result<i64, DrawError> {
        if self.engine.is_drawing() {
            return Err(DrawError::Busy);
        }
        let range = self.range();
        let available = self.available()?;
        let pending = self.engine.request_draw(range, &available, rng)?;
        Ok(pending.number)
    }

    /// Finishes the reveal and appends the drawn number to history.
    ///
    /// A failed history read or write is logged; the number is still returned.
    pub fn commit_spin(&mut self) -> Result<i64, DrawError> {
        let pending = self.engine.complete_reveal()?;
        let range = pending.range;
        if let Err(err) = self
            .ledger()
            .append(pending.number, range.min(), range.max())
        {
            warn!(
                "event=spin_commit module=service status=degraded number={} error={err}",
                pending.number
            );
        }
        Ok(pending.number)
    }

    /// Abandons an in-flight draw without touching history.
    pub fn cancel_spin(&mut self) -> Option<i64> {
        self.engine.cancel().map(|pending| pending.number)
    }

    pub fn clear_history(&self) {
        self.ledger().clear();
        info!("event=history_clear module=service status=ok");
    }

    /// Renders the current history in `format`.
    pub fn export(&self, format: ExportFormat) -> ExportResult<Vec<u8>> {
        let history = self.history();
        match format {
            ExportFormat::Json => export_service::to_json(history.as_ref()),
            ExportFormat::Csv => {
                export_service::to_csv(history.as_ref(), self.config.export_offset())
            }
        }
    }

    /// Replaces history with an exported JSON document; returns the record count.
    ///
    /// An in-flight draw is cancelled first, since its exclusion set is stale.
    pub fn import_json(&mut self, bytes: &[u8]) -> ExportResult<usize> {
        let history = export_service::from_json(bytes)?;
        if let Some(discarded) = self.cancel_spin() {
            info!("event=history_import module=service status=cancel_pending number={discarded}");
        }
        if let Err(err) = self.ledger().replace(&history) {
            warn!("event=history_import module=service status=degraded error={err}");
        }
        Ok(history.len())
    }

    /// Removes every persisted key owned by the draw core, including range
    /// settings, layout and background.
    pub fn reset_all(&mut self) -> usize {
        self.engine.cancel();
        let removed = self.store.remove_prefixed(KEY_PREFIX);
        info!("event=storage_reset module=service status=ok removed={removed}");
        removed
    }
}
