//! Per-element drag position and zoom scale.
//!
//! Positions are stored as JSON under `lucky_drag_<element>`; scales as a
//! bare float string under `lucky_scale_<element>`.

use super::{DRAG_KEY_PREFIX, SCALE_KEY_PREFIX};
use crate::model::layout::{clamp_scale, ElementPosition, DEFAULT_SCALE, SCALE_STEP};
use crate::store::{KeyValueStore, PersistedStore, StorageError};

pub struct LayoutRepository<'a, S: KeyValueStore> {
    store: &'a PersistedStore<S>,
}

impl<'a, S: KeyValueStore> LayoutRepository<'a, S> {
    pub fn new(store: &'a PersistedStore<S>) -> Self {
        Self { store }
    }

    /// Saved position, or the origin when absent or unreadable.
    pub fn position(&self, element: &str) -> ElementPosition {
        self.store
            .get_json(&drag_key(element))
            .unwrap_or_default()
    }

    pub fn save_position(
        &self,
        element: &str,
        position: ElementPosition,
    ) -> Result<(), StorageError> {
        self.store.set_json(&drag_key(element), &position)
    }

    /// Saved scale, or `DEFAULT_SCALE` when absent or unparsable.
    pub fn scale(&self, element: &str) -> f64 {
        self.store
            .get(&scale_key(element))
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .map_or(DEFAULT_SCALE, clamp_scale)
    }

    /// Persists a clamped scale and returns the stored value.
    pub fn save_scale(&self, element: &str, scale: f64) -> Result<f64, StorageError> {
        let scale = clamp_scale(scale);
        self.store.set(&scale_key(element), &scale.to_string())?;
        Ok(scale)
    }

    pub fn zoom_in(&self, element: &str) -> Result<f64, StorageError> {
        self.save_scale(element, self.scale(element) + SCALE_STEP)
    }

    pub fn zoom_out(&self, element: &str) -> Result<f64, StorageError> {
        self.save_scale(element, self.scale(element) - SCALE_STEP)
    }

    /// Resets the horizontal offset, keeping the vertical one.
    pub fn center(&self, element: &str) -> Result<ElementPosition, StorageError> {
        let position = self.position(element).centered();
        self.save_position(element, position)?;
        Ok(position)
    }
}

fn drag_key(element: &str) -> String {
    format!("{DRAG_KEY_PREFIX}{element}")
}

fn scale_key(element: &str) -> String {
    format!("{SCALE_KEY_PREFIX}{element}")
}
