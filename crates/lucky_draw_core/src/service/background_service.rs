//! Background image upload and edit flow.
//!
//! Cropping, rotation and flipping are performed by an injected
//! `ImageTransformer`; this service only validates the request, picks the
//! edit source, and persists the outcome.

use crate::repo::background_repo::BackgroundRepository;
use crate::store::{KeyValueStore, PersistedStore, StorageError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Longest output edge; larger sources are scaled down before cropping.
pub const MAX_OUTPUT_SIZE: u32 = 3840;

/// Crop rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    pub crop: CropArea,
    pub rotation_deg: f64,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub max_output_size: u32,
}

impl TransformRequest {
    /// Crop-only request with no rotation or flips.
    pub fn crop(crop: CropArea) -> Self {
        Self {
            crop,
            rotation_deg: 0.0,
            flip_horizontal: false,
            flip_vertical: false,
            max_output_size: MAX_OUTPUT_SIZE,
        }
    }

    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> f64 {
        self.rotation_deg.rem_euclid(360.0)
    }

    fn validate(&self) -> Result<(), BackgroundError> {
        let crop = &self.crop;
        let finite = [crop.x, crop.y, crop.width, crop.height, self.rotation_deg]
            .iter()
            .all(|value| value.is_finite());
        if !finite {
            return Err(BackgroundError::InvalidRequest(
                "crop and rotation must be finite".to_string(),
            ));
        }
        if crop.width <= 0.0 || crop.height <= 0.0 {
            return Err(BackgroundError::InvalidRequest(format!(
                "crop size must be positive, got {}x{}",
                crop.width, crop.height
            )));
        }
        if self.max_output_size == 0 {
            return Err(BackgroundError::InvalidRequest(
                "max_output_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Produces a transformed image source string from an encoded source image.
pub trait ImageTransformer {
    fn transform(&self, source: &str, request: &TransformRequest) -> Result<String, String>;
}

#[derive(Debug)]
pub enum BackgroundError {
    /// No uploaded image to edit.
    NoSource,
    InvalidRequest(String),
    Transform(String),
    Storage(StorageError),
}

impl Display for BackgroundError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSource => write!(f, "no background image to edit"),
            Self::InvalidRequest(message) => write!(f, "invalid edit request: {message}"),
            Self::Transform(message) => write!(f, "image transform failed: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackgroundError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for BackgroundError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

pub struct BackgroundService<'a, S: KeyValueStore> {
    repo: BackgroundRepository<'a, S>,
}

impl<'a, S: KeyValueStore> BackgroundService<'a, S> {
    pub fn new(store: &'a PersistedStore<S>) -> Self {
        Self {
            repo: BackgroundRepository::new(store),
        }
    }

    /// Stores a fresh upload; it becomes both the original and displayed image.
    pub fn upload(&self, data: &str) -> Result<(), BackgroundError> {
        if data.trim().is_empty() {
            return Err(BackgroundError::InvalidRequest(
                "uploaded image is empty".to_string(),
            ));
        }
        self.repo.set_upload(data)?;
        info!(
            "event=background_upload module=service status=ok bytes={}",
            data.len()
        );
        Ok(())
    }

    /// Transforms the original upload (or the displayed image when no original
    /// was kept) and stores the result as the displayed background.
    pub fn apply_edit<T: ImageTransformer + ?Sized>(
        &self,
        transformer: &T,
        request: &TransformRequest,
    ) -> Result<String, BackgroundError> {
        request.validate()?;
        let source = self
            .repo
            .original()
            .or_else(|| self.repo.custom())
            .ok_or(BackgroundError::NoSource)?;

        let edited = transformer.transform(&source, request).map_err(|message| {
            warn!("event=background_edit module=service status=error error={message}");
            BackgroundError::Transform(message)
        })?;
        self.repo.save_custom(&edited)?;
        info!(
            "event=background_edit module=service status=ok rotation={} flip_h={} flip_v={}",
            request.normalized_rotation(),
            request.flip_horizontal,
            request.flip_vertical
        );
        Ok(edited)
    }

    /// Stores an image edited by the host as the displayed background,
    /// keeping the original upload for the next edit.
    pub fn save_edit(&self, edited: &str) -> Result<(), BackgroundError> {
        if edited.trim().is_empty() {
            return Err(BackgroundError::InvalidRequest(
                "edited image is empty".to_string(),
            ));
        }
        if self.repo.original().is_none() && !self.repo.has_background() {
            return Err(BackgroundError::NoSource);
        }
        self.repo.save_custom(edited)?;
        info!(
            "event=background_edit module=service status=ok source=host bytes={}",
            edited.len()
        );
        Ok(())
    }

    pub fn current(&self) -> Option<String> {
        self.repo.custom()
    }

    pub fn original(&self) -> Option<String> {
        self.repo.original()
    }

    pub fn reset(&self) {
        self.repo.reset();
    }
}
