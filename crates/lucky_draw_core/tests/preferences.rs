use lucky_draw_core::model::layout::{MAX_SCALE, MIN_SCALE};
use lucky_draw_core::repo::{CUSTOM_BACKGROUND_KEY, ORIGINAL_BACKGROUND_KEY, SCALE_KEY_PREFIX};
use lucky_draw_core::{
    BackgroundError, BackgroundService, CropArea, ElementPosition, ImageTransformer,
    KeyValueStore, LayoutRepository, MemoryStore, PersistedStore, TransformRequest,
};
use std::cell::RefCell;

#[derive(Default)]
struct RecordingTransformer {
    sources: RefCell<Vec<String>>,
}

impl ImageTransformer for RecordingTransformer {
    fn transform(&self, source: &str, request: &TransformRequest) -> Result<String, String> {
        self.sources.borrow_mut().push(source.to_string());
        Ok(format!(
            "{source}|crop={}x{}|rot={}",
            request.crop.width,
            request.crop.height,
            request.normalized_rotation()
        ))
    }
}

struct FailingTransformer;

impl ImageTransformer for FailingTransformer {
    fn transform(&self, _source: &str, _request: &TransformRequest) -> Result<String, String> {
        Err("decode failed".to_string())
    }
}

fn crop() -> CropArea {
    CropArea {
        x: 0.0,
        y: 0.0,
        width: 640.0,
        height: 360.0,
    }
}

#[test]
fn position_defaults_and_persists() {
    let store = PersistedStore::new(MemoryStore::new());
    let layout = LayoutRepository::new(&store);

    assert_eq!(layout.position("title"), ElementPosition::default());
    layout
        .save_position("title", ElementPosition::new(12.0, -30.0))
        .unwrap();
    assert_eq!(layout.position("title"), ElementPosition::new(12.0, -30.0));
    assert_eq!(
        layout.center("title").unwrap(),
        ElementPosition::new(0.0, -30.0)
    );
    assert_eq!(layout.position("other"), ElementPosition::default());
}

#[test]
fn zoom_steps_and_clamps() {
    let backend = MemoryStore::new();
    let store = PersistedStore::new(&backend);
    let layout = LayoutRepository::new(&store);

    assert_eq!(layout.zoom_in("slots").unwrap(), 1.1);
    assert_eq!(
        backend
            .get(&format!("{SCALE_KEY_PREFIX}slots"))
            .unwrap()
            .as_deref(),
        Some("1.1")
    );
    for _ in 0..40 {
        layout.zoom_in("slots").unwrap();
    }
    assert_eq!(layout.scale("slots"), MAX_SCALE);
    for _ in 0..40 {
        layout.zoom_out("slots").unwrap();
    }
    assert_eq!(layout.scale("slots"), MIN_SCALE);
}

#[test]
fn unparsable_scale_reads_as_default() {
    let backend = MemoryStore::new();
    backend
        .set(&format!("{SCALE_KEY_PREFIX}button"), "huge")
        .unwrap();
    let store = PersistedStore::new(&backend);
    assert_eq!(LayoutRepository::new(&store).scale("button"), 1.0);
}

#[test]
fn upload_sets_original_and_custom() {
    let backend = MemoryStore::new();
    let store = PersistedStore::new(&backend);
    let background = BackgroundService::new(&store);

    background.upload("data:image/png;base64,AAAA").unwrap();
    assert_eq!(
        backend.get(ORIGINAL_BACKGROUND_KEY).unwrap().as_deref(),
        Some("data:image/png;base64,AAAA")
    );
    assert_eq!(
        backend.get(CUSTOM_BACKGROUND_KEY).unwrap().as_deref(),
        Some("data:image/png;base64,AAAA")
    );
    assert!(matches!(
        background.upload("  "),
        Err(BackgroundError::InvalidRequest(_))
    ));
}

#[test]
fn edits_always_start_from_the_original() {
    let store = PersistedStore::new(MemoryStore::new());
    let background = BackgroundService::new(&store);
    let transformer = RecordingTransformer::default();
    background.upload("orig").unwrap();

    let mut request = TransformRequest::crop(crop());
    request.rotation_deg = -90.0;
    let first = background.apply_edit(&transformer, &request).unwrap();
    assert_eq!(first, "orig|crop=640x360|rot=270");
    background.apply_edit(&transformer, &request).unwrap();

    assert_eq!(*transformer.sources.borrow(), vec!["orig", "orig"]);
    assert_eq!(background.current().as_deref(), Some(first.as_str()));
    assert_eq!(background.original().as_deref(), Some("orig"));
}

#[test]
fn host_edit_replaces_display_and_keeps_original() {
    let store = PersistedStore::new(MemoryStore::new());
    let background = BackgroundService::new(&store);
    assert!(matches!(
        background.save_edit("cropped"),
        Err(BackgroundError::NoSource)
    ));

    background.upload("orig").unwrap();
    background.save_edit("cropped").unwrap();
    assert_eq!(background.current().as_deref(), Some("cropped"));
    assert_eq!(background.original().as_deref(), Some("orig"));

    assert!(matches!(
        background.save_edit(""),
        Err(BackgroundError::InvalidRequest(_))
    ));
    assert_eq!(background.current().as_deref(), Some("cropped"));
}

#[test]
fn edit_failures_leave_background_untouched() {
    let store = PersistedStore::new(MemoryStore::new());
    let background = BackgroundService::new(&store);

    assert!(matches!(
        background.apply_edit(&RecordingTransformer::default(), &TransformRequest::crop(crop())),
        Err(BackgroundError::NoSource)
    ));

    background.upload("orig").unwrap();
    assert!(matches!(
        background.apply_edit(&FailingTransformer, &TransformRequest::crop(crop())),
        Err(BackgroundError::Transform(_))
    ));

    let mut empty_crop = TransformRequest::crop(crop());
    empty_crop.crop.width = 0.0;
    assert!(matches!(
        background.apply_edit(&RecordingTransformer::default(), &empty_crop),
        Err(BackgroundError::InvalidRequest(_))
    ));
    assert_eq!(background.current().as_deref(), Some("orig"));

    background.reset();
    assert!(background.current().is_none());
    assert!(background.original().is_none());
}
