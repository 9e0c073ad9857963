//! FFI use-case API for host UI calls.
//!
//! # Responsibility
//! - Expose draw, history, export and preference use-cases to Dart via FRB.
//! - Own the single process-wide session so the reveal state survives
//!   between calls.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are reported through response envelopes, never by throwing.
//! - Calls before `open_session` fall back to a private in-memory store.

use chrono::NaiveDate;
use log::warn;
use lucky_draw_core::{
    core_version as core_version_inner, export_file_name, init_logging as init_logging_inner,
    ping as ping_inner, slot_digits, BackgroundService, ElementPosition, ExportFormat,
    KeyValueStore, LayoutRepository, LuckyDrawService, MemoryStore, SqliteStore,
};
use std::sync::{Mutex, MutexGuard};

/// Session backends; SQLite when a path was opened, memory otherwise.
enum SessionStore {
    Sqlite(SqliteStore),
    Memory(MemoryStore),
}

impl KeyValueStore for SessionStore {
    fn get(&self, key: &str) -> lucky_draw_core::store::StoreResult<Option<String>> {
        match self {
            Self::Sqlite(store) => store.get(key),
            Self::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> lucky_draw_core::store::StoreResult<()> {
        match self {
            Self::Sqlite(store) => store.set(key, value),
            Self::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> lucky_draw_core::store::StoreResult<()> {
        match self {
            Self::Sqlite(store) => store.remove(key),
            Self::Memory(store) => store.remove(key),
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> lucky_draw_core::store::StoreResult<Vec<String>> {
        match self {
            Self::Sqlite(store) => store.keys_with_prefix(prefix),
            Self::Memory(store) => store.keys_with_prefix(prefix),
        }
    }
}

static SESSION: Mutex<Option<LuckyDrawService<SessionStore>>> = Mutex::new(None);

fn lock_session() -> MutexGuard<'static, Option<LuckyDrawService<SessionStore>>> {
    SESSION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_session<T>(f: impl FnOnce(&mut LuckyDrawService<SessionStore>) -> T) -> T {
    let mut guard = lock_session();
    let session = guard.get_or_insert_with(|| {
        warn!("event=session_open module=ffi status=fallback mode=memory");
        LuckyDrawService::new(SessionStore::Memory(MemoryStore::new()))
    });
    f(session)
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Snapshot of everything the draw screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawState {
    pub min_value: i64,
    pub max_value: i64,
    /// `None` when the current range cannot be enumerated.
    pub available_count: Option<u64>,
    pub spin_count: u64,
    pub current_number: Option<i64>,
    pub digits: Vec<u8>,
    pub is_drawing: bool,
    /// Drawn numbers in draw order.
    pub history: Vec<i64>,
}

/// Result of starting or committing a spin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinResponse {
    pub ok: bool,
    pub number: Option<i64>,
    pub message: String,
}

/// Export payload ready to be saved by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
    pub message: String,
}

/// Persisted placement of one draggable element.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResponse {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

/// Opens (or creates) the durable session store at `db_path`.
///
/// Replaces any previous session, discarding an in-flight draw.
#[flutter_rust_bridge::frb(sync)]
pub fn open_session(db_path: String) -> ActionResponse {
    match SqliteStore::open(db_path.trim()) {
        Ok(store) => {
            *lock_session() = Some(LuckyDrawService::new(SessionStore::Sqlite(store)));
            ActionResponse::success("Session opened.")
        }
        Err(err) => ActionResponse::failure(format!("open_session failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn draw_state() -> DrawState {
    with_session(|session| {
        let range = session.range();
        let history = session
            .history()
            .map(|history| history.numbers().collect::<Vec<_>>())
            .unwrap_or_default();
        let current_number = history.last().copied();
        DrawState {
            min_value: range.min(),
            max_value: range.max(),
            available_count: session.available_count().ok().map(|count| count as u64),
            spin_count: history.len() as u64,
            current_number,
            digits: slot_digits(current_number).to_vec(),
            is_drawing: session.is_drawing(),
            history,
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn set_range(min_value: i64, max_value: i64) -> ActionResponse {
    with_session(|session| match session.set_range(min_value, max_value) {
        Ok(range) => ActionResponse::success(format!("Range set to {range}.")),
        Err(err) => ActionResponse::failure(err.to_string()),
    })
}

/// Starts a spin. The host runs its reveal animation, then calls
/// `spin_commit` (or `spin_cancel`).
#[flutter_rust_bridge::frb(sync)]
pub fn spin_start() -> SpinResponse {
    with_session(|session| match session.spin(&mut rand::rng()) {
        Ok(number) => SpinResponse {
            ok: true,
            number: Some(number),
            message: "Spinning.".to_string(),
        },
        Err(err) => SpinResponse {
            ok: false,
            number: None,
            message: err.to_string(),
        },
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn spin_commit() -> SpinResponse {
    with_session(|session| match session.commit_spin() {
        Ok(number) => SpinResponse {
            ok: true,
            number: Some(number),
            message: format!("Drew {number}."),
        },
        Err(err) => SpinResponse {
            ok: false,
            number: None,
            message: err.to_string(),
        },
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn spin_cancel() -> ActionResponse {
    with_session(|session| match session.cancel_spin() {
        Some(_) => ActionResponse::success("Spin cancelled."),
        None => ActionResponse::failure("No spin in progress."),
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn clear_history() -> ActionResponse {
    with_session(|session| {
        session.clear_history();
        ActionResponse::success("History cleared.")
    })
}

/// Exports history; `format` is `json` or `csv`, `today` is `YYYY-MM-DD`.
#[flutter_rust_bridge::frb(sync)]
pub fn export_history(format: String, today: String) -> ExportResponse {
    let failure = |message: String| ExportResponse {
        ok: false,
        file_name: String::new(),
        mime_type: String::new(),
        content: String::new(),
        message,
    };
    let Some(format) = ExportFormat::parse(&format) else {
        return failure(format!("unsupported export format `{format}`"));
    };
    let today = match today.trim().parse::<NaiveDate>() {
        Ok(date) => date,
        Err(err) => return failure(format!("invalid date `{today}`: {err}")),
    };

    with_session(|session| match session.export(format) {
        Ok(bytes) => ExportResponse {
            ok: true,
            file_name: export_file_name(format, today),
            mime_type: format.mime_type().to_string(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
            message: "History exported.".to_string(),
        },
        Err(err) => failure(err.to_string()),
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn import_history(content: String) -> ActionResponse {
    with_session(|session| match session.import_json(content.as_bytes()) {
        Ok(count) => ActionResponse::success(format!("Imported {count} record(s).")),
        Err(err) => ActionResponse::failure(format!("import_history failed: {err}")),
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn layout_get(element: String) -> LayoutResponse {
    with_session(|session| {
        let layout = LayoutRepository::new(session.store());
        let position = layout.position(&element);
        LayoutResponse {
            x: position.x,
            y: position.y,
            scale: layout.scale(&element),
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn layout_save_position(element: String, x: f64, y: f64) -> ActionResponse {
    with_session(|session| {
        match LayoutRepository::new(session.store())
            .save_position(&element, ElementPosition::new(x, y))
        {
            Ok(()) => ActionResponse::success("Position saved."),
            Err(err) => ActionResponse::failure(err.to_string()),
        }
    })
}

/// Steps the element scale; returns the resulting layout.
#[flutter_rust_bridge::frb(sync)]
pub fn layout_zoom(element: String, zoom_in: bool) -> LayoutResponse {
    with_session(|session| {
        let layout = LayoutRepository::new(session.store());
        let stepped = if zoom_in {
            layout.zoom_in(&element)
        } else {
            layout.zoom_out(&element)
        };
        let scale = stepped.unwrap_or_else(|_| layout.scale(&element));
        let position = layout.position(&element);
        LayoutResponse {
            x: position.x,
            y: position.y,
            scale,
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn layout_center(element: String) -> ActionResponse {
    with_session(
        |session| match LayoutRepository::new(session.store()).center(&element) {
            Ok(_) => ActionResponse::success("Element centered."),
            Err(err) => ActionResponse::failure(err.to_string()),
        },
    )
}

/// Currently displayed background image, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn background_current() -> Option<String> {
    with_session(|session| BackgroundService::new(session.store()).current())
}

/// Unedited upload, used as the source for the next host-side crop.
#[flutter_rust_bridge::frb(sync)]
pub fn background_original() -> Option<String> {
    with_session(|session| BackgroundService::new(session.store()).original())
}

#[flutter_rust_bridge::frb(sync)]
pub fn background_upload(data: String) -> ActionResponse {
    with_session(
        |session| match BackgroundService::new(session.store()).upload(&data) {
            Ok(()) => ActionResponse::success("Background saved."),
            Err(err) => ActionResponse::failure(err.to_string()),
        },
    )
}

/// Stores a host-side crop as the displayed background. The original upload
/// is kept so the next crop starts from it.
#[flutter_rust_bridge::frb(sync)]
pub fn background_save_edit(edited: String) -> ActionResponse {
    with_session(
        |session| match BackgroundService::new(session.store()).save_edit(&edited) {
            Ok(()) => ActionResponse::success("Background updated."),
            Err(err) => ActionResponse::failure(err.to_string()),
        },
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn background_reset() -> ActionResponse {
    with_session(|session| {
        BackgroundService::new(session.store()).reset();
        ActionResponse::success("Background removed.")
    })
}
