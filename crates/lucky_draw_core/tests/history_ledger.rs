use chrono::{DateTime, TimeZone, Utc};
use lucky_draw_core::repo::HISTORY_KEY;
use lucky_draw_core::{HistoryLedger, KeyValueStore, MemoryStore, PersistedStore};

fn frozen_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn load_on_fresh_store_is_absent() {
    let store = PersistedStore::new(MemoryStore::new());
    let ledger = HistoryLedger::new(&store);
    assert!(ledger.load().is_none());
    assert_eq!(ledger.count(), 0);
    assert_eq!(ledger.last_number(), None);
}

#[test]
fn append_adds_exactly_one_record_and_tracks_range() {
    let store = PersistedStore::new(MemoryStore::new());
    let ledger = HistoryLedger::new(&store);

    ledger.append(5, 1, 10).unwrap();
    let before = ledger.load().unwrap();
    ledger.append(8, 1, 20).unwrap();
    let after = ledger.load().unwrap();

    assert_eq!(after.len(), before.len() + 1);
    let last = after.records.last().unwrap();
    assert_eq!(last.number, 8);
    assert_eq!((last.min_range, last.max_range), (1, 20));
    assert_eq!((after.min_range, after.max_range), (1, 20));
    assert_eq!(after.records[0].max_range, 10);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(ledger.last_number(), Some(8));
}

#[test]
fn updated_at_strictly_increases_even_with_stalled_clock() {
    let store = PersistedStore::new(MemoryStore::new());
    let ledger = HistoryLedger::with_clock(&store, frozen_clock);

    ledger.append(1, 1, 3).unwrap();
    let first = ledger.load().unwrap();
    assert_eq!(first.created_at, "2024-01-01T00:00:00.000Z");
    assert_eq!(first.updated_at, "2024-01-01T00:00:00.000Z");

    ledger.append(2, 1, 3).unwrap();
    let second = ledger.load().unwrap();
    assert_eq!(second.updated_at, "2024-01-01T00:00:00.001Z");
    assert!(second.updated_at > first.updated_at);
}

#[test]
fn clear_is_idempotent() {
    let store = PersistedStore::new(MemoryStore::new());
    let ledger = HistoryLedger::new(&store);
    ledger.append(4, 1, 9).unwrap();

    ledger.clear();
    assert!(ledger.load().is_none());
    ledger.clear();
    assert!(ledger.load().is_none());
    assert_eq!(ledger.count(), 0);
}

#[test]
fn garbage_payload_loads_as_absent_and_append_starts_fresh() {
    let backend = MemoryStore::new();
    backend.set(HISTORY_KEY, "definitely not json").unwrap();
    let store = PersistedStore::new(&backend);
    let ledger = HistoryLedger::new(&store);

    assert!(ledger.load().is_none());
    ledger.append(3, 1, 5).unwrap();
    assert_eq!(ledger.count(), 1);
}

#[test]
fn failed_write_is_reported_without_panicking() {
    let backend = MemoryStore::new();
    let store = PersistedStore::new(&backend);
    let ledger = HistoryLedger::new(&store);
    ledger.append(1, 1, 5).unwrap();

    backend.fail_writes();
    assert!(ledger.append(2, 1, 5).is_err());
    assert_eq!(ledger.count(), 1);

    backend.disable();
    assert!(ledger.load().is_none());
    ledger.clear();
}

#[test]
fn append_after_failed_read_keeps_existing_ledger() {
    let backend = MemoryStore::new();
    let store = PersistedStore::new(&backend);
    let ledger = HistoryLedger::new(&store);
    for number in 1..=3 {
        ledger.append(number, 1, 10).unwrap();
    }

    backend.fail_reads();
    assert!(ledger.append(4, 1, 10).is_err());

    backend.restore();
    let numbers: Vec<i64> = ledger.load().unwrap().numbers().collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn stored_payload_uses_camel_case_schema() {
    let backend = MemoryStore::new();
    let store = PersistedStore::new(&backend);
    HistoryLedger::with_clock(&store, frozen_clock)
        .append(42, 1, 100)
        .unwrap();

    let raw = backend.get(HISTORY_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["records"][0]["number"], 42);
    assert_eq!(json["records"][0]["minRange"], 1);
    assert_eq!(json["records"][0]["maxRange"], 100);
    assert_eq!(json["records"][0]["timestamp"], "2024-01-01T00:00:00.000Z");
    assert_eq!(json["maxRange"], 100);
    assert!(json.get("createdAt").is_some());
    assert!(json.get("updatedAt").is_some());
}
