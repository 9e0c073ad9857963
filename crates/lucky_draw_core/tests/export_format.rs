use chrono::FixedOffset;
use lucky_draw_core::service::export_service::{from_json, to_csv, to_json};
use lucky_draw_core::{ExportError, HistoryValidationError, SpinHistory, SpinRecord};

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn single_record_history() -> SpinHistory {
    let mut history = SpinHistory::new(1, 100, "2024-01-01T00:00:00Z");
    history
        .records
        .push(SpinRecord::new(42, 1, 100, "2024-01-01T00:00:00Z"));
    history
}

#[test]
fn csv_has_header_and_one_row_per_record() {
    let bytes = to_csv(Some(&single_record_history()), utc()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines, vec!["Order,From,To,Number,Time", "1,1,100,42,1/1/2024 12:00:00 AM"]);
}

#[test]
fn csv_order_column_is_one_based_draw_order() {
    let mut history = single_record_history();
    history
        .records
        .push(SpinRecord::new(7, 1, 10, "2024-06-30T15:30:00.000Z"));

    let text = String::from_utf8(to_csv(Some(&history), utc()).unwrap()).unwrap();
    let rows: Vec<Vec<&str>> = text
        .lines()
        .skip(1)
        .map(|line| line.split(',').collect())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], vec!["2", "1", "10", "7", "6/30/2024 3:30:00 PM"]);
    assert!(rows.iter().all(|row| row.len() == 5));
}

#[test]
fn json_export_sets_date_to_timestamp() {
    let mut history = single_record_history();
    history.records[0].date = Some(serde_json::json!({"legacy": true}));

    let bytes = to_json(Some(&history)).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("\n  \"records\""), "export should be pretty-printed");

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let record = &json["records"][0];
    assert_eq!(record["date"], record["timestamp"]);
    assert_eq!(record["number"], 42);
    assert_eq!(json["minRange"], 1);
    assert_eq!(json["maxRange"], 100);
}

#[test]
fn empty_or_absent_history_cannot_be_exported() {
    let empty = SpinHistory::new(1, 10, "2024-01-01T00:00:00Z");
    assert!(matches!(to_json(None), Err(ExportError::EmptyHistory)));
    assert!(matches!(to_json(Some(&empty)), Err(ExportError::EmptyHistory)));
    assert!(matches!(to_csv(Some(&empty), utc()), Err(ExportError::EmptyHistory)));
}

#[test]
fn exported_json_imports_back() {
    let history = single_record_history();
    let imported = from_json(&to_json(Some(&history)).unwrap()).unwrap();
    assert_eq!(imported.records.len(), 1);
    assert_eq!(imported.records[0].number, 42);
    assert_eq!(imported.created_at, history.created_at);
}

#[test]
fn malformed_or_inverted_import_is_rejected() {
    assert!(matches!(from_json(b"[1, 2"), Err(ExportError::Json(_))));

    let inverted = br#"{"records": [], "minRange": 9, "maxRange": 1,
                        "createdAt": "", "updatedAt": ""}"#;
    assert!(matches!(from_json(inverted), Err(ExportError::Invalid(_))));
}

#[test]
fn import_rejects_repeated_or_out_of_range_numbers() {
    let record = |number: i64| {
        format!(
            r#"{{"number": {number}, "timestamp": "2024-01-01T00:00:00Z", "minRange": 1, "maxRange": 10}}"#
        )
    };
    let document = |records: &[String]| {
        format!(
            r#"{{"records": [{}], "minRange": 1, "maxRange": 10,
                "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}}"#,
            records.join(",")
        )
    };

    let repeated = document(&[record(5), record(5), record(7)]);
    let err = from_json(repeated.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Invalid(HistoryValidationError::DuplicateNumber { index: 1, number: 5 })
    ));

    let outside = document(&[record(5), record(42)]);
    let err = from_json(outside.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Invalid(HistoryValidationError::NumberOutOfRange { index: 1, number: 42, .. })
    ));

    assert_eq!(from_json(document(&[record(5), record(7)]).as_bytes()).unwrap().len(), 2);
}
