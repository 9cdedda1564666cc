use chrono::{TimeZone, Utc};
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

use ngo_docs_server::models::Bill;
use ngo_docs_server::storage::{
    CounterStore, JsonFileStore, RecordStore, StorageError, BILLS_KEY, RECEIPT_COUNTER_KEY,
};

fn bill(receipt_number: &str) -> Bill {
    Bill {
        id: format!("bill_{receipt_number}"),
        receipt_number: receipt_number.to_string(),
        name: "A. Rahman".to_string(),
        amount: 1250.5,
        received_by: "Treasurer".to_string(),
        date: "01.01.2026".to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 9, 30, 0).unwrap(),
    }
}

#[test]
fn test_counter_is_stored_as_plain_decimal() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    store.take().unwrap();
    store.take().unwrap();

    let raw = fs::read_to_string(dir.path().join(RECEIPT_COUNTER_KEY)).unwrap();
    assert_eq!(raw, "3");
}

#[test]
fn test_bill_history_uses_camel_case_fields() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    store.append_bill(bill("7")).unwrap();

    let raw = fs::read_to_string(dir.path().join("ngo_bills.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let entry = &json[0];
    assert_eq!(entry["receiptNumber"], "7");
    assert_eq!(entry["receivedBy"], "Treasurer");
    assert_eq!(entry["amount"], 1250.5);
    assert!(entry["createdAt"].as_str().unwrap().starts_with("2026-01-01T09:30:00"));
}

#[test]
fn test_existing_history_is_read_back() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("ngo_notices.json"),
        r#"[{"id":"notice_1","date":"05.02.2026","noticeNumber":"NTC00009","content":"<p>AGM</p>","createdAt":"2026-02-05T08:00:00Z"}]"#,
    )
    .unwrap();

    let store = JsonFileStore::new(dir.path());
    let notices = store.list_notices();

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].notice_number, "NTC00009");
    assert!(store.list_bills().is_empty());
}

#[test]
fn test_concurrent_takes_hand_out_distinct_numbers() {
    let dir = tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                (0..5)
                    .map(|_| store.take().unwrap())
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    let mut taken: Vec<u64> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    taken.sort_unstable();

    assert_eq!(taken, (1..=40).collect::<Vec<u64>>());
    assert_eq!(store.peek(), 41);
}

#[test]
fn test_histories_are_independent() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    store.append_bill(bill("1")).unwrap();
    store.append_bill(bill("2")).unwrap();

    assert_eq!(store.list_bills().len(), 2);
    assert!(store.list_notices().is_empty());
    assert_eq!(store.peek(), 1);
}

#[test]
fn test_append_refuses_history_with_unreadable_entry() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ngo_bills.json");
    let seeded = r#"[{"id":"bill_1","receiptNumber":"1","name":"Old Donor","amount":500,"receivedBy":"Treasurer","date":"01.12.2025","createdAt":"2025-12-01T10:00:00Z"},{"id":"bill_2","receiptNumber":"2","name":"Second Donor","amount":"700","receivedBy":"Treasurer","date":"02.12.2025","createdAt":"2025-12-02T10:00:00Z"}]"#;
    fs::write(&path, seeded).unwrap();

    let store = JsonFileStore::new(dir.path());
    let err = store.append_bill(bill("3")).unwrap_err();

    assert!(matches!(err, StorageError::Read { key: BILLS_KEY, .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), seeded);
    // Listing stays available, it just shows nothing it cannot read.
    assert!(store.list_bills().is_empty());
}

#[test]
fn test_take_refuses_garbled_counter() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(RECEIPT_COUNTER_KEY);
    fs::write(&path, "12a").unwrap();

    let store = JsonFileStore::new(dir.path());

    assert!(matches!(store.take(), Err(StorageError::Read { .. })));
    assert!(matches!(store.take(), Err(StorageError::Read { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), "12a");
}
