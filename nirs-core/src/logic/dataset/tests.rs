use super::record::{Fields, Record, RecordId};
use super::store::DatasetStore;
use super::filter::RecordFilter;
use chrono::Utc;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn record(id: u64, amount: f64, risk: f64, institution: &str) -> Record {
    let mut fields = Fields::new();
    fields.insert("transaction_id".into(), json!(format!("TX{:03}", id)));
    fields.insert("amount".into(), json!(amount));
    fields.insert("risk_score".into(), json!(risk));
    fields.insert("institution".into(), json!(institution));
    Record {
        id: RecordId::Index(id),
        fields,
        timestamp: Utc::now(),
        signature: format!("sig-{}", id),
    }
}

#[test]
fn test_append_preserves_order() {
    let store = DatasetStore::in_memory();
    let batch = vec![record(0, 10.0, 0.1, "A"), record(1, 20.0, 0.2, "B")];

    assert_eq!(store.append(batch.clone()).unwrap(), 2);
    assert_eq!(store.append(vec![record(2, 30.0, 0.3, "C")]).unwrap(), 3);

    let all = store.all();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0], batch[0]);
    assert_eq!(all[1], batch[1]);
    assert_eq!(all[2].id, RecordId::Index(2));
}

#[test]
fn test_unsigned_record_rejects_whole_batch() {
    let store = DatasetStore::in_memory();
    let mut bad = record(1, 1.0, 0.1, "A");
    bad.signature.clear();

    let result = store.append(vec![record(0, 1.0, 0.1, "A"), bad]);
    assert!(result.is_err());
    assert!(store.is_empty());
}

#[test]
fn test_query_amount_filter() {
    let store = DatasetStore::in_memory();
    store
        .append(vec![
            record(0, 500_000.0, 0.3, "Zenith"),
            record(1, 1_500_000.0, 0.85, "GTBank"),
            record(2, 750_000.0, 0.6, "Access"),
        ])
        .unwrap();

    let hits = store.filter(&RecordFilter::min_amount(600_000.0));
    let ids: Vec<_> = hits.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![RecordId::Index(1), RecordId::Index(2)]);

    // Strictly greater
    assert_eq!(store.filter(&RecordFilter::min_amount(1_500_000.0)).len(), 0);
    // Filtering does not mutate
    assert_eq!(store.len(), 3);
}

#[test]
fn test_combined_filter_and_pagination() {
    let store = DatasetStore::in_memory();
    store
        .append((0..10).map(|i| record(i, i as f64 * 100.0, i as f64 / 10.0, "Zenith")).collect())
        .unwrap();

    let filter = RecordFilter {
        min_risk: Some(0.45),
        institution: Some("zenith".into()),
        offset: Some(1),
        limit: Some(2),
        ..Default::default()
    };
    let page = store.filter(&filter);
    let ids: Vec<_> = page.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, vec!["6", "7"]);
}

#[test]
fn test_get_by_rendered_id() {
    let store = DatasetStore::in_memory();
    let mut keyed = record(0, 1.0, 0.1, "A");
    keyed.id = RecordId::Key("TX-9".into());
    store.append(vec![keyed]).unwrap();

    assert!(store.get("TX-9").is_some());
    assert!(store.get("missing").is_none());
}

#[test]
fn test_readers_never_see_partial_batch() {
    let store = Arc::new(DatasetStore::in_memory());
    const BATCH: usize = 5;

    let writer = {
        let store = store.clone();
        std::thread::spawn(move || {
            for b in 0..50u64 {
                let batch = (0..BATCH as u64)
                    .map(|i| record(b * BATCH as u64 + i, 1.0, 0.1, "A"))
                    .collect();
                store.append(batch).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..500 {
                    assert_eq!(store.all().len() % BATCH, 0);
                    assert_eq!(store.query(|_| true).len() % BATCH, 0);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(store.len(), 250);
}

#[test]
fn test_readers_never_see_rejected_batch() {
    let store = Arc::new(DatasetStore::in_memory());
    const BATCH: usize = 4;

    let writer = {
        let store = store.clone();
        std::thread::spawn(move || {
            for b in 0..60u64 {
                let rejected = b % 2 == 1;
                let mut batch: Vec<Record> = (0..BATCH as u64)
                    .map(|i| record(b * BATCH as u64 + i, 1.0, 0.1, if rejected { "REJECTED" } else { "OK" }))
                    .collect();
                if rejected {
                    batch[BATCH - 1].signature.clear();
                    assert!(store.append(batch).is_err());
                } else {
                    store.append(batch).unwrap();
                }
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..500 {
                    let seen = store.query(|r| r.institution() == Some("REJECTED"));
                    assert!(seen.is_empty());
                    assert_eq!(store.len() % BATCH, 0);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(store.len(), 30 * BATCH);
    assert!(store.all().iter().all(|r| r.institution() == Some("OK")));
}

// ============================================================================
// JOURNAL
// ============================================================================

#[test]
fn test_journal_replay() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nirs").join("dataset.jsonl");

    {
        let store = DatasetStore::open(&path).unwrap();
        assert!(store.is_durable());
        store.append(vec![record(0, 1.0, 0.1, "A"), record(1, 2.0, 0.2, "B")]).unwrap();
        store.append(vec![record(2, 3.0, 0.3, "C")]).unwrap();
    }

    // One line per batch
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);

    let reopened = DatasetStore::open(&path).unwrap();
    let all = reopened.all();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].id, RecordId::Index(2));
    assert_eq!(all[1].signature, "sig-1");
}

#[test]
fn test_journal_drops_torn_tail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset.jsonl");

    {
        let store = DatasetStore::open(&path).unwrap();
        store.append(vec![record(0, 1.0, 0.1, "A")]).unwrap();
    }
    // Simulate a crash mid-write
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str(r#"{"id":1,"amount":2"#);
    fs::write(&path, content).unwrap();

    let store = DatasetStore::open(&path).unwrap();
    assert_eq!(store.len(), 1);

    store.append(vec![record(1, 2.0, 0.2, "B")]).unwrap();
    drop(store);

    let reopened = DatasetStore::open(&path).unwrap();
    assert_eq!(reopened.len(), 2);
}

#[test]
fn test_journal_drops_torn_multi_record_batch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset.jsonl");
    let scratch = dir.path().join("scratch.jsonl");

    {
        let store = DatasetStore::open(&path).unwrap();
        store.append(vec![record(0, 1.0, 0.1, "A")]).unwrap();
    }
    {
        let other = DatasetStore::open(&scratch).unwrap();
        other
            .append(vec![record(1, 2.0, 0.2, "B"), record(2, 3.0, 0.3, "C"), record(3, 4.0, 0.4, "D")])
            .unwrap();
    }

    // Crash after two of the three records reached the disk
    let batch = fs::read_to_string(&scratch).unwrap();
    let cut = batch.find("sig-3").unwrap();
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str(&batch[..cut]);
    fs::write(&path, content).unwrap();

    let store = DatasetStore::open(&path).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.all()[0].id, RecordId::Index(0));

    store.append(vec![record(4, 5.0, 0.5, "E")]).unwrap();
    drop(store);
    let ids: Vec<String> = DatasetStore::open(&path).unwrap().all().iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, vec!["0", "4"]);
}

#[test]
fn test_journal_rejects_corrupt_middle_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dataset.jsonl");
    fs::write(&path, "not json\n").unwrap();

    let result = DatasetStore::open(&path);
    assert!(matches!(result, Err(crate::logic::error::PipelineError::Storage(_))));
}
