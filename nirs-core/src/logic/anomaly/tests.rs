use super::*;
use crate::logic::aggregate::{score_all, FieldScorer, RiskScore};
use crate::logic::dataset::{Fields, Record, RecordId};
use chrono::Utc;
use serde_json::{json, Value};

fn txs(values: Value) -> Vec<Value> {
    values.as_array().unwrap().clone()
}

#[test]
fn test_default_threshold_flags() {
    let engine = AnomalyEngine::default();
    let scan = engine.scan_transactions(&txs(json!([
        {"from": "A", "to": "B", "value": 1_500_000},
        {"from": "B", "to": "C", "value": 900_000},
        {"from": "C", "to": "D", "value": 11, "asset": "BTC"}
    ])));

    let flagged: Vec<usize> = scan.anomalies.iter().map(|a| a.index).collect();
    assert_eq!(flagged, vec![0, 2]);
    assert_eq!(scan.anomalies[0].reasons[0].as_str(), "high_value");
    assert_eq!(scan.anomalies[1].reasons[0].as_str(), "asset_threshold");
    assert_eq!(scan.summary, "2 anomalies detected in 3 transactions");
}

#[test]
fn test_flagged_once_with_all_reasons() {
    let engine = AnomalyEngine::default();
    let scan = engine.scan_transactions(&txs(json!([
        {"from": "A", "to": "B", "value": 2_000_000, "asset": "ETH"}
    ])));

    assert_eq!(scan.anomalies.len(), 1);
    let tags: Vec<_> = scan.anomalies[0].reasons.iter().map(|r| r.as_str()).collect();
    assert_eq!(tags, vec!["high_value", "asset_threshold"]);
}

#[test]
fn test_graph_ids_first_seen() {
    let engine = AnomalyEngine::default();
    let scan = engine.scan_transactions(&txs(json!([
        {"from": "A", "to": "B", "value": 1},
        {"from": "B", "to": "C", "value": 2}
    ])));

    let graph = &scan.graph;
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.edges.len(), 2);
    assert_eq!(graph.node("A").unwrap().id, 1);
    assert_eq!(graph.node("B").unwrap().id, 2);
    assert_eq!(graph.node("C").unwrap().id, 3);
    assert_eq!((graph.edges[0].from, graph.edges[0].to), (1, 2));
    assert_eq!((graph.edges[1].from, graph.edges[1].to), (2, 3));
    assert!(graph.nodes.iter().all(|n| !n.implicated));
}

#[test]
fn test_graph_is_deterministic() {
    let engine = AnomalyEngine::default();
    let input = txs(json!([
        {"from": "X", "to": "Y", "value": 5},
        {"from": "Z", "to": "X", "value": 2_000_000},
        {"from": "Y", "to": "W", "value": 1},
        {"from": "X", "to": "X", "value": 3}
    ]));

    let first = engine.scan_transactions(&input);
    let second = engine.scan_transactions(&input);
    assert_eq!(first.graph, second.graph);

    let ids: Vec<(u32, &str)> = first.graph.nodes.iter().map(|n| (n.id, n.address.as_str())).collect();
    assert_eq!(ids, vec![(1, "X"), (2, "Y"), (3, "Z"), (4, "W")]);
    assert_eq!(first.graph.edges.len(), 4);
}

#[test]
fn test_implicated_marking() {
    let engine = AnomalyEngine::default();
    let scan = engine.scan_transactions(&txs(json!([
        {"from": "A", "to": "B", "value": 1},
        {"from": "B", "to": "C", "value": 5_000_000},
        {"from": "D", "to": "E", "value": 1}
    ])));

    let implicated: Vec<&str> = scan
        .graph
        .nodes
        .iter()
        .filter(|n| n.implicated)
        .map(|n| n.address.as_str())
        .collect();
    assert_eq!(implicated, vec!["B", "C"]);

    let edges: Vec<(bool, bool)> = scan.graph.edges.iter().map(|e| (e.anomalous, e.implicated)).collect();
    // A->B touches implicated B without being flagged itself
    assert_eq!(edges, vec![(false, true), (true, true), (false, false)]);
}

#[test]
fn test_malformed_transactions_are_skipped() {
    let engine = AnomalyEngine::default();
    let scan = engine.scan_transactions(&txs(json!([
        {"from": "A", "to": "B", "value": 1},
        {"from": "A", "value": 3},
        "garbage",
        {"from": "B", "to": "C", "value": 2_000_000}
    ])));

    let skipped: Vec<usize> = scan.skipped.iter().map(|s| s.index).collect();
    assert_eq!(skipped, vec![1, 2]);
    assert_eq!(scan.graph.edges.len(), 2);
    assert_eq!(scan.graph.nodes.len(), 3);
    assert_eq!(scan.anomalies[0].index, 3);
    assert_eq!(scan.summary, "1 anomalies detected in 2 transactions; 2 skipped");
}

#[test]
fn test_builder_keeps_ids_across_calls() {
    let engine = AnomalyEngine::default();
    let mut builder = GraphBuilder::new();

    engine.scan_transactions_with(&txs(json!([{"from": "A", "to": "B", "value": 1}])), &mut builder);
    let second = engine.scan_transactions_with(&txs(json!([{"from": "C", "to": "A", "value": 1}])), &mut builder);

    assert_eq!(second.graph.node("C").unwrap().id, 3);
    assert_eq!(second.graph.node("A").unwrap().id, 1);
    assert_eq!(second.graph.nodes.len(), 2);
    assert_eq!(builder.index().len(), 3);
}

#[test]
fn test_anomaly_keeps_submitted_fields() {
    let engine = AnomalyEngine::default();
    let scan = engine.scan_transactions(&txs(json!([
        {"from": "A", "to": "B", "value": 20, "asset": "BTC", "hash": "0xfeed"}
    ])));

    let json = serde_json::to_value(&scan.anomalies[0]).unwrap();
    assert_eq!(json["index"], 0);
    assert_eq!(json["reasons"][0]["type"], "asset_threshold");
    assert_eq!(
        json["transaction"],
        json!({"from": "A", "to": "B", "value": 20, "asset": "BTC", "hash": "0xfeed"})
    );
}

#[test]
fn test_anomaly_echoes_value_as_submitted() {
    let engine = AnomalyEngine::default();
    let scan = engine.scan_transactions(&txs(json!([
        {"from": "A", "to": "B", "value": "1500000.50", "index": "caller-7", "reasons": "n/a"}
    ])));

    let json = serde_json::to_value(&scan.anomalies[0]).unwrap();
    // Numeric strings stay strings and caller keys never shadow ours
    assert_eq!(json["transaction"]["value"], "1500000.50");
    assert_eq!(json["transaction"]["index"], "caller-7");
    assert_eq!(json["index"], 0);
    assert_eq!(json["reasons"][0]["type"], "high_value");
}

fn record(id: u64, amount: f64, risk: Value) -> Record {
    let mut fields = Fields::new();
    fields.insert("amount".into(), json!(amount));
    fields.insert("risk_score".into(), risk);
    Record {
        id: RecordId::Index(id),
        fields,
        timestamp: Utc::now(),
        signature: "s".into(),
    }
}

#[test]
fn test_record_scan() {
    let records = vec![
        record(0, 500_000.0, json!(0.3)),
        record(1, 1_500_000.0, json!(0.85)),
        record(2, 750_000.0, json!(0.75)),
    ];
    let scores = score_all(&FieldScorer::default(), &records);

    let anomalies = AnomalyEngine::default().scan_records(&records, &scores);
    assert_eq!(anomalies.len(), 2);
    assert_eq!(anomalies[0].record.id, RecordId::Index(1));
    assert_eq!(anomalies[0].reasons.len(), 2);
    assert_eq!(anomalies[1].reasons[0].as_str(), "high_risk_score");
}

#[test]
fn test_record_scan_uses_validated_scores() {
    let records = vec![record(0, 10.0, json!(1.7)), record(1, 10.0, json!(0.1))];

    // Out-of-range field value is unscored, so never flagged
    let scores = score_all(&FieldScorer::default(), &records);
    assert_eq!(scores[0], None);
    assert!(AnomalyEngine::default().scan_records(&records, &scores).is_empty());

    // The supplied score wins over the stored field
    let scores = vec![RiskScore::new(0.95), RiskScore::new(0.95)];
    let anomalies = AnomalyEngine::default().scan_records(&records, &scores);
    assert_eq!(anomalies.len(), 2);
    assert!(anomalies.iter().all(|a| a.reasons[0].as_str() == "high_risk_score"));

    // Missing entries count as unscored
    assert!(AnomalyEngine::default().scan_records(&records, &[]).is_empty());
}