//! Anomaly & Graph Engine
//!
//! Two passes over records or raw digital-asset transactions:
//! - threshold anomalies (absolute value, per-asset limits, record risk score)
//! - counterparty graph with first-seen-wins node ids
//!
//! Malformed transactions are skipped individually; the pass never aborts.

pub mod rules;
pub mod transaction;
pub mod graph;
pub mod engine;

#[cfg(test)]
mod tests;

pub use engine::{AnomalyEngine, RecordAnomaly, TransactionAnomaly, TransactionScan};
pub use graph::{AddressIndex, Graph, GraphBuilder, GraphEdge, GraphNode};
pub use rules::{AnomalyReason, Observation, ThresholdConfig, ThresholdRules};
pub use transaction::{SkippedItem, Transaction};
