use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use super::graph::{Graph, GraphBuilder};
use super::rules::{AnomalyReason, Observation, ThresholdConfig, ThresholdRules};
use super::transaction::{SkippedItem, Transaction};
use crate::logic::aggregate::RiskScore;
use crate::logic::dataset::Record;

/// Flagged transaction with every matching reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionAnomaly {
    /// Position in the submitted list
    pub index: usize,
    pub reasons: Vec<AnomalyReason>,
    /// The item exactly as submitted
    pub transaction: Value,
}

/// Flagged stored record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordAnomaly {
    pub reasons: Vec<AnomalyReason>,
    pub record: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionScan {
    pub anomalies: Vec<TransactionAnomaly>,
    pub graph: Graph,
    pub skipped: Vec<SkippedItem>,
    pub summary: String,
}

#[derive(Debug, Clone, Default)]
pub struct AnomalyEngine {
    rules: ThresholdRules,
}

impl AnomalyEngine {
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            rules: ThresholdRules::new(config),
        }
    }

    pub fn config(&self) -> &ThresholdConfig {
        self.rules.config()
    }

    /// Threshold + graph pass with fresh node ids
    pub fn scan_transactions(&self, items: &[Value]) -> TransactionScan {
        self.scan_transactions_with(items, &mut GraphBuilder::new())
    }

    /// Same pass, numbering nodes through `builder`
    pub fn scan_transactions_with(&self, items: &[Value], builder: &mut GraphBuilder) -> TransactionScan {
        let mut accepted = Vec::with_capacity(items.len());
        let mut skipped = Vec::new();

        for (index, item) in items.iter().enumerate() {
            match Transaction::from_value(item) {
                Ok(tx) => accepted.push((index, tx)),
                Err(reason) => {
                    log::debug!("Skipping transaction {}: {}", index, reason);
                    skipped.push(SkippedItem { index, reason });
                }
            }
        }

        let mut anomalies = Vec::new();
        let mut flagged = HashSet::new();
        for (position, (index, tx)) in accepted.iter().enumerate() {
            let reasons = self.rules.evaluate(tx);
            if !reasons.is_empty() {
                flagged.insert(position);
                anomalies.push(TransactionAnomaly {
                    index: *index,
                    reasons,
                    transaction: items[*index].clone(),
                });
            }
        }

        let transactions: Vec<Transaction> = accepted.into_iter().map(|(_, tx)| tx).collect();
        let graph = builder.build(&transactions, &flagged);

        let mut summary = format!(
            "{} anomalies detected in {} transactions",
            anomalies.len(),
            transactions.len()
        );
        if !skipped.is_empty() {
            summary.push_str(&format!("; {} skipped", skipped.len()));
            log::warn!("{} malformed transactions skipped", skipped.len());
        }
        log::info!("{}", summary);

        TransactionScan {
            anomalies,
            graph,
            skipped,
            summary,
        }
    }

    /// Threshold pass over stored records. `scores[i]` is the validated
    /// Scorer output for `records[i]`; unscored records only face the amount rules.
    pub fn scan_records(&self, records: &[Record], scores: &[Option<RiskScore>]) -> Vec<RecordAnomaly> {
        records
            .iter()
            .enumerate()
            .filter_map(|(i, record)| {
                let observed = ScoredRecord {
                    record,
                    score: scores.get(i).copied().flatten(),
                };
                let reasons = self.rules.evaluate(&observed);
                (!reasons.is_empty()).then(|| RecordAnomaly {
                    reasons,
                    record: record.clone(),
                })
            })
            .collect()
    }
}

struct ScoredRecord<'a> {
    record: &'a Record,
    score: Option<RiskScore>,
}

impl Observation for ScoredRecord<'_> {
    fn value(&self) -> Option<f64> {
        self.record.amount()
    }

    fn asset(&self) -> Option<&str> {
        self.record.asset()
    }

    fn risk_score(&self) -> Option<f64> {
        self.score.map(RiskScore::value)
    }
}
