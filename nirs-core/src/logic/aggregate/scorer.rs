//! Scorer collaborator
//!
//! The pipeline never computes a risk score itself. A Scorer returns one per
//! record; the value is validated here and anything outside [0,1] is
//! treated as unscored.

use serde::Serialize;

use crate::constants::RISK_SCORE_FIELD;
use crate::logic::dataset::Record;
use crate::logic::error::CollaboratorError;

pub trait Scorer: Send + Sync {
    fn score(&self, record: &Record) -> Result<f64, CollaboratorError>;
}

impl<F> Scorer for F
where
    F: Fn(&Record) -> Result<f64, CollaboratorError> + Send + Sync,
{
    fn score(&self, record: &Record) -> Result<f64, CollaboratorError> {
        self(record)
    }
}

/// Reads the score already carried by the record (default wiring)
#[derive(Debug, Clone)]
pub struct FieldScorer {
    field: String,
}

impl FieldScorer {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }
}

impl Default for FieldScorer {
    fn default() -> Self {
        Self::new(RISK_SCORE_FIELD)
    }
}

impl Scorer for FieldScorer {
    fn score(&self, record: &Record) -> Result<f64, CollaboratorError> {
        record
            .number(&self.field)
            .ok_or_else(|| CollaboratorError::Rejected(format!("record {} has no '{}'", record.id, self.field)))
    }
}

/// Validated score in [0,1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct RiskScore(f64);

impl RiskScore {
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// `None` when the scorer failed or returned garbage
pub fn score_one(scorer: &dyn Scorer, record: &Record) -> Option<RiskScore> {
    match scorer.score(record) {
        Ok(raw) => {
            let score = RiskScore::new(raw);
            if score.is_none() {
                log::debug!("Score {} for record {} out of range", raw, record.id);
            }
            score
        }
        Err(e) => {
            log::debug!("Scorer declined record {}: {}", record.id, e);
            None
        }
    }
}

/// One entry per record
pub fn score_all(scorer: &dyn Scorer, records: &[Record]) -> Vec<Option<RiskScore>> {
    let scores: Vec<_> = records.iter().map(|record| score_one(scorer, record)).collect();
    warn_unscored(&scores);
    scores
}

pub fn warn_unscored(scores: &[Option<RiskScore>]) {
    let rejected = scores.iter().filter(|s| s.is_none()).count();
    if rejected > 0 {
        log::warn!("{} of {} records left unscored", rejected, scores.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::dataset::{Fields, RecordId};
    use chrono::Utc;
    use serde_json::json;

    fn record(risk: serde_json::Value) -> Record {
        let mut fields = Fields::new();
        fields.insert("risk_score".into(), risk);
        Record {
            id: RecordId::Index(0),
            fields,
            timestamp: Utc::now(),
            signature: "s".into(),
        }
    }

    #[test]
    fn test_risk_score_bounds() {
        assert!(RiskScore::new(0.0).is_some());
        assert!(RiskScore::new(1.0).is_some());
        assert!(RiskScore::new(1.01).is_none());
        assert!(RiskScore::new(-0.1).is_none());
        assert!(RiskScore::new(f64::NAN).is_none());
    }

    #[test]
    fn test_field_scorer() {
        let records = vec![record(json!(0.4)), record(json!("0.9")), record(json!(3.0)), record(json!(null))];
        let scores = score_all(&FieldScorer::default(), &records);
        let values: Vec<Option<f64>> = scores.iter().map(|s| s.map(RiskScore::value)).collect();
        assert_eq!(values, vec![Some(0.4), Some(0.9), None, None]);
    }

    #[test]
    fn test_closure_scorer_errors_become_unscored() {
        let scorer = |_: &Record| -> Result<f64, CollaboratorError> {
            Err(CollaboratorError::Unavailable("model offline".into()))
        };
        let scores = score_all(&scorer, &[record(json!(0.5))]);
        assert_eq!(scores, vec![None]);
    }
}
