use serde::{Deserialize, Serialize};

use super::record::Record;

/// Query parameters for the dataset.
/// `min_amount` and `min_risk` are strict lower bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub min_amount: Option<f64>,
    pub min_risk: Option<f64>,
    pub institution: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl RecordFilter {
    pub fn min_amount(amount: f64) -> Self {
        Self {
            min_amount: Some(amount),
            ..Default::default()
        }
    }

    /// Records lacking a filtered attribute never match
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(min) = self.min_amount {
            if !record.amount().is_some_and(|a| a > min) {
                return false;
            }
        }
        if let Some(min) = self.min_risk {
            if !record.risk_score().is_some_and(|r| r > min) {
                return false;
            }
        }
        if let Some(institution) = &self.institution {
            if !record
                .institution()
                .is_some_and(|i| i.eq_ignore_ascii_case(institution))
            {
                return false;
            }
        }
        true
    }

    pub fn paginate(&self, records: Vec<Record>) -> Vec<Record> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(usize::MAX);
        records.into_iter().skip(offset).take(limit).collect()
    }
}
