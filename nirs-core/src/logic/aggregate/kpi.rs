//! KPI and risk distribution

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::scorer::RiskScore;
use super::Aggregator;
use crate::logic::dataset::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskDistribution {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    pub total_records: usize,
    pub high_risk_count: usize,
    pub institution_count: usize,
    /// Percent of records not high risk, two decimals; 0 for an empty dataset
    pub compliance_rate: f64,
    pub unscored_count: usize,
    pub total_amount: f64,
    pub risk_distribution: RiskDistribution,
}

/// `part / total`, or 0 when there is nothing to divide by
pub(crate) fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl Aggregator {
    /// Bucket counts over scored records; unscored ones are left out
    pub fn risk_distribution(&self, scores: &[Option<RiskScore>]) -> RiskDistribution {
        let mut dist = RiskDistribution::default();
        for score in scores.iter().flatten() {
            let value = score.value();
            if value <= self.config.low_risk_max {
                dist.low += 1;
            } else if value <= self.config.medium_risk_max {
                dist.medium += 1;
            } else {
                dist.high += 1;
            }
        }
        dist
    }

    pub(crate) fn high_risk_count(&self, scores: &[Option<RiskScore>]) -> usize {
        scores
            .iter()
            .flatten()
            .filter(|s| s.value() > self.config.high_risk_threshold)
            .count()
    }

    /// `scores` is positional: one entry per record
    pub fn kpis(&self, records: &[Record], scores: &[Option<RiskScore>]) -> KpiReport {
        let total = records.len();
        let high_risk_count = self.high_risk_count(scores);

        let institutions: HashSet<String> = records
            .iter()
            .filter_map(|r| r.text(&self.config.institution_field))
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        let scored = scores.iter().flatten().count();
        let unscored_count = total.saturating_sub(scored);

        let compliance = ratio(total.saturating_sub(high_risk_count), total);

        KpiReport {
            total_records: total,
            high_risk_count,
            institution_count: institutions.len(),
            compliance_rate: round_to(compliance * 100.0, 2),
            unscored_count,
            total_amount: records.iter().filter_map(Record::amount).filter(|a| a.is_finite()).sum(),
            risk_distribution: self.risk_distribution(scores),
        }
    }
}
