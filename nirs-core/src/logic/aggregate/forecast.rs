//! Forecast
//!
//! Baseline figures come from the dataset and are deterministic. Per-day
//! variation comes only from the noise samples handed in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::kpi::{ratio, round_to};
use super::noise::NoiseSample;
use super::scorer::RiskScore;
use super::Aggregator;
use crate::constants::{DEFAULT_CONFIDENCE, DEFAULT_FORECAST_HORIZON};
use crate::logic::dataset::Record;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Days ahead
    pub horizon: u32,
    /// Percent
    pub confidence: u8,
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_FORECAST_HORIZON,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 1-based
    pub day: u32,
    pub risk: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub total_volume: u64,
    pub expected_high_risk: u64,
    pub high_risk_days: u32,
    pub average_risk: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    HighRiskPeriod,
    LowConfidence,
    ModelRetraining,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::HighRiskPeriod => "high_risk_period",
            RecommendationKind::LowConfidence => "low_confidence",
            RecommendationKind::ModelRetraining => "model_retraining",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub message: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub horizon: u32,
    pub confidence: u8,
    pub baseline_risk: f64,
    pub baseline_volume: f64,
    pub points: Vec<ForecastPoint>,
    pub summary: ForecastSummary,
    pub recommendations: Vec<Recommendation>,
}

// ============================================================================
// AGGREGATION
// ============================================================================

impl Aggregator {
    /// Requested horizon capped at the configured maximum
    pub fn effective_horizon(&self, request: &ForecastRequest) -> u32 {
        request.horizon.min(self.config.forecast.max_horizon)
    }

    /// Share of high-risk records over all records
    pub fn baseline_risk(&self, scores: &[Option<RiskScore>]) -> f64 {
        ratio(self.high_risk_count(scores), scores.len())
    }

    /// Records per distinct ingestion day
    pub fn baseline_volume(&self, records: &[Record]) -> f64 {
        let days: HashSet<_> = records.iter().map(|r| r.timestamp.date_naive()).collect();
        ratio(records.len(), days.len())
    }

    /// Missing or non-finite noise samples count as zero perturbation
    pub fn forecast(
        &self,
        records: &[Record],
        scores: &[Option<RiskScore>],
        request: &ForecastRequest,
        noise: &[NoiseSample],
    ) -> Forecast {
        let horizon = self.effective_horizon(request);
        let baseline_risk = self.baseline_risk(scores);
        let baseline_volume = self.baseline_volume(records);

        let points: Vec<ForecastPoint> = (1..=horizon)
            .map(|day| {
                let sample = noise
                    .get(day as usize - 1)
                    .copied()
                    .filter(NoiseSample::is_finite)
                    .unwrap_or_default();
                ForecastPoint {
                    day,
                    risk: round_to((baseline_risk + sample.risk).clamp(0.0, 1.0), 4),
                    volume: (baseline_volume * (1.0 + sample.volume)).round().max(0.0) as u64,
                }
            })
            .collect();

        let summary = self.summarize_points(&points);
        let recommendations = self.recommend(&summary, request.confidence);

        log::debug!(
            "Forecast over {} days: baseline risk {:.3}, volume {:.1}",
            horizon,
            baseline_risk,
            baseline_volume
        );

        Forecast {
            horizon,
            confidence: request.confidence,
            baseline_risk: round_to(baseline_risk, 4),
            baseline_volume: round_to(baseline_volume, 2),
            points,
            summary,
            recommendations,
        }
    }

    fn summarize_points(&self, points: &[ForecastPoint]) -> ForecastSummary {
        if points.is_empty() {
            return ForecastSummary::default();
        }

        let total_volume = points.iter().fold(0u64, |acc, p| acc.saturating_add(p.volume));
        let expected = points.iter().map(|p| p.volume as f64 * p.risk).sum::<f64>();
        let high_risk_days = points
            .iter()
            .filter(|p| p.risk > self.config.high_risk_threshold)
            .count() as u32;
        let average = points.iter().map(|p| p.risk).sum::<f64>() / points.len() as f64;

        ForecastSummary {
            total_volume,
            expected_high_risk: expected.floor() as u64,
            high_risk_days,
            average_risk: round_to(average, 4),
        }
    }

    fn recommend(&self, summary: &ForecastSummary, confidence: u8) -> Vec<Recommendation> {
        let limits = &self.config.forecast;
        let mut out = Vec::new();

        if summary.average_risk > limits.risk_alert_level {
            out.push(Recommendation {
                kind: RecommendationKind::HighRiskPeriod,
                priority: Priority::High,
                message: format!("{} high-risk days predicted in the forecast period", summary.high_risk_days),
                action: "Increase monitoring during peak risk days".to_string(),
            });
        }

        if confidence < limits.min_confidence {
            out.push(Recommendation {
                kind: RecommendationKind::LowConfidence,
                priority: Priority::Medium,
                message: format!("Model confidence at {}%, consider conservative measures", confidence),
                action: "Validate predictions with additional data sources".to_string(),
            });
        }

        out.push(Recommendation {
            kind: RecommendationKind::ModelRetraining,
            priority: Priority::Medium,
            message: "Consider retraining the scoring model with recent anomaly data".to_string(),
            action: "Schedule a model retraining session".to_string(),
        });

        out
    }
}
