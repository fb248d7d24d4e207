//! Threshold Rules
//!
//! All limits are configuration. Every rule is evaluated independently and
//! every match is reported.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ABSOLUTE_THRESHOLD, DEFAULT_BTC_THRESHOLD, DEFAULT_ETH_THRESHOLD,
    DEFAULT_HIGH_RISK_THRESHOLD,
};

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Any value strictly above this is flagged (currency units)
    pub absolute_threshold: f64,

    /// Per-asset limits in asset units, keyed by upper-case symbol
    pub asset_thresholds: BTreeMap<String, f64>,

    /// Record scan only: risk scores strictly above this are flagged
    pub high_risk_score: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            absolute_threshold: DEFAULT_ABSOLUTE_THRESHOLD,
            asset_thresholds: BTreeMap::from([
                ("BTC".to_string(), DEFAULT_BTC_THRESHOLD),
                ("ETH".to_string(), DEFAULT_ETH_THRESHOLD),
            ]),
            high_risk_score: DEFAULT_HIGH_RISK_THRESHOLD,
        }
    }
}

impl ThresholdConfig {
    /// Absolute threshold only, no asset limits
    pub fn absolute(threshold: f64) -> Self {
        Self {
            absolute_threshold: threshold,
            asset_thresholds: BTreeMap::new(),
            ..Default::default()
        }
    }

    pub fn with_asset(mut self, asset: &str, threshold: f64) -> Self {
        self.asset_thresholds.insert(asset.to_uppercase(), threshold);
        self
    }

    /// Case-insensitive lookup
    pub fn asset_threshold(&self, asset: &str) -> Option<f64> {
        self.asset_thresholds
            .get(&asset.to_uppercase())
            .or_else(|| self.asset_thresholds.get(asset))
            .copied()
    }
}

// ============================================================================
// REASONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnomalyReason {
    HighValue { value: f64, threshold: f64 },
    AssetThreshold { asset: String, value: f64, threshold: f64 },
    HighRiskScore { score: f64, threshold: f64 },
}

impl AnomalyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyReason::HighValue { .. } => "high_value",
            AnomalyReason::AssetThreshold { .. } => "asset_threshold",
            AnomalyReason::HighRiskScore { .. } => "high_risk_score",
        }
    }

    pub fn description(&self) -> String {
        match self {
            AnomalyReason::HighValue { value, threshold } => {
                format!("Value {} exceeds absolute threshold {}", value, threshold)
            }
            AnomalyReason::AssetThreshold { asset, value, threshold } => {
                format!("{} {} exceeds asset threshold {}", value, asset, threshold)
            }
            AnomalyReason::HighRiskScore { score, threshold } => {
                format!("Risk score {:.2} above {:.2}", score, threshold)
            }
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

/// Anything the threshold rules can look at
pub trait Observation {
    fn value(&self) -> Option<f64>;
    fn asset(&self) -> Option<&str>;
    fn risk_score(&self) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThresholdRules {
    config: ThresholdConfig,
}

impl ThresholdRules {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Every rule that fires, in rule order. Empty means not anomalous.
    pub fn evaluate<O: Observation + ?Sized>(&self, obs: &O) -> Vec<AnomalyReason> {
        let mut reasons = Vec::new();

        if let Some(value) = obs.value() {
            if value > self.config.absolute_threshold {
                reasons.push(AnomalyReason::HighValue {
                    value,
                    threshold: self.config.absolute_threshold,
                });
            }

            if let Some(asset) = obs.asset() {
                if let Some(threshold) = self.config.asset_threshold(asset) {
                    if value > threshold {
                        reasons.push(AnomalyReason::AssetThreshold {
                            asset: asset.to_uppercase(),
                            value,
                            threshold,
                        });
                    }
                }
            }
        }

        if let Some(score) = obs.risk_score() {
            if score > self.config.high_risk_score {
                reasons.push(AnomalyReason::HighRiskScore {
                    score,
                    threshold: self.config.high_risk_score,
                });
            }
        }

        reasons
    }
}
