//! Aggregation Configuration

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONFIDENCE, DEFAULT_FORECAST_HORIZON, DEFAULT_HIGH_RISK_THRESHOLD,
    DEFAULT_LOW_RISK_MAX, DEFAULT_MEDIUM_RISK_MAX, INSTITUTION_FIELD, MAX_FORECAST_HORIZON,
};

// ============================================================================
// AGGREGATOR CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Scores up to this value fall in the `low` bucket
    pub low_risk_max: f64,
    /// Scores up to this value (and above `low_risk_max`) fall in `medium`
    pub medium_risk_max: f64,
    /// Scores strictly above this count as high risk in KPIs and forecasts
    pub high_risk_threshold: f64,
    /// Field holding the reporting institution
    pub institution_field: String,
    pub forecast: ForecastConfig,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            low_risk_max: DEFAULT_LOW_RISK_MAX,
            medium_risk_max: DEFAULT_MEDIUM_RISK_MAX,
            high_risk_threshold: DEFAULT_HIGH_RISK_THRESHOLD,
            institution_field: INSTITUTION_FIELD.to_string(),
            forecast: ForecastConfig::default(),
        }
    }
}

impl AggregatorConfig {
    /// Tighter buckets; anything above 0.5 is high risk
    pub fn conservative() -> Self {
        Self {
            low_risk_max: 0.2,
            medium_risk_max: 0.5,
            high_risk_threshold: 0.5,
            ..Default::default()
        }
    }

    pub fn with_high_risk_threshold(mut self, threshold: f64) -> Self {
        self.high_risk_threshold = threshold;
        self
    }
}

// ============================================================================
// FORECAST CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub default_horizon: u32,
    pub default_confidence: u8,
    /// Requests above this are clamped
    pub max_horizon: u32,
    /// Average forecast risk above this raises a `high_risk_period` recommendation
    pub risk_alert_level: f64,
    /// Confidence (percent) below this raises a `low_confidence` recommendation
    pub min_confidence: u8,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_horizon: DEFAULT_FORECAST_HORIZON,
            default_confidence: DEFAULT_CONFIDENCE,
            max_horizon: MAX_FORECAST_HORIZON,
            risk_alert_level: 0.6,
            min_confidence: 90,
        }
    }
}
