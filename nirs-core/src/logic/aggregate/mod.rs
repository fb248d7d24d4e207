//! Aggregator
//!
//! KPIs, risk distribution and forecast over a dataset snapshot.
//! Everything here is pure: scores and noise are computed by the caller
//! (see `score_all` / `sample_horizon`) and passed in, so identical inputs
//! give identical output. Empty datasets yield zeroed reports, never errors.

pub mod config;
pub mod scorer;
pub mod noise;
pub mod kpi;
pub mod forecast;


pub use config::{AggregatorConfig, ForecastConfig};
pub use forecast::{
    Forecast, ForecastPoint, ForecastRequest, ForecastSummary, Priority, Recommendation,
    RecommendationKind,
};
pub use kpi::{KpiReport, RiskDistribution};
pub use noise::{sample_day, sample_horizon, FlatNoise, ForecastNoise, NoiseSample, SeededNoise};
pub use scorer::{score_all, score_one, warn_unscored, FieldScorer, RiskScore, Scorer};

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }
}
