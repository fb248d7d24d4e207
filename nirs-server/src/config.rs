//! Configuration module

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use nirs_core::constants::{
    DEFAULT_ABSOLUTE_THRESHOLD, DEFAULT_BTC_THRESHOLD, DEFAULT_COLLABORATOR_TIMEOUT_MS,
    DEFAULT_ETH_THRESHOLD, DEFAULT_HIGH_RISK_THRESHOLD, DEFAULT_REQUIRED_FIELDS,
};
use nirs_core::{AggregatorConfig, NormalizerConfig, PipelineConfig, ThresholdConfig};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// JSONL journal backing the dataset (in-memory when unset)
    pub data_path: Option<PathBuf>,

    /// Key mixed into record signatures
    pub signing_key: Option<String>,

    /// Columns every ingested batch must contain
    pub required_fields: Vec<String>,

    /// Absolute anomaly threshold
    pub anomaly_threshold: f64,

    /// Per-asset anomaly thresholds (`BTC=10,ETH=100`)
    pub asset_thresholds: BTreeMap<String, f64>,

    /// Risk scores above this count as high risk
    pub high_risk_threshold: f64,

    /// Bound on signer / scorer / noise calls
    pub collaborator_timeout_ms: u64,

    /// Fixed seed for forecast noise (random when unset)
    pub noise_seed: Option<u64>,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            data_path: None,
            signing_key: None,
            required_fields: DEFAULT_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            anomaly_threshold: DEFAULT_ABSOLUTE_THRESHOLD,
            asset_thresholds: BTreeMap::from([
                ("BTC".to_string(), DEFAULT_BTC_THRESHOLD),
                ("ETH".to_string(), DEFAULT_ETH_THRESHOLD),
            ]),
            high_risk_threshold: DEFAULT_HIGH_RISK_THRESHOLD,
            collaborator_timeout_ms: DEFAULT_COLLABORATOR_TIMEOUT_MS,
            noise_seed: None,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading through `lookup`. Unparseable values fall
    /// back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            data_path: lookup("DATA_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),

            signing_key: lookup("SIGNING_KEY").filter(|k| !k.is_empty()),

            required_fields: lookup("REQUIRED_FIELDS")
                .map(|fields| {
                    fields
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or(defaults.required_fields),

            anomaly_threshold: lookup("ANOMALY_THRESHOLD")
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.anomaly_threshold),

            asset_thresholds: lookup("ASSET_THRESHOLDS")
                .map(|raw| parse_asset_thresholds(&raw))
                .unwrap_or(defaults.asset_thresholds),

            high_risk_threshold: lookup("HIGH_RISK_THRESHOLD")
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.high_risk_threshold),

            collaborator_timeout_ms: lookup("COLLABORATOR_TIMEOUT_MS")
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.collaborator_timeout_ms),

            noise_seed: lookup("NOISE_SEED").and_then(|s| s.parse().ok()),

            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            normalizer: NormalizerConfig::with_required(self.required_fields.iter().cloned()),
            thresholds: ThresholdConfig {
                absolute_threshold: self.anomaly_threshold,
                asset_thresholds: self.asset_thresholds.clone(),
                high_risk_score: self.high_risk_threshold,
            },
            aggregator: AggregatorConfig::default().with_high_risk_threshold(self.high_risk_threshold),
            collaborator_timeout_ms: self.collaborator_timeout_ms,
        }
    }
}

/// `BTC=10,eth=100` -> {BTC: 10, ETH: 100}. Malformed entries are dropped.
pub fn parse_asset_thresholds(raw: &str) -> BTreeMap<String, f64> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let parsed = entry.split_once('=').and_then(|(asset, limit)| {
                let asset = asset.trim();
                let limit: f64 = limit.trim().parse().ok()?;
                (!asset.is_empty() && limit.is_finite()).then(|| (asset.to_uppercase(), limit))
            });
            if parsed.is_none() {
                tracing::warn!("Ignoring malformed asset threshold '{}'", entry);
            }
            parsed
        })
        .collect()
}
