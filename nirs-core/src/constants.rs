//! Central Configuration Constants
//!
//! Single source of truth for pipeline defaults.
//! Every value here is a default only - the config structs override them.

/// Absolute anomaly threshold (currency units)
pub const DEFAULT_ABSOLUTE_THRESHOLD: f64 = 1_000_000.0;

/// BTC-specific anomaly threshold (asset units)
pub const DEFAULT_BTC_THRESHOLD: f64 = 10.0;

/// ETH-specific anomaly threshold (asset units)
pub const DEFAULT_ETH_THRESHOLD: f64 = 100.0;

/// Upper bound of the `low` risk bucket (inclusive)
pub const DEFAULT_LOW_RISK_MAX: f64 = 0.3;

/// Upper bound of the `medium` risk bucket (inclusive)
pub const DEFAULT_MEDIUM_RISK_MAX: f64 = 0.7;

/// Scores strictly above this count as high risk
pub const DEFAULT_HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Fields every ingested batch must carry
pub const DEFAULT_REQUIRED_FIELDS: &[&str] = &["transaction_id", "amount", "risk_score"];

/// Default forecast horizon (days)
pub const DEFAULT_FORECAST_HORIZON: u32 = 7;

/// Longest forecast horizon accepted (days)
pub const MAX_FORECAST_HORIZON: u32 = 365;

/// Default forecast confidence (percent)
pub const DEFAULT_CONFIDENCE: u8 = 95;

/// Bound on any single collaborator call (Signer, Scorer, Forecast Noise)
pub const DEFAULT_COLLABORATOR_TIMEOUT_MS: u64 = 2_000;

// ============================================
// Well-known field names
// ============================================

pub const ID_FIELD: &str = "id";
pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const SIGNATURE_FIELD: &str = "signature";
pub const AMOUNT_FIELD: &str = "amount";
pub const VALUE_FIELD: &str = "value";
pub const ASSET_FIELD: &str = "asset";
pub const RISK_SCORE_FIELD: &str = "risk_score";
pub const INSTITUTION_FIELD: &str = "institution";

/// Library version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
