//! NIRS Core - Regulatory Data Pipeline
//!
//! Normalizes column-oriented regulatory/financial submissions into signed,
//! timestamped records, keeps them in an append-only dataset, and runs the
//! analytic passes (threshold anomalies, counterparty graph, KPI/forecast
//! aggregation) over it.
//!
//! ## Structure
//! - `logic::normalizer` - columnar input -> row records
//! - `logic::integrity` - Signer collaborator + Stamper
//! - `logic::dataset` - Record types and the append-only `DatasetStore`
//! - `logic::anomaly` - threshold rules and transaction graph
//! - `logic::aggregate` - KPIs, risk distribution, forecast
//! - `logic::pipeline` - wires the stages together
//!
//! ## Usage
//! ```ignore
//! use nirs_core::{Pipeline, PipelineConfig, DatasetStore, Sha256Signer};
//!
//! let pipeline = Pipeline::new(
//!     PipelineConfig::default(),
//!     DatasetStore::in_memory(),
//!     Arc::new(Sha256Signer::new()),
//! );
//! let report = pipeline.ingest(&payload).await?;
//! let summary = pipeline.summarize(None).await?;
//! ```

pub mod constants;
pub mod logic;

pub use logic::aggregate::{
    Aggregator, AggregatorConfig, FieldScorer, FlatNoise, Forecast, ForecastNoise,
    ForecastRequest, KpiReport, NoiseSample, RiskDistribution, RiskScore, Scorer, SeededNoise,
};
pub use logic::anomaly::{
    AnomalyEngine, AnomalyReason, Graph, GraphBuilder, RecordAnomaly, ThresholdConfig,
    Transaction, TransactionScan,
};
pub use logic::dataset::{DatasetStore, Record, RecordFilter, RecordId};
pub use logic::error::{Collaborator, CollaboratorError, PipelineError, PipelineResult};
pub use logic::integrity::{Sha256Signer, Signer, Stamper};
pub use logic::normalizer::{Normalizer, NormalizerConfig};
pub use logic::pipeline::{IngestReport, Pipeline, PipelineConfig, Summary, Verification};
