//! Pipeline
//!
//! Wires Normalizer -> Stamper -> DatasetStore and exposes the analytic
//! passes over the stored dataset.
//!
//! Ingestion is all-or-nothing. Signing runs on the blocking pool with every
//! Signer call under the collaborator bound; if one fails, times out, or the
//! future is dropped before the append, nothing is written. Readers never block on a slow collaborator
//! because the store lock is only taken for the append itself.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::aggregate::{
    sample_day, score_one, warn_unscored, Aggregator, AggregatorConfig, FieldScorer, FlatNoise,
    Forecast, ForecastNoise, ForecastRequest, KpiReport, RiskScore, Scorer,
};
use super::anomaly::{AnomalyEngine, RecordAnomaly, ThresholdConfig, TransactionScan};
use super::collab::{run_bounded, run_bounded_each};
use super::dataset::{DatasetStore, Record, RecordFilter};
use super::error::{Collaborator, PipelineResult};
use super::integrity::{Signer, Stamper};
use super::normalizer::{Normalizer, NormalizerConfig};
use crate::constants::DEFAULT_COLLABORATOR_TIMEOUT_MS;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub normalizer: NormalizerConfig,
    pub thresholds: ThresholdConfig,
    pub aggregator: AggregatorConfig,
    /// Bound on each Signer / Scorer / Forecast Noise call
    pub collaborator_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            thresholds: ThresholdConfig::default(),
            aggregator: AggregatorConfig::default(),
            collaborator_timeout_ms: DEFAULT_COLLABORATOR_TIMEOUT_MS,
        }
    }
}

impl PipelineConfig {
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub batch_id: Uuid,
    /// Records in this batch
    pub ingested: usize,
    /// Records in the store after the append
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub id: String,
    pub valid: bool,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub kpis: KpiReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline {
    config: PipelineConfig,
    normalizer: Normalizer,
    stamper: Stamper,
    store: DatasetStore,
    engine: AnomalyEngine,
    aggregator: Aggregator,
    scorer: Arc<dyn Scorer>,
    noise: Arc<dyn ForecastNoise>,
}

impl Pipeline {
    /// Scores come from the records' own `risk_score`; forecasts are flat
    /// until `with_scorer` / `with_noise` wire something else in.
    pub fn new(config: PipelineConfig, store: DatasetStore, signer: Arc<dyn Signer>) -> Self {
        Self {
            normalizer: Normalizer::new(config.normalizer.clone()),
            stamper: Stamper::new(signer),
            store,
            engine: AnomalyEngine::new(config.thresholds.clone()),
            aggregator: Aggregator::new(config.aggregator.clone()),
            scorer: Arc::new(FieldScorer::default()),
            noise: Arc::new(FlatNoise),
            config,
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_noise(mut self, noise: Arc<dyn ForecastNoise>) -> Self {
        self.noise = noise;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    // ------------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------------

    pub async fn ingest(&self, input: &Value) -> PipelineResult<IngestReport> {
        let batch = self.normalizer.normalize(input)?;
        let ingested = batch.len();
        let timestamp = Utc::now();

        let stamper = self.stamper.clone();
        let records = run_bounded_each(Collaborator::Signer, self.config.collaborator_timeout(), batch, move |r| {
            stamper.stamp(r, timestamp)
        })
        .await?;

        let total = self.store.append(records)?;
        let batch_id = Uuid::new_v4();
        log::info!("Ingested batch {} ({} records, {} total)", batch_id, ingested, total);

        Ok(IngestReport {
            batch_id,
            ingested,
            total,
            timestamp,
        })
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn query(&self, filter: &RecordFilter) -> Vec<Record> {
        self.store.filter(filter)
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.store.all()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// `None` when no record has this id
    pub async fn verify(&self, id: &str) -> PipelineResult<Option<Verification>> {
        let Some(record) = self.store.get(id) else {
            return Ok(None);
        };

        let stamper = self.stamper.clone();
        let signature = record.signature.clone();
        let valid = run_bounded(Collaborator::Signer, self.config.collaborator_timeout(), move || {
            stamper.verify(&record)
        })
        .await??;

        if !valid {
            log::warn!("Signature mismatch for record {}", id);
        }
        Ok(Some(Verification {
            id: id.to_string(),
            valid,
            signature,
        }))
    }

    // ------------------------------------------------------------------------
    // Analytics
    // ------------------------------------------------------------------------

    pub async fn kpis(&self) -> PipelineResult<KpiReport> {
        Ok(self.summarize(None).await?.kpis)
    }

    /// Current records with one Scorer call each, every call bounded
    async fn scored_snapshot(&self) -> PipelineResult<(Arc<Vec<Record>>, Vec<Option<RiskScore>>)> {
        let records = Arc::new(self.store.all());
        let scorer = Arc::clone(&self.scorer);
        let shared = Arc::clone(&records);

        let scores = run_bounded_each(
            Collaborator::Scorer,
            self.config.collaborator_timeout(),
            (0..records.len()).collect(),
            move |i: usize| Ok(score_one(scorer.as_ref(), &shared[i])),
        )
        .await?;
        warn_unscored(&scores);

        Ok((records, scores))
    }

    /// KPIs always; a forecast only when requested
    pub async fn summarize(&self, forecast: Option<ForecastRequest>) -> PipelineResult<Summary> {
        let (records, scores) = self.scored_snapshot().await?;
        let kpis = self.aggregator.kpis(&records, &scores);

        let forecast = match forecast {
            Some(request) => {
                let horizon = self.aggregator.effective_horizon(&request);
                let noise = Arc::clone(&self.noise);
                let samples = run_bounded_each(
                    Collaborator::ForecastNoise,
                    self.config.collaborator_timeout(),
                    (1..=horizon).collect(),
                    move |day: u32| Ok(sample_day(noise.as_ref(), day)),
                )
                .await?;
                Some(self.aggregator.forecast(&records, &scores, &request, &samples))
            }
            None => None,
        };

        Ok(Summary { kpis, forecast })
    }

    pub fn scan_transactions(&self, transactions: &[Value]) -> TransactionScan {
        self.engine.scan_transactions(transactions)
    }

    /// Threshold pass over the stored records, scored the same way as `kpis`
    pub async fn scan_records(&self) -> PipelineResult<Vec<RecordAnomaly>> {
        let (records, scores) = self.scored_snapshot().await?;
        Ok(self.engine.scan_records(&records, &scores))
    }
}

// ============================================================================
// TESTS
// ============================================================================
