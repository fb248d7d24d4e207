//! Ingestion models

use nirs_core::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Deserialize, Default)]
pub struct IngestParams {
    /// Include the full dataset in the response
    #[serde(default)]
    pub snapshot: bool,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub message: String,
    pub batch_id: Uuid,
    pub ingested: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Record>>,
}

#[derive(Debug, Deserialize)]
pub struct DigitalAssetRequest {
    /// Raw transactions; malformed entries are skipped, not rejected
    pub transactions: Vec<Value>,
}
