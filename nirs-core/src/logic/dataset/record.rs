use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    AMOUNT_FIELD, ASSET_FIELD, ID_FIELD, INSTITUTION_FIELD, RISK_SCORE_FIELD, VALUE_FIELD,
};

/// Named attributes of a record, exactly as submitted
pub type Fields = Map<String, Value>;

// ============================================================================
// RECORD ID
// ============================================================================

/// Caller-assigned id (from an `id` column) or positional index within the batch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Index(u64),
    Key(String),
}

impl RecordId {
    /// Accepts non-negative integers and strings
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(RecordId::Index),
            Value::String(s) => Some(RecordId::Key(s.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Index(i) => write!(f, "{}", i),
            RecordId::Key(k) => write!(f, "{}", k),
        }
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// Normalized row that has not been stamped yet
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedRecord {
    pub id: RecordId,
    pub fields: Fields,
}

impl UnsignedRecord {
    /// Bytes handed to the Signer
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        canonical_bytes(&self.id, &self.fields)
    }
}

/// Normalized, signed, timestamped entry of the dataset
///
/// Serialized flat: `{"id": .., <fields>.., "timestamp": .., "signature": ..}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Fields,
    pub timestamp: DateTime<Utc>,
    pub signature: String,
}

impl Record {
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        canonical_bytes(&self.id, &self.fields)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Numeric view of a field (numbers and numeric strings)
    pub fn number(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(as_number)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// `amount`, falling back to `value`
    pub fn amount(&self) -> Option<f64> {
        self.number(AMOUNT_FIELD).or_else(|| self.number(VALUE_FIELD))
    }

    pub fn risk_score(&self) -> Option<f64> {
        self.number(RISK_SCORE_FIELD)
    }

    pub fn institution(&self) -> Option<&str> {
        self.text(INSTITUTION_FIELD)
    }

    pub fn asset(&self) -> Option<&str> {
        self.text(ASSET_FIELD)
    }
}

/// Compact JSON of a key-sorted map holding `id` and every field.
/// `timestamp`/`signature` are never part of it.
fn canonical_bytes(id: &RecordId, fields: &Fields) -> Result<Vec<u8>, serde_json::Error> {
    let id_value = serde_json::to_value(id)?;
    let mut canonical: BTreeMap<&str, &Value> = fields.iter().map(|(k, v)| (k.as_str(), v)).collect();
    canonical.insert(ID_FIELD, &id_value);
    serde_json::to_vec(&canonical)
}

/// Numbers and numeric strings as f64
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
