//! Record Normalizer
//!
//! Transposes column-oriented input (`{field: [v0, v1, ..]}`) into row records.
//! Record `i` holds the `i`-th value of every field. No side effects.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_REQUIRED_FIELDS, ID_FIELD, SIGNATURE_FIELD, TIMESTAMP_FIELD};
use crate::logic::dataset::{Fields, RecordId, UnsignedRecord};
use crate::logic::error::{PipelineError, PipelineResult};

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Columns every batch must contain
    pub required_fields: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            required_fields: DEFAULT_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl NormalizerConfig {
    /// No required columns
    pub fn permissive() -> Self {
        Self {
            required_fields: Vec::new(),
        }
    }

    pub fn with_required<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// NORMALIZER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn normalize(&self, input: &Value) -> PipelineResult<Vec<UnsignedRecord>> {
        let columns = input.as_object().ok_or_else(|| {
            PipelineError::Shape("expected an object mapping field names to arrays".to_string())
        })?;
        if columns.is_empty() {
            return Err(PipelineError::Shape("input contains no fields".to_string()));
        }

        // Shape: every column is an array of the same length
        let mut batch_len: Option<(usize, &str)> = None;
        let mut arrays = Vec::with_capacity(columns.len());
        for (name, column) in columns {
            let values = column.as_array().ok_or_else(|| {
                PipelineError::Shape(format!("field '{}' is not an array", name))
            })?;
            match batch_len {
                None => batch_len = Some((values.len(), name)),
                Some((expected, first)) if expected != values.len() => {
                    return Err(PipelineError::Shape(format!(
                        "field '{}' has {} values but '{}' has {}",
                        name,
                        values.len(),
                        first,
                        expected
                    )));
                }
                Some(_) => {}
            }
            arrays.push((name.as_str(), values));
        }
        let n = batch_len.map(|(len, _)| len).unwrap_or(0);
        if n == 0 {
            return Err(PipelineError::Shape("batch contains no rows".to_string()));
        }

        // Validation
        let missing: Vec<&str> = self
            .config
            .required_fields
            .iter()
            .map(String::as_str)
            .filter(|f| !columns.contains_key(*f))
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        for reserved in [TIMESTAMP_FIELD, SIGNATURE_FIELD] {
            if columns.contains_key(reserved) {
                return Err(PipelineError::Validation(format!(
                    "field '{}' is assigned by the pipeline and cannot be submitted",
                    reserved
                )));
            }
        }

        let ids = match columns.get(ID_FIELD).and_then(Value::as_array) {
            Some(values) => caller_ids(values)?,
            None => (0..n as u64).map(RecordId::Index).collect(),
        };

        // Transpose
        let records = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let fields: Fields = arrays
                    .iter()
                    .filter(|(name, _)| *name != ID_FIELD)
                    .map(|(name, values)| (name.to_string(), values[i].clone()))
                    .collect();
                UnsignedRecord { id, fields }
            })
            .collect();

        Ok(records)
    }
}

/// Ids from an `id` column: strings or non-negative integers, unique in the
/// batch by their rendered form (`7` and `"7"` collide)
fn caller_ids(values: &[Value]) -> PipelineResult<Vec<RecordId>> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .iter()
        .enumerate()
        .map(|(row, value)| {
            let id = RecordId::from_value(value).ok_or_else(|| {
                PipelineError::Validation(format!(
                    "id at row {} must be a string or non-negative integer",
                    row
                ))
            })?;
            if !seen.insert(id.to_string()) {
                return Err(PipelineError::Validation(format!("duplicate id '{}' in batch", id)));
            }
            Ok(id)
        })
        .collect()
}
