use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::signer::Signer;
use crate::logic::dataset::{Record, UnsignedRecord};
use crate::logic::error::{PipelineError, PipelineResult};

/// Turns normalized rows into signed records.
/// Cheap to clone; the signer is shared.
#[derive(Clone)]
pub struct Stamper {
    signer: Arc<dyn Signer>,
}

impl Stamper {
    pub fn new(signer: Arc<dyn Signer>) -> Self {
        Self { signer }
    }

    pub fn stamp(&self, record: UnsignedRecord, timestamp: DateTime<Utc>) -> PipelineResult<Record> {
        let signature = self.signature_for(&record.id.to_string(), record.canonical_bytes())?;
        Ok(Record {
            id: record.id,
            fields: record.fields,
            timestamp,
            signature,
        })
    }

    /// All-or-nothing: the first signer failure rejects the batch
    pub fn stamp_batch(
        &self,
        batch: Vec<UnsignedRecord>,
        timestamp: DateTime<Utc>,
    ) -> PipelineResult<Vec<Record>> {
        batch.into_iter().map(|r| self.stamp(r, timestamp)).collect()
    }

    /// Recompute the signature of a stored record
    pub fn verify(&self, record: &Record) -> PipelineResult<bool> {
        let expected = self.signature_for(&record.id.to_string(), record.canonical_bytes())?;
        Ok(expected == record.signature)
    }

    fn signature_for(
        &self,
        id: &str,
        payload: Result<Vec<u8>, serde_json::Error>,
    ) -> PipelineResult<String> {
        let payload = payload.map_err(|e| {
            log::error!("Cannot serialize record {} for signing: {}", id, e);
            PipelineError::Signing(format!("unable to sign record {}", id))
        })?;
        let signature = self.signer.sign(&payload).map_err(|e| {
            log::error!("Signer failed for record {}: {}", id, e);
            PipelineError::Signing(format!("unable to sign record {}", id))
        })?;
        if signature.is_empty() {
            log::error!("Signer returned an empty signature for record {}", id);
            return Err(PipelineError::Signing(format!("unable to sign record {}", id)));
        }
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::dataset::{Fields, RecordId};
    use crate::logic::error::CollaboratorError;
    use crate::logic::integrity::Sha256Signer;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn unsigned(id: u64, amount: i64) -> UnsignedRecord {
        let mut fields = Fields::new();
        fields.insert("amount".into(), json!(amount));
        fields.insert("risk_score".into(), json!(0.4));
        UnsignedRecord {
            id: RecordId::Index(id),
            fields,
        }
    }

    #[test]
    fn test_signature_is_reproducible() {
        let stamper = Stamper::new(Arc::new(Sha256Signer::new()));
        let t1 = Utc::now();
        let t2 = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        let a = stamper.stamp(unsigned(0, 100), t1).unwrap();
        let b = stamper.stamp(unsigned(0, 100), t2).unwrap();

        assert_eq!(a.signature, b.signature);
        assert_eq!(a.timestamp, t1);
        assert_eq!(b.timestamp, t2);
        assert_ne!(a.signature, stamper.stamp(unsigned(0, 101), t1).unwrap().signature);
    }

    #[test]
    fn test_fields_untouched() {
        let stamper = Stamper::new(Arc::new(Sha256Signer::new()));
        let input = unsigned(3, 42);
        let record = stamper.stamp(input.clone(), Utc::now()).unwrap();
        assert_eq!(record.fields, input.fields);
        assert_eq!(record.id, input.id);
    }

    #[test]
    fn test_failing_signer_rejects_batch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let signer = move |_: &[u8]| -> Result<String, CollaboratorError> {
            if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                Err(CollaboratorError::Unavailable("hsm offline at 10.0.0.7".into()))
            } else {
                Ok("ok".into())
            }
        };
        let stamper = Stamper::new(Arc::new(signer));

        let result = stamper.stamp_batch(vec![unsigned(0, 1), unsigned(1, 2), unsigned(2, 3)], Utc::now());
        match result {
            Err(PipelineError::Signing(msg)) => {
                assert_eq!(msg, "unable to sign record 1");
                assert!(!msg.contains("10.0.0.7"));
            }
            other => panic!("Expected Signing error, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_verify_detects_tampering() {
        let stamper = Stamper::new(Arc::new(Sha256Signer::with_key("k")));
        let mut record = stamper.stamp(unsigned(0, 100), Utc::now()).unwrap();
        assert!(stamper.verify(&record).unwrap());

        record.fields.insert("amount".into(), json!(1));
        assert!(!stamper.verify(&record).unwrap());
    }
}
