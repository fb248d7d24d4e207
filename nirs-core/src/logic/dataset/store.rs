//! Dataset Store
//!
//! Append-only, insertion-ordered collection of signed records.
//! Writers hold the exclusive guard for a whole batch, so readers see either
//! all of a batch or none of it. There is no update or delete.

use std::path::Path;

use parking_lot::RwLock;

use super::filter::RecordFilter;
use super::journal::Journal;
use super::record::Record;
use crate::logic::error::{PipelineError, PipelineResult};

struct StoreInner {
    records: Vec<Record>,
    journal: Option<Journal>,
}

pub struct DatasetStore {
    inner: RwLock<StoreInner>,
}

impl DatasetStore {
    /// Process-lifetime store
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                records: Vec::new(),
                journal: None,
            }),
        }
    }

    /// Store backed by a JSONL journal; existing records are replayed
    pub fn open(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let (journal, records) = Journal::open(path.as_ref())?;
        Ok(Self {
            inner: RwLock::new(StoreInner {
                records,
                journal: Some(journal),
            }),
        })
    }

    /// Append a batch atomically. Returns the new total.
    pub fn append(&self, batch: Vec<Record>) -> PipelineResult<usize> {
        if let Some(unsigned) = batch.iter().find(|r| r.signature.is_empty()) {
            return Err(PipelineError::Validation(format!(
                "record {} has no signature",
                unsigned.id
            )));
        }

        let mut inner = self.inner.write();
        if let Some(journal) = inner.journal.as_mut() {
            journal.append_batch(&batch)?;
        }
        inner.records.extend(batch);
        Ok(inner.records.len())
    }

    /// Ordered subsequence matching `predicate`
    pub fn query<P>(&self, predicate: P) -> Vec<Record>
    where
        P: Fn(&Record) -> bool,
    {
        self.inner
            .read()
            .records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    pub fn filter(&self, filter: &RecordFilter) -> Vec<Record> {
        filter.paginate(self.query(|r| filter.matches(r)))
    }

    pub fn all(&self) -> Vec<Record> {
        self.inner.read().records.clone()
    }

    /// First record whose id renders as `id`
    pub fn get(&self, id: &str) -> Option<Record> {
        self.inner
            .read()
            .records
            .iter()
            .find(|r| r.id.to_string() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_durable(&self) -> bool {
        self.inner.read().journal.is_some()
    }
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
