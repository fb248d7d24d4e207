//! Dataset Module - Normalized Record Storage
//!
//! Single source of truth for the analytic passes.
//! Records are stored in insertion order and never edited; corrections are new records.
//! Optionally durable through a JSONL journal.

pub mod record;
pub mod filter;
pub mod store;
pub mod journal;

#[cfg(test)]
mod tests;

pub use filter::RecordFilter;
pub use record::{Fields, Record, RecordId, UnsignedRecord};
pub use store::DatasetStore;
