//! Logic Module - Pipeline Stages & Engines
//!
//! Dependency order (leaves first):
//! `normalizer` -> `integrity` -> `dataset` -> {`anomaly`, `aggregate`} -> `pipeline`

pub mod error;
pub mod normalizer;
pub mod integrity;
pub mod dataset;
pub mod anomaly;
pub mod aggregate;
pub mod pipeline;

mod collab;
