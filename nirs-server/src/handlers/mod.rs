//! HTTP handlers

pub mod health;
pub mod ingest;
pub mod data;
pub mod digital_asset;
pub mod analytics;
