//! Request / response models

pub mod ingest;
pub mod query;
pub mod analytics;

pub use ingest::*;
pub use query::*;
pub use analytics::*;
