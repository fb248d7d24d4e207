//! Analytics models

use nirs_core::{Forecast, ForecastRequest, KpiReport};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Default, Validate)]
pub struct ForecastQuery {
    /// Days ahead
    #[validate(range(min = 1, max = 365))]
    pub horizon: Option<u32>,
    /// Percent
    #[validate(range(min = 1, max = 100))]
    pub confidence: Option<u8>,
}

impl ForecastQuery {
    pub fn request(&self) -> ForecastRequest {
        let defaults = ForecastRequest::default();
        ForecastRequest {
            horizon: self.horizon.unwrap_or(defaults.horizon),
            confidence: self.confidence.unwrap_or(defaults.confidence),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub kpis: KpiReport,
    pub forecast: Forecast,
}
