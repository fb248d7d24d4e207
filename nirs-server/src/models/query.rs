//! Dataset query models

use nirs_core::RecordFilter;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Default, Validate)]
pub struct DataQuery {
    /// Strict lower bound on `amount`
    pub amount: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_risk: Option<f64>,
    #[validate(length(min = 1))]
    pub institution: Option<String>,
    #[validate(range(min = 1, max = 10000))]
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl DataQuery {
    pub fn into_filter(self) -> RecordFilter {
        RecordFilter {
            min_amount: self.amount,
            min_risk: self.min_risk,
            institution: self.institution,
            limit: self.limit,
            offset: self.offset,
        }
    }
}
