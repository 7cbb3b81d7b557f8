use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string of the nearest-search endpoints
///
/// `latitude`/`longitude` are optional on the wire; absent, `NaN` or `0,0`
/// all mean the caller has no usable position.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearestQuery {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[validate(range(min = 1, max = 50, message = "limit must be between 1 and 50"))]
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default, alias = "province_id", rename = "provinceId")]
    pub province_id: Option<i32>,
    #[serde(default, alias = "district_id", rename = "districtId")]
    pub district_id: Option<i32>,
}

impl NearestQuery {
    /// Requested limit, falling back to the variant's configured default
    pub fn limit_or(&self, default_limit: usize) -> usize {
        self.limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(default_limit)
    }
}
