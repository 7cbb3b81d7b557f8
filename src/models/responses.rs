use serde::{Deserialize, Serialize};

use crate::models::domain::{District, Province, RatingSummary};

/// One search hit as returned to clients
///
/// The candidate's own fields are flattened next to the distance, contact
/// and rating fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedResult<C> {
    #[serde(flatten)]
    pub candidate: C,
    /// Kilometers from the user, `null` when either side lacks coordinates
    pub distance: Option<f64>,
    pub company_name: String,
    pub company_phone: String,
    pub company_email: Option<String>,
    pub company_address: Option<String>,
    pub company_city: Option<String>,
    pub company_district: Option<String>,
    pub average_rating: f64,
    pub review_count: i64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Rating summary of a single tow truck
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummaryResponse {
    pub tow_truck_id: i32,
    #[serde(flatten)]
    pub summary: RatingSummary,
}

/// Province listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvincesResponse {
    pub status: String,
    pub data: Vec<Province>,
}

/// District listing of one province
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictsResponse {
    pub status: String,
    pub data: Vec<District>,
}
