use serde::{Deserialize, Serialize};
use crate::models::domain::{Donation, DonationStatus, GeoPoint, ItemWastage, NearbyOrganizations, PlateEstimate};

/// Response for the per-item estimate endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEstimateResponse {
    pub event_type: String,
    pub items: Vec<ItemWastage>,
    pub total_predicted_wastage: f64,
}

/// Response for the nearby organizations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyOrganizationsResponse {
    pub origin: GeoPoint,
    pub radius_km: f64,
    pub organizations: NearbyOrganizations,
    pub total_results: usize,
    pub used_fallback: bool,
    pub message: Option<String>,
}

/// Response for the combined predict endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub estimated_wastage: u64,
    pub recommended_plates: u64,
    pub estimate: PlateEstimate,
    pub origin: GeoPoint,
    pub nearby_organizations: NearbyOrganizations,
    pub used_fallback: bool,
    pub message: Option<String>,
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
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Record donation response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDonationResponse {
    pub success: bool,
    pub donation_id: String,
    pub status: DonationStatus,
    pub next_steps: Vec<String>,
}

/// Donations recorded for one organization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationListResponse {
    pub organization_id: String,
    pub donations: Vec<Donation>,
    pub count: usize,
}
