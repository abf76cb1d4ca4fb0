use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::distance::validate_coordinates;
use crate::core::error::EngineResult;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point, rejecting out-of-range or non-finite coordinates
    pub fn new(latitude: f64, longitude: f64) -> EngineResult<Self> {
        validate_coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn validate(&self) -> EngineResult<()> {
        validate_coordinates(self.latitude, self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// Organization classification
///
/// Deserializes from free-form labels ("NGO", "Old Age Home", "nursing_home", ...)
/// and always serializes to the snake_case name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrganizationCategory {
    Charity,
    Ngo,
    OldAgeHome,
    FoodBank,
    Shelter,
    #[default]
    Other,
}

impl OrganizationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationCategory::Charity => "charity",
            OrganizationCategory::Ngo => "ngo",
            OrganizationCategory::OldAgeHome => "old_age_home",
            OrganizationCategory::FoodBank => "food_bank",
            OrganizationCategory::Shelter => "shelter",
            OrganizationCategory::Other => "other",
        }
    }

    /// Classify a free-form place/organization label
    pub fn classify(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace(['_', '-'], " ");
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let normalized = words.join(" ");

        if normalized.contains("ngo") {
            OrganizationCategory::Ngo
        } else if normalized.contains("charity") {
            OrganizationCategory::Charity
        } else if normalized.contains("food bank") || normalized.contains("foodbank") {
            OrganizationCategory::FoodBank
        } else if normalized.contains("shelter") {
            OrganizationCategory::Shelter
        } else if normalized.contains("home")
            || normalized.contains("elderly")
            || normalized.contains("nursing")
        {
            OrganizationCategory::OldAgeHome
        } else {
            OrganizationCategory::Other
        }
    }
}

impl From<String> for OrganizationCategory {
    fn from(value: String) -> Self {
        Self::classify(&value)
    }
}

impl From<OrganizationCategory> for String {
    fn from(value: OrganizationCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for OrganizationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An organization able to receive surplus food
///
/// Documents from the catalog store coordinates flat (`latitude`/`longitude`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(alias = "$id", alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, alias = "type", alias = "organizationType", alias = "organization_type")]
    pub category: OrganizationCategory,
    #[serde(flatten)]
    pub location: GeoPoint,
    /// Maximum units of food the organization accepts per donation
    #[serde(default)]
    pub capacity: u32,
    /// Food item names the organization will not accept
    #[serde(default)]
    pub restrictions: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

fn default_true() -> bool { true }

/// A requested food item in a donation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default = "default_serving_size", alias = "serving_size")]
    pub serving_size: u32,
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_serving_size() -> u32 { 1 }
fn default_unit() -> String { "servings".to_string() }

impl FoodItem {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
            serving_size: default_serving_size(),
            unit: default_unit(),
        }
    }
}

/// One organization matched to a donation origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub organization_id: String,
    pub name: String,
    pub category: OrganizationCategory,
    pub distance_km: f64,
}

/// Matches grouped by category, each group ordered by ascending distance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NearbyOrganizations(pub BTreeMap<OrganizationCategory, Vec<MatchResult>>);

impl NearbyOrganizations {
    pub fn get(&self, category: OrganizationCategory) -> &[MatchResult] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn categories(&self) -> impl Iterator<Item = &OrganizationCategory> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OrganizationCategory, &Vec<MatchResult>)> {
        self.0.iter()
    }

    /// Total number of matches across all categories
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Event parameters for a wastage estimate
///
/// Without `actual_attendees` only the plate-count estimate applies, using the
/// expected attendance as the plate count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWastageRequest {
    pub event_type: String,
    pub expected_attendees: i64,
    #[serde(default)]
    pub actual_attendees: Option<i64>,
}

/// The rate table entry an attendance estimate was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBasis {
    /// Rate table key actually used (unknown types resolve to "Other")
    pub event_type: String,
    /// Kilograms per attendee
    pub base_rate: f64,
    /// Over-preparation multiplier or under-preparation factor
    pub multiplier_applied: f64,
    pub over_prepared: bool,
}

/// Attendance-based wastage prediction in kilograms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WastageEstimate {
    pub predicted_quantity: f64,
    pub unit: String,
    pub basis: RateBasis,
}

/// Plate-count wastage prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateEstimate {
    pub event_type: String,
    pub wastage_rate: f64,
    pub estimated_wastage: u64,
    pub recommended_plates: u64,
}

/// Predicted wastage for one food item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemWastage {
    pub name: String,
    pub original_quantity: u32,
    pub predicted_wastage: f64,
    pub unit: String,
}

/// Either estimate, depending on which attendance figures were known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Estimate {
    Attendance(WastageEstimate),
    PlateCount(PlateEstimate),
}

/// Lifecycle of a recorded donation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "donation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Accepted,
    Collected,
    Cancelled,
}

impl DonationStatus {
    /// Whether a donation may move from `self` to `next`
    pub fn can_transition_to(self, next: DonationStatus) -> bool {
        use DonationStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Cancelled) | (Accepted, Collected) | (Accepted, Cancelled)
        )
    }
}

/// Surplus food handed to an organization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: uuid::Uuid,
    pub organization_id: String,
    pub organization_name: String,
    pub event_type: Option<String>,
    pub plate_count: i32,
    pub pickup_time: Option<String>,
    pub notes: String,
    pub donor_name: String,
    pub donor_contact: String,
    pub status: DonationStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}
