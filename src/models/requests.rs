use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{DonationStatus, EventWastageRequest, FoodItem, GeoPoint};

/// Request for an attendance-based estimate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttendanceEstimateRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "event_type", rename = "eventType")]
    pub event_type: String,
    #[serde(alias = "expected_attendees", rename = "expectedAttendees")]
    pub expected_attendees: i64,
    #[serde(default, alias = "actual_attendees", rename = "actualAttendees")]
    pub actual_attendees: Option<i64>,
}

impl From<AttendanceEstimateRequest> for EventWastageRequest {
    fn from(req: AttendanceEstimateRequest) -> Self {
        EventWastageRequest {
            event_type: req.event_type,
            expected_attendees: req.expected_attendees,
            actual_attendees: req.actual_attendees,
        }
    }
}

/// Request for a plate-count estimate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlateEstimateRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "event_type", rename = "eventType")]
    pub event_type: String,
    #[serde(alias = "plate_count", alias = "plates", rename = "plateCount")]
    pub plate_count: i64,
}

/// Request for a per-item menu estimate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ItemEstimateRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "event_type", rename = "eventType")]
    pub event_type: String,
    #[validate(length(min = 1))]
    #[serde(alias = "food_items", rename = "foodItems")]
    pub food_items: Vec<FoodItem>,
}

/// Where the surplus food is
///
/// Either device coordinates, a structured place, or a free-text query for the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    Coordinates(GeoPoint),
    Place {
        city: String,
        #[serde(default)]
        state: Option<String>,
        #[serde(default)]
        country: Option<String>,
    },
    Query {
        query: String,
    },
}

impl LocationInput {
    /// Free-text query for the geocoder, or `None` when coordinates were supplied
    pub fn geocoding_query(&self, default_country: &str) -> Option<String> {
        match self {
            LocationInput::Coordinates(_) => None,
            LocationInput::Place {
                city,
                state,
                country,
            } => {
                let country = country.as_deref().unwrap_or(default_country);
                let parts: Vec<&str> = [Some(city.as_str()), state.as_deref(), Some(country)]
                    .into_iter()
                    .flatten()
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .collect();
                Some(parts.join(", "))
            }
            LocationInput::Query { query } => Some(query.trim().to_string()),
        }
    }
}

/// Request to find organizations near a location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyOrganizationsRequest {
    pub location: LocationInput,
    #[serde(default, alias = "radius_km", rename = "radiusKm")]
    pub radius_km: Option<f64>,
    #[serde(default, alias = "food_items", rename = "foodItems")]
    pub food_items: Option<Vec<FoodItem>>,
}

/// Combined plate estimate and organization lookup
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "event_type", rename = "eventType")]
    pub event_type: String,
    #[serde(alias = "plateCount", alias = "plate_count", rename = "plates")]
    pub plates: i64,
    pub location: LocationInput,
    #[serde(default, alias = "radius_km", rename = "radiusKm")]
    pub radius_km: Option<f64>,
}

/// Request to record a donation hand-off
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordDonationRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "organization_id", rename = "organizationId")]
    pub organization_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "organization_name", rename = "organizationName")]
    pub organization_name: String,
    #[serde(default, alias = "event_type", rename = "eventType")]
    pub event_type: Option<String>,
    #[validate(range(min = 1))]
    #[serde(alias = "plate_count", rename = "plateCount")]
    pub plate_count: i32,
    #[serde(default, alias = "pickup_time", rename = "pickupTime")]
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[validate(length(min = 1))]
    #[serde(alias = "donor_name", rename = "donorName")]
    pub donor_name: String,
    #[validate(length(min = 1))]
    #[serde(alias = "donor_contact", rename = "donorContact")]
    pub donor_contact: String,
}

/// Request to move a donation to a new status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDonationStatusRequest {
    pub status: DonationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_input_variants() {
        let coords: LocationInput = serde_json::from_str(r#"{"latitude": 19.07, "longitude": 72.87}"#).unwrap();
        assert!(matches!(coords, LocationInput::Coordinates(_)));
        assert_eq!(coords.geocoding_query("India"), None);

        let place: LocationInput = serde_json::from_str(r#"{"city": "Pune", "state": "Maharashtra"}"#).unwrap();
        assert_eq!(place.geocoding_query("India").as_deref(), Some("Pune, Maharashtra, India"));

        let place: LocationInput = serde_json::from_str(r#"{"city": "Lyon", "state": "", "country": "France"}"#).unwrap();
        assert_eq!(place.geocoding_query("India").as_deref(), Some("Lyon, France"));

        let query: LocationInput = serde_json::from_str(r#"{"query": " Koramangala, Bangalore "}"#).unwrap();
        assert_eq!(query.geocoding_query("India").as_deref(), Some("Koramangala, Bangalore"));
    }

    #[test]
    fn test_attendance_request_validation() {
        let req: AttendanceEstimateRequest =
            serde_json::from_str(r#"{"eventType": "", "expectedAttendees": 10}"#).unwrap();
        assert!(req.validate().is_err());

        let req: AttendanceEstimateRequest =
            serde_json::from_str(r#"{"event_type": "Wedding", "expected_attendees": 10, "actual_attendees": 8}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(EventWastageRequest::from(req).actual_attendees, Some(8));
    }

    #[test]
    fn test_predict_request_accepts_plate_aliases() {
        let req: PredictRequest = serde_json::from_str(
            r#"{"eventType": "Festival", "plateCount": 300, "location": {"lat": 12.97, "lng": 77.59}}"#,
        )
        .unwrap();
        assert_eq!(req.plates, 300);
        assert!(req.radius_km.is_none());
    }

    #[test]
    fn test_record_donation_validation() {
        let req = RecordDonationRequest {
            organization_id: "org-1".to_string(),
            organization_name: "City Food Relief".to_string(),
            event_type: Some("Wedding".to_string()),
            plate_count: 0,
            pickup_time: None,
            notes: String::new(),
            donor_name: "A. Organizer".to_string(),
            donor_contact: "+91 9876500000".to_string(),
        };
        assert!(req.validate().is_err());

        let req = RecordDonationRequest { plate_count: 40, ..req };
        assert!(req.validate().is_ok());
    }
}
