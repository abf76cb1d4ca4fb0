// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    GeoPoint, Organization, OrganizationCategory, FoodItem, MatchResult, NearbyOrganizations,
    EventWastageRequest, RateBasis, WastageEstimate, PlateEstimate, ItemWastage, Estimate,
    Donation, DonationStatus, BoundingBox,
};
pub use requests::{
    AttendanceEstimateRequest, PlateEstimateRequest, ItemEstimateRequest, LocationInput,
    NearbyOrganizationsRequest, PredictRequest, RecordDonationRequest, UpdateDonationStatusRequest,
};
pub use responses::{
    ItemEstimateResponse, NearbyOrganizationsResponse, PredictResponse, HealthResponse,
    ErrorResponse, RecordDonationResponse, DonationListResponse,
};
