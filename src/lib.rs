//! FoodShare Algo - surplus food estimation and charity matching service
//!
//! This library provides the two deterministic engines behind the service:
//! a rule-based wastage estimator for events and a proximity matcher that
//! groups eligible receiving organizations around a donation point.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    find_nearby_organizations, haversine_distance, EngineError, EngineResult, ProximityMatcher,
    WastageEstimator, WastageRates,
};
pub use models::{
    EventWastageRequest, FoodItem, GeoPoint, MatchResult, NearbyOrganizations, Organization,
    OrganizationCategory,
};
