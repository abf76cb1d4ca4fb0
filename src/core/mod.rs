// Core algorithm exports
pub mod distance;
pub mod error;
pub mod filters;
pub mod matcher;
pub mod wastage;

pub use distance::{haversine_distance, distance_between, calculate_bounding_box, is_within_bounding_box};
pub use error::{EngineError, EngineResult};
pub use filters::{is_available, is_eligible, has_capacity_for, accepts_items};
pub use matcher::{ProximityMatcher, find_nearby_organizations};
pub use wastage::{WastageEstimator, WastageRates, round2};
