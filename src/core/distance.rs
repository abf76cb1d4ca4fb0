use crate::core::error::{EngineError, EngineResult};
use crate::models::{BoundingBox, GeoPoint};

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude, rounded down so boxes err on the large side
const KM_PER_DEGREE: f64 = 111.0;

/// Extra slack applied to bounding boxes before the exact haversine check
const BOX_MARGIN: f64 = 1.01;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two points
#[inline]
pub fn distance_between(from: &GeoPoint, to: &GeoPoint) -> f64 {
    haversine_distance(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Check that a coordinate pair is finite and inside the valid lat/lon ranges
pub fn validate_coordinates(latitude: f64, longitude: f64) -> EngineResult<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(EngineError::invalid(format!(
            "latitude {} is outside [-90, 90]",
            latitude
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(EngineError::invalid(format!(
            "longitude {} is outside [-180, 180]",
            longitude
        )));
    }
    Ok(())
}

/// Calculate a bounding box around a center point
///
/// This is much faster than Haversine for pre-filtering.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
///
/// Returns `None` when the box would touch a pole or wrap the antimeridian;
/// callers must then skip the pre-filter and rely on the exact distance.
pub fn calculate_bounding_box(center: &GeoPoint, radius_km: f64) -> Option<BoundingBox> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return None;
    }

    let lat_delta = radius_km * BOX_MARGIN / KM_PER_DEGREE;
    let min_lat = center.latitude - lat_delta;
    let max_lat = center.latitude + lat_delta;
    if min_lat <= -89.0 || max_lat >= 89.0 {
        return None;
    }

    // Widest longitude span occurs at the latitude edge closest to a pole
    let widest_lat = min_lat.abs().max(max_lat.abs());
    let lon_delta = radius_km * BOX_MARGIN / (KM_PER_DEGREE * widest_lat.to_radians().cos());
    let min_lon = center.longitude - lon_delta;
    let max_lon = center.longitude + lon_delta;
    if min_lon < -180.0 || max_lon > 180.0 {
        return None;
    }

    Some(BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    })
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(point: &GeoPoint, bbox: &BoundingBox) -> bool {
    point.latitude >= bbox.min_lat
        && point.latitude <= bbox.max_lat
        && point.longitude >= bbox.min_lon
        && point.longitude <= bbox.max_lon
}
