use crate::models::{GeoPoint, Organization, OrganizationCategory};
use crate::services::catalog::CatalogError;

/// Message attached to responses computed from the default organizations
pub const FALLBACK_MESSAGE: &str = "Using default organizations as live data could not be fetched";

/// Organizations a request is matched against, and where they came from
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub organizations: Vec<Organization>,
    pub used_fallback: bool,
    pub message: Option<String>,
}

/// (name, category, lat offset, lon offset, capacity, phone)
const DEFAULT_ORGANIZATIONS: &[(&str, OrganizationCategory, f64, f64, u32, &str)] = &[
    ("Food Bank of Hope", OrganizationCategory::Charity, 0.01, 0.01, 400, "+91 9876543210"),
    ("Community Kitchen", OrganizationCategory::Charity, -0.01, -0.01, 150, "+91 9876543211"),
    ("Green Earth NGO", OrganizationCategory::Ngo, 0.02, -0.02, 200, "+91 9876543212"),
    ("Help Hands Foundation", OrganizationCategory::Ngo, -0.02, 0.02, 300, "+91 9876543213"),
    ("Sunset Senior Home", OrganizationCategory::OldAgeHome, 0.015, -0.015, 100, "+91 9876543214"),
    ("Golden Years Residence", OrganizationCategory::OldAgeHome, -0.015, 0.015, 125, "+91 9876543215"),
];

/// Shift a point by degree offsets, staying inside the valid coordinate ranges
fn offset_point(origin: &GeoPoint, d_lat: f64, d_lon: f64) -> GeoPoint {
    let latitude = (origin.latitude + d_lat).clamp(-90.0, 90.0);
    let mut longitude = origin.longitude + d_lon;
    if longitude > 180.0 {
        longitude -= 360.0;
    } else if longitude < -180.0 {
        longitude += 360.0;
    }
    GeoPoint {
        latitude,
        longitude,
    }
}

/// Built-in organizations placed around `origin`
///
/// Used only by the request layer when the live catalog cannot serve a request.
pub fn default_organizations(origin: &GeoPoint) -> Vec<Organization> {
    DEFAULT_ORGANIZATIONS
        .iter()
        .enumerate()
        .map(|(i, (name, category, d_lat, d_lon, capacity, phone))| Organization {
            id: format!("default-{}", i + 1),
            name: name.to_string(),
            category: *category,
            location: offset_point(origin, *d_lat, *d_lon),
            capacity: *capacity,
            restrictions: vec![],
            active: true,
            verified: true,
            address: None,
            phone: Some(phone.to_string()),
            email: None,
            rating: None,
        })
        .collect()
}

/// Decide which organizations a request is matched against
///
/// With `fallback_enabled`, a failed or empty catalog fetch is replaced by
/// [`default_organizations`]. Without it, fetch errors propagate and an empty
/// catalog stays empty.
pub fn resolve_catalog(
    fetched: Result<Vec<Organization>, CatalogError>,
    origin: &GeoPoint,
    fallback_enabled: bool,
) -> Result<CatalogSnapshot, CatalogError> {
    match fetched {
        Ok(organizations) if !organizations.is_empty() || !fallback_enabled => Ok(CatalogSnapshot {
            organizations,
            used_fallback: false,
            message: None,
        }),
        Ok(_) => {
            tracing::warn!("Catalog returned no organizations near {}, using defaults", origin);
            Ok(fallback_snapshot(origin))
        }
        Err(e) if fallback_enabled => {
            tracing::warn!("Catalog unavailable ({}), using default organizations", e);
            Ok(fallback_snapshot(origin))
        }
        Err(e) => Err(e),
    }
}

fn fallback_snapshot(origin: &GeoPoint) -> CatalogSnapshot {
    CatalogSnapshot {
        organizations: default_organizations(origin),
        used_fallback: true,
        message: Some(FALLBACK_MESSAGE.to_string()),
    }
}
