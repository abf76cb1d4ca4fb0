use std::collections::BTreeMap;

use crate::core::{
    distance::{calculate_bounding_box, distance_between, is_within_bounding_box},
    error::{EngineError, EngineResult},
    filters::is_eligible,
};
use crate::models::{FoodItem, GeoPoint, MatchResult, NearbyOrganizations, Organization};

/// Proximity matcher - routes a donation to nearby eligible organizations
///
/// # Pipeline Stages
/// 1. Input validation (origin, radius, candidate locations, items)
/// 2. Eligibility (active, verified, capacity, restrictions)
/// 3. Bounding box pre-check, then exact haversine distance against the radius
/// 4. Grouping by category and stable sort by distance
///
/// The matcher holds no candidate data; every call works on the snapshot it is given.
#[derive(Debug, Clone, Default)]
pub struct ProximityMatcher {
    limit_per_category: Option<usize>,
}

impl ProximityMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` closest organizations in each category
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit_per_category: Some(limit),
        }
    }

    /// Find organizations within `radius_km` of `origin` that can take the donation
    ///
    /// # Arguments
    /// * `origin` - Where the surplus food is
    /// * `candidates` - Organization catalog snapshot
    /// * `radius_km` - Inclusive search radius
    /// * `food_items` - Requested items; enables the capacity and restriction checks
    ///
    /// # Returns
    /// Matches grouped by category, closest first. Ties keep candidate order.
    pub fn find_nearby(
        &self,
        origin: &GeoPoint,
        candidates: &[Organization],
        radius_km: f64,
        food_items: Option<&[FoodItem]>,
    ) -> EngineResult<NearbyOrganizations> {
        origin.validate()?;

        if radius_km.is_nan() {
            return Err(EngineError::invalid("radius_km must be a number"));
        }
        if radius_km <= 0.0 || candidates.is_empty() {
            return Ok(NearbyOrganizations::default());
        }

        for org in candidates {
            org.location.validate().map_err(|e| {
                EngineError::invalid(format!("organization {}: {}", org.id, e))
            })?;
        }

        if let Some(items) = food_items {
            if let Some(item) = items.iter().find(|item| item.name.trim().is_empty()) {
                return Err(EngineError::invalid(format!(
                    "food item with quantity {} has no name",
                    item.quantity
                )));
            }
        }

        let bounding_box = calculate_bounding_box(origin, radius_km);

        let matches = candidates
            .iter()
            // Stage 2: Eligibility
            .filter(|org| is_eligible(org, food_items))
            // Stage 3a: Cheap geospatial pre-check
            .filter(|org| {
                bounding_box
                    .as_ref()
                    .map_or(true, |bbox| is_within_bounding_box(&org.location, bbox))
            })
            // Stage 3b: Exact distance
            .filter_map(|org| {
                let distance_km = distance_between(origin, &org.location);
                (distance_km <= radius_km).then(|| MatchResult {
                    organization_id: org.id.clone(),
                    name: org.name.clone(),
                    category: org.category,
                    distance_km,
                })
            });

        // Stage 4: Group, then stable sort so equal distances keep catalog order
        let mut grouped: BTreeMap<_, Vec<MatchResult>> = BTreeMap::new();
        for m in matches {
            grouped.entry(m.category).or_default().push(m);
        }

        for group in grouped.values_mut() {
            group.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
            if let Some(limit) = self.limit_per_category {
                group.truncate(limit);
            }
        }
        grouped.retain(|_, group| !group.is_empty());

        Ok(NearbyOrganizations(grouped))
    }
}

/// Caller-facing form of [`ProximityMatcher::find_nearby`] with no per-category limit
pub fn find_nearby_organizations(
    origin: &GeoPoint,
    candidates: &[Organization],
    radius_km: f64,
    food_items: Option<&[FoodItem]>,
) -> EngineResult<NearbyOrganizations> {
    ProximityMatcher::new().find_nearby(origin, candidates, radius_km, food_items)
}
