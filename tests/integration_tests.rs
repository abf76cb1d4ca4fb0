// Integration tests for FoodShare Algo

use foodshare_algo::core::{find_nearby_organizations, ProximityMatcher, WastageEstimator};
use foodshare_algo::models::{
    Estimate, EventWastageRequest, FoodItem, GeoPoint, Organization, OrganizationCategory,
};
use foodshare_algo::services::{default_organizations, resolve_catalog, CatalogError};

const MUMBAI: GeoPoint = GeoPoint {
    latitude: 19.0760,
    longitude: 72.8777,
};

fn create_test_organization(
    id: &str,
    category: OrganizationCategory,
    lat: f64,
    lon: f64,
) -> Organization {
    Organization {
        id: id.to_string(),
        name: format!("Organization {}", id),
        category,
        location: GeoPoint {
            latitude: lat,
            longitude: lon,
        },
        capacity: 200,
        restrictions: vec![],
        active: true,
        verified: true,
        address: None,
        phone: None,
        email: None,
        rating: None,
    }
}

#[test]
fn test_integration_end_to_end_matching() {
    let mut unverified = create_test_organization("5", OrganizationCategory::Charity, 19.08, 72.88);
    unverified.verified = false;

    let mut strict = create_test_organization("6", OrganizationCategory::Ngo, 19.07, 72.87);
    strict.restrictions = vec!["biryani".to_string()];

    let candidates = vec![
        create_test_organization("1", OrganizationCategory::Charity, 19.09, 72.89),     // ~2km
        create_test_organization("2", OrganizationCategory::Charity, 19.0770, 72.8780), // ~0.1km
        create_test_organization("3", OrganizationCategory::OldAgeHome, 19.10, 72.90),  // ~3.5km
        create_test_organization("4", OrganizationCategory::FoodBank, 19.50, 73.20),    // too far
        unverified,
        strict,
    ];

    let items = vec![FoodItem::new("biryani", 50), FoodItem::new("raita", 20)];
    let result = find_nearby_organizations(&MUMBAI, &candidates, 10.0, Some(&items)).unwrap();

    // Closest first inside each category
    let charities: Vec<&str> = result
        .get(OrganizationCategory::Charity)
        .iter()
        .map(|m| m.organization_id.as_str())
        .collect();
    assert_eq!(charities, vec!["2", "1"]);

    assert_eq!(result.get(OrganizationCategory::OldAgeHome).len(), 1);
    assert!(result.get(OrganizationCategory::FoodBank).is_empty());
    assert!(result.get(OrganizationCategory::Ngo).is_empty());
    assert_eq!(result.total(), 3);

    for (_, group) in result.iter() {
        for m in group {
            assert!(m.distance_km <= 10.0);
        }
    }
}

#[test]
fn test_integration_empty_categories_are_absent() {
    let candidates = vec![create_test_organization("1", OrganizationCategory::Shelter, 19.08, 72.88)];
    let result = find_nearby_organizations(&MUMBAI, &candidates, 5.0, None).unwrap();

    let categories: Vec<_> = result.categories().copied().collect();
    assert_eq!(categories, vec![OrganizationCategory::Shelter]);

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("shelter").is_some());
    assert!(json.get("charity").is_none());
}

#[test]
fn test_integration_limit_per_category() {
    let candidates: Vec<Organization> = (0..20)
        .map(|i| {
            create_test_organization(
                &i.to_string(),
                OrganizationCategory::Charity,
                19.0760 + i as f64 * 0.001,
                72.8777,
            )
        })
        .collect();

    let matcher = ProximityMatcher::with_limit(5);
    let result = matcher.find_nearby(&MUMBAI, &candidates, 10.0, None).unwrap();

    let group = result.get(OrganizationCategory::Charity);
    assert_eq!(group.len(), 5);
    assert_eq!(group[0].organization_id, "0");
    assert!(group.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
}

#[test]
fn test_integration_fallback_when_catalog_fails() {
    let fetched = Err(CatalogError::ApiError("503 Service Unavailable".to_string()));
    let snapshot = resolve_catalog(fetched, &MUMBAI, true).unwrap();

    assert!(snapshot.used_fallback);
    assert!(snapshot.message.is_some());

    let result = find_nearby_organizations(&MUMBAI, &snapshot.organizations, 10.0, None).unwrap();
    assert_eq!(result.total(), 6);
}

#[test]
fn test_integration_no_fallback_when_disabled() {
    let fetched = Err(CatalogError::Unauthorized);
    assert!(resolve_catalog(fetched, &MUMBAI, false).is_err());

    let snapshot = resolve_catalog(Ok(vec![]), &MUMBAI, false).unwrap();
    assert!(!snapshot.used_fallback);
    assert!(snapshot.organizations.is_empty());
}

#[test]
fn test_integration_default_catalog_respects_radius() {
    // Default organizations sit 1.5-3km from the origin
    let organizations = default_organizations(&MUMBAI);
    let result = find_nearby_organizations(&MUMBAI, &organizations, 1.0, None).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_integration_estimate_then_match() {
    let estimator = WastageEstimator::default();
    let request = EventWastageRequest {
        event_type: "Festival".to_string(),
        expected_attendees: 500,
        actual_attendees: None,
    };

    let estimate = match request.estimate(&estimator).unwrap() {
        Estimate::PlateCount(estimate) => estimate,
        other => panic!("expected a plate estimate, got {:?}", other),
    };
    assert_eq!(estimate.estimated_wastage, 100);
    assert_eq!(estimate.recommended_plates, 400);

    let items = vec![FoodItem::new("plates", estimate.estimated_wastage as u32)];
    let mut small = create_test_organization("small", OrganizationCategory::Ngo, 19.08, 72.88);
    small.capacity = 50;
    let large = create_test_organization("large", OrganizationCategory::Ngo, 19.09, 72.89);

    let result = find_nearby_organizations(&MUMBAI, &[small, large], 10.0, Some(&items)).unwrap();
    let ngos = result.get(OrganizationCategory::Ngo);
    assert_eq!(ngos.len(), 1);
    assert_eq!(ngos[0].organization_id, "large");
}

#[test]
fn test_integration_attendance_mode() {
    let estimator = WastageEstimator::default();
    let request = EventWastageRequest {
        event_type: "corporate".to_string(),
        expected_attendees: 200,
        actual_attendees: Some(200),
    };

    match request.estimate(&estimator).unwrap() {
        Estimate::Attendance(estimate) => {
            // 200 * 0.4 * 0.2
            assert_eq!(estimate.predicted_quantity, 16.0);
            assert_eq!(estimate.basis.event_type, "Corporate");
        }
        other => panic!("expected an attendance estimate, got {:?}", other),
    }
}
