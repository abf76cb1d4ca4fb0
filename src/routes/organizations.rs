use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

use crate::core::calculate_bounding_box;
use crate::models::{
    FoodItem, GeoPoint, LocationInput, NearbyOrganizations, NearbyOrganizationsRequest,
    NearbyOrganizationsResponse, PredictRequest, PredictResponse,
};
use crate::routes::{engine_error_response, error_response, validation_error_response, AppState};
use crate::services::{resolve_catalog, CatalogError};

/// Configure organization lookup routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/organizations/nearby", web::post().to(find_nearby))
        .route("/predict", web::post().to(predict));
}

/// Matches around a resolved origin, plus how the candidate list was obtained
struct NearbyLookup {
    origin: GeoPoint,
    radius_km: f64,
    organizations: NearbyOrganizations,
    used_fallback: bool,
    message: Option<String>,
}

/// Resolve the location, fetch candidates and run the matcher
///
/// Errors come back as ready-made responses so handlers can return them as-is.
async fn lookup_nearby(
    state: &AppState,
    location: &LocationInput,
    radius_km: Option<f64>,
    food_items: Option<&[FoodItem]>,
) -> Result<NearbyLookup, HttpResponse> {
    let origin = state
        .geocoder
        .resolve(location, &state.default_country)
        .await
        .map_err(|e| {
            tracing::info!("Could not resolve location {:?}: {}", location, e);
            engine_error_response(&e)
        })?;

    let radius_km = state.matching.effective_radius(radius_km);

    // A non-positive radius matches nothing, so skip the catalog round trip
    if radius_km <= 0.0 {
        let organizations = state
            .matcher
            .find_nearby(&origin, &[], radius_km, food_items)
            .map_err(|e| engine_error_response(&e))?;
        return Ok(NearbyLookup {
            origin,
            radius_km,
            organizations,
            used_fallback: false,
            message: None,
        });
    }

    let bbox = calculate_bounding_box(&origin, radius_km);
    let fetched = state.catalog.list_organizations(bbox).await;
    let snapshot = resolve_catalog(fetched, &origin, state.matching.fallback_to_defaults)
        .map_err(|e| catalog_error_response(&e))?;

    tracing::debug!(
        "Matching {} candidates within {}km of {}",
        snapshot.organizations.len(),
        radius_km,
        origin
    );

    let organizations = state
        .matcher
        .find_nearby(&origin, &snapshot.organizations, radius_km, food_items)
        .map_err(|e| {
            tracing::warn!("Matcher rejected catalog snapshot: {}", e);
            engine_error_response(&e)
        })?;

    Ok(NearbyLookup {
        origin,
        radius_km,
        organizations,
        used_fallback: snapshot.used_fallback,
        message: snapshot.message,
    })
}

fn catalog_error_response(err: &CatalogError) -> HttpResponse {
    tracing::error!("Failed to fetch organizations: {}", err);
    error_response(
        StatusCode::BAD_GATEWAY,
        "catalog_unavailable",
        format!("Failed to fetch organizations: {}", err),
    )
}

/// Nearby organizations endpoint
///
/// POST /api/v1/organizations/nearby
///
/// Request body:
/// ```json
/// {
///   "location": { "latitude": 19.076, "longitude": 72.8777 },
///   "radiusKm": 10,
///   "foodItems": [{ "name": "rice", "quantity": 20 }]
/// }
/// ```
async fn find_nearby(
    state: web::Data<AppState>,
    req: web::Json<NearbyOrganizationsRequest>,
) -> impl Responder {
    let lookup = match lookup_nearby(&state, &req.location, req.radius_km, req.food_items.as_deref()).await {
        Ok(lookup) => lookup,
        Err(resp) => return resp,
    };

    tracing::info!(
        "Found {} organizations within {}km of {}",
        lookup.organizations.total(),
        lookup.radius_km,
        lookup.origin
    );

    HttpResponse::Ok().json(NearbyOrganizationsResponse {
        origin: lookup.origin,
        radius_km: lookup.radius_km,
        total_results: lookup.organizations.total(),
        organizations: lookup.organizations,
        used_fallback: lookup.used_fallback,
        message: lookup.message,
    })
}

/// Combined estimate and match endpoint
///
/// POST /api/v1/predict
///
/// Estimates plate wastage for the event, then lists organizations near the
/// venue that could take the surplus.
async fn predict(
    state: web::Data<AppState>,
    req: web::Json<PredictRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    // Estimate first so bad input never costs a geocoding call
    let estimate = match state.estimator.estimate_by_plate_count(&req.event_type, req.plates) {
        Ok(estimate) => estimate,
        Err(e) => return engine_error_response(&e),
    };

    let lookup = match lookup_nearby(&state, &req.location, req.radius_km, None).await {
        Ok(lookup) => lookup,
        Err(resp) => return resp,
    };

    tracing::info!(
        "Predicted {} wasted plates for {} and found {} organizations",
        estimate.estimated_wastage,
        estimate.event_type,
        lookup.organizations.total()
    );

    HttpResponse::Ok().json(PredictResponse {
        estimated_wastage: estimate.estimated_wastage,
        recommended_plates: estimate.recommended_plates,
        estimate,
        origin: lookup.origin,
        nearby_organizations: lookup.organizations,
        used_fallback: lookup.used_fallback,
        message: lookup.message,
    })
}
