use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    DonationListResponse, RecordDonationRequest, RecordDonationResponse,
    UpdateDonationStatusRequest,
};
use crate::routes::{error_response, validation_error_response, AppState};
use crate::services::PostgresError;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

/// Configure donation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/donations", web::post().to(record_donation))
        .route("/donations/{id}", web::get().to(get_donation))
        .route("/donations/{id}/status", web::patch().to(update_donation_status))
        .route("/organizations/{id}/donations", web::get().to(list_donations));
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<usize>,
    offset: Option<usize>,
}

fn next_steps(organization_name: &str) -> Vec<String> {
    vec![
        format!("{} has been sent your donation details", organization_name),
        "Their volunteer will contact you on the number you provided".to_string(),
        "Keep the food covered and ready for pickup at the agreed time".to_string(),
    ]
}

/// Map storage errors; `InvalidInput` here means the request conflicts with stored state
fn postgres_error_response(err: &PostgresError) -> HttpResponse {
    match err {
        PostgresError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        PostgresError::InvalidInput(_) => error_response(StatusCode::CONFLICT, "conflict", err.to_string()),
        PostgresError::SqlxError(_) | PostgresError::MigrateError(_) => {
            tracing::error!("Database error: {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "database_error",
                "Failed to access donation records",
            )
        }
    }
}

fn parse_donation_id(raw: &str) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(raw).map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            format!("'{}' is not a valid donation id", raw),
        )
    })
}

/// Record donation endpoint
///
/// POST /api/v1/donations
///
/// Request body:
/// ```json
/// {
///   "organizationId": "org-123",
///   "organizationName": "Helping Hands Charity",
///   "eventType": "Wedding",
///   "plateCount": 120,
///   "pickupTime": "2025-01-01T21:00:00+05:30",
///   "donorName": "A. Organizer",
///   "donorContact": "+91 9876500000"
/// }
/// ```
async fn record_donation(
    state: web::Data<AppState>,
    req: web::Json<RecordDonationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    match state.postgres.record_donation(&req).await {
        Ok(donation) => {
            tracing::info!(
                "Recorded donation {} of {} plates for {}",
                donation.id,
                donation.plate_count,
                donation.organization_id
            );
            HttpResponse::Created().json(RecordDonationResponse {
                success: true,
                donation_id: donation.id.to_string(),
                status: donation.status,
                next_steps: next_steps(&donation.organization_name),
            })
        }
        Err(PostgresError::InvalidInput(msg)) => {
            error_response(StatusCode::BAD_REQUEST, "invalid_input", msg)
        }
        Err(e) => postgres_error_response(&e),
    }
}

/// GET /api/v1/donations/{id}
async fn get_donation(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_donation_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.postgres.get_donation(id).await {
        Ok(donation) => HttpResponse::Ok().json(donation),
        Err(e) => postgres_error_response(&e),
    }
}

/// PATCH /api/v1/donations/{id}/status
///
/// Allowed moves: pending to accepted or cancelled, accepted to collected or cancelled.
async fn update_donation_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateDonationStatusRequest>,
) -> impl Responder {
    let id = match parse_donation_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.postgres.update_donation_status(id, req.status).await {
        Ok(donation) => HttpResponse::Ok().json(donation),
        Err(e) => postgres_error_response(&e),
    }
}

/// GET /api/v1/organizations/{id}/donations?limit=20&offset=0
async fn list_donations(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListParams>,
) -> impl Responder {
    let organization_id = path.into_inner();
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    match state
        .postgres
        .list_donations_for_organization(&organization_id, limit, offset)
        .await
    {
        Ok(donations) => HttpResponse::Ok().json(DonationListResponse {
            count: donations.len(),
            organization_id,
            donations,
        }),
        Err(e) => postgres_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_donation_id() {
        assert!(parse_donation_id("3f2b1c1e-8d4a-4c55-9a55-2f0d7c1f9b10").is_ok());

        let resp = parse_donation_id("not-a-uuid").unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_postgres_error_mapping() {
        let resp = postgres_error_response(&PostgresError::NotFound("donation".to_string()));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = postgres_error_response(&PostgresError::InvalidInput("collected".to_string()));
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_next_steps_name_the_organization() {
        let steps = next_steps("City Food Relief");
        assert!(steps[0].starts_with("City Food Relief"));
    }
}
