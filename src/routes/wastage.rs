use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::round2;
use crate::models::{
    AttendanceEstimateRequest, EventWastageRequest, ItemEstimateRequest, ItemEstimateResponse,
    PlateEstimateRequest,
};
use crate::routes::{engine_error_response, validation_error_response, AppState};

/// Configure wastage estimation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/wastage/attendance", web::post().to(estimate_by_attendance))
        .route("/wastage/plates", web::post().to(estimate_by_plate_count))
        .route("/wastage/items", web::post().to(estimate_by_food_items));
}

/// Attendance estimate endpoint
///
/// POST /api/v1/wastage/attendance
///
/// Request body:
/// ```json
/// {
///   "eventType": "Wedding",
///   "expectedAttendees": 1000,
///   "actualAttendees": 800
/// }
/// ```
///
/// Without `actualAttendees` the plate-count estimate is returned instead.
async fn estimate_by_attendance(
    state: web::Data<AppState>,
    req: web::Json<AttendanceEstimateRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    let request = EventWastageRequest::from(req.into_inner());

    match request.estimate(&state.estimator) {
        Ok(estimate) => {
            tracing::info!(
                "Estimated wastage for {} (expected {}, actual {:?})",
                request.event_type,
                request.expected_attendees,
                request.actual_attendees
            );
            HttpResponse::Ok().json(estimate)
        }
        Err(e) => {
            tracing::info!("Rejected attendance estimate: {}", e);
            engine_error_response(&e)
        }
    }
}

/// Plate-count estimate endpoint
///
/// POST /api/v1/wastage/plates
async fn estimate_by_plate_count(
    state: web::Data<AppState>,
    req: web::Json<PlateEstimateRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    match state.estimator.estimate_by_plate_count(&req.event_type, req.plate_count) {
        Ok(estimate) => HttpResponse::Ok().json(estimate),
        Err(e) => engine_error_response(&e),
    }
}

/// Per-item menu estimate endpoint
///
/// POST /api/v1/wastage/items
async fn estimate_by_food_items(
    state: web::Data<AppState>,
    req: web::Json<ItemEstimateRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error_response(&errors);
    }

    match state.estimator.estimate_by_food_items(&req.event_type, &req.food_items) {
        Ok(items) => {
            let total = round2(items.iter().map(|item| item.predicted_wastage).sum());
            HttpResponse::Ok().json(ItemEstimateResponse {
                event_type: req.event_type.clone(),
                items,
                total_predicted_wastage: total,
            })
        }
        Err(e) => engine_error_response(&e),
    }
}
