// Route exports
pub mod donations;
pub mod health;
pub mod organizations;
pub mod wastage;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse};
use std::sync::Arc;
use validator::ValidationErrors;

use crate::config::MatchingSettings;
use crate::core::{EngineError, ProximityMatcher, WastageEstimator};
use crate::models::ErrorResponse;
use crate::services::{CatalogClient, NominatimGeocoder, PostgresClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogClient>,
    pub geocoder: Arc<NominatimGeocoder>,
    pub postgres: Arc<PostgresClient>,
    pub estimator: WastageEstimator,
    pub matcher: ProximityMatcher,
    pub matching: MatchingSettings,
    pub default_country: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(wastage::configure)
            .configure(organizations::configure)
            .configure(donations::configure),
    );
}

/// Build a JSON error body with the given status
pub fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

/// Map engine errors: bad input is the caller's to fix, an unresolved location
/// asks the caller for coordinates instead
pub fn engine_error_response(err: &EngineError) -> HttpResponse {
    let status = match err {
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EngineError::LocationUnresolved(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    error_response(status, err.code(), err.to_string())
}

pub fn validation_error_response(errors: &ValidationErrors) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, "validation_failed", errors.to_string())
}

/// JSON error returned when actix rejects a payload before it reaches a handler
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Payload extractor settings shared by the server and the API tests
pub fn configure_payloads(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_status_codes() {
        let resp = engine_error_response(&EngineError::invalid("radius"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = engine_error_response(&EngineError::unresolved("Atlantis"));
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
