use crate::config::GeocodingSettings;
use crate::core::EngineError;
use crate::models::{GeoPoint, LocationInput};
use crate::services::cache::{CacheKey, CacheManager};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when geocoding a location
#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoder returned error: {0}")]
    ApiError(String),

    #[error("No coordinates found for {0}")]
    NotFound(String),

    #[error("Invalid geocoder response: {0}")]
    InvalidResponse(String),
}

impl From<GeocodingError> for EngineError {
    fn from(err: GeocodingError) -> Self {
        EngineError::LocationUnresolved(err.to_string())
    }
}

/// One search hit as returned by Nominatim
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Nominatim (OpenStreetMap) geocoding client
///
/// Successful lookups are cached; misses are not, so a place that appears
/// later in OSM is picked up on the next request.
pub struct NominatimGeocoder {
    endpoint: String,
    user_agent: String,
    country_codes: Option<String>,
    client: Client,
    cache: Option<Arc<CacheManager>>,
}

impl NominatimGeocoder {
    pub fn new(
        endpoint: String,
        user_agent: String,
        country_codes: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GeocodingError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            user_agent,
            country_codes,
            client,
            cache: None,
        })
    }

    pub fn from_settings(settings: &GeocodingSettings) -> Result<Self, GeocodingError> {
        Self::new(
            settings.endpoint.clone(),
            settings.user_agent.clone(),
            settings.country_codes.clone(),
            Duration::from_secs(settings.timeout_secs.unwrap_or(10)),
        )
    }

    /// Cache successful lookups in the given cache manager
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn search_url(&self, query: &str) -> String {
        let mut url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(query)
        );
        if let Some(codes) = self.country_codes.as_deref().filter(|c| !c.is_empty()) {
            url.push_str("&countrycodes=");
            url.push_str(&urlencoding::encode(codes));
        }
        url
    }

    /// Resolve a free-text location to coordinates
    pub async fn geocode(&self, query: &str) -> Result<GeoPoint, GeocodingError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodingError::NotFound("an empty location".to_string()));
        }

        let cache_key = CacheKey::geocode(query);
        if let Some(cache) = &self.cache {
            if let Ok(point) = cache.get::<GeoPoint>(&cache_key).await {
                tracing::debug!("Geocode cache hit for {:?}", query);
                return Ok(point);
            }
        }

        let url = self.search_url(query);
        tracing::debug!("Geocoding request: {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodingError::ApiError(format!(
                "Geocoding request failed with status {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodingError::InvalidResponse(e.to_string()))?;

        let place = places
            .first()
            .ok_or_else(|| GeocodingError::NotFound(query.to_string()))?;

        let latitude: f64 = place
            .lat
            .parse()
            .map_err(|_| GeocodingError::InvalidResponse(format!("bad latitude {:?}", place.lat)))?;
        let longitude: f64 = place
            .lon
            .parse()
            .map_err(|_| GeocodingError::InvalidResponse(format!("bad longitude {:?}", place.lon)))?;
        let point = GeoPoint::new(latitude, longitude)
            .map_err(|e| GeocodingError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            "Geocoded {:?} to {} ({})",
            query,
            point,
            place.display_name.as_deref().unwrap_or("unnamed")
        );

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&cache_key, &point).await {
                tracing::warn!("Failed to cache geocode for {:?}: {}", query, e);
            }
        }

        Ok(point)
    }

    /// Turn a request location into a validated origin
    ///
    /// Supplied coordinates are validated and used as-is (`InvalidInput` when out of
    /// range). Anything else goes through the geocoder (`LocationUnresolved` on failure).
    pub async fn resolve(&self, location: &LocationInput, default_country: &str) -> Result<GeoPoint, EngineError> {
        match location.geocoding_query(default_country) {
            None => match location {
                LocationInput::Coordinates(point) => {
                    point.validate()?;
                    Ok(*point)
                }
                _ => Err(EngineError::invalid("location has neither coordinates nor a place name")),
            },
            Some(query) => self.geocode(&query).await.map_err(|e| {
                tracing::warn!("Could not resolve location {:?}: {}", query, e);
                EngineError::from(e)
            }),
        }
    }
}
