// Service exports
pub mod cache;
pub mod catalog;
pub mod fallback;
pub mod geocoding;
pub mod postgres;

pub use cache::{CacheManager, CacheKey, CacheError};
pub use catalog::{CatalogClient, CatalogError};
pub use fallback::{CatalogSnapshot, default_organizations, resolve_catalog};
pub use geocoding::{NominatimGeocoder, GeocodingError};
pub use postgres::{PostgresClient, PostgresError};
