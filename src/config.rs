use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::WastageRates;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub geocoding: GeocodingSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub wastage: WastageRates,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Organization catalog document store
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    #[serde(default = "default_organizations_collection")]
    pub organizations_collection: String,
    pub timeout_secs: Option<u64>,
}

fn default_organizations_collection() -> String { "organizations".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    #[serde(default = "default_geocoding_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Restrict results to these ISO country codes (comma separated)
    #[serde(default)]
    pub country_codes: Option<String>,
    /// Appended to structured locations that carry no country
    #[serde(default = "default_country")]
    pub default_country: String,
    pub timeout_secs: Option<u64>,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            endpoint: default_geocoding_endpoint(),
            user_agent: default_user_agent(),
            country_codes: None,
            default_country: default_country(),
            timeout_secs: None,
        }
    }
}

fn default_geocoding_endpoint() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { format!("FoodShareAlgo/{}", env!("CARGO_PKG_VERSION")) }
fn default_country() -> String { "India".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Shared L2 cache; the service runs with the in-process cache alone when unset
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,
    #[serde(default)]
    pub max_results_per_category: Option<usize>,
    /// Match against the built-in default organizations when the catalog is unavailable or empty
    #[serde(default = "default_fallback")]
    pub fallback_to_defaults: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
            max_radius_km: default_max_radius_km(),
            max_results_per_category: None,
            fallback_to_defaults: default_fallback(),
        }
    }
}

impl MatchingSettings {
    /// Requested radius, or the default, capped at the configured maximum
    ///
    /// Non-positive and NaN radii pass through untouched so the matcher decides.
    pub fn effective_radius(&self, requested: Option<f64>) -> f64 {
        let radius = requested.unwrap_or(self.default_radius_km);
        if radius.is_nan() || radius <= self.max_radius_km {
            radius
        } else {
            self.max_radius_km
        }
    }
}

fn default_radius_km() -> f64 { 10.0 }
fn default_max_radius_km() -> f64 { 50.0 }
fn default_fallback() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with FOODSHARE_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., FOODSHARE_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("FOODSHARE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("FOODSHARE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.wastage
            .validate()
            .map_err(|e| ConfigError::Message(format!("wastage: {}", e)))?;

        let matching = &self.matching;
        if !(matching.default_radius_km > 0.0) || !(matching.max_radius_km >= matching.default_radius_km) {
            return Err(ConfigError::Message(format!(
                "matching: need 0 < default_radius_km ({}) <= max_radius_km ({})",
                matching.default_radius_km, matching.max_radius_km
            )));
        }
        Ok(())
    }
}

/// Apply the conventional unprefixed variables on top of the layered config
///
/// `DATABASE_URL` and `CATALOG_API_KEY` are what the deployment tooling exports.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let database_url = env::var("DATABASE_URL").ok();
    let catalog_api_key = env::var("CATALOG_API_KEY").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(url) = database_url {
        builder = builder.set_override("database.url", url)?;
    }
    if let Some(api_key) = catalog_api_key {
        builder = builder.set_override("catalog.api_key", api_key)?;
    }

    builder.build()
}
