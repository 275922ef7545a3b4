//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_BACKEND_URL` - Base URL of the REST backend
//!
//! ## Optional
//! - `SHOPFRONT_CURRENCY` - ISO 4217 display currency (default: USD)
//! - `SHOPFRONT_DELIVERY_CHARGE` - Flat delivery fee (default: 10)
//! - `SHOPFRONT_FREE_SHIPPING_THRESHOLD` - Subtotal above which the cart
//!   is flagged as qualifying for free shipping (default: 99)
//! - `SHOPFRONT_PAGE_SIZE` - Products per catalog page (default: 15)
//! - `SHOPFRONT_REQUEST_TIMEOUT_SECS` - Backend request timeout (default: 15)
//! - `SHOPFRONT_CATALOG_CACHE_TTL_SECS` - Product list cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use shopfront_core::CurrencyCode;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend connection settings
    pub backend: BackendConfig,
    /// Pricing and delivery settings used for cart totals
    pub checkout: CheckoutConfig,
    /// Products per catalog page
    pub page_size: usize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// REST backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, always ending in `/` so relative API paths join under it
    pub base_url: Url,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// How long the product list stays cached
    pub catalog_cache_ttl: Duration,
}

/// Cart totals configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Display currency
    pub currency: CurrencyCode,
    /// Flat delivery fee added to non-empty carts
    pub delivery_charge: Decimal,
    /// Subtotal above which the cart qualifies for free shipping
    pub free_shipping_threshold: Decimal,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::USD,
            delivery_charge: Decimal::from(10),
            free_shipping_threshold: Decimal::from(99),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = BackendConfig::from_env()?;
        let checkout = CheckoutConfig::from_env()?;
        let page_size = parse_env_or_default::<usize>("SHOPFRONT_PAGE_SIZE", "15")?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            backend,
            checkout,
            page_size,
            sentry_dsn,
        })
    }
}

impl BackendConfig {
    /// Build a backend configuration with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            request_timeout: Duration::from_secs(15),
            catalog_cache_ttl: Duration::from_secs(300),
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(&get_required_env("SHOPFRONT_BACKEND_URL")?)?;
        let request_timeout = Duration::from_secs(parse_env_or_default::<u64>(
            "SHOPFRONT_REQUEST_TIMEOUT_SECS",
            "15",
        )?);
        let catalog_cache_ttl = Duration::from_secs(parse_env_or_default::<u64>(
            "SHOPFRONT_CATALOG_CACHE_TTL_SECS",
            "300",
        )?);

        Ok(Self {
            base_url,
            request_timeout,
            catalog_cache_ttl,
        })
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let currency = get_env_or_default("SHOPFRONT_CURRENCY", "USD")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_CURRENCY".to_string(), e.to_string()))?;
        let delivery_charge = parse_env_or_default::<Decimal>("SHOPFRONT_DELIVERY_CHARGE", "10")?;
        let free_shipping_threshold =
            parse_env_or_default::<Decimal>("SHOPFRONT_FREE_SHIPPING_THRESHOLD", "99")?;

        if delivery_charge.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_DELIVERY_CHARGE".to_string(),
                "must not be negative".to_string(),
            ));
        }

        Ok(Self {
            currency,
            delivery_charge,
            free_shipping_threshold,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the backend URL and make sure relative joins land under it.
fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("SHOPFRONT_BACKEND_URL".to_string(), reason);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
