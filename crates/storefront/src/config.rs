//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_FEED_URL` - Base URL of the remote document store
//! - `STOREFRONT_CHECKOUT_PHONE` - Messaging number that receives checkout requests
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_FEED_COLLECTION` - Product collection path (default: products)
//! - `STOREFRONT_FEED_AUTH` - Document store auth token
//! - `STOREFRONT_FEED_RETRY_SECS` - Reconnect delay after a feed failure (default: 5)
//! - `STOREFRONT_CART_DIR` - Directory for the local cart store (in-memory when unset)
//! - `STOREFRONT_SEARCH_DEBOUNCE_MS` - Search input quiet period (default: 500)
//! - `STOREFRONT_NOTIFICATION_SECS` - Notification lifetime (default: 3)
//! - `STOREFRONT_LOCALE` - Shopper-facing language, `en` or `ar` (default: en)
//! - `STOREFRONT_CURRENCY_LABEL` - Currency label in checkout messages (default: EGP)
//! - `STOREFRONT_STATIC_DIR` - Directory served under `/static`
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::locale::Locale;

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
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Remote product feed configuration
    pub feed: FeedConfig,
    /// Checkout hand-off configuration
    pub checkout: CheckoutConfig,
    /// Local cart store directory; `None` keeps the cart in memory
    pub cart_dir: Option<PathBuf>,
    /// Quiet period before a typed search term is applied
    pub search_debounce: Duration,
    /// How long a notification stays visible
    pub notification_ttl: Duration,
    /// Shopper-facing language
    pub locale: Locale,
    /// Static asset directory served under `/static`
    pub static_dir: Option<PathBuf>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Remote product feed configuration.
///
/// Implements `Debug` manually to redact the auth token.
#[derive(Clone)]
pub struct FeedConfig {
    /// Document store base URL (e.g., <https://my-store.firebaseio.com>)
    pub database_url: Url,
    /// Collection path holding product records
    pub collection: String,
    /// Optional auth token sent as the `auth` query parameter
    pub auth_token: Option<SecretString>,
    /// Delay before reconnecting after a transport failure
    pub retry_backoff: Duration,
}

impl std::fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedConfig")
            .field("database_url", &self.database_url.as_str())
            .field("collection", &self.collection)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("retry_backoff", &self.retry_backoff)
            .finish()
    }
}

/// Checkout hand-off configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Recipient number, digits only
    pub phone: String,
    /// Currency label appended to prices in the checkout message
    pub currency_label: String,
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

        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let feed = FeedConfig::from_env()?;
        let checkout = CheckoutConfig::from_env()?;
        let cart_dir = get_optional_env("STOREFRONT_CART_DIR").map(PathBuf::from);
        let search_debounce = Duration::from_millis(parse_env_or_default::<u64>(
            "STOREFRONT_SEARCH_DEBOUNCE_MS",
            "500",
        )?);
        let notification_ttl = Duration::from_secs(parse_env_or_default::<u64>(
            "STOREFRONT_NOTIFICATION_SECS",
            "3",
        )?);
        let locale_code = get_env_or_default("STOREFRONT_LOCALE", "en");
        let locale = Locale::parse(&locale_code).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "STOREFRONT_LOCALE".to_string(),
                format!("unsupported locale '{locale_code}' (expected 'en' or 'ar')"),
            )
        })?;
        let static_dir = get_optional_env("STOREFRONT_STATIC_DIR").map(PathBuf::from);
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            feed,
            checkout,
            cart_dir,
            search_debounce,
            notification_ttl,
            locale,
            static_dir,
            sentry_dsn,
        })
    }

    /// Configuration with every optional setting at its default.
    #[must_use]
    pub fn with_defaults(database_url: Url, checkout_phone: impl Into<String>) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            feed: FeedConfig {
                database_url,
                collection: "products".to_string(),
                auth_token: None,
                retry_backoff: Duration::from_secs(5),
            },
            checkout: CheckoutConfig {
                phone: checkout_phone.into(),
                currency_label: "EGP".to_string(),
            },
            cart_dir: None,
            search_debounce: Duration::from_millis(500),
            notification_ttl: Duration::from_secs(3),
            locale: Locale::English,
            static_dir: None,
            sentry_dsn: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl FeedConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_url = get_required_env("STOREFRONT_FEED_URL")?;
        let database_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_FEED_URL".to_string(), e.to_string())
        })?;
        let collection = get_env_or_default("STOREFRONT_FEED_COLLECTION", "products")
            .trim_matches('/')
            .to_string();
        if collection.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_FEED_COLLECTION".to_string(),
                "collection path cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            collection,
            auth_token: get_optional_env("STOREFRONT_FEED_AUTH").map(SecretString::from),
            retry_backoff: Duration::from_secs(parse_env_or_default::<u64>(
                "STOREFRONT_FEED_RETRY_SECS",
                "5",
            )?),
        })
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let phone = normalize_phone(&get_required_env("STOREFRONT_CHECKOUT_PHONE")?)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "STOREFRONT_CHECKOUT_PHONE".to_string(),
                    "must contain only digits, spaces, dashes and a leading '+'".to_string(),
                )
            })?;

        Ok(Self {
            phone,
            currency_label: get_env_or_default("STOREFRONT_CURRENCY_LABEL", "EGP"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Reduce a phone number to the digits the messaging link expects.
///
/// Returns `None` if the input contains anything but digits, spaces, dashes
/// and a single leading `+`, or has no digits at all.
pub(crate) fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return None;
    }
    let digits: String = body.chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then_some(digits)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to a default.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
