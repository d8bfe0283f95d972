//! Client configuration.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TRADEPOST_API_URL` - API base URL (default: `http://127.0.0.1:3000`)
//! - `TRADEPOST_GATEWAY_URL` - Messaging gateway endpoint
//! - `TRADEPOST_GATEWAY_TOKEN` - Bearer token for the gateway
//! - `TRADEPOST_COUNTRY_CODE` - Dialing prefix for local numbers (default: `+263`)
//! - `TRADEPOST_STORE_PHONE` - Number inquiries are delivered to
//! - `TRADEPOST_CURRENCY_SYMBOL` - Symbol used in order summaries (default: `$`)
//! - `TRADEPOST_DATA_DIR` - Directory for the cart and cached tokens (default: `.tradepost`)
//! - `TRADEPOST_GATEWAY_TIMEOUT_SECS` - Gateway request timeout (default: 15)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use tradepost_core::{CountryCode, MessageComposer};
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_COUNTRY_CODE: &str = "+263";
const DEFAULT_CURRENCY_SYMBOL: &str = "$";
const DEFAULT_DATA_DIR: &str = ".tradepost";
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 15;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Tradepost API base URL.
    pub api_url: Url,
    /// Messaging gateway endpoint. Dispatch is unavailable without it.
    pub gateway_url: Option<Url>,
    /// Bearer token sent to the gateway.
    pub gateway_token: Option<SecretString>,
    /// Dialing prefix used to normalize local numbers.
    pub country_code: CountryCode,
    /// Number inquiries are delivered to.
    pub store_phone: Option<String>,
    /// Currency symbol used in order summaries.
    pub currency_symbol: String,
    /// Directory holding the cart and cached tokens.
    pub data_dir: PathBuf,
    /// Gateway request timeout.
    pub gateway_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_url = parse_env(
            "TRADEPOST_API_URL",
            &get_env_or_default("TRADEPOST_API_URL", DEFAULT_API_URL),
        )?;
        let gateway_url = get_optional_env("TRADEPOST_GATEWAY_URL")
            .map(|v| parse_env("TRADEPOST_GATEWAY_URL", &v))
            .transpose()?;
        let gateway_token = get_optional_env("TRADEPOST_GATEWAY_TOKEN").map(SecretString::from);
        let country_code = parse_env(
            "TRADEPOST_COUNTRY_CODE",
            &get_env_or_default("TRADEPOST_COUNTRY_CODE", DEFAULT_COUNTRY_CODE),
        )?;
        let gateway_timeout_secs: u64 = parse_env(
            "TRADEPOST_GATEWAY_TIMEOUT_SECS",
            &get_env_or_default(
                "TRADEPOST_GATEWAY_TIMEOUT_SECS",
                &DEFAULT_GATEWAY_TIMEOUT_SECS.to_string(),
            ),
        )?;

        Ok(Self {
            api_url,
            gateway_url,
            gateway_token,
            country_code,
            store_phone: get_optional_env("TRADEPOST_STORE_PHONE"),
            currency_symbol: get_env_or_default(
                "TRADEPOST_CURRENCY_SYMBOL",
                DEFAULT_CURRENCY_SYMBOL,
            ),
            data_dir: PathBuf::from(get_env_or_default("TRADEPOST_DATA_DIR", DEFAULT_DATA_DIR)),
            gateway_timeout: Duration::from_secs(gateway_timeout_secs),
        })
    }

    /// Message composer for these settings.
    #[must_use]
    pub fn composer(&self) -> MessageComposer {
        let composer = MessageComposer::new(self.country_code.clone(), &self.currency_symbol);
        match &self.store_phone {
            Some(phone) => composer.with_store_phone(phone),
            None => composer,
        }
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
