//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required for `import run`
//! - `STORELOOM_API_URL` - Base URL of the product API (products are POSTed to `{url}/products`)
//! - `STORELOOM_API_TOKEN` - Bearer token for the product API (high entropy, not a placeholder)
//!
//! ## Optional
//! - `STORELOOM_CURRENCY` - Store currency code (default: USD)
//! - `STORELOOM_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)

use std::time::Duration;

use secrecy::SecretString;
use storeloom_core::CurrencyCode;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: &str = "30";

/// Tokens below this many bits per character are rejected.
const TOKEN_MIN_ENTROPY: f64 = 3.3;

/// Fragments that only show up in copied sample values.
const SAMPLE_TOKEN_MARKERS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "placeholder",
    "example",
    "sample",
    "dummy",
    "token-here",
    "xxx",
    "todo",
    "<",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Settings every import command needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportDefaults {
    /// Store currency used when `--currency` is not given.
    pub currency: CurrencyCode,
}

impl ImportDefaults {
    /// Load import defaults from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if `STORELOOM_CURRENCY` is not a supported currency code.
    pub fn from_env() -> Result<Self, ConfigError> {
        let currency = parse_currency(&get_env_or_default("STORELOOM_CURRENCY", "USD"))?;
        Ok(Self { currency })
    }
}

/// Connection settings for the product API.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL of the product API
    pub base_url: Url,
    /// Bearer token
    pub token: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiConfig {
    /// Load API configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_api_url(&get_required_env("STORELOOM_API_URL")?)?;
        let token = get_api_token("STORELOOM_API_TOKEN")?;
        let timeout = parse_timeout(&get_env_or_default(
            "STORELOOM_REQUEST_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        ))?;

        Ok(Self {
            base_url,
            token,
            timeout,
        })
    }

    /// Endpoint that creates one product.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL cannot be joined with a path.
    pub fn products_url(&self) -> Result<Url, url::ParseError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("products")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("STORELOOM_API_URL".to_string(), reason);
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(invalid(format!("expected an http(s) URL, got {raw}")));
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "STORELOOM_REQUEST_TIMEOUT_SECS".to_string(),
                format!("expected a positive number of seconds, got {raw}"),
            )
        })
}

fn parse_currency(raw: &str) -> Result<CurrencyCode, ConfigError> {
    raw.parse::<CurrencyCode>()
        .map_err(|e| ConfigError::InvalidEnvVar("STORELOOM_CURRENCY".to_string(), e.to_string()))
}

/// Shannon entropy of `value` in bits per character.
fn entropy_per_char(value: &str) -> f64 {
    let mut chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return 0.0;
    }
    chars.sort_unstable();

    #[allow(clippy::cast_precision_loss)] // tokens are short
    let total = chars.len() as f64;
    chars
        .chunk_by(|a, b| a == b)
        .map(|run| {
            #[allow(clippy::cast_precision_loss)]
            let p = run.len() as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject copied sample values and low-entropy tokens.
fn check_token(var: &str, token: &str) -> Result<(), ConfigError> {
    let lower = token.to_ascii_lowercase();
    if let Some(marker) = SAMPLE_TOKEN_MARKERS.iter().find(|m| lower.contains(*m)) {
        return Err(ConfigError::InsecureSecret(
            var.to_string(),
            format!("looks like a sample value (contains '{marker}')"),
        ));
    }

    let bits = entropy_per_char(token);
    if bits < TOKEN_MIN_ENTROPY {
        return Err(ConfigError::InsecureSecret(
            var.to_string(),
            format!("{bits:.2} bits/char is below {TOKEN_MIN_ENTROPY:.1}; use the token issued by the store"),
        ));
    }
    Ok(())
}

/// Read the API token and check it before wrapping it.
fn get_api_token(var: &str) -> Result<SecretString, ConfigError> {
    let token = get_required_env(var)?;
    check_token(var, token.trim())?;
    Ok(SecretString::from(token.trim().to_string()))
}
