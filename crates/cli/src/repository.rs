//! Product repositories used by `import run`.
//!
//! [`HttpProductRepository`] POSTs each record as JSON to the product API.
//! [`DryRunRepository`] accepts everything without sending anything.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use storeloom_import::{CreateAck, ImportRecord, ProductRepository, RepositoryError};
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;

/// Creates products through the store's HTTP API.
#[derive(Clone)]
pub struct HttpProductRepository {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpProductRepository {
    /// Create a new product API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value, the endpoint
    /// URL cannot be built, or the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, RepositoryError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.token.expose_secret());
        let mut auth = HeaderValue::from_str(&auth_value)
            .map_err(|e| RepositoryError::Transport(format!("Invalid API token format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;

        let endpoint = config
            .products_url()
            .map_err(|e| RepositoryError::Transport(format!("Invalid API URL: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Where records are sent.
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ProductRepository for HttpProductRepository {
    async fn create(&self, record: &ImportRecord) -> Result<CreateAck, RepositoryError> {
        let body = serde_json::to_vec(record)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .body(body)
            .send()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        debug!(status = status.as_u16(), product = record.name(), "Product created");
        parse_ack(&text)
    }
}

/// Client errors mean the store refused the record; anything else is transport.
fn classify_failure(status: StatusCode, body: &str) -> RepositoryError {
    let message = extract_message(body).unwrap_or_else(|| body.trim().to_string());
    let message = if message.is_empty() {
        status.to_string()
    } else {
        format!("{} - {message}", status.as_u16())
    };

    if status.is_client_error() {
        RepositoryError::Rejected(message)
    } else {
        RepositoryError::Transport(message)
    }
}

/// Pull `error` or `message` out of a JSON error body.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key)?.as_str().map(ToString::to_string))
}

/// An empty success body is an acknowledgment without details.
fn parse_ack(body: &str) -> Result<CreateAck, RepositoryError> {
    if body.trim().is_empty() {
        return Ok(CreateAck::default());
    }
    serde_json::from_str(body).map_err(|e| RepositoryError::InvalidResponse(e.to_string()))
}

/// Accepts every record; used by `import run --dry-run`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRepository;

impl ProductRepository for DryRunRepository {
    async fn create(&self, record: &ImportRecord) -> Result<CreateAck, RepositoryError> {
        debug!(product = record.name(), "Dry run: skipping create");
        Ok(CreateAck::default())
    }
}
