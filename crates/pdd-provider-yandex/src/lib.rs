// # Yandex PDD DNS Provider
//
// This crate provides the record-management client for the Yandex PDD
// `admin/dns` API used by the PDD ACME solver.
//
// ## Behaviour
//
// - ✅ One HTTP request per operation, PddToken header on every request
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Query values percent-encoded by the request builder
// - ✅ Body-level `success` flag mapped to `ProviderResult`
// - ❌ NO retry logic (owned by the host framework)
// - ❌ NO record search on write paths (callers resolve ids via `list_records`)
// - ❌ NO caching (the provider is the source of truth)
//
// ## Security Requirements
//
// - PDD token NEVER appears in logs or Debug output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// Every endpoint answers HTTP 200; `success` is `"ok"` or `"error"`.
//
// - List: GET `/list?domain=...`
// - Add: POST `/add?domain=...&subdomain=...&type=TXT&content=...&ttl=...`
// - Edit: POST `/edit?record_id=...&domain=...&subdomain=...&type=TXT&content=...&ttl=...`
// - Delete: POST `/del?record_id=...&domain=...`

use async_trait::async_trait;
use pdd_core::error::{Operation, TransportError};
use pdd_core::traits::{DnsProvider, DnsProviderFactory, DnsRecord, ProviderCall, ProviderResult};
use pdd_core::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// PDD DNS API base URL
pub const PDD_API_BASE: &str = "https://pddimp.yandex.ru/api2/admin/dns";

/// Header carrying the PDD token
pub const PDD_TOKEN_HEADER: &str = "PddToken";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Body `success` value meaning the request was accepted
const SUCCESS_OK: &str = "ok";

/// Yandex PDD DNS provider
///
/// A plain value holding the token and an HTTP client; safe to share
/// read-only between concurrent calls.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the PDD token.
pub struct YandexPddProvider {
    /// PDD token
    /// ⚠️ NEVER log this value
    token: String,

    /// API base URL without trailing slash
    base_url: String,

    /// Per-request timeout
    timeout: Duration,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the PDD token
impl std::fmt::Debug for YandexPddProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexPddProvider")
            .field("token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl YandexPddProvider {
    /// Create a provider talking to the production API
    ///
    /// # Errors
    ///
    /// `Error::Config` if the token is empty or the HTTP client cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(token, PDD_API_BASE, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a provider against a custom endpoint
    ///
    /// Intended for tests and API-compatible mirrors.
    pub fn with_endpoint(
        token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::config("PDD token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    /// API base URL in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, operation: Operation) -> String {
        format!("{}/{}", self.base_url, operation.endpoint())
    }

    /// Send one request and decode the envelope
    ///
    /// Anything short of an HTTP 200 carrying a JSON object of shape `E` is
    /// a transport failure.
    async fn execute<E: DeserializeOwned>(
        &self,
        operation: Operation,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<E, TransportError> {
        let response = request
            .header(PDD_TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_reqwest_error(e))?;

        tracing::trace!(
            operation = operation.endpoint(),
            status = status.as_u16(),
            body = %body,
            "PDD API response"
        );

        if status != reqwest::StatusCode::OK {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            TransportError::MalformedEnvelope(format!(
                "{} response is not a valid envelope: {}",
                operation.endpoint(),
                e
            ))
        })
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                after: self.timeout,
            }
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Fields shared by every response body
#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl Status {
    /// `None` when accepted, the provider's message otherwise
    fn rejection(&self) -> Option<String> {
        match self.success.as_deref() {
            Some(SUCCESS_OK) => None,
            _ => Some(
                self.error
                    .clone()
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
        }
    }
}

/// `GET /list` response
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(flatten)]
    status: Status,
    #[serde(default)]
    records: Option<Vec<DnsRecord>>,
}

/// `POST /add` and `POST /edit` response
#[derive(Debug, Deserialize)]
struct RecordResponse {
    #[serde(flatten)]
    status: Status,
    #[serde(default)]
    record: Option<DnsRecord>,
}

/// `POST /del` response
#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(flatten)]
    status: Status,
    #[serde(default)]
    record_id: Option<u64>,
}

/// Read the payload of an accepted response, or report why there is none
fn accepted<T>(status: &Status, payload: Option<T>, what: &str) -> ProviderResult<T> {
    if let Some(message) = status.rejection() {
        return ProviderResult::rejected(message);
    }
    match payload {
        Some(value) => ProviderResult::Success(value),
        None => ProviderResult::rejected(format!("malformed response: missing {}", what)),
    }
}

#[async_trait]
impl DnsProvider for YandexPddProvider {
    async fn list_records(&self, domain: &str) -> ProviderCall<Vec<DnsRecord>> {
        tracing::debug!(domain = %domain, "Listing PDD DNS records");

        let request = self
            .client
            .get(self.endpoint(Operation::List))
            .query(&[("domain", domain)]);

        let response: ListResponse = self.execute(Operation::List, request).await?;
        let result = accepted(&response.status, response.records, "records");

        if let ProviderResult::Error { message } = &result {
            tracing::warn!(domain = %domain, error = %message, "PDD rejected list request");
        }
        Ok(result)
    }

    async fn create_record(
        &self,
        domain: &str,
        subdomain: &str,
        content: &str,
        ttl: u32,
    ) -> ProviderCall<DnsRecord> {
        tracing::debug!(domain = %domain, subdomain = %subdomain, ttl, "Adding PDD TXT record");

        let ttl = ttl.to_string();
        let request = self.client.post(self.endpoint(Operation::Create)).query(&[
            ("domain", domain),
            ("subdomain", subdomain),
            ("type", "TXT"),
            ("content", content),
            ("ttl", ttl.as_str()),
        ]);

        let response: RecordResponse = self.execute(Operation::Create, request).await?;
        let result = accepted(&response.status, response.record, "record");

        if let ProviderResult::Error { message } = &result {
            tracing::warn!(domain = %domain, subdomain = %subdomain, error = %message, "PDD rejected add request");
        }
        Ok(result)
    }

    async fn update_record(
        &self,
        record_id: u64,
        domain: &str,
        subdomain: &str,
        content: &str,
        ttl: u32,
    ) -> ProviderCall<DnsRecord> {
        tracing::debug!(record_id, domain = %domain, subdomain = %subdomain, ttl, "Editing PDD TXT record");

        let record_id_param = record_id.to_string();
        let ttl = ttl.to_string();
        let request = self.client.post(self.endpoint(Operation::Update)).query(&[
            ("record_id", record_id_param.as_str()),
            ("domain", domain),
            ("subdomain", subdomain),
            ("type", "TXT"),
            ("content", content),
            ("ttl", ttl.as_str()),
        ]);

        let response: RecordResponse = self.execute(Operation::Update, request).await?;
        let result = accepted(&response.status, response.record, "record");

        if let ProviderResult::Error { message } = &result {
            tracing::warn!(record_id, domain = %domain, error = %message, "PDD rejected edit request");
        }
        Ok(result)
    }

    async fn delete_record(&self, record_id: u64, domain: &str) -> ProviderCall<()> {
        tracing::debug!(record_id, domain = %domain, "Deleting PDD DNS record");

        let record_id_param = record_id.to_string();
        let request = self
            .client
            .post(self.endpoint(Operation::Delete))
            .query(&[("record_id", record_id_param.as_str()), ("domain", domain)]);

        let response: DeleteResponse = self.execute(Operation::Delete, request).await?;

        // The echoed id is informational; only the status decides.
        if let Some(echoed) = response.record_id
            && echoed != record_id
        {
            tracing::debug!(record_id, echoed, "PDD echoed a different record id");
        }

        let result = match response.status.rejection() {
            None => ProviderResult::Success(()),
            Some(message) => {
                tracing::warn!(record_id, domain = %domain, error = %message, "PDD rejected del request");
                ProviderResult::rejected(message)
            }
        };
        Ok(result)
    }

    fn provider_name(&self) -> &'static str {
        "yandex-pdd"
    }
}

/// Factory for creating PDD providers from a token
#[derive(Debug, Clone)]
pub struct YandexPddFactory {
    base_url: String,
    timeout: Duration,
}

impl YandexPddFactory {
    /// Factory for the production API
    pub fn new() -> Self {
        Self {
            base_url: PDD_API_BASE.to_string(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Factory for a custom endpoint
    pub fn with_endpoint(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl Default for YandexPddFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsProviderFactory for YandexPddFactory {
    fn create(&self, token: &str) -> Result<Box<dyn DnsProvider>> {
        Ok(Box::new(YandexPddProvider::with_endpoint(
            token,
            self.base_url.clone(),
            self.timeout,
        )?))
    }
}
