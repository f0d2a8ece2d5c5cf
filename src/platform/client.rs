//! platform::client
//!
//! Rate-limited platform API client.
//!
//! # Design
//!
//! Every request sleeps for a fixed pace delay first, modeling the
//! platform's "3 requests per 10 seconds" budget conservatively. A 429
//! response sleeps for the longer backoff delay and resends the identical
//! request; the retry loop has no ceiling, so sustained throttling keeps
//! retrying rather than giving up (best-effort semantics). Any other
//! status of 400 or above fails immediately with the status and the raw
//! response body so the caller can surface the upstream diagnostic.
//!
//! Responses are returned as opaque body text; callers parse. Redirects
//! are followed transparently by reqwest.
//!
//! # Example
//!
//! ```ignore
//! use gangway::platform::{PlatformClient, Probe};
//! use reqwest::Method;
//!
//! let client = PlatformClient::new("https://api.gangway.dev", api_key);
//! let body = client.request(Method::GET, "/global/templates", None).await?;
//! match client.probe("/accounts/acme/organizations/eng/apps/orders").await? {
//!     Probe::Exists => println!("already onboarded"),
//!     Probe::Absent => println!("free to create"),
//! }
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;

/// Header carrying the API key credential, re-sent on every call.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "gangway-cli";

/// Pace delay applied before every request (3-per-10s budget, held conservatively).
const PACE_DELAY: Duration = Duration::from_secs(4);

/// Backoff delay applied after a 429 before resending.
const BACKOFF_DELAY: Duration = Duration::from_secs(10);

/// Errors from platform API calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a non-429 error status.
    #[error("API error: {status} - {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body, surfaced for diagnosis
        body: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),
}

/// Outcome of an existence probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The resource exists (any 2xx).
    Exists,
    /// The resource does not exist (404).
    Absent,
}

/// Request pacing knobs.
///
/// Production uses [`Pacing::default`]; tests inject short delays.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    /// Minimum delay before every request.
    pub pace: Duration,
    /// Delay before resending after a 429.
    pub backoff: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            pace: PACE_DELAY,
            backoff: BACKOFF_DELAY,
        }
    }
}

/// Rate-limited platform API client.
pub struct PlatformClient {
    /// HTTP client for making requests
    client: Client,
    /// API base URL (configurable for self-hosted installs)
    api_base: String,
    /// API key sent with every request
    api_key: String,
    /// Pace and backoff delays
    pacing: Pacing,
}

// Custom Debug to avoid exposing api_key
impl std::fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformClient")
            .field("api_base", &self.api_base)
            .field("pacing", &self.pacing)
            .finish()
    }
}

impl PlatformClient {
    /// Create a client with production pacing.
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_pacing(api_base, api_key, Pacing::default())
    }

    /// Create a client with explicit pacing (used by tests).
    pub fn with_pacing(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        pacing: Pacing,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            api_key: api_key.into(),
            pacing,
        }
    }

    /// Build the absolute URL for an API path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Build common headers. The API key was format-checked at config time.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&self.api_key).expect("API key validated at config load"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .client
            .request(method.clone(), self.url(path))
            .headers(self.headers());
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))
    }

    /// Issue a request, pacing every attempt and retrying on 429.
    ///
    /// Returns the response body on 2xx. Fails immediately on any other
    /// status of 400 or above, carrying the status and raw body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<String, ClientError> {
        loop {
            sleep(self.pacing.pace).await;
            let response = self.send(&method, path, body).await?;
            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                sleep(self.pacing.backoff).await;
                continue;
            }
            let text = response
                .text()
                .await
                .map_err(|e| ClientError::Network(e.to_string()))?;
            if status.is_client_error() || status.is_server_error() {
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    body: text,
                });
            }
            return Ok(text);
        }
    }

    /// GET convenience wrapper.
    pub async fn get(&self, path: &str) -> Result<String, ClientError> {
        self.request(Method::GET, path, None).await
    }

    /// Existence probe: like [`request`] but 404 maps to [`Probe::Absent`]
    /// instead of an error. The only endpoint-specific deviation from the
    /// generic contract.
    ///
    /// [`request`]: PlatformClient::request
    pub async fn probe(&self, path: &str) -> Result<Probe, ClientError> {
        loop {
            sleep(self.pacing.pace).await;
            let response = self.send(&Method::GET, path, None).await?;
            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                sleep(self.pacing.backoff).await;
                continue;
            }
            if status == StatusCode::NOT_FOUND {
                return Ok(Probe::Absent);
            }
            if status.is_client_error() || status.is_server_error() {
                let body = response
                    .text()
                    .await
                    .map_err(|e| ClientError::Network(e.to_string()))?;
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    body,
                });
            }
            return Ok(Probe::Exists);
        }
    }
}
