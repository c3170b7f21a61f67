// Imperva API HTTP client
//
// Wraps `reqwest::Client` with base-URL handling, auth header injection,
// and status classification. Resource modules (sites, rules, sessions,
// stats) are implemented as inherent methods in separate files and only
// see raw response bytes from here.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::auth::{ApiGeneration, Credentials};
use crate::error::Error;
use crate::transport::{RequestBody, TransportConfig};

/// Vendor API host used when none is configured.
pub const DEFAULT_HOST: &str = "https://my.imperva.com";

const API_ID_HEADER: &str = "x-API-Id";
const API_KEY_HEADER: &str = "x-API-Key";
const JSON: &str = "application/json";

/// Everything needed to construct an [`ImpervaClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API host, e.g. `https://my.imperva.com`. Trailing slashes are stripped.
    pub host: String,
    pub credentials: Credentials,
    /// Account scope for listing calls; the API key's own account when `None`.
    pub account_id: Option<String>,
    pub api_generation: ApiGeneration,
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Config for the default host with default transport settings.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            credentials,
            account_id: None,
            api_generation: ApiGeneration::default(),
            transport: TransportConfig::default(),
        }
    }
}

/// Async client for the Imperva Cloud WAF API.
///
/// Holds only immutable configuration and a reusable `reqwest::Client`, so a
/// single instance can serve concurrent callers. Every public operation is
/// one request/response round trip; nothing is cached, retried or paginated
/// behind the caller's back.
#[derive(Debug, Clone)]
pub struct ImpervaClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    account_id: Option<String>,
    generation: ApiGeneration,
    timeout: Duration,
}

impl ImpervaClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build the HTTP client from the config's transport settings.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Self::with_client(http, config)
    }

    /// Wrap an existing `reqwest::Client`. Auth headers are still added per request.
    pub fn with_client(http: reqwest::Client, config: &ClientConfig) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(&config.host)?;
        Ok(Self {
            http,
            base_url,
            credentials: config.credentials.clone(),
            account_id: config.account_id.clone().filter(|id| !id.is_empty()),
            generation: config.api_generation,
            timeout: config.transport.timeout,
        })
    }

    fn normalize_base_url(host: &str) -> Result<Url, Error> {
        let host = host.trim().trim_end_matches('/');
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        Ok(Url::parse(host)?)
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The configured account scope, if any.
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// The API generation this client was configured for.
    pub fn api_generation(&self) -> ApiGeneration {
        self.generation
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join an absolute API path (optionally with a pre-encoded query) onto the base.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// Build `{base}{path}?{params}` with form-encoded parameters.
    pub(crate) fn url_with_query(&self, path: &str, params: &[(&str, String)]) -> Result<Url, Error> {
        let mut url = self.url(path)?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Build a URL from individual path segments, percent-encoding each one.
    pub(crate) fn url_from_segments(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    // ── Request execution ────────────────────────────────────────────

    /// Perform one authenticated exchange against `path` (query string included).
    ///
    /// Returns the raw body for status codes below 400. Anything else is an
    /// [`Error::Http`] carrying the status and the raw body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<Bytes, Error> {
        let url = self.url(path)?;
        self.send(method, url, body).await
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: RequestBody,
    ) -> Result<Bytes, Error> {
        debug!("{method} {url}");

        let (api_id, api_key) = self.credentials.header_values()?;
        let mut builder = self
            .http
            .request(method, url)
            .header(API_ID_HEADER, api_id)
            .header(API_KEY_HEADER, api_key)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON);

        if let Some(value) = body.into_value() {
            builder = builder.json(&value);
        }

        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();

        if status.as_u16() >= 400 {
            let body = error_body(resp.text().await);
            debug!(status = status.as_u16(), "request failed");
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        resp.bytes().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// Body text for an `Error::Http`, or a marker naming why it could not be read.
fn error_body<E: std::fmt::Display>(read: Result<String, E>) -> String {
    match read {
        Ok(text) => text,
        Err(e) => {
            debug!(error = %e, "failed to read error response body");
            format!("<unreadable response body: {e}>")
        }
    }
}
