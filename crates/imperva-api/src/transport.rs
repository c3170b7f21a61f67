// Transport configuration and the request-body policy.
//
// Builds the single `reqwest::Client` an `ImpervaClient` reuses for every
// call. The overall timeout is fixed at construction; there is no per-call
// override and no retry.

use std::path::PathBuf;
use std::time::Duration;

/// Overall timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("imperva-rs/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the bundled web PKI roots.
    #[default]
    System,
    /// Additionally trust a CA certificate from the given PEM file
    /// (TLS-intercepting corporate proxies).
    CustomCa(PathBuf),
}

/// Shared transport configuration for building the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if let TlsMode::CustomCa(path) = &self.tls {
            let cert_pem = std::fs::read(path)
                .map_err(|e| crate::error::Error::Tls(format!("failed to read CA cert: {e}")))?;
            let cert = reqwest::Certificate::from_pem(&cert_pem)
                .map_err(|e| crate::error::Error::Tls(format!("invalid CA cert: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// What to send as the request body.
///
/// Several vendor endpoints are POSTs that take every parameter in the
/// query string; some of them reject a request without a JSON body, others
/// expect none at all. Each endpoint picks its variant explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    None,
    /// A literal `{}`.
    EmptyObject,
    /// A JSON document.
    Json(serde_json::Value),
}

impl RequestBody {
    pub(crate) fn into_value(self) -> Option<serde_json::Value> {
        match self {
            Self::None => None,
            Self::EmptyObject => Some(serde_json::Value::Object(serde_json::Map::new())),
            Self::Json(value) => Some(value),
        }
    }
}
