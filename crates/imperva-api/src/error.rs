use thiserror::Error;

/// Top-level error type for the `imperva-api` crate.
///
/// Covers every failure mode of a single API round trip: building the
/// request, the network exchange, HTTP status, the vendor's in-body result
/// code, and response-shape normalization. Nothing here is retried by the
/// client; callers decide on retry policy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Credentials ─────────────────────────────────────────────────
    /// API id or key cannot be encoded as an HTTP header value.
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request exceeded the client-wide timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup error (unreadable or invalid CA certificate).
    #[error("TLS error: {0}")]
    Tls(String),

    /// A request body could not be encoded as JSON.
    #[error("Failed to encode request body: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── HTTP ────────────────────────────────────────────────────────
    /// The API answered with status >= 400. The raw body is kept for diagnostics.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── Vendor ──────────────────────────────────────────────────────
    /// The JSON body carried a non-zero `res` result code (HTTP status may be 200).
    #[error("{operation} failed: {message} ({code})")]
    Vendor {
        operation: &'static str,
        code: i64,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// None of the known response envelopes matched.
    #[error("{operation}: no recognized response envelope (tried {})", .tried.join(", "))]
    UnrecognizedEnvelope {
        operation: &'static str,
        tried: Vec<String>,
        body: String,
    },

    /// The response envelope parsed but carried no result.
    #[error("{operation}: empty response")]
    EmptyResponse { operation: &'static str },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// The vendor result code, for `Vendor` errors.
    pub fn vendor_code(&self) -> Option<i64> {
        match self {
            Self::Vendor { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Raw response body attached to this error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. }
            | Self::Deserialization { body, .. }
            | Self::UnrecognizedEnvelope { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_error_display_carries_code_and_message() {
        let err = Error::Vendor {
            operation: "delete rule",
            code: 3,
            message: "site not found".into(),
        };
        assert_eq!(err.to_string(), "delete rule failed: site not found (3)");
        assert_eq!(err.vendor_code(), Some(3));
    }

    #[test]
    fn unrecognized_envelope_lists_tried_shapes() {
        let err = Error::UnrecognizedEnvelope {
            operation: "list sites",
            tried: vec!["sites".into(), "data".into()],
            body: "{}".into(),
        };
        assert_eq!(
            err.to_string(),
            "list sites: no recognized response envelope (tried sites, data)"
        );
        assert_eq!(err.body(), Some("{}"));
    }

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Http {
            status: 503,
            body: String::new(),
        };
        assert!(err.is_transient());
        assert!(!err.is_not_found());

        let err = Error::Http {
            status: 404,
            body: String::new(),
        };
        assert!(!err.is_transient());
        assert!(err.is_not_found());
    }
}
