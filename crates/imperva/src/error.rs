//! CLI error types with miette diagnostics.
//!
//! Maps `imperva_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use imperva_api::Error as ApiError;
use imperva_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Imperva API")]
    #[diagnostic(
        code(imperva::connection_failed),
        help("Check network access and the configured host (--host or `host` in the config file).")
    )]
    ConnectionFailed {
        #[source]
        source: ApiError,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(imperva::tls_error),
        help("Check the `ca_cert` path in your config file; it must point to a PEM certificate.")
    )]
    TlsError { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(imperva::timeout),
        help("Increase the timeout with --timeout or `timeout_secs` in the config file.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed (HTTP {status})")]
    #[diagnostic(
        code(imperva::auth_failed),
        help(
            "Verify the API id and key.\n\
             Keys are managed under Account Settings > API Keys in the Imperva console."
        )
    )]
    AuthFailed { status: u16 },

    #[error("No {field} configured")]
    #[diagnostic(
        code(imperva::no_credentials),
        help(
            "Pass --api-id / --api-key, set IMPERVA_API_ID / IMPERVA_API_KEY,\n\
             or add api_id and api_key (or api_key_env) to {path}"
        )
    )]
    NoCredentials { field: &'static str, path: String },

    #[error("Invalid credentials: {message}")]
    #[diagnostic(code(imperva::invalid_credentials))]
    InvalidCredentials { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{operation} failed: {message} (res {code})")]
    #[diagnostic(code(imperva::api_error))]
    Vendor {
        operation: String,
        code: i64,
        message: String,
    },

    #[error("HTTP {status}: {body}")]
    #[diagnostic(code(imperva::http_error))]
    Http { status: u16, body: String },

    #[error("Not found: {body}")]
    #[diagnostic(
        code(imperva::not_found),
        help("Run `imperva sites list` or `imperva rules list` to see what exists.")
    )]
    NotFound { body: String },

    #[error("Unexpected response: {message}")]
    #[diagnostic(
        code(imperva::unexpected_response),
        help(
            "Run with -vv to log the request, or try --api-generation v1 / v3\n\
             if rule listing returns an unfamiliar shape."
        )
    )]
    UnexpectedResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(imperva::validation))]
    Validation { field: String, reason: String },

    #[error("No sites available for this account")]
    #[diagnostic(code(imperva::no_sites))]
    NoSites,

    #[error("A site is required")]
    #[diagnostic(
        code(imperva::site_required),
        help("Pass --site <ID> (or set IMPERVA_SITE) when not running interactively.")
    )]
    SiteRequired,

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(imperva::no_config), help("Check the --config path."))]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(imperva::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(imperva::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(imperva::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(imperva::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::NoCredentials { .. }
            | Self::InvalidCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::NoSites => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::SiteRequired
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── imperva_api::Error → CliError mapping ────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            ApiError::Tls(message) => CliError::TlsError { message },
            ApiError::InvalidCredentials { message } => CliError::InvalidCredentials { message },
            ApiError::InvalidUrl(e) => CliError::Validation {
                field: "host".into(),
                reason: e.to_string(),
            },
            ApiError::Http {
                status: status @ (401 | 403),
                ..
            } => CliError::AuthFailed { status },
            ApiError::Http { status: 404, body } => CliError::NotFound { body },
            ApiError::Http { status, body } => CliError::Http { status, body },
            ApiError::Vendor {
                operation,
                code,
                message,
            } => CliError::Vendor {
                operation: operation.to_owned(),
                code,
                message,
            },
            ApiError::Serialization(e) => CliError::Json(e),
            err @ (ApiError::Deserialization { .. }
            | ApiError::UnrecognizedEnvelope { .. }
            | ApiError::EmptyResponse { .. }) => CliError::UnexpectedResponse {
                message: err.to_string(),
            },
            source @ ApiError::Transport(_) => CliError::ConnectionFailed { source },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { field } => CliError::NoCredentials {
                field,
                path: imperva_config::config_path().display().to_string(),
            },
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_auth_statuses_map_to_auth_exit_code() {
        let err = CliError::from(ApiError::Http {
            status: 401,
            body: String::new(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn vendor_errors_keep_code_and_message() {
        let err = CliError::from(ApiError::Vendor {
            operation: "list sites",
            code: 9403,
            message: "Unknown account".into(),
        });
        assert_eq!(err.to_string(), "list sites failed: Unknown account (res 9403)");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn shape_errors_are_unexpected_responses() {
        let err = CliError::from(ApiError::EmptyResponse {
            operation: "release session",
        });
        assert!(matches!(err, CliError::UnexpectedResponse { .. }));
    }

    #[test]
    fn missing_credentials_map_to_auth_exit_code() {
        let err = CliError::from(ConfigError::NoCredentials { field: "API key" });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
