//! Configuration for the Imperva WAF client.
//!
//! Layered loading (defaults → config file → `IMPERVA_*` environment),
//! API key resolution (env → named env var → plaintext), and translation
//! to `imperva_api::ClientConfig`. The CLI adds flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use imperva_api::{
    ApiGeneration, ClientConfig, Credentials, DEFAULT_HOST, FlexId, TlsMode, TransportConfig,
};

/// Environment variable consulted first for the API key.
pub const API_KEY_ENV: &str = "IMPERVA_API_KEY";

const ENV_PREFIX: &str = "IMPERVA_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {field} configured")]
    NoCredentials { field: &'static str },

    #[error("config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

/// Client configuration as read from file and environment.
///
/// Field names match the JSON `config.json` layout (`host`, `api_id`,
/// `api_key`, `account_id`) so an existing JSON file loads unchanged.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// API host. Trailing slashes are stripped when the client is built.
    #[serde(default = "default_host")]
    pub host: String,

    /// Numeric or string API identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_id: Option<FlexId>,

    /// API key (plaintext; prefer `api_key_env` or `IMPERVA_API_KEY`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Name of an environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Account scope for site listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<FlexId>,

    /// Rules-listing shape: `v1` (grouped) or `v3` (flat).
    #[serde(default)]
    pub api_generation: ApiGeneration,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Extra CA certificate (PEM) to trust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_id: None,
            api_key: None,
            api_key_env: None,
            account_id: None,
            api_generation: ApiGeneration::default(),
            timeout_secs: default_timeout(),
            ca_cert: None,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.into()
}
fn default_timeout() -> u64 {
    60
}

impl Config {
    /// Render as TOML with the plaintext key masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.api_key.is_some() {
            shown.api_key = Some("********".into());
        }
        Ok(toml::to_string_pretty(&shown)?)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the default config file path via platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "imperva", "imperva").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("imperva");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from defaults, a file, and `IMPERVA_*` environment variables.
///
/// With `explicit = None` the default path is used and may be absent.
/// An explicitly named file must exist. Files ending in `.json` are read as
/// JSON, anything else as TOML.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Some(path) => path.to_path_buf(),
        None => config_path(),
    };
    debug!(path = %path.display(), "loading config");

    let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
    figment = if is_json(&path) {
        figment.merge(Json::file(&path))
    } else {
        figment.merge(Toml::file(&path))
    };
    // The key is resolved separately so `api_key_env` can sit between the
    // environment variable and the plaintext file entry.
    figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["api_key"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API key: `IMPERVA_API_KEY`, then the variable named by
/// `api_key_env`, then the plaintext `api_key`.
pub fn resolve_api_key(config: &Config) -> Result<SecretString, ConfigError> {
    if let Some(key) = non_empty_env(API_KEY_ENV) {
        return Ok(SecretString::from(key));
    }

    if let Some(ref env_name) = config.api_key_env {
        if let Some(key) = non_empty_env(env_name) {
            return Ok(SecretString::from(key));
        }
    }

    if let Some(ref key) = config.api_key {
        if !key.is_empty() {
            return Ok(SecretString::from(key.clone()));
        }
    }

    Err(ConfigError::NoCredentials { field: "API key" })
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Resolve the API id, rejecting an empty value.
pub fn resolve_api_id(config: &Config) -> Result<String, ConfigError> {
    config
        .api_id
        .as_ref()
        .map(ToString::to_string)
        .filter(|id| !id.is_empty())
        .ok_or(ConfigError::NoCredentials { field: "API id" })
}

/// Build a `ClientConfig` from a loaded config, resolving the API key.
pub fn to_client_config(config: &Config) -> Result<ClientConfig, ConfigError> {
    let api_key = resolve_api_key(config)?;
    to_client_config_with_key(config, api_key)
}

/// Build a `ClientConfig` with an already-resolved API key.
pub fn to_client_config_with_key(
    config: &Config,
    api_key: SecretString,
) -> Result<ClientConfig, ConfigError> {
    let api_id = resolve_api_id(config)?;

    let host = config.host.trim().trim_end_matches('/');
    let host = if host.is_empty() { DEFAULT_HOST } else { host };
    url::Url::parse(host).map_err(|e| ConfigError::Validation {
        field: "host".into(),
        reason: format!("invalid URL '{host}': {e}"),
    })?;

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            field: "timeout_secs".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let tls = config
        .ca_cert
        .clone()
        .map_or(TlsMode::System, TlsMode::CustomCa);

    Ok(ClientConfig {
        host: host.to_owned(),
        credentials: Credentials::new(api_id, api_key),
        account_id: config.account_id.as_ref().map(ToString::to_string),
        api_generation: config.api_generation,
        transport: TransportConfig {
            tls,
            timeout: Duration::from_secs(config.timeout_secs),
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write as _;

    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn toml_file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    host = "https://file.example.com/"
                    api_id = 12345
                    api_key = "from-file"
                    account_id = "777"
                    api_generation = "v1"
                "#,
            )?;
            jail.set_env("IMPERVA_HOST", "https://env.example.com");

            let config = load_config(Some(Path::new("config.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.host, "https://env.example.com");
            assert_eq!(config.api_id, Some(FlexId::from(12345)));
            assert_eq!(config.account_id, Some(FlexId::from("777")));
            assert_eq!(config.api_generation, ApiGeneration::V1);
            assert_eq!(config.timeout_secs, 60);
            Ok(())
        });
    }

    #[test]
    fn json_file_is_read_as_json() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.json",
                r#"{"host": "", "api_id": "12345", "api_key": "k", "account_id": ""}"#,
            )?;
            let config = load_config(Some(Path::new("config.json"))).map_err(|e| e.to_string())?;
            assert_eq!(config.api_id, Some(FlexId::from("12345")));

            let client = to_client_config(&config).map_err(|e| e.to_string())?;
            assert_eq!(client.host, DEFAULT_HOST);
            assert_eq!(client.account_id.as_deref(), Some(""));
            Ok(())
        });
    }

    #[test]
    fn api_key_env_var_is_not_merged_into_plaintext_slot() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "api_id = 1\napi_key = \"plain\"\napi_key_env = \"MY_KEY\"")?;
            jail.set_env("MY_KEY", "named");

            let config = load_config(Some(Path::new("config.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.api_key.as_deref(), Some("plain"));
            assert_eq!(resolve_api_key(&config).unwrap().expose_secret(), "named");

            jail.set_env("IMPERVA_API_KEY", "direct");
            assert_eq!(resolve_api_key(&config).unwrap().expose_secret(), "direct");
            Ok(())
        });
    }

    #[test]
    fn plaintext_key_is_last_resort() {
        Jail::expect_with(|_jail| {
            let config = Config {
                api_key: Some("plain".into()),
                api_key_env: Some("IMPERVA_TEST_UNSET_KEY".into()),
                ..Config::default()
            };
            assert_eq!(resolve_api_key(&config).unwrap().expose_secret(), "plain");
            Ok(())
        });
    }

    #[test]
    fn missing_credentials_are_reported() {
        Jail::expect_with(|_jail| {
            let no_key = Config {
                api_id: Some(FlexId::from(1)),
                ..Config::default()
            };
            assert!(matches!(
                to_client_config(&no_key),
                Err(ConfigError::NoCredentials { field: "API key" })
            ));

            let no_id = Config::default();
            assert!(matches!(
                to_client_config_with_key(&no_id, SecretString::from("k".to_owned())),
                Err(ConfigError::NoCredentials { field: "API id" })
            ));
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/imperva.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn client_config_translation() {
        let mut ca = tempfile::NamedTempFile::new().unwrap();
        writeln!(ca, "not really a pem").unwrap();

        let config = Config {
            host: "https://my.imperva.com///".into(),
            api_id: Some(FlexId::from(42)),
            account_id: Some(FlexId::from(9)),
            timeout_secs: 15,
            ca_cert: Some(ca.path().to_path_buf()),
            ..Config::default()
        };
        let client = to_client_config_with_key(&config, SecretString::from("k".to_owned())).unwrap();
        assert_eq!(client.host, "https://my.imperva.com");
        assert_eq!(client.credentials.api_id, "42");
        assert_eq!(client.account_id.as_deref(), Some("9"));
        assert_eq!(client.transport.timeout, Duration::from_secs(15));
        assert!(matches!(client.transport.tls, TlsMode::CustomCa(_)));
    }

    #[test]
    fn invalid_host_and_zero_timeout_are_rejected() {
        let base = Config {
            api_id: Some(FlexId::from(1)),
            ..Config::default()
        };
        let bad_host = Config {
            host: "not a url".into(),
            ..base.clone()
        };
        assert!(matches!(
            to_client_config_with_key(&bad_host, SecretString::from("k".to_owned())),
            Err(ConfigError::Validation { .. })
        ));
        let zero = Config {
            timeout_secs: 0,
            ..base
        };
        assert!(matches!(
            to_client_config_with_key(&zero, SecretString::from("k".to_owned())),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn redacted_toml_masks_key() {
        let config = Config {
            api_key: Some("super-secret".into()),
            ..Config::default()
        };
        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("********"));
        assert!(rendered.contains("api_generation = \"v3\""));
    }
}
