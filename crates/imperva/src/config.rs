//! CLI configuration: thin wrapper around `imperva_config`.
//!
//! Adds `GlobalOpts` flag overrides (--host, --api-key, etc.) on top of
//! the file + environment layers.

use secrecy::SecretString;

use imperva_api::{ApiGeneration, ClientConfig, FlexId};

use crate::cli::{ApiGenerationArg, GlobalOpts};
use crate::error::CliError;

pub use imperva_config::{Config, config_path, load_config};

/// Load config from file + environment, then apply CLI flag overrides.
pub fn resolve_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config = load_config(global.config.as_deref())?;

    if let Some(ref host) = global.host {
        config.host.clone_from(host);
    }
    if let Some(ref api_id) = global.api_id {
        config.api_id = Some(FlexId::from(api_id.as_str()));
    }
    if let Some(ref account_id) = global.account_id {
        config.account_id = Some(FlexId::from(account_id.as_str()));
    }
    if let Some(generation) = global.api_generation {
        config.api_generation = match generation {
            ApiGenerationArg::V1 => ApiGeneration::V1,
            ApiGenerationArg::V3 => ApiGeneration::V3,
        };
    }
    if let Some(timeout) = global.timeout {
        config.timeout_secs = timeout;
    }

    Ok(config)
}

/// Translate config + global flags into a `ClientConfig`.
///
/// The `--api-key` flag (or `IMPERVA_API_KEY`) wins over the config's
/// key sources.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let config = resolve_config(global)?;

    let api_key = match global.api_key {
        Some(ref key) if !key.is_empty() => SecretString::from(key.clone()),
        _ => imperva_config::resolve_api_key(&config)?,
    };

    let client_config = imperva_config::to_client_config_with_key(&config, api_key)?;
    tracing::debug!(
        host = %client_config.host,
        generation = %client_config.api_generation,
        timeout_secs = config.timeout_secs,
        "resolved client config"
    );
    Ok(client_config)
}
