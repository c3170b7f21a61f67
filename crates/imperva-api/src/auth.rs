use std::fmt;
use std::str::FromStr;

use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// API credentials sent on every request.
///
/// The key is held as a [`SecretString`] so it never shows up in `Debug`
/// output or logs.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_id: String,
    pub api_key: SecretString,
}

impl Credentials {
    pub fn new(api_id: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            api_id: api_id.into(),
            api_key,
        }
    }

    /// Encode both values as header values, marking them sensitive.
    pub(crate) fn header_values(&self) -> Result<(HeaderValue, HeaderValue), Error> {
        let mut id = HeaderValue::from_str(&self.api_id).map_err(|e| Error::InvalidCredentials {
            message: format!("invalid API id header value: {e}"),
        })?;
        id.set_sensitive(true);

        let mut key = HeaderValue::from_str(self.api_key.expose_secret()).map_err(|e| {
            Error::InvalidCredentials {
                message: format!("invalid API key header value: {e}"),
            }
        })?;
        key.set_sensitive(true);

        Ok((id, key))
    }
}

/// Which vendor API generation the client talks to.
///
/// Only rule listing differs between generations: v1 returns rules grouped
/// by rule-group name under `incap_rules`, v3 returns a flat `data` array
/// of `{rule, site_id, account_id}` items. One client uses exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiGeneration {
    V1,
    #[default]
    V3,
}

impl fmt::Display for ApiGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V3 => f.write_str("v3"),
        }
    }
}

impl FromStr for ApiGeneration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v3" | "3" => Ok(Self::V3),
            other => Err(format!("expected 'v1' or 'v3', got '{other}'")),
        }
    }
}
