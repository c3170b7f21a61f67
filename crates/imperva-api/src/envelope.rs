// Response envelopes
//
// Most vendor responses embed an application-level result code (`res`,
// `res_message`) next to the payload, and several list operations wrap
// their array under a key that changed between API versions. This module
// holds the result-code check and the ordered envelope probe shared by
// the resource modules.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::Error;
use crate::wire::null_as_default;

/// Result block carried by most vendor responses. `res == 0` means success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResult {
    #[serde(default)]
    pub res: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub res_message: String,
    /// Free-form message some v3 endpoints add next to `res_message`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<Value>,
}

impl ApiResult {
    pub fn is_ok(&self) -> bool {
        self.res == 0
    }

    /// Turn a non-zero result code into an `Error::Vendor`.
    pub(crate) fn into_result(self, operation: &'static str) -> Result<Self, Error> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(Error::Vendor {
                operation,
                code: self.res,
                message: self.res_message,
            })
        }
    }
}

/// Fail if a JSON object body carries a top-level non-zero integer `res`.
///
/// Bodies that are not objects, or whose `res` is absent or not an
/// integer, pass through untouched.
pub(crate) fn check_result_code(operation: &'static str, body: &Value) -> Result<(), Error> {
    let Some(code) = body.get("res").and_then(Value::as_i64) else {
        return Ok(());
    };
    if code == 0 {
        return Ok(());
    }
    let message = body
        .get("res_message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    Err(Error::Vendor {
        operation,
        code,
        message,
    })
}

/// Parse raw response bytes as JSON, keeping the body for diagnostics.
pub(crate) fn parse_json(body: &[u8]) -> Result<Value, Error> {
    serde_json::from_slice(body).map_err(|e| {
        deserialization_error(&e, String::from_utf8_lossy(body).into_owned())
    })
}

/// Parse a response body and apply the result-code check in one step.
pub(crate) fn parse_checked(operation: &'static str, body: &[u8]) -> Result<Value, Error> {
    let value = parse_json(body)?;
    check_result_code(operation, &value)?;
    Ok(value)
}

/// Decode an already-parsed body into a single known shape.
pub(crate) fn decode_value<T: DeserializeOwned>(value: &Value) -> Result<T, Error> {
    T::deserialize(value).map_err(|e| deserialization_error(&e, value.to_string()))
}

fn deserialization_error(err: &serde_json::Error, body: String) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        body,
    }
}

// ── Envelope probing ─────────────────────────────────────────────────

/// Where a candidate envelope finds its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Candidate {
    /// The value under a top-level object key.
    Key(&'static str),
    /// The body itself, when it is an array.
    Bare,
}

impl Candidate {
    fn describe(self) -> String {
        match self {
            Self::Key(key) => format!("\"{key}\""),
            Self::Bare => "bare array".to_owned(),
        }
    }

    fn select(self, body: &Value) -> Option<&Value> {
        match self {
            Self::Key(key) => body.get(key),
            Self::Bare => body.is_array().then_some(body),
        }
    }
}

/// Try each candidate in order; the first whose payload decodes as `T` wins.
///
/// A candidate that is present but does not decode is skipped, not fatal.
/// When nothing matches the error names every shape that was tried, with
/// the decode error for each one whose payload was present.
pub(crate) fn probe<T: DeserializeOwned>(
    operation: &'static str,
    body: &Value,
    candidates: &[Candidate],
) -> Result<T, Error> {
    let mut tried = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let Some(payload) = candidate.select(body) else {
            tried.push(candidate.describe());
            continue;
        };
        match T::deserialize(payload) {
            Ok(value) => {
                debug!(operation, envelope = %candidate.describe(), "envelope matched");
                return Ok(value);
            }
            Err(e) => {
                trace!(operation, envelope = %candidate.describe(), error = %e, "envelope skipped");
                tried.push(format!("{} ({e})", candidate.describe()));
            }
        }
    }

    Err(Error::UnrecognizedEnvelope {
        operation,
        tried,
        body: body.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    const CANDIDATES: &[Candidate] = &[
        Candidate::Key("items"),
        Candidate::Key("data"),
        Candidate::Bare,
    ];

    #[test]
    fn non_zero_res_is_vendor_error() {
        let body = json!({"res": 3, "res_message": "site not found"});
        let err = check_result_code("get site status", &body).unwrap_err();
        match err {
            Error::Vendor { code, message, .. } => {
                assert_eq!(code, 3);
                assert_eq!(message, "site not found");
            }
            other => panic!("expected Vendor error, got {other:?}"),
        }
    }

    #[test]
    fn zero_or_missing_res_passes() {
        assert!(check_result_code("op", &json!({"res": 0})).is_ok());
        assert!(check_result_code("op", &json!({"sites": []})).is_ok());
        assert!(check_result_code("op", &json!([1, 2])).is_ok());
        assert!(check_result_code("op", &json!({"res": "3"})).is_ok());
    }

    #[test]
    fn probe_takes_first_decodable_candidate() {
        let body = json!({"items": "not a list", "data": [1, 2]});
        let values: Vec<i32> = probe("op", &body, CANDIDATES).unwrap();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn probe_accepts_bare_array() {
        let values: Vec<i32> = probe("op", &json!([7]), CANDIDATES).unwrap();
        assert_eq!(values, vec![7]);
    }

    #[test]
    fn probe_reports_all_tried_shapes() {
        let err = probe::<Vec<i32>>("op", &json!({"other": []}), CANDIDATES).unwrap_err();
        match err {
            Error::UnrecognizedEnvelope { tried, .. } => {
                assert_eq!(tried, vec!["\"items\"", "\"data\"", "bare array"]);
            }
            other => panic!("expected UnrecognizedEnvelope, got {other:?}"),
        }
    }

    #[test]
    fn bare_candidate_skips_object_bodies() {
        let err = probe::<Vec<i32>>("op", &json!({"res": 0}), &[Candidate::Bare]).unwrap_err();
        match err {
            Error::UnrecognizedEnvelope { tried, .. } => assert_eq!(tried, vec!["bare array"]),
            other => panic!("expected UnrecognizedEnvelope, got {other:?}"),
        }
    }

    #[test]
    fn unmatched_envelope_explains_present_candidates() {
        let body = json!({"items": null, "data": ["x"]});
        let err = probe::<Vec<i32>>("op", &body, CANDIDATES).unwrap_err();
        match err {
            Error::UnrecognizedEnvelope { tried, .. } => {
                assert_eq!(tried.len(), 3);
                assert!(tried[0].starts_with("\"items\" (invalid type: null"), "{tried:?}");
                assert!(tried[1].starts_with("\"data\" (invalid type: string"), "{tried:?}");
                assert_eq!(tried[2], "bare array");
            }
            other => panic!("expected UnrecognizedEnvelope, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_keeps_body() {
        let err = parse_json(b"<html>gateway error</html>").unwrap_err();
        assert_eq!(err.body(), Some("<html>gateway error</html>"));
    }

    #[test]
    fn parse_checked_rejects_vendor_failure() {
        let err = parse_checked("op", br#"{"res":1,"res_message":"Unexpected error"}"#).unwrap_err();
        assert_eq!(err.vendor_code(), Some(1));
    }

    #[test]
    fn api_result_into_result() {
        let ok = ApiResult {
            res: 0,
            res_message: "OK".into(),
            ..ApiResult::default()
        };
        assert!(ok.into_result("op").is_ok());

        let bad = ApiResult {
            res: 9414,
            res_message: "feature not permitted".into(),
            ..ApiResult::default()
        };
        assert_eq!(bad.into_result("op").unwrap_err().vendor_code(), Some(9414));
    }
}
