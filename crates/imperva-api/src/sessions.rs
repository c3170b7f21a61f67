// Session endpoints
//
// Release is the only session operation. The documented response wraps
// result objects in a `data` array; some error paths return one bare
// result object instead.

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::client::ImpervaClient;
use crate::envelope::{ApiResult, decode_value, parse_checked};
use crate::error::Error;
use crate::transport::RequestBody;

const RELEASE_SESSION: &str = "release session";

/// Fields that identify a bare object as a result block.
const RESULT_FIELDS: [&str; 3] = ["res", "res_message", "message"];

impl ImpervaClient {
    /// Release (unblock) a session on a site.
    ///
    /// `POST /v3/sites/{site_id}/sessions/{session_id}/release` with no body
    pub async fn release_session(
        &self,
        site_id: i64,
        session_id: &str,
    ) -> Result<ApiResult, Error> {
        let site = site_id.to_string();
        let url =
            self.url_from_segments(&["v3", "sites", &site, "sessions", session_id, "release"])?;
        debug!(site_id, session_id, "releasing session");

        let body = self.send(Method::POST, url, RequestBody::None).await?;
        parse_release(&body)
    }
}

pub(crate) fn parse_release(body: &[u8]) -> Result<ApiResult, Error> {
    let value = parse_checked(RELEASE_SESSION, body)?;

    let data = value
        .get("data")
        .and_then(|data| Vec::<ApiResult>::deserialize(data).ok());
    if let Some(results) = data {
        debug!(count = results.len(), "release session: data envelope");
        let first = results.into_iter().next().ok_or(Error::EmptyResponse {
            operation: RELEASE_SESSION,
        })?;
        return first.into_result(RELEASE_SESSION);
    }

    if is_result_object(&value) {
        debug!("release session: bare result object");
        return decode_value::<ApiResult>(&value)?.into_result(RELEASE_SESSION);
    }

    Err(Error::UnrecognizedEnvelope {
        operation: RELEASE_SESSION,
        tried: vec!["\"data\"".to_owned(), "bare object".to_owned()],
        body: value.to_string(),
    })
}

fn is_result_object(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| RESULT_FIELDS.iter().any(|field| map.contains_key(*field)))
}
