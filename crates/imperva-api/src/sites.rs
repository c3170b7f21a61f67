// Site endpoints
//
// Both calls are POSTs that carry their parameters in the query string
// and an empty `{}` JSON body. The listing envelope key moved between API
// versions, so the payload is probed under each known key in turn.

use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::client::ImpervaClient;
use crate::envelope::{ApiResult, Candidate, decode_value, parse_checked, probe};
use crate::error::Error;
use crate::models::{Site, SiteStatusTest};
use crate::transport::RequestBody;

const LIST_SITES: &str = "list sites";
const SITE_STATUS: &str = "site status";

/// Envelope keys for the site list, most recent API version first.
const SITE_LIST_ENVELOPES: &[Candidate] = &[
    Candidate::Key("sites"),
    Candidate::Key("ApiResultSiteStatus"),
    Candidate::Key("data"),
];

/// Pagination for [`ImpervaClient::list_sites`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSitesOptions {
    pub page_size: u32,
    pub page_num: u32,
}

impl Default for ListSitesOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            page_num: 0,
        }
    }
}

/// `site status` returns the site record's fields next to the result code.
#[derive(Debug, Deserialize)]
struct SiteStatusResponse {
    #[serde(flatten)]
    result: ApiResult,
    #[serde(flatten)]
    site: Site,
}

impl ImpervaClient {
    /// List sites visible to the API key, scoped to the configured account if any.
    ///
    /// `POST /api/prov/v1/sites/list?page_size=…&page_num=…[&account_id=…]` with `{}`
    pub async fn list_sites(&self, options: ListSitesOptions) -> Result<Vec<Site>, Error> {
        let mut params = vec![
            ("page_size", options.page_size.to_string()),
            ("page_num", options.page_num.to_string()),
        ];
        if let Some(account_id) = self.account_id() {
            params.push(("account_id", account_id.to_owned()));
        }
        let url = self.url_with_query("/api/prov/v1/sites/list", &params)?;
        debug!(page_size = options.page_size, page_num = options.page_num, "listing sites");

        let body = self.send(Method::POST, url, RequestBody::EmptyObject).await?;
        parse_site_list(&body)
    }

    /// Fetch a site's record, optionally running status tests first.
    ///
    /// `POST /api/prov/v1/sites/status?site_id=…[&tests=a,b]` with `{}`
    pub async fn get_site_status(
        &self,
        site_id: i64,
        tests: &[SiteStatusTest],
    ) -> Result<Site, Error> {
        let mut params = vec![("site_id", site_id.to_string())];
        if !tests.is_empty() {
            params.push(("tests", join_tests(tests)));
        }
        let url = self.url_with_query("/api/prov/v1/sites/status", &params)?;
        debug!(site_id, "fetching site status");

        let body = self.send(Method::POST, url, RequestBody::EmptyObject).await?;
        parse_site_status(&body)
    }
}

fn join_tests(tests: &[SiteStatusTest]) -> String {
    tests
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn parse_site_list(body: &[u8]) -> Result<Vec<Site>, Error> {
    let value = parse_checked(LIST_SITES, body)?;
    probe(LIST_SITES, &value, SITE_LIST_ENVELOPES)
}

pub(crate) fn parse_site_status(body: &[u8]) -> Result<Site, Error> {
    let value: Value = parse_checked(SITE_STATUS, body)?;
    let resp: SiteStatusResponse = decode_value(&value)?;
    resp.result.into_result(SITE_STATUS)?;
    Ok(resp.site)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn list_prefers_sites_key() {
        let body = br#"{"res":0,"sites":[{"site_id":1,"domain":"a.example"}],"data":[{"site_id":2}]}"#;
        let sites = parse_site_list(body).unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].domain, "a.example");
    }

    #[test]
    fn list_falls_back_to_legacy_key() {
        let body = br#"{"res":0,"ApiResultSiteStatus":[{"site_id":7,"domain":"b.example","active":"active"}]}"#;
        let sites = parse_site_list(body).unwrap();
        assert_eq!(sites[0].site_id, 7);
        assert!(sites[0].is_active());
    }

    #[test]
    fn list_skips_key_that_does_not_decode() {
        let body = br#"{"sites":"unavailable","data":[{"site_id":3}]}"#;
        let sites = parse_site_list(body).unwrap();
        assert_eq!(sites[0].site_id, 3);
    }

    #[test]
    fn list_without_known_key_names_every_candidate() {
        let body = br#"{"res":0,"items":[]}"#;
        let err = parse_site_list(body).unwrap_err();
        match err {
            Error::UnrecognizedEnvelope { tried, .. } => assert_eq!(
                tried,
                vec!["\"sites\"", "\"ApiResultSiteStatus\"", "\"data\""]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn list_vendor_failure_wins_over_payload() {
        let body = br#"{"res":9403,"res_message":"Unknown account","sites":[]}"#;
        let err = parse_site_list(body).unwrap_err();
        assert_eq!(err.vendor_code(), Some(9403));
        assert!(err.to_string().contains("Unknown account"));
    }

    #[test]
    fn status_decodes_flattened_site() {
        let body = br#"{"res":0,"res_message":"OK","site_id":42,"domain":"shop.example","status":"fully_configured","active":true}"#;
        let site = parse_site_status(body).unwrap();
        assert_eq!(site.site_id, 42);
        assert_eq!(site.status, "fully_configured");
        assert!(site.is_active());
    }

    #[test]
    fn status_without_site_id_is_a_decode_error() {
        let body = br#"{"res":0,"domain":"shop.example"}"#;
        assert!(matches!(
            parse_site_status(body),
            Err(Error::Deserialization { .. })
        ));
    }

    #[test]
    fn list_tolerates_null_fields() {
        let body = br#"{"res":0,"sites":[
            {"site_id":1,"domain":"a.example","ips":null,"dns":null,"incap_rules":null},
            {"site_id":2,"domain":null,"status":null}
        ]}"#;
        let sites = parse_site_list(body).unwrap();
        assert_eq!(sites.len(), 2);
        assert!(sites[0].ips.is_empty());
        assert!(sites[0].dns.is_empty());
        assert!(sites[0].incap_rules.is_empty());
        assert_eq!(sites[1].domain, "");
    }

    #[test]
    fn tests_join_with_commas() {
        assert_eq!(
            join_tests(&[SiteStatusTest::DomainValidation, SiteStatusTest::Dns]),
            "domain_validation,dns"
        );
    }
}
