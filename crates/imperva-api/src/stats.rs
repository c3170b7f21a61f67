// Traffic endpoints: visits (traffic log) and aggregated statistics
//
// Both are POSTs with every parameter in the query string and no request
// body. Visits arrive under `visits`, under `data`, or as a bare array;
// statistics decode straight into the per-category bag.

use std::fmt;

use reqwest::Method;
use tracing::debug;

use crate::client::ImpervaClient;
use crate::envelope::{Candidate, decode_value, parse_checked, probe};
use crate::error::Error;
use crate::models::{StatsCategory, StatsResponse, Visit};
use crate::transport::RequestBody;

const GET_VISITS: &str = "get visits";
const GET_STATS: &str = "get stats";

const DEFAULT_TIME_RANGE: &str = "last_7_days";

const VISIT_ENVELOPES: &[Candidate] = &[
    Candidate::Key("visits"),
    Candidate::Key("data"),
    Candidate::Bare,
];

// ── Options ──────────────────────────────────────────────────────────

/// Time window for traffic queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRange {
    /// A vendor preset token such as `last_hour`, `today` or `last_30_days`.
    Preset(String),
    /// Explicit window in epoch seconds, sent as `time_range=custom&start=…&end=…`.
    Custom { start: i64, end: i64 },
}

impl TimeRange {
    pub fn preset(token: impl Into<String>) -> Self {
        Self::Preset(token.into())
    }

    fn push_params(&self, params: &mut Vec<(&'static str, String)>) {
        match self {
            Self::Preset(token) => params.push(("time_range", token.clone())),
            Self::Custom { start, end } => {
                params.push(("time_range", "custom".to_owned()));
                params.push(("start", start.to_string()));
                params.push(("end", end.to_string()));
            }
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::Preset(DEFAULT_TIME_RANGE.to_owned())
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(token) => f.write_str(token),
            Self::Custom { start, end } => write!(f, "custom ({start}..{end})"),
        }
    }
}

/// Security-event filter for the visits query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityFilter {
    All,
    Blocked,
}

impl SecurityFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Blocked => "blocked",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitOptions {
    /// Defaults to `last_7_days` when `None`.
    pub time_range: Option<TimeRange>,
    pub page_size: Option<u32>,
    pub page_num: Option<u32>,
    pub security: Option<SecurityFilter>,
}

impl VisitOptions {
    fn query(&self, site_id: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![("site_id", site_id.to_string())];
        self.time_range
            .clone()
            .unwrap_or_default()
            .push_params(&mut params);
        if let Some(size) = self.page_size.filter(|n| *n > 0) {
            params.push(("page_size", size.to_string()));
        }
        if let Some(num) = self.page_num.filter(|n| *n > 0) {
            params.push(("page_num", num.to_string()));
        }
        if let Some(security) = self.security {
            params.push(("security", security.as_str().to_owned()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsOptions {
    /// Omitted from the request when `None`; the vendor applies its own default.
    pub time_range: Option<TimeRange>,
    /// Categories to request. Empty sends no `stats` parameter.
    pub stats: Vec<StatsCategory>,
}

impl StatsOptions {
    fn query(&self, site_id: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![("site_id", site_id.to_string())];
        if let Some(range) = &self.time_range {
            range.push_params(&mut params);
        }
        if !self.stats.is_empty() {
            let joined = self
                .stats
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(",");
            params.push(("stats", joined));
        }
        params
    }
}

// ── Endpoints ────────────────────────────────────────────────────────

impl ImpervaClient {
    /// Fetch one page of the site's traffic log.
    ///
    /// `POST /api/visits/v1?site_id=…&time_range=…[&page_size][&page_num][&security]`
    pub async fn get_visits(
        &self,
        site_id: i64,
        options: &VisitOptions,
    ) -> Result<Vec<Visit>, Error> {
        let url = self.url_with_query("/api/visits/v1", &options.query(site_id))?;
        debug!(site_id, "fetching visits");

        let body = self.send(Method::POST, url, RequestBody::None).await?;
        parse_visits(&body)
    }

    /// Fetch aggregated statistics for the requested categories.
    ///
    /// `POST /api/stats/v1?site_id=…[&time_range][&stats=a,b]`
    pub async fn get_stats(
        &self,
        site_id: i64,
        options: &StatsOptions,
    ) -> Result<StatsResponse, Error> {
        let url = self.url_with_query("/api/stats/v1", &options.query(site_id))?;
        debug!(site_id, categories = options.stats.len(), "fetching stats");

        let body = self.send(Method::POST, url, RequestBody::None).await?;
        parse_stats(&body)
    }
}

pub(crate) fn parse_visits(body: &[u8]) -> Result<Vec<Visit>, Error> {
    let value = parse_checked(GET_VISITS, body)?;
    probe(GET_VISITS, &value, VISIT_ENVELOPES)
}

pub(crate) fn parse_stats(body: &[u8]) -> Result<StatsResponse, Error> {
    let value = parse_checked(GET_STATS, body)?;
    decode_value(&value)
}
