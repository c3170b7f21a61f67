// Imperva API resource types
//
// Plain value records produced fresh per call. Non-optional fields use
// `#[serde(default)]` plus `null_as_default` because the API is inconsistent
// about field presence across versions and sends explicit `null` for empty
// values; fields whose *type* drifts use the shapes from `crate::wire`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::envelope::ApiResult;
use crate::wire::{ActiveFlag, FlexId, OneOrMany, null_as_default};

// ── Site ─────────────────────────────────────────────────────────────

/// A protected web property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub site_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// `true`/`false` or a status word; see [`Site::is_active`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SiteSecurity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_creation_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ips: Vec<String>,
    /// DNS records; the shape varies by site type so it stays loosely typed.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub dns: Vec<serde_json::Value>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub incap_rules: Vec<IncapRule>,
}

impl Site {
    /// Whether the site is active. Null, absent and unrecognized values are not.
    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(ActiveFlag::is_active)
    }

    /// WAF rules from the nested security configuration, if any.
    pub fn waf_rules(&self) -> &[SiteWafRule] {
        self.security
            .as_ref()
            .and_then(|s| s.waf.as_ref())
            .map(|w| w.rules.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSecurity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waf: Option<SiteWaf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteWaf {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<SiteWafRule>,
}

/// WAF rule as reported inside a site's security configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteWafRule {
    pub id: FlexId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub exceptions: Vec<WafException>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WafException {
    pub id: FlexId,
    /// Exception values: strings or objects depending on the exception type.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub values: Vec<serde_json::Value>,
}

/// Custom rule summary embedded in a site record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncapRule {
    pub id: FlexId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<i64>,
}

/// Checks the status endpoint can run before reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteStatusTest {
    DomainValidation,
    Services,
    Dns,
}

impl SiteStatusTest {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DomainValidation => "domain_validation",
            Self::Services => "services",
            Self::Dns => "dns",
        }
    }
}

impl fmt::Display for SiteStatusTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteStatusTest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain_validation" | "domain-validation" => Ok(Self::DomainValidation),
            "services" => Ok(Self::Services),
            "dns" => Ok(Self::Dns),
            other => Err(format!(
                "unknown site test '{other}' (expected domain_validation, services or dns)"
            )),
        }
    }
}

// ── Rule ─────────────────────────────────────────────────────────────

/// Action a custom rule takes when its filter matches.
///
/// Unknown action strings are kept verbatim in `Other` so a new vendor
/// action does not break rule listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleAction {
    Redirect,
    SimplifiedRedirect,
    BlockIp,
    BlockUser,
    BlockSession,
    ChallengeCookie,
    ChallengeJs,
    ChallengeCaptcha,
    Allow,
    RewriteUrl,
    Other(String),
}

impl RuleAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Redirect => "RULE_ACTION_REDIRECT",
            Self::SimplifiedRedirect => "RULE_ACTION_SIMPLIFIED_REDIRECT",
            Self::BlockIp => "RULE_ACTION_BLOCK_IP",
            Self::BlockUser => "RULE_ACTION_BLOCK_USER",
            Self::BlockSession => "RULE_ACTION_BLOCK_SESSION",
            Self::ChallengeCookie => "RULE_ACTION_CHALLENGE_COOKIE",
            Self::ChallengeJs => "RULE_ACTION_CHALLENGE_JS",
            Self::ChallengeCaptcha => "RULE_ACTION_CHALLENGE_CAPTCHA",
            Self::Allow => "RULE_ACTION_ALLOW",
            Self::RewriteUrl => "RULE_ACTION_REWRITE_URL",
            Self::Other(s) => s,
        }
    }

    /// Whether the action blocks traffic (and so honours a block duration).
    pub fn is_block(&self) -> bool {
        matches!(self, Self::BlockIp | Self::BlockUser | Self::BlockSession)
    }
}

impl From<String> for RuleAction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "RULE_ACTION_REDIRECT" => Self::Redirect,
            "RULE_ACTION_SIMPLIFIED_REDIRECT" => Self::SimplifiedRedirect,
            "RULE_ACTION_BLOCK_IP" => Self::BlockIp,
            "RULE_ACTION_BLOCK_USER" => Self::BlockUser,
            "RULE_ACTION_BLOCK_SESSION" => Self::BlockSession,
            "RULE_ACTION_CHALLENGE_COOKIE" => Self::ChallengeCookie,
            "RULE_ACTION_CHALLENGE_JS" => Self::ChallengeJs,
            "RULE_ACTION_CHALLENGE_CAPTCHA" => Self::ChallengeCaptcha,
            "RULE_ACTION_ALLOW" => Self::Allow,
            "RULE_ACTION_REWRITE_URL" => Self::RewriteUrl,
            _ => Self::Other(s),
        }
    }
}

impl From<RuleAction> for String {
    fn from(action: RuleAction) -> Self {
        match action {
            RuleAction::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockDurationPeriod {
    Fixed,
    Custom,
}

/// How long a block action keeps the client blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDuration {
    #[serde(
        rename = "blockDurationPeriodType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub period_type: Option<BlockDurationPeriod>,
    #[serde(
        rename = "blockFixedDurationValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fixed_duration_minutes: Option<u32>,
}

/// A custom (incap) rule scoped to one site.
///
/// The same type is the request body for create/update, so every field
/// is omitted from the JSON when unset. The identifier is `rule_id` in v2/v3
/// responses and `id` in v1 listings; its type is not fixed either.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(
        rename = "rule_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<FlexId>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<RuleAction>,
    /// Match expression. v1 listings call it `rule`.
    #[serde(
        default,
        alias = "rule",
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(
        rename = "blockDurationDetails",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub block_duration: Option<BlockDuration>,
}

// ── Visit ────────────────────────────────────────────────────────────

/// One traffic log entry from the visits API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(
        rename = "siteId",
        alias = "site_id",
        default,
        deserialize_with = "null_as_default"
    )]
    pub site_id: i64,
    #[serde(
        rename = "clientIPs",
        alias = "clientIP",
        alias = "clientIp",
        default,
        deserialize_with = "null_as_default"
    )]
    pub client_ips: OneOrMany<String>,
    #[serde(rename = "country", default, deserialize_with = "null_as_default")]
    pub countries: OneOrMany<String>,
    #[serde(
        rename = "countryCode",
        default,
        deserialize_with = "null_as_default"
    )]
    pub country_codes: OneOrMany<String>,
    /// Start of the visit, epoch timestamp as reported by the API.
    #[serde(rename = "startTime", default)]
    pub start_time: i64,
    #[serde(rename = "endTime", default)]
    pub end_time: i64,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Stats ────────────────────────────────────────────────────────────

/// A timeseries point that is not a `[timestamp, value]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("malformed timeseries point: expected 2 elements, got {len}")]
pub struct MalformedPoint {
    pub len: usize,
}

/// One `[timestamp, value]` sample, decoded positionally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeseriesPoint {
    pub timestamp: i64,
    pub value: f64,
}

impl TimeseriesPoint {
    /// Build from the numeric elements of a wire array. Extra elements are ignored.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn from_values(values: &[f64]) -> Result<Self, MalformedPoint> {
        match values {
            [timestamp, value, ..] => Ok(Self {
                timestamp: timestamp.trunc() as i64,
                value: *value,
            }),
            _ => Err(MalformedPoint { len: values.len() }),
        }
    }
}

impl<'de> Deserialize<'de> for TimeseriesPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PointVisitor;

        impl<'de> Visitor<'de> for PointVisitor {
            type Value = TimeseriesPoint;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a [timestamp, value] array")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut values = Vec::with_capacity(2);
                while values.len() < 2 {
                    match seq.next_element::<f64>()? {
                        Some(v) => values.push(v),
                        None => break,
                    }
                }
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                TimeseriesPoint::from_values(&values).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_seq(PointVisitor)
    }
}

impl Serialize for TimeseriesPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.timestamp, self.value).serialize(serializer)
    }
}

/// A named series inside one stats category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSeries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FlexId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<TimeseriesPoint>,
    /// Category-specific extras (incident counts, hit totals, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Statistic categories the stats endpoint can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsCategory {
    VisitsTimeseries,
    HitsTimeseries,
    BandwidthTimeseries,
    RequestsGeoDistSummary,
    VisitsDistSummary,
    Caching,
    CachingTimeseries,
    Threats,
    IncapRules,
    IncapRulesTimeseries,
    DeliveryRules,
    DeliveryRulesTimeseries,
}

impl StatsCategory {
    pub const ALL: [Self; 12] = [
        Self::VisitsTimeseries,
        Self::HitsTimeseries,
        Self::BandwidthTimeseries,
        Self::RequestsGeoDistSummary,
        Self::VisitsDistSummary,
        Self::Caching,
        Self::CachingTimeseries,
        Self::Threats,
        Self::IncapRules,
        Self::IncapRulesTimeseries,
        Self::DeliveryRules,
        Self::DeliveryRulesTimeseries,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VisitsTimeseries => "visits_timeseries",
            Self::HitsTimeseries => "hits_timeseries",
            Self::BandwidthTimeseries => "bandwidth_timeseries",
            Self::RequestsGeoDistSummary => "requests_geo_dist_summary",
            Self::VisitsDistSummary => "visits_dist_summary",
            Self::Caching => "caching",
            Self::CachingTimeseries => "caching_timeseries",
            Self::Threats => "threats",
            Self::IncapRules => "incap_rules",
            Self::IncapRulesTimeseries => "incap_rules_timeseries",
            Self::DeliveryRules => "delivery_rules",
            Self::DeliveryRulesTimeseries => "delivery_rules_timeseries",
        }
    }
}

impl fmt::Display for StatsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown stats category '{s}'"))
    }
}

/// Bag of stats categories. Categories that were not requested are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub result: ApiResult,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub visits_timeseries: Vec<StatsSeries>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub hits_timeseries: Vec<StatsSeries>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub bandwidth_timeseries: Vec<StatsSeries>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub requests_geo_dist_summary: Vec<StatsSeries>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub visits_dist_summary: Vec<StatsSeries>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub caching: Vec<StatsSeries>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub caching_timeseries: Vec<StatsSeries>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub threats: Vec<StatsSeries>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub incap_rules: Vec<StatsSeries>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub incap_rules_timeseries: Vec<StatsSeries>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub delivery_rules: Vec<StatsSeries>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub delivery_rules_timeseries: Vec<StatsSeries>,
}

impl StatsResponse {
    pub fn series(&self, category: StatsCategory) -> &[StatsSeries] {
        match category {
            StatsCategory::VisitsTimeseries => &self.visits_timeseries,
            StatsCategory::HitsTimeseries => &self.hits_timeseries,
            StatsCategory::BandwidthTimeseries => &self.bandwidth_timeseries,
            StatsCategory::RequestsGeoDistSummary => &self.requests_geo_dist_summary,
            StatsCategory::VisitsDistSummary => &self.visits_dist_summary,
            StatsCategory::Caching => &self.caching,
            StatsCategory::CachingTimeseries => &self.caching_timeseries,
            StatsCategory::Threats => &self.threats,
            StatsCategory::IncapRules => &self.incap_rules,
            StatsCategory::IncapRulesTimeseries => &self.incap_rules_timeseries,
            StatsCategory::DeliveryRules => &self.delivery_rules,
            StatsCategory::DeliveryRulesTimeseries => &self.delivery_rules_timeseries,
        }
    }

    /// Categories that came back with at least one series, in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (StatsCategory, &[StatsSeries])> {
        StatsCategory::ALL
            .into_iter()
            .map(|c| (c, self.series(c)))
            .filter(|(_, s)| !s.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn site(active: serde_json::Value) -> Site {
        serde_json::from_value(json!({
            "site_id": 1,
            "domain": "example.com",
            "status": "fully_configured",
            "active": active,
        }))
        .unwrap()
    }

    #[test]
    fn site_active_accepts_bool_and_words() {
        assert!(site(json!(true)).is_active());
        assert!(site(json!("active")).is_active());
        assert!(site(json!("true")).is_active());
    }

    #[test]
    fn site_inactive_on_false_null_and_unknown() {
        assert!(!site(json!(false)).is_active());
        assert!(!site(json!("inactive")).is_active());
        assert!(!site(json!(null)).is_active());

        let absent: Site = serde_json::from_value(json!({"site_id": 1})).unwrap();
        assert!(!absent.is_active());
    }

    #[test]
    fn site_waf_rules_keep_polymorphic_ids() {
        let site: Site = serde_json::from_value(json!({
            "site_id": 7,
            "domain": "shop.example.com",
            "security": {"waf": {"rules": [
                {"id": "api.threats.sql_injection", "name": "SQL Injection", "action": "api.threats.action.block_request"},
                {"id": 3564330, "name": "Custom", "action": "block",
                 "exceptions": [{"id": 12, "values": ["1.2.3.4", {"id": "api.rule_exception_type.url"}]}]}
            ]}}
        }))
        .unwrap();

        let rules = site.waf_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, FlexId::Str("api.threats.sql_injection".into()));
        assert_eq!(rules[1].id, FlexId::Int(3_564_330));
        assert_eq!(rules[1].exceptions[0].values.len(), 2);
    }

    #[test]
    fn rule_action_round_trips_known_and_unknown() {
        let known: RuleAction = serde_json::from_value(json!("RULE_ACTION_BLOCK_IP")).unwrap();
        assert_eq!(known, RuleAction::BlockIp);
        assert!(known.is_block());

        let unknown: RuleAction = serde_json::from_value(json!("RULE_ACTION_TARPIT")).unwrap();
        assert_eq!(unknown, RuleAction::Other("RULE_ACTION_TARPIT".into()));
        assert_eq!(serde_json::to_value(&unknown).unwrap(), json!("RULE_ACTION_TARPIT"));
    }

    #[test]
    fn rule_request_body_omits_unset_fields() {
        let rule = Rule {
            name: "Block bad bots".into(),
            action: Some(RuleAction::BlockIp),
            filter: "ClientType == Bot".into(),
            block_duration: Some(BlockDuration {
                period_type: Some(BlockDurationPeriod::Fixed),
                fixed_duration_minutes: Some(10),
            }),
            ..Rule::default()
        };
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({
                "name": "Block bad bots",
                "action": "RULE_ACTION_BLOCK_IP",
                "filter": "ClientType == Bot",
                "blockDurationDetails": {
                    "blockDurationPeriodType": "fixed",
                    "blockFixedDurationValue": 10
                }
            })
        );
    }

    #[test]
    fn rule_reads_v1_field_names() {
        let rule: Rule = serde_json::from_value(json!({
            "id": 1,
            "name": "r1",
            "action": "RULE_ACTION_ALLOW",
            "rule": "URL == \"/health\"",
            "creation_date": 1_700_000_000_000_i64
        }))
        .unwrap();
        assert_eq!(rule.id, Some(FlexId::Int(1)));
        assert_eq!(rule.filter, "URL == \"/health\"");
    }

    #[test]
    fn visit_accepts_singular_and_array_fields() {
        let old: Visit = serde_json::from_value(json!({
            "id": "v1", "siteId": 10, "clientIP": "1.2.3.4",
            "country": "France", "countryCode": "FR",
            "startTime": 1_700_000_000, "endTime": 1_700_000_060
        }))
        .unwrap();
        assert_eq!(old.client_ips.as_slice(), ["1.2.3.4".to_owned()]);
        assert_eq!(old.country_codes.first().map(String::as_str), Some("FR"));

        let new: Visit = serde_json::from_value(json!({
            "id": "v2", "siteId": 10, "clientIPs": ["1.2.3.4", "5.6.7.8"],
            "country": ["France"], "countryCode": ["FR"],
            "startTime": 1_700_000_000, "endTime": 1_700_000_060,
            "browserName": "Firefox"
        }))
        .unwrap();
        assert_eq!(new.client_ips.as_slice().len(), 2);
        assert_eq!(new.extra.get("browserName"), Some(&json!("Firefox")));
    }

    #[test]
    fn timeseries_point_decodes_positionally() {
        let point: TimeseriesPoint = serde_json::from_value(json!([1_700_000_000, 42.5])).unwrap();
        assert_eq!(
            point,
            TimeseriesPoint {
                timestamp: 1_700_000_000,
                value: 42.5
            }
        );
    }

    #[test]
    fn timeseries_point_truncates_fractional_timestamp() {
        let point: TimeseriesPoint = serde_json::from_value(json!([1_700_000_000.9, 3])).unwrap();
        assert_eq!(point.timestamp, 1_700_000_000);
        assert!((point.value - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn timeseries_point_rejects_short_array() {
        let err = serde_json::from_value::<TimeseriesPoint>(json!([1_700_000_000])).unwrap_err();
        assert!(
            err.to_string().contains("malformed timeseries point"),
            "unexpected error: {err}"
        );
        assert_eq!(
            TimeseriesPoint::from_values(&[]),
            Err(MalformedPoint { len: 0 })
        );
    }

    #[test]
    fn timeseries_point_ignores_trailing_elements() {
        let point: TimeseriesPoint = serde_json::from_str("[1700000000, 1.5, 99]").unwrap();
        assert_eq!(point.timestamp, 1_700_000_000);
    }

    #[test]
    fn stats_response_missing_categories_are_empty() {
        let stats: StatsResponse = serde_json::from_value(json!({
            "res": 0,
            "res_message": "OK",
            "visits_timeseries": [
                {"id": "api.stats.visits_timeseries.human", "name": "Human visits",
                 "data": [[1_700_000_000_000_i64, 12], [1_700_000_060_000_i64, 15.5]]}
            ]
        }))
        .unwrap();

        assert_eq!(stats.visits_timeseries[0].data.len(), 2);
        assert!(stats.threats.is_empty());
        assert!(stats.series(StatsCategory::DeliveryRules).is_empty());
        let present: Vec<_> = stats.present().map(|(c, _)| c).collect();
        assert_eq!(present, vec![StatsCategory::VisitsTimeseries]);
    }

    #[test]
    fn stats_category_parses_wire_names() {
        for category in StatsCategory::ALL {
            assert_eq!(category.as_str().parse::<StatsCategory>().unwrap(), category);
        }
        assert!("requests".parse::<StatsCategory>().is_err());
    }
}
