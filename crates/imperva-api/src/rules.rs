// Custom rule endpoints
//
// Create, read, update and delete go through the v2 provisioning paths.
// Listing depends on the configured API generation: v1 groups rules by
// name under `incap_rules`, v3 returns a flat `data` array of
// `{rule, site_id, account_id}` items.

use indexmap::IndexMap;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::auth::ApiGeneration;
use crate::client::ImpervaClient;
use crate::envelope::{ApiResult, Candidate, decode_value, parse_checked, probe};
use crate::error::Error;
use crate::models::Rule;
use crate::transport::RequestBody;
use crate::wire::FlexId;

const CREATE_RULE: &str = "create rule";
const GET_RULE: &str = "get rule";
const UPDATE_RULE: &str = "update rule";
const DELETE_RULE: &str = "delete rule";
const LIST_RULES: &str = "list rules";

const LIST_PAGE_SIZE: u32 = 100;

/// One element of the v3 listing `data` array. `site_id` and `account_id`
/// ride alongside the rule and are dropped.
#[derive(Debug, Deserialize)]
struct RuleListItem {
    rule: Rule,
}

impl ImpervaClient {
    /// Create a custom rule on a site and return the vendor's view of it.
    ///
    /// `POST /api/prov/v2/sites/{site_id}/rules`
    pub async fn create_rule(&self, site_id: i64, rule: &Rule) -> Result<Rule, Error> {
        let site = site_id.to_string();
        let url = self.url_from_segments(&["api", "prov", "v2", "sites", &site, "rules"])?;
        debug!(site_id, name = %rule.name, "creating rule");

        let body = self
            .send(Method::POST, url, RequestBody::Json(serde_json::to_value(rule)?))
            .await?;
        parse_rule(CREATE_RULE, &body)
    }

    /// `GET /api/prov/v2/sites/{site_id}/rules/{rule_id}`
    pub async fn get_rule(&self, site_id: i64, rule_id: &FlexId) -> Result<Rule, Error> {
        let url = self.rule_url(site_id, rule_id)?;
        debug!(site_id, %rule_id, "fetching rule");

        let body = self.send(Method::GET, url, RequestBody::None).await?;
        parse_rule(GET_RULE, &body)
    }

    /// Replace a rule. The vendor uses POST for this, not PUT.
    ///
    /// `POST /api/prov/v2/sites/{site_id}/rules/{rule_id}`
    pub async fn update_rule(
        &self,
        site_id: i64,
        rule_id: &FlexId,
        rule: &Rule,
    ) -> Result<Rule, Error> {
        let url = self.rule_url(site_id, rule_id)?;
        debug!(site_id, %rule_id, "updating rule");

        let body = self
            .send(Method::POST, url, RequestBody::Json(serde_json::to_value(rule)?))
            .await?;
        parse_rule(UPDATE_RULE, &body)
    }

    /// `DELETE /api/prov/v2/sites/{site_id}/rules/{rule_id}`
    pub async fn delete_rule(&self, site_id: i64, rule_id: &FlexId) -> Result<(), Error> {
        let url = self.rule_url(site_id, rule_id)?;
        debug!(site_id, %rule_id, "deleting rule");

        let body = self.send(Method::DELETE, url, RequestBody::None).await?;
        parse_delete(&body)
    }

    /// List a site's custom rules using the configured API generation.
    ///
    /// - v1: `POST /api/prov/v1/sites/incapRules/list?site_id=…&page_size=100&page_num=0` with `{}`
    /// - v3: `GET /api/prov/v3/rules?siteIds=…&page_size=100`
    pub async fn list_rules(&self, site_id: i64) -> Result<Vec<Rule>, Error> {
        let generation = self.api_generation();
        debug!(site_id, %generation, "listing rules");

        match generation {
            ApiGeneration::V1 => {
                let url = self.url_with_query(
                    "/api/prov/v1/sites/incapRules/list",
                    &[
                        ("site_id", site_id.to_string()),
                        ("page_size", LIST_PAGE_SIZE.to_string()),
                        ("page_num", "0".to_owned()),
                    ],
                )?;
                let body = self.send(Method::POST, url, RequestBody::EmptyObject).await?;
                parse_grouped_rules(&body)
            }
            ApiGeneration::V3 => {
                let url = self.url_with_query(
                    "/api/prov/v3/rules",
                    &[
                        ("siteIds", site_id.to_string()),
                        ("page_size", LIST_PAGE_SIZE.to_string()),
                    ],
                )?;
                let body = self.send(Method::GET, url, RequestBody::None).await?;
                parse_flat_rules(&body)
            }
        }
    }

    fn rule_url(&self, site_id: i64, rule_id: &FlexId) -> Result<url::Url, Error> {
        let site = site_id.to_string();
        let rule = rule_id.to_string();
        self.url_from_segments(&["api", "prov", "v2", "sites", &site, "rules", &rule])
    }
}

// ── Response parsing ─────────────────────────────────────────────────

pub(crate) fn parse_rule(operation: &'static str, body: &[u8]) -> Result<Rule, Error> {
    let value = parse_checked(operation, body)?;
    decode_value(&value)
}

pub(crate) fn parse_delete(body: &[u8]) -> Result<(), Error> {
    let value = parse_checked(DELETE_RULE, body)?;
    decode_value::<ApiResult>(&value)?.into_result(DELETE_RULE)?;
    Ok(())
}

/// v1: `{"incap_rules": {"<group>": [rule, ...], ...}}`, every group flattened in wire order.
pub(crate) fn parse_grouped_rules(body: &[u8]) -> Result<Vec<Rule>, Error> {
    let value = parse_checked(LIST_RULES, body)?;
    let groups: IndexMap<String, Vec<Rule>> =
        probe(LIST_RULES, &value, &[Candidate::Key("incap_rules")])?;
    Ok(groups.into_values().flatten().collect())
}

/// v3: `{"data": [{"rule": {...}, "site_id": n, "account_id": n}, ...]}`
pub(crate) fn parse_flat_rules(body: &[u8]) -> Result<Vec<Rule>, Error> {
    let value = parse_checked(LIST_RULES, body)?;
    let items: Vec<RuleListItem> = probe(LIST_RULES, &value, &[Candidate::Key("data")])?;
    Ok(items.into_iter().map(|item| item.rule).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::RuleAction;

    #[test]
    fn flat_listing_extracts_rule_field() {
        let body = br#"{"data":[
            {"rule":{"rule_id":"abc","name":"Block bots","action":"RULE_ACTION_BLOCK_IP","filter":"ClientType == Bot"},"site_id":7,"account_id":1},
            {"rule":{"rule_id":55,"name":"Allow office"},"site_id":7,"account_id":1}
        ],"meta":{"totalPages":1}}"#;
        let rules = parse_flat_rules(body).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, Some(FlexId::from("abc")));
        assert_eq!(rules[0].action, Some(RuleAction::BlockIp));
        assert_eq!(rules[1].id, Some(FlexId::from(55)));
    }

    #[test]
    fn grouped_listing_flattens_every_group_in_order() {
        let body = br#"{"res":0,"incap_rules":{
            "All":[{"id":1,"name":"first","rule":"URL == \"/a\""}],
            "Custom Group":[{"id":2,"name":"second"},{"id":3,"name":"third"}]
        }}"#;
        let rules = parse_grouped_rules(body).unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert_eq!(rules[0].filter, "URL == \"/a\"");
    }

    #[test]
    fn grouped_listing_without_groups_is_empty() {
        let rules = parse_grouped_rules(br#"{"res":0,"incap_rules":{}}"#).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn flat_listing_without_data_is_unrecognized() {
        let err = parse_flat_rules(br#"{"rules":[]}"#).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedEnvelope { .. }));
    }

    #[test]
    fn unknown_action_is_preserved() {
        let rule = parse_rule(GET_RULE, br#"{"rule_id":9,"action":"RULE_ACTION_FORWARD_TO_DC"}"#).unwrap();
        assert_eq!(
            rule.action,
            Some(RuleAction::Other("RULE_ACTION_FORWARD_TO_DC".into()))
        );
    }

    #[test]
    fn delete_surfaces_vendor_message() {
        let err = parse_delete(br#"{"res":9414,"res_message":"Rule does not exist"}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "delete rule failed: Rule does not exist (9414)"
        );
    }

    #[test]
    fn delete_accepts_zero_result() {
        parse_delete(br#"{"res":0,"res_message":"OK"}"#).unwrap();
    }
}
