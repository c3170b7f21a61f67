//! Custom rule command handlers.

use tabled::Tabled;

use imperva_api::{BlockDuration, BlockDurationPeriod, ImpervaClient, Rule, RuleAction};

use crate::cli::{GlobalOpts, RuleActionArg, RuleSpecArgs, RulesArgs, RulesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Filter")]
    filter: String,
}

fn rule_row(r: &Rule, color: bool) -> RuleRow {
    let enabled = r.enabled.unwrap_or(true);
    RuleRow {
        id: rule_id(r),
        name: r.name.clone(),
        action: r
            .action
            .as_ref()
            .map_or_else(|| "-".into(), ToString::to_string),
        enabled: output::status_cell(if enabled { "yes" } else { "no" }, enabled, color),
        filter: output::muted(&r.filter, color),
    }
}

fn rule_id(r: &Rule) -> String {
    r.id.as_ref().map_or_else(|| "-".into(), ToString::to_string)
}

fn detail(r: &Rule) -> String {
    let mut lines = vec![
        format!("ID:       {}", rule_id(r)),
        format!("Name:     {}", r.name),
        format!(
            "Action:   {}",
            r.action.as_ref().map_or_else(|| "-".into(), ToString::to_string)
        ),
        format!("Enabled:  {}", r.enabled.unwrap_or(true)),
        format!("Filter:   {}", r.filter),
    ];
    if let Some(code) = r.response_code {
        lines.push(format!("Response: {code}"));
    }
    if let Some(minutes) = r.block_duration.as_ref().and_then(|b| b.fixed_duration_minutes) {
        lines.push(format!("Block:    {minutes} min"));
    }
    lines.join("\n")
}

// ── Request building ────────────────────────────────────────────────

fn rule_action(arg: RuleActionArg) -> RuleAction {
    match arg {
        RuleActionArg::Redirect => RuleAction::Redirect,
        RuleActionArg::SimplifiedRedirect => RuleAction::SimplifiedRedirect,
        RuleActionArg::BlockIp => RuleAction::BlockIp,
        RuleActionArg::BlockUser => RuleAction::BlockUser,
        RuleActionArg::BlockSession => RuleAction::BlockSession,
        RuleActionArg::ChallengeCookie => RuleAction::ChallengeCookie,
        RuleActionArg::ChallengeJs => RuleAction::ChallengeJs,
        RuleActionArg::ChallengeCaptcha => RuleAction::ChallengeCaptcha,
        RuleActionArg::Allow => RuleAction::Allow,
        RuleActionArg::RewriteUrl => RuleAction::RewriteUrl,
    }
}

/// Build a rule body from `--from-file` (if any) with flags layered on top.
fn build_rule(spec: RuleSpecArgs) -> Result<Rule, CliError> {
    let mut rule: Rule = match spec.from_file {
        Some(ref path) => serde_json::from_value(util::read_json_file(path)?)?,
        None => Rule::default(),
    };

    if let Some(name) = spec.name {
        rule.name = name;
    }
    if let Some(action) = spec.action {
        rule.action = Some(rule_action(action));
    }
    if let Some(filter) = spec.filter {
        rule.filter = filter;
    }
    if spec.response_code.is_some() {
        rule.response_code = spec.response_code;
    }
    if spec.disabled {
        rule.enabled = Some(false);
    }
    if let Some(minutes) = spec.block_minutes {
        if !rule.action.as_ref().is_some_and(RuleAction::is_block) {
            return Err(CliError::Validation {
                field: "block-minutes".into(),
                reason: "only applies to block actions".into(),
            });
        }
        rule.block_duration = Some(BlockDuration {
            period_type: Some(BlockDurationPeriod::Fixed),
            fixed_duration_minutes: Some(minutes),
        });
    }

    if rule.name.is_empty() {
        return Err(CliError::Validation {
            field: "name".into(),
            reason: "a rule needs a name (--name or the file's \"name\")".into(),
        });
    }
    if rule.action.is_none() {
        return Err(CliError::Validation {
            field: "action".into(),
            reason: "a rule needs an action (--action or the file's \"action\")".into(),
        });
    }

    // The identifier travels in the URL, never in the body.
    rule.id = None;
    Ok(rule)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &ImpervaClient,
    args: RulesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        RulesCommand::List => {
            let site_id = util::resolve_site(client, global).await?;
            let rules = client.list_rules(site_id).await?;
            let out = output::render_list(
                &global.output,
                &rules,
                |r| rule_row(r, color),
                rule_id,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Get { rule_id: id } => {
            let site_id = util::resolve_site(client, global).await?;
            let rule = client.get_rule(site_id, &util::parse_rule_id(&id)).await?;
            let out = output::render_single(&global.output, &rule, detail, rule_id)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Create(spec) => {
            let rule = build_rule(spec)?;
            let site_id = util::resolve_site(client, global).await?;
            let created = client.create_rule(site_id, &rule).await?;
            let out = output::render_single(&global.output, &created, detail, rule_id)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Update { rule_id: id, spec } => {
            let rule = build_rule(spec)?;
            let site_id = util::resolve_site(client, global).await?;
            let updated = client
                .update_rule(site_id, &util::parse_rule_id(&id), &rule)
                .await?;
            let out = output::render_single(&global.output, &updated, detail, rule_id)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Delete { rule_id: id } => {
            let site_id = util::resolve_site(client, global).await?;
            if !util::confirm(&format!("Delete rule {id} from site {site_id}?"), global.yes)? {
                return Ok(());
            }
            client
                .delete_rule(site_id, &util::parse_rule_id(&id))
                .await?;
            if !global.quiet {
                eprintln!("Rule {id} deleted");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn spec() -> RuleSpecArgs {
        RuleSpecArgs {
            from_file: None,
            name: Some("block bad ip".into()),
            action: Some(RuleActionArg::BlockIp),
            filter: Some("ClientIP == 1.2.3.4".into()),
            response_code: None,
            block_minutes: None,
            disabled: false,
        }
    }

    #[test]
    fn flags_build_a_rule() {
        let rule = build_rule(spec()).unwrap();
        assert_eq!(rule.name, "block bad ip");
        assert_eq!(rule.action, Some(RuleAction::BlockIp));
        assert_eq!(rule.filter, "ClientIP == 1.2.3.4");
        assert!(rule.id.is_none());
    }

    #[test]
    fn block_minutes_sets_fixed_duration() {
        let rule = build_rule(RuleSpecArgs {
            block_minutes: Some(30),
            ..spec()
        })
        .unwrap();
        let duration = rule.block_duration.unwrap();
        assert_eq!(duration.period_type, Some(BlockDurationPeriod::Fixed));
        assert_eq!(duration.fixed_duration_minutes, Some(30));
    }

    #[test]
    fn block_minutes_rejected_for_non_block_actions() {
        let err = build_rule(RuleSpecArgs {
            action: Some(RuleActionArg::Allow),
            block_minutes: Some(5),
            ..spec()
        })
        .unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn missing_action_is_rejected() {
        let err = build_rule(RuleSpecArgs {
            action: None,
            ..spec()
        })
        .unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "action"));
    }

    #[test]
    fn file_fields_are_overridden_by_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rule.json");
        std::fs::write(
            &path,
            r#"{"rule_id": 7, "name": "from file", "action": "RULE_ACTION_ALLOW", "filter": "URL == \"/x\""}"#,
        )
        .unwrap();

        let rule = build_rule(RuleSpecArgs {
            from_file: Some(path),
            name: Some("renamed".into()),
            action: None,
            filter: None,
            response_code: None,
            block_minutes: None,
            disabled: true,
        })
        .unwrap();
        assert_eq!(rule.name, "renamed");
        assert_eq!(rule.action, Some(RuleAction::Allow));
        assert_eq!(rule.filter, "URL == \"/x\"");
        assert_eq!(rule.enabled, Some(false));
        assert!(rule.id.is_none());
    }
}
