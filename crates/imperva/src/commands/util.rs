//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use chrono::{DateTime, Utc};
use dialoguer::Select;

use imperva_api::{FlexId, ImpervaClient, ListSitesOptions, TimeRange};

use crate::cli::{GlobalOpts, TimeRangeArgs};
use crate::error::CliError;

/// Epoch values above this are taken to be milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the action is refused.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').to_owned(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// The site to operate on: `--site`, or an interactive pick from the
/// first page of sites.
pub async fn resolve_site(client: &ImpervaClient, global: &GlobalOpts) -> Result<i64, CliError> {
    if let Some(site) = global.site {
        return Ok(site);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::SiteRequired);
    }

    let sites = client.list_sites(ListSitesOptions::default()).await?;
    if sites.is_empty() {
        return Err(CliError::NoSites);
    }

    let labels: Vec<String> = sites
        .iter()
        .map(|s| format!("{} ({})", s.domain, s.site_id))
        .collect();
    let selection = Select::new()
        .with_prompt("Site")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    sites
        .get(selection)
        .map(|s| s.site_id)
        .ok_or(CliError::SiteRequired)
}

/// Rule identifiers are numeric on current API generations; keep anything
/// else as a string.
pub fn parse_rule_id(raw: &str) -> FlexId {
    raw.parse::<i64>()
        .map_or_else(|_| FlexId::from(raw), FlexId::from)
}

/// Time range from `--time-range` or `--start`/`--end`.
pub fn time_range(args: &TimeRangeArgs) -> Result<Option<TimeRange>, CliError> {
    match (&args.time_range, args.start, args.end) {
        (Some(token), _, _) => Ok(Some(TimeRange::preset(token.clone()))),
        (None, Some(start), Some(end)) => {
            if end < start {
                return Err(CliError::Validation {
                    field: "end".into(),
                    reason: "must not be before --start".into(),
                });
            }
            Ok(Some(TimeRange::Custom { start, end }))
        }
        _ => Ok(None),
    }
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Render an epoch timestamp (seconds or milliseconds) as UTC.
pub fn format_timestamp(ts: i64) -> String {
    if ts <= 0 {
        return "-".into();
    }
    let parsed = if ts > MILLIS_THRESHOLD {
        DateTime::<Utc>::from_timestamp_millis(ts)
    } else {
        DateTime::<Utc>::from_timestamp(ts, 0)
    };
    parsed.map_or_else(|| ts.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}
