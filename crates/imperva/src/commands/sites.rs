//! Site command handlers.

use tabled::Tabled;

use imperva_api::{ImpervaClient, ListSitesOptions, Site, SiteStatusTest};

use crate::cli::{GlobalOpts, SitesArgs, SitesCommand, StatusTestArg};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Account")]
    account: String,
}

fn site_row(s: &Site, color: bool) -> SiteRow {
    SiteRow {
        id: s.site_id,
        domain: s.domain.clone(),
        status: s.status.clone(),
        active: output::status_cell(if s.is_active() { "yes" } else { "no" }, s.is_active(), color),
        account: s
            .account_id
            .map_or_else(|| "-".into(), |id| id.to_string()),
    }
}

fn detail(s: &Site) -> String {
    let mut lines = vec![
        format!("ID:       {}", s.site_id),
        format!("Domain:   {}", s.domain),
        format!("Status:   {}", s.status),
        format!("Active:   {}", s.is_active()),
        format!(
            "Account:  {}",
            s.account_id.map_or_else(|| "-".into(), |id| id.to_string())
        ),
        format!("Accel:    {}", s.acceleration_level.as_deref().unwrap_or("-")),
        format!(
            "Created:  {}",
            s.site_creation_date.map_or_else(|| "-".into(), util::format_timestamp)
        ),
    ];
    if !s.ips.is_empty() {
        lines.push(format!("IPs:      {}", s.ips.join(", ")));
    }
    let waf = s.waf_rules();
    if !waf.is_empty() {
        lines.push("WAF rules:".into());
        lines.extend(
            waf.iter()
                .map(|r| format!("  {:<28} {}", r.name, r.action_text.as_deref().unwrap_or(&r.action))),
        );
    }
    if !s.incap_rules.is_empty() {
        lines.push("Custom rules:".into());
        lines.extend(
            s.incap_rules
                .iter()
                .map(|r| format!("  {:<10} {:<28} {}", r.id, r.name, r.action)),
        );
    }
    lines.join("\n")
}

fn status_test(arg: StatusTestArg) -> SiteStatusTest {
    match arg {
        StatusTestArg::DomainValidation => SiteStatusTest::DomainValidation,
        StatusTestArg::Services => SiteStatusTest::Services,
        StatusTestArg::Dns => SiteStatusTest::Dns,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &ImpervaClient,
    args: SitesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        SitesCommand::List(page) => {
            let sites = client
                .list_sites(ListSitesOptions {
                    page_size: page.page_size,
                    page_num: page.page_num,
                })
                .await?;
            let out = output::render_list(
                &global.output,
                &sites,
                |s| site_row(s, color),
                |s| s.site_id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Status { tests } => {
            let site_id = util::resolve_site(client, global).await?;
            let tests: Vec<SiteStatusTest> = tests.into_iter().map(status_test).collect();
            let site = client.get_site_status(site_id, &tests).await?;
            let out = output::render_single(&global.output, &site, detail, |s| {
                s.site_id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
