//! Visit (traffic log) command handler.

use tabled::Tabled;

use imperva_api::{ImpervaClient, SecurityFilter, Visit, VisitOptions};

use crate::cli::{GlobalOpts, SecurityArg, VisitsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct VisitRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Client IPs")]
    client_ips: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
}

impl From<&Visit> for VisitRow {
    fn from(v: &Visit) -> Self {
        Self {
            id: v.id.clone(),
            client_ips: v.client_ips.as_slice().join(", "),
            country: v.countries.as_slice().join(", "),
            start: util::format_timestamp(v.start_time),
            end: util::format_timestamp(v.end_time),
        }
    }
}

pub async fn handle(
    client: &ImpervaClient,
    args: VisitsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let options = VisitOptions {
        time_range: util::time_range(&args.range)?,
        page_size: args.page_size,
        page_num: args.page_num,
        security: args.security.map(|s| match s {
            SecurityArg::All => SecurityFilter::All,
            SecurityArg::Blocked => SecurityFilter::Blocked,
        }),
    };

    let site_id = util::resolve_site(client, global).await?;
    let visits = client.get_visits(site_id, &options).await?;
    let out = output::render_list(&global.output, &visits, |v| VisitRow::from(v), |v| v.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
