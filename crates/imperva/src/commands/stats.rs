//! Statistics command handler.
//!
//! The table view flattens every returned series into one row; the
//! structured formats emit the full category bag.

use tabled::Tabled;

use imperva_api::{ImpervaClient, StatsCategory, StatsOptions, StatsResponse};

use crate::cli::{GlobalOpts, StatsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SeriesRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Series")]
    series: String,
    #[tabled(rename = "Points")]
    points: usize,
    #[tabled(rename = "Latest")]
    latest: String,
}

fn series_rows(stats: &StatsResponse) -> Vec<SeriesRow> {
    stats
        .present()
        .flat_map(|(category, series)| {
            series.iter().map(move |s| SeriesRow {
                category: category.to_string(),
                series: if s.name.is_empty() {
                    s.id.as_ref().map_or_else(|| "-".into(), ToString::to_string)
                } else {
                    s.name.clone()
                },
                points: s.data.len(),
                latest: s.data.last().map_or_else(
                    || "-".into(),
                    |p| format!("{} @ {}", p.value, util::format_timestamp(p.timestamp)),
                ),
            })
        })
        .collect()
}

fn categories(names: &[String]) -> Result<Vec<StatsCategory>, CliError> {
    names
        .iter()
        .map(|n| {
            n.parse::<StatsCategory>().map_err(|reason| CliError::Validation {
                field: "stats".into(),
                reason,
            })
        })
        .collect()
}

pub async fn handle(
    client: &ImpervaClient,
    args: StatsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let options = StatsOptions {
        time_range: util::time_range(&args.range)?,
        stats: categories(&args.stats)?,
    };

    let site_id = util::resolve_site(client, global).await?;
    let stats = client.get_stats(site_id, &options).await?;

    let out = output::render_single(
        &global.output,
        &stats,
        |s| output::render_table(&series_rows(s)),
        |s| {
            s.present()
                .map(|(c, _)| c.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
