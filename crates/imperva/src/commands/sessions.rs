//! Session command handlers.

use imperva_api::{ApiResult, ImpervaClient};

use crate::cli::{GlobalOpts, SessionsArgs, SessionsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(r: &ApiResult) -> String {
    let message = r
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(&r.res_message);
    if message.is_empty() {
        "Session released".into()
    } else {
        format!("Session released: {message}")
    }
}

pub async fn handle(
    client: &ImpervaClient,
    args: SessionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SessionsCommand::Release { session_id } => {
            let site_id = util::resolve_site(client, global).await?;
            let result = client.release_session(site_id, &session_id).await?;
            let out = output::render_single(&global.output, &result, detail, |r| {
                r.res.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
