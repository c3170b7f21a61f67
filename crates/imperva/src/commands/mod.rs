//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod config_cmd;
pub mod rules;
pub mod sessions;
pub mod sites;
pub mod stats;
pub mod util;
pub mod visits;

use imperva_api::ImpervaClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &ImpervaClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Sites(args) => sites::handle(client, args, global).await,
        Command::Rules(args) => rules::handle(client, args, global).await,
        Command::Sessions(args) => sessions::handle(client, args, global).await,
        Command::Visits(args) => visits::handle(client, args, global).await,
        Command::Stats(args) => stats::handle(client, args, global).await,
        // Handled in main before a client exists
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
