use courtside_core::nba::TEAMS_PATH;
use courtside_core::{NbaApi, ResourceId};

use crate::cli::IdArgs;
use crate::error::CliError;

use super::{timed, CommandResult};

pub async fn list(api: &NbaApi) -> Result<CommandResult, CliError> {
    timed(TEAMS_PATH, api.teams()).await
}

pub async fn show(args: &IdArgs, api: &NbaApi) -> Result<CommandResult, CliError> {
    let id = ResourceId::parse(&args.id)?;
    timed(format!("{TEAMS_PATH}/{id}"), api.team(&id)).await
}
