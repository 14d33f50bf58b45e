use courtside_core::nba::PLAYERS_PATH;
use courtside_core::{NbaApi, Query, ResourceId};

use crate::cli::{IdArgs, PlayersArgs};
use crate::error::CliError;

use super::{timed, CommandResult};

pub async fn list(args: &PlayersArgs, api: &NbaApi) -> Result<CommandResult, CliError> {
    let search = args.search.as_deref();
    let endpoint = Query::new()
        .param_opt("search", search.map(str::trim).filter(|term| !term.is_empty()))
        .apply(PLAYERS_PATH);
    timed(endpoint, api.players(search)).await
}

pub async fn show(args: &IdArgs, api: &NbaApi) -> Result<CommandResult, CliError> {
    let id = ResourceId::parse(&args.id)?;
    timed(format!("{PLAYERS_PATH}/{id}"), api.player(&id)).await
}
