use courtside_core::nba::GAMES_PATH;
use courtside_core::{Game, NbaApi, Poller, ResourceId};

use crate::cli::GameArgs;
use crate::error::CliError;
use crate::output::Renderer;

use super::watch::follow;
use super::{timed, CommandResult};

pub async fn run(args: &GameArgs, api: &NbaApi) -> Result<CommandResult, CliError> {
    let id = ResourceId::parse(&args.id)?;
    timed(format!("{GAMES_PATH}/{id}"), api.game(&id)).await
}

/// Follows one game every 5s until it is no longer in progress.
pub async fn watch(args: &GameArgs, api: &NbaApi, renderer: &mut Renderer) -> Result<(), CliError> {
    let id = ResourceId::parse(&args.id)?;
    let endpoint = format!("{GAMES_PATH}/{id}");

    let api = api.clone();
    let fetch = move || {
        let api = api.clone();
        let id = id.clone();
        async move { api.game(&id).await }
    };

    follow(&endpoint, Poller::game_detail(), fetch, Game::is_live, renderer).await
}
