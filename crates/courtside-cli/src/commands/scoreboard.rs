use courtside_core::nba::GAMES_PATH;
use courtside_core::{GameDate, NbaApi, Poller, Query, Scoreboard};

use crate::cli::ScoreboardArgs;
use crate::error::CliError;
use crate::output::Renderer;

use super::watch::follow;
use super::{timed, CommandResult};

fn parse_date(args: &ScoreboardArgs) -> Result<Option<GameDate>, CliError> {
    Ok(args.date.as_deref().map(GameDate::parse).transpose()?)
}

fn endpoint(date: Option<&GameDate>) -> String {
    Query::new().param_opt("date", date).apply(GAMES_PATH)
}

pub async fn run(args: &ScoreboardArgs, api: &NbaApi) -> Result<CommandResult, CliError> {
    let date = parse_date(args)?;
    timed(endpoint(date.as_ref()), api.scoreboard(date.as_ref())).await
}

/// Follows the slate every 2s while any game is in progress.
pub async fn watch(
    args: &ScoreboardArgs,
    api: &NbaApi,
    renderer: &mut Renderer,
) -> Result<(), CliError> {
    let date = parse_date(args)?;
    let endpoint = endpoint(date.as_ref());

    let api = api.clone();
    let fetch = move || {
        let api = api.clone();
        async move { api.scoreboard(date.as_ref()).await }
    };

    follow(
        &endpoint,
        Poller::live_games(),
        fetch,
        Scoreboard::has_live_games,
        renderer,
    )
    .await
}
