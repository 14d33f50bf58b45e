use courtside_core::nba::NEWS_PATH;
use courtside_core::{NbaApi, Query};

use crate::cli::NewsArgs;
use crate::error::CliError;

use super::{timed, CommandResult};

pub async fn run(args: &NewsArgs, api: &NbaApi) -> Result<CommandResult, CliError> {
    if args.limit == Some(0) {
        return Err(CliError::Command(String::from("--limit must be greater than zero")));
    }

    let endpoint = Query::new().param_opt("limit", args.limit).apply(NEWS_PATH);
    timed(endpoint, api.news(args.limit)).await
}
