mod game;
mod news;
mod players;
mod request;
mod scoreboard;
mod teams;
mod watch;

use std::future::Future;
use std::time::Instant;

use courtside_core::rate_limit::now_millis;
use courtside_core::{ApiClient, ApiConfig, ApiError, ApiResponse, NbaApi, RateLimitInfo};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::{rate_limit_warning, ReportMeta};
use crate::output::{Renderer, Report};

pub struct CommandResult {
    pub endpoint: String,
    pub data: Value,
    pub status: Option<u16>,
    pub rate_limit: Option<RateLimitInfo>,
    pub warnings: Vec<String>,
    pub errors: Vec<ApiError>,
    pub latency_ms: u64,
}

impl CommandResult {
    /// Folds one request outcome into a result; API failures become report errors.
    pub fn from_outcome<T: Serialize>(
        endpoint: impl Into<String>,
        outcome: Result<ApiResponse<T>, ApiError>,
        latency_ms: u64,
    ) -> Result<Self, CliError> {
        let endpoint = endpoint.into();
        match outcome {
            Ok(response) => Ok(Self {
                endpoint,
                data: serde_json::to_value(&response.data)?,
                status: Some(response.status),
                rate_limit: response.rate_limit,
                warnings: Vec::new(),
                errors: Vec::new(),
                latency_ms,
            }),
            Err(error) => Ok(Self {
                endpoint,
                data: Value::Null,
                status: error.status_code(),
                rate_limit: error.rate_limit().copied(),
                warnings: Vec::new(),
                errors: vec![error],
                latency_ms,
            }),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn into_report(self) -> Result<Report, CliError> {
        let CommandResult {
            endpoint,
            data,
            status,
            rate_limit,
            warnings,
            errors,
            latency_ms,
        } = self;

        let mut meta = ReportMeta::new(endpoint, latency_ms)?
            .with_status(status)
            .with_rate_limit(rate_limit);
        if let Some(warning) = rate_limit
            .as_ref()
            .and_then(|rate_limit| rate_limit_warning(rate_limit, now_millis()))
        {
            meta.push_warning(warning);
        }
        for warning in warnings {
            meta.push_warning(warning);
        }

        Ok(Report { meta, data, errors })
    }
}

/// Awaits `call` and records its latency.
pub async fn timed<T, Fut>(endpoint: impl Into<String>, call: Fut) -> Result<CommandResult, CliError>
where
    T: Serialize,
    Fut: Future<Output = Result<ApiResponse<T>, ApiError>>,
{
    let started = Instant::now();
    let outcome = call.await;
    CommandResult::from_outcome(endpoint, outcome, elapsed_ms(started))
}

pub fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Environment configuration with command-line overrides applied.
pub fn resolve_config(cli: &Cli) -> Result<ApiConfig, CliError> {
    let mut config = ApiConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.as_str())?;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms)?;
    }
    Ok(config)
}

pub async fn run(cli: &Cli, renderer: &mut Renderer) -> Result<(), CliError> {
    let api = NbaApi::new(ApiClient::new(resolve_config(cli)?));

    let result = match &cli.command {
        Command::Scoreboard(args) if args.watch => {
            return scoreboard::watch(args, &api, renderer).await;
        }
        Command::Game(args) if args.watch => return game::watch(args, &api, renderer).await,
        Command::Scoreboard(args) => scoreboard::run(args, &api).await?,
        Command::Game(args) => game::run(args, &api).await?,
        Command::Teams => teams::list(&api).await?,
        Command::Team(args) => teams::show(args, &api).await?,
        Command::Players(args) => players::list(args, &api).await?,
        Command::Player(args) => players::show(args, &api).await?,
        Command::News(args) => news::run(args, &api).await?,
        Command::Request(args) => request::run(args, api.client()).await?,
    };

    renderer.emit(&result.into_report()?)
}
