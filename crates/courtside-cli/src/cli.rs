//! CLI argument definitions for Courtside.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scoreboard` | Games for a date, optionally followed live |
//! | `game` | One game's detail, optionally followed live |
//! | `teams` / `team` | Team list or a single team |
//! | `players` / `player` | Player search or a single player |
//! | `news` | Latest headlines |
//! | `request` | Raw call against any backend endpoint |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--base-url` | `$COURTSIDE_API_BASE_URL` or `http://localhost:3001` | Backend base URL |
//! | `--timeout-ms` | `$COURTSIDE_TIMEOUT_MS` or `10000` | Request timeout in ms |
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings and errors as failures |
//!
//! # Examples
//!
//! ```bash
//! # Tonight's games, refreshed every 2s while any game is live
//! courtside scoreboard --watch --format table
//!
//! # A single game, refreshed every 5s until it is final
//! courtside game 0022300561 --watch
//!
//! # Raw POST with a JSON body
//! courtside request post /api/favorites --body '{"teamId":"1610612738"}'
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use courtside_core::HttpMethod;

/// Courtside - NBA scores, teams, players and news from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "courtside",
    author,
    version,
    about = "NBA data client for the Courtside backend",
    long_about = "Courtside fetches NBA games, teams, players and news from the Courtside \
backend API. Every command prints a report with request metadata, the payload and any \
API errors.\n\
\n\
Use 'courtside <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Backend base URL. Overrides COURTSIDE_API_BASE_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds. Overrides COURTSIDE_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Output format for results.
    ///
    /// - json: Single JSON object per report (default)
    /// - ndjson: One JSON object per row
    /// - table: ASCII table format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format for terminal display.
    Table,
    /// Single JSON object output.
    Json,
    /// Newline-delimited JSON (one object per row).
    Ndjson,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Games for a date (defaults to the backend's current slate).
    ///
    /// # Examples
    ///
    ///   courtside scoreboard
    ///   courtside scoreboard --date 2024-01-15 --format table
    ///   courtside scoreboard --watch
    Scoreboard(ScoreboardArgs),

    /// Detail for a single game.
    ///
    /// # Examples
    ///
    ///   courtside game 0022300561
    ///   courtside game 0022300561 --watch --pretty
    Game(GameArgs),

    /// List all teams.
    Teams,

    /// Detail for a single team.
    Team(IdArgs),

    /// List players, optionally filtered by a search term.
    ///
    /// # Examples
    ///
    ///   courtside players --search curry
    Players(PlayersArgs),

    /// Detail for a single player.
    Player(IdArgs),

    /// Latest news headlines.
    News(NewsArgs),

    /// Raw request against any endpoint, printing the unwrapped payload.
    ///
    /// # Examples
    ///
    ///   courtside request get /api/games --query date=2024-01-15
    ///   courtside request put /api/settings --body '{"theme":"dark"}'
    ///   courtside request delete /api/favorites/1610612738
    Request(RequestArgs),
}

/// Arguments for the `scoreboard` command.
#[derive(Debug, Args)]
pub struct ScoreboardArgs {
    /// Date in YYYY-MM-DD form.
    #[arg(long)]
    pub date: Option<String>,

    /// Refresh every 2 seconds while any game is in progress.
    #[arg(long, default_value_t = false)]
    pub watch: bool,
}

/// Arguments for the `game` command.
#[derive(Debug, Args)]
pub struct GameArgs {
    /// Game identifier (e.g., 0022300561).
    pub id: String,

    /// Refresh every 5 seconds while the game is in progress.
    #[arg(long, default_value_t = false)]
    pub watch: bool,
}

/// Single-identifier arguments for `team` and `player`.
#[derive(Debug, Args)]
pub struct IdArgs {
    /// Resource identifier.
    pub id: String,
}

/// Arguments for the `players` command.
#[derive(Debug, Args)]
pub struct PlayersArgs {
    /// Free-text search on player names.
    #[arg(long)]
    pub search: Option<String>,
}

/// Arguments for the `news` command.
#[derive(Debug, Args)]
pub struct NewsArgs {
    /// Maximum number of articles to return.
    #[arg(long)]
    pub limit: Option<u32>,
}

/// Arguments for the `request` command.
#[derive(Debug, Args)]
pub struct RequestArgs {
    /// HTTP method.
    #[arg(value_enum)]
    pub method: MethodArg,

    /// Endpoint path (e.g., /api/games) or absolute URL.
    pub endpoint: String,

    /// Query parameter as key=value; repeatable. GET only.
    #[arg(long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,

    /// JSON request body for POST and PUT (defaults to {}).
    #[arg(long)]
    pub body: Option<String>,
}

/// HTTP method selector for `request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    Get,
    Post,
    Put,
    Delete,
}

impl From<MethodArg> for HttpMethod {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::Get => Self::Get,
            MethodArg::Post => Self::Post,
            MethodArg::Put => Self::Put,
            MethodArg::Delete => Self::Delete,
        }
    }
}
