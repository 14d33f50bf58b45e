//! # Courtside Core
//!
//! API layer for the Courtside NBA data client.
//!
//! ## Overview
//!
//! This crate provides everything between a view and the backend:
//!
//! - **Response envelope** parsing for `{success, data}` / `{success, error}` bodies
//! - **Request executor** that turns every failure into one typed [`ApiError`]
//! - **Rate-limit metadata** from `X-RateLimit-*` headers
//! - **Convenience verbs** (`get`, `post`, `put`, `delete`)
//! - **Polling controller** for live scoreboards and game detail
//! - **Typed NBA routes** for games, teams, players and news
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Request executor and verbs |
//! | [`config`] | Base URL and timeout configuration |
//! | [`domain`] | Domain models (Game, Team, Player, NewsArticle) |
//! | [`envelope`] | Response envelope parser |
//! | [`error`] | Error types and codes |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`nba`] | Typed backend routes |
//! | [`polling`] | Interval polling with change detection |
//! | [`rate_limit`] | Rate-limit header parsing |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courtside_core::{ApiClient, ApiConfig, NbaApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = NbaApi::new(ApiClient::new(ApiConfig::from_env()?));
//!
//!     let scoreboard = api.scoreboard(None).await?.into_data();
//!     for game in &scoreboard.games {
//!         println!(
//!             "{} {} - {} {}",
//!             game.away_team.team_tricode,
//!             game.away_team.score,
//!             game.home_team.score,
//!             game.home_team.team_tricode
//!         );
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │  View / CLI     │────▶│ Polling Session  │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  NbaApi routes  │────▶│ ApiClient        │
//! └─────────────────┘     │ (executor/verbs) │
//!                         └────────┬─────────┘
//!                                  │
//!                    ┌─────────────┼─────────────┐
//!                    ▼             ▼             ▼
//!             ┌────────────┐ ┌──────────┐ ┌─────────────┐
//!             │ HttpClient │ │ Envelope │ │ Rate limit  │
//!             │ (reqwest)  │ │ parser   │ │ headers     │
//!             └────────────┘ └──────────┘ └─────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every request resolves to `Result<ApiResponse<T>, ApiError>`:
//!
//! ```rust
//! use courtside_core::{ApiError, ApiErrorKind};
//!
//! fn handle_error(error: &ApiError) {
//!     match error.kind() {
//!         ApiErrorKind::RateLimitExceeded => {
//!             // Wait `error.retry_after()` seconds
//!         }
//!         ApiErrorKind::Network => {
//!             // Backend unreachable
//!         }
//!         ApiErrorKind::Application => {
//!             // Backend-specific code such as GAME_NOT_FOUND
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod client;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod nba;
pub mod polling;
pub mod rate_limit;

// Re-export commonly used types at crate root for convenience

// Executor and verbs
pub use client::{normalize_response, ApiClient, ApiResponse, Query, RequestOptions};

// Configuration
pub use config::ApiConfig;

// Domain models
pub use domain::{
    any_live, Game, GameDate, GameStatus, NewsArticle, Player, ResourceId, Scoreboard, Team,
    TeamLine,
};

// Envelope
pub use envelope::{parse_envelope, Envelope};

// Error types
pub use error::{ApiError, ApiErrorKind, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient,
};

// Typed routes
pub use nba::NbaApi;

// Polling
pub use polling::{
    lock_session, FetchTicket, PollOutcome, PollPhase, PollTimer, Poller, PollingSession,
    SharedSession, ViewState, GAME_DETAIL_INTERVAL, LIVE_GAMES_INTERVAL,
};

// Rate limiting
pub use rate_limit::RateLimitInfo;
