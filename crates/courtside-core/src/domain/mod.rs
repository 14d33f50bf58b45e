//! # Domain Models
//!
//! Typed views of the NBA payloads the backend serves.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Game`] | Scoreboard entry or game detail |
//! | [`GameStatus`] | Scheduled, in progress, final or an unrecognised code |
//! | [`TeamLine`] | One side of a game with its score |
//! | [`Scoreboard`] | Games for a single date |
//! | [`Team`] | Team metadata |
//! | [`Player`] | Player metadata |
//! | [`NewsArticle`] | Headline from the news feed |
//! | [`ResourceId`] | Validated path identifier |
//! | [`GameDate`] | Calendar date in `YYYY-MM-DD` form |
//!
//! Fields the backend sends that are not modeled explicitly are kept in each
//! type's `extra` map, so re-serializing a model does not lose data.
//!
//! ## Validation
//!
//! Identifiers and dates are checked before they reach a URL:
//!
//! ```rust
//! use courtside_core::{GameDate, ResourceId, ValidationError};
//!
//! assert!(ResourceId::parse("0022300061").is_ok());
//! assert!(matches!(
//!     ResourceId::parse("../admin"),
//!     Err(ValidationError::ResourceIdInvalidChar { .. })
//! ));
//! assert_eq!(GameDate::parse("2024-01-15").unwrap().to_string(), "2024-01-15");
//! ```

mod game_date;
mod models;
mod resource_id;

pub use game_date::GameDate;
pub use models::{
    any_live, Game, GameStatus, NewsArticle, Player, Scoreboard, Team, TeamLine,
};
pub use resource_id::ResourceId;
