use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};


/// Game lifecycle using the league's numeric convention.
///
/// Codes outside 1..=3 (postponed, suspended, ...) decode as `Unknown` so one
/// odd game cannot fail a whole scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
    Unknown(u8),
}

impl GameStatus {
    pub const fn is_live(self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl From<u8> for GameStatus {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Scheduled,
            2 => Self::InProgress,
            3 => Self::Final,
            other => Self::Unknown(other),
        }
    }
}

impl From<GameStatus> for u8 {
    fn from(value: GameStatus) -> Self {
        match value {
            GameStatus::Scheduled => 1,
            GameStatus::InProgress => 2,
            GameStatus::Final => 3,
            GameStatus::Unknown(other) => other,
        }
    }
}

/// One side of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLine {
    #[serde(default, deserialize_with = "optional_id")]
    pub team_id: Option<String>,
    #[serde(default)]
    pub team_tricode: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub score: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Scoreboard entry or game detail. Box-score sections stay in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(deserialize_with = "required_id")]
    pub game_id: String,
    pub game_status: GameStatus,
    #[serde(default)]
    pub game_status_text: String,
    #[serde(default)]
    pub period: u8,
    #[serde(default)]
    pub game_clock: String,
    pub home_team: TeamLine,
    pub away_team: TeamLine,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Game {
    pub const fn is_live(&self) -> bool {
        self.game_status.is_live()
    }
}

/// Games for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_date: Option<String>,
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Scoreboard {
    pub fn has_live_games(&self) -> bool {
        any_live(&self.games)
    }
}

/// Polling predicate for game lists: keep refreshing while anything is in progress.
pub fn any_live(games: &[Game]) -> bool {
    games.iter().any(Game::is_live)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(deserialize_with = "required_id")]
    pub team_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(deserialize_with = "required_id")]
    pub player_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jersey: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Player {
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            _ => self.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// The backend is inconsistent about numeric vs string ids; normalize to strings.
fn id_from_value<E: DeError>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(id) => Ok(Some(id)),
        Value::Number(id) => Ok(Some(id.to_string())),
        other => Err(E::custom(format!(
            "expected string or number id, found {other}"
        ))),
    }
}

fn required_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    id_from_value(Value::deserialize(deserializer)?)?
        .ok_or_else(|| D::Error::custom("id must not be null"))
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    id_from_value(Value::deserialize(deserializer)?)
}
