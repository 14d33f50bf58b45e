//! Typed routes for the NBA backend.
//!
//! | Route | Method |
//! |-------|--------|
//! | `/api/games?date=YYYY-MM-DD` | [`NbaApi::scoreboard`] |
//! | `/api/games/{id}` | [`NbaApi::game`] |
//! | `/api/teams` | [`NbaApi::teams`] |
//! | `/api/teams/{id}` | [`NbaApi::team`] |
//! | `/api/players?search=` | [`NbaApi::players`] |
//! | `/api/players/{id}` | [`NbaApi::player`] |
//! | `/api/news?limit=` | [`NbaApi::news`] |

use crate::client::{ApiClient, ApiResponse, Query};
use crate::domain::{Game, GameDate, NewsArticle, Player, ResourceId, Scoreboard, Team};
use crate::error::ApiError;

pub const GAMES_PATH: &str = "/api/games";
pub const TEAMS_PATH: &str = "/api/teams";
pub const PLAYERS_PATH: &str = "/api/players";
pub const NEWS_PATH: &str = "/api/news";

#[derive(Clone)]
pub struct NbaApi {
    client: ApiClient,
}

impl NbaApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Games for `date`, or today's slate as the backend defines it.
    pub async fn scoreboard(
        &self,
        date: Option<&GameDate>,
    ) -> Result<ApiResponse<Scoreboard>, ApiError> {
        let query = Query::new().param_opt("date", date);
        self.client.get(GAMES_PATH, &query).await
    }

    pub async fn game(&self, id: &ResourceId) -> Result<ApiResponse<Game>, ApiError> {
        self.client
            .get(&item_path(GAMES_PATH, id), &Query::new())
            .await
    }

    pub async fn teams(&self) -> Result<ApiResponse<Vec<Team>>, ApiError> {
        self.client.get(TEAMS_PATH, &Query::new()).await
    }

    pub async fn team(&self, id: &ResourceId) -> Result<ApiResponse<Team>, ApiError> {
        self.client
            .get(&item_path(TEAMS_PATH, id), &Query::new())
            .await
    }

    /// Player list, optionally filtered by a free-text search. Blank searches are dropped.
    pub async fn players(
        &self,
        search: Option<&str>,
    ) -> Result<ApiResponse<Vec<Player>>, ApiError> {
        let search = search.map(str::trim).filter(|term| !term.is_empty());
        let query = Query::new().param_opt("search", search);
        self.client.get(PLAYERS_PATH, &query).await
    }

    pub async fn player(&self, id: &ResourceId) -> Result<ApiResponse<Player>, ApiError> {
        self.client
            .get(&item_path(PLAYERS_PATH, id), &Query::new())
            .await
    }

    pub async fn news(
        &self,
        limit: Option<u32>,
    ) -> Result<ApiResponse<Vec<NewsArticle>>, ApiError> {
        let query = Query::new().param_opt("limit", limit);
        self.client.get(NEWS_PATH, &query).await
    }
}

fn item_path(collection: &str, id: &ResourceId) -> String {
    format!("{collection}/{}", id.as_str())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ApiConfig;
    use crate::http_client::{HttpResponse, ScriptedHttpClient};

    fn api(http: &Arc<ScriptedHttpClient>) -> NbaApi {
        let config = ApiConfig::new("http://nba.test").expect("valid base url");
        NbaApi::new(ApiClient::with_http_client(config, http.clone()))
    }

    #[tokio::test]
    async fn scoreboard_sends_date_and_decodes_games() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_response(HttpResponse::ok_json(
            r#"{"success":true,"data":{"gameDate":"2024-01-15","games":[
                {"gameId":"0022300561","gameStatus":2,
                 "homeTeam":{"teamTricode":"BOS","score":61},
                 "awayTeam":{"teamTricode":"HOU","score":55}}]}}"#,
        ));
        let date = GameDate::parse("2024-01-15").expect("valid date");

        let response = api(&http)
            .scoreboard(Some(&date))
            .await
            .expect("scoreboard should decode");

        assert!(response.data.has_live_games());
        assert_eq!(response.data.games[0].home_team.team_tricode, "BOS");
        assert_eq!(
            http.requests()[0].url,
            "http://nba.test/api/games?date=2024-01-15"
        );
    }

    #[tokio::test]
    async fn players_search_is_encoded_and_blank_search_dropped() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_response(HttpResponse::ok_json(r#"{"success":true,"data":[]}"#));
        http.push_response(HttpResponse::ok_json("[]"));
        let api = api(&http);

        api.players(Some("de'aaron fox")).await.expect("empty list");
        api.players(Some("   ")).await.expect("empty list");

        let urls = http
            .requests()
            .into_iter()
            .map(|request| request.url)
            .collect::<Vec<_>>();
        assert_eq!(
            urls,
            vec![
                "http://nba.test/api/players?search=de%27aaron%20fox",
                "http://nba.test/api/players",
            ]
        );
    }

    #[tokio::test]
    async fn item_routes_use_validated_ids() {
        let http = Arc::new(ScriptedHttpClient::new());
        http.push_response(HttpResponse::ok_json(
            r#"{"teamId":1610612738,"name":"Celtics","city":"Boston"}"#,
        ));
        let id = ResourceId::parse("1610612738").expect("valid id");

        let team = api(&http).team(&id).await.expect("team decodes").into_data();

        assert_eq!(team.team_id, "1610612738");
        assert_eq!(team.city.as_deref(), Some("Boston"));
        assert_eq!(http.requests()[0].url, "http://nba.test/api/teams/1610612738");
    }
}
