use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use spinmaster_ranking::api::handlers::AppState;
use spinmaster_ranking::api::routes::create_router;
use spinmaster_ranking::config::settings::AppConfig;
use spinmaster_ranking::database;
use spinmaster_ranking::rating::RatingEngine;

struct TestApp {
    router: Router,
    _dir: tempfile::TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.db");

        let mut config = AppConfig::new();
        config.server.database_path = path.to_str().unwrap().to_string();

        let pool = database::create_pool(&config.server.database_path).unwrap();
        let mut conn = database::get_connection(&pool).unwrap();
        database::setup::init_schema(&mut conn).unwrap();
        drop(conn);

        let engine = RatingEngine::new(config.rating.clone()).unwrap();
        let state = Arc::new(AppState { pool, config, engine });

        Self {
            router: create_router(state),
            _dir: dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_player(&self, username: &str) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/players",
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "fullName": format!("{} Player", username),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    async fn record(&self, player_id: i64, opponent_id: i64, scores: &[(i32, i32)]) -> (StatusCode, Value) {
        let games: Vec<Value> = scores
            .iter()
            .map(|&(p, o)| json!({ "playerScore": p, "opponentScore": o }))
            .collect();
        self.send(
            Method::POST,
            "/api/v1/matches",
            Some(json!({
                "matchType": "friendly",
                "playerId": player_id,
                "opponentId": opponent_id,
                "games": games,
            })),
        )
        .await
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_new_player_starts_at_initial_rating() {
    let app = TestApp::new();
    let id = app.create_player("timo_boll").await;

    let (status, body) = app.send(Method::GET, &format!("/api/v1/players/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 1000.0);
    assert_eq!(body["category"], "beginner");
    assert_eq!(body["matchesPlayed"], 0);
    assert_eq!(body["isActive"], true);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = TestApp::new();
    app.create_player("fan_zhendong").await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/players",
            Some(json!({
                "username": "fan_zhendong",
                "email": "other@example.com",
                "fullName": "Someone Else",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_record_match_between_equal_players() {
    let app = TestApp::new();
    let a = app.create_player("alpha").await;
    let b = app.create_player("bravo").await;

    let (status, body) = app.record(a, b, &[(11, 9), (7, 11), (11, 9), (11, 8)]).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["match"]["winnerId"], a);
    assert_eq!(body["match"]["playerGamesWon"], 3);
    assert_eq!(body["match"]["opponentGamesWon"], 1);
    assert_eq!(body["match"]["games"].as_array().unwrap().len(), 4);

    assert_eq!(body["playerRating"]["previous"], 1000.0);
    assert_eq!(body["playerRating"]["new"], 1016.0);
    assert_eq!(body["playerRating"]["change"], 16.0);
    assert_eq!(body["opponentRating"]["new"], 984.0);
    assert_eq!(body["opponentRating"]["change"], -16.0);

    let (_, player) = app.send(Method::GET, &format!("/api/v1/players/{}", b), None).await;
    assert_eq!(player["losses"], 1);
    assert_eq!(player["rating"], 984.0);
}

#[tokio::test]
async fn test_invalid_game_score_is_unprocessable() {
    let app = TestApp::new();
    let a = app.create_player("alpha").await;
    let b = app.create_player("bravo").await;

    let (status, body) = app.record(a, b, &[(11, 10), (11, 5), (11, 5)]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("Game 1"), "{body}");

    let (_, player) = app.send(Method::GET, &format!("/api/v1/players/{}", a), None).await;
    assert_eq!(player["rating"], 1000.0);
    assert_eq!(player["matchesPlayed"], 0);
}

#[tokio::test]
async fn test_inactive_participant_is_rejected() {
    let app = TestApp::new();
    let a = app.create_player("alpha").await;
    let b = app.create_player("bravo").await;

    let (status, _) = app.send(Method::DELETE, &format!("/api/v1/players/{}", b), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.record(a, b, &[(11, 9), (11, 9), (11, 9)]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, history) = app
        .send(Method::GET, &format!("/api/v1/rankings/players/{}/history", a), None)
        .await;
    assert_eq!(history.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_rankings_and_history() {
    let app = TestApp::new();
    let a = app.create_player("alpha").await;
    let b = app.create_player("bravo").await;
    let c = app.create_player("charlie").await;

    app.record(a, b, &[(11, 9), (11, 9), (11, 9)]).await;
    app.record(a, c, &[(11, 9), (11, 9), (11, 9)]).await;

    let (status, rankings) = app.send(Method::GET, "/api/v1/rankings", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = rankings.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["playerId"], a);
    assert_eq!(rows[0]["rank"], 1);
    for pair in rows.windows(2) {
        assert!(pair[0]["rating"].as_f64().unwrap() >= pair[1]["rating"].as_f64().unwrap());
    }

    let (_, filtered) = app.send(Method::GET, "/api/v1/rankings?category=elite", None).await;
    assert_eq!(filtered.as_array().unwrap().len(), 0);

    let (status, _) = app.send(Method::GET, "/api/v1/rankings?category=legend", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, history) = app
        .send(Method::GET, &format!("/api/v1/rankings/players/{}/history", a), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["oldRating"], 1000.0);
    assert_eq!(entries[0]["newRating"], entries[1]["oldRating"]);
    assert_eq!(entries[1]["rank"], 1);

    let (status, ranged) = app
        .send(
            Method::GET,
            &format!("/api/v1/rankings/players/{}/history?start=2000-01-01&end=2999-12-31", a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ranged.as_array().unwrap().len(), 2);

    let (status, before) = app
        .send(
            Method::GET,
            &format!("/api/v1/rankings/players/{}/history?end=2000-01-01", a),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before.as_array().unwrap().len(), 0);

    let (_, played) = app.send(Method::GET, "/api/v1/rankings?minMatches=1", None).await;
    assert_eq!(played[0]["rank"], entries[1]["rank"]);
}

#[tokio::test]
async fn test_unknown_player_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/v1/players/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Player 404 not found");

    let (status, _) = app
        .send(Method::GET, "/api/v1/rankings/players/404/history", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tournament_flow() {
    let app = TestApp::new();
    let ids = [
        app.create_player("alpha").await,
        app.create_player("bravo").await,
        app.create_player("charlie").await,
        app.create_player("delta").await,
    ];

    let (status, tournament) = app
        .send(
            Method::POST,
            "/api/v1/tournaments",
            Some(json!({
                "name": "Club Championship",
                "startDate": "2024-06-01T09:00:00",
                "endDate": "2024-06-02T18:00:00",
                "maxPlayers": 4,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{tournament}");
    let tid = tournament["id"].as_i64().unwrap();
    assert_eq!(tournament["status"], "pending");

    for id in ids {
        let (status, _) = app
            .send(
                Method::POST,
                &format!("/api/v1/tournaments/{}/players", tid),
                Some(json!({ "playerId": id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/tournaments/{}", tid),
            Some(json!({ "status": "in_progress" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/matches",
            Some(json!({
                "matchType": "tournament",
                "playerId": ids[2],
                "opponentId": ids[3],
                "tournamentId": tid,
                "games": [
                    { "playerScore": 11, "opponentScore": 4 },
                    { "playerScore": 11, "opponentScore": 6 },
                    { "playerScore": 12, "opponentScore": 10 },
                ],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (_, standings) = app
        .send(Method::GET, &format!("/api/v1/tournaments/{}/standings", tid), None)
        .await;
    let rows = standings.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["playerId"], ids[2]);
    assert_eq!(rows[0]["wins"], 1);
    assert_eq!(rows[1]["losses"], 1);
}

#[tokio::test]
async fn test_head_to_head_and_global_statistics() {
    let app = TestApp::new();
    let a = app.create_player("alpha").await;
    let b = app.create_player("bravo").await;
    app.record(a, b, &[(11, 9), (11, 9), (11, 9)]).await;

    let (status, h2h) = app
        .send(Method::GET, &format!("/api/v1/compare/{}/{}", a, b), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h2h["stats"]["totalMatches"], 1);
    assert_eq!(h2h["stats"]["player1MatchWins"], 1);
    assert_eq!(h2h["stats"]["player1GameWins"], 3);
    assert!(h2h["expectedScorePlayer1"].as_f64().unwrap() > 0.5);

    let (status, global) = app.send(Method::GET, "/api/v1/statistics/global", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(global["totalPlayers"], 2);
    assert_eq!(global["totalMatches"], 1);
    assert_eq!(global["averageRating"], 1000.0);
}
