use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{
    health,
    matches::{create_match, get_match, get_matches, update_match},
    players::{
        create_player, deactivate_player, get_player, get_player_matches, get_player_stats,
        get_players, update_player,
    },
    rankings::{get_rankings, get_rating_history},
    statistics::{get_global_statistics, get_head_to_head_comparison},
    tournaments::{
        create_tournament, get_standings, get_tournament, get_tournaments, register_player,
        update_tournament,
    },
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/players", post(create_player).get(get_players))
        .route(
            "/players/:id",
            get(get_player).patch(update_player).delete(deactivate_player),
        )
        .route("/players/:id/stats", get(get_player_stats))
        .route("/players/:id/matches", get(get_player_matches))
        .route("/matches", post(create_match).get(get_matches))
        .route("/matches/:id", get(get_match).patch(update_match))
        .route("/rankings", get(get_rankings))
        .route("/rankings/players/:id/history", get(get_rating_history))
        .route("/tournaments", post(create_tournament).get(get_tournaments))
        .route("/tournaments/:id", get(get_tournament).patch(update_tournament))
        .route("/tournaments/:id/players", post(register_player))
        .route("/tournaments/:id/standings", get(get_standings))
        .route("/statistics/global", get(get_global_statistics))
        .route("/compare/:player1_id/:player2_id", get(get_head_to_head_comparison));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .with_state(state)
}
