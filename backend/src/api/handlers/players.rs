use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use log::info;
use serde::Deserialize;
use std::sync::Arc;

use super::{AppState, PageParams};
use crate::api::models::{MatchResponse, PaginatedResponse, PlayerResponse, PlayerStatsResponse};
use crate::database::{self, MatchFilter, Player, PlayerFilter};
use crate::domain::validation::{validate_new_player, validate_player_update};
use crate::domain::{NewPlayer, PlayerUpdate};
use crate::errors::{ApiResult, ServiceError};
use crate::services::statistics;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerQuery {
    pub search: Option<String>,
    pub active_only: Option<bool>,
}

fn load_player(conn: &rusqlite::Connection, player_id: i64) -> ApiResult<Player> {
    let player = database::players::find_by_id(conn, player_id)?
        .ok_or(ServiceError::not_found("Player", player_id))?;
    Ok(player)
}

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(new_player): Json<NewPlayer>,
) -> ApiResult<(StatusCode, Json<PlayerResponse>)> {
    validate_new_player(&new_player)?;

    let conn = state.pool.get()?;
    let player = database::players::insert_player(
        &conn,
        &new_player,
        state.engine.initial_rating(),
        Utc::now().naive_utc(),
    )?;
    info!("Registered player {} ({})", player.id, player.username);

    Ok((StatusCode::CREATED, Json(PlayerResponse::new(player, &state.engine))))
}

pub async fn get_players(
    State(state): State<Arc<AppState>>,
    Query(paging): Query<PageParams>,
    Query(params): Query<PlayerQuery>,
) -> ApiResult<Json<PaginatedResponse<PlayerResponse>>> {
    let page = paging.resolve(&state.config.server);
    let conn = state.pool.get()?;

    let filter = PlayerFilter {
        search: params.search.filter(|s| !s.trim().is_empty()),
        active_only: params.active_only.unwrap_or(false),
        limit: page.size,
        offset: page.offset,
    };
    let (players, total) = database::players::list_players(&conn, &filter)?;

    Ok(Json(PaginatedResponse {
        items: players
            .into_iter()
            .map(|p| PlayerResponse::new(p, &state.engine))
            .collect(),
        total,
        page: page.number,
        page_size: page.size,
    }))
}

pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
) -> ApiResult<Json<PlayerResponse>> {
    let conn = state.pool.get()?;
    let player = load_player(&conn, player_id)?;
    Ok(Json(PlayerResponse::new(player, &state.engine)))
}

pub async fn update_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
    Json(update): Json<PlayerUpdate>,
) -> ApiResult<Json<PlayerResponse>> {
    validate_player_update(&update)?;

    let conn = state.pool.get()?;
    let mut player = load_player(&conn, player_id)?;
    if update.is_empty() {
        return Ok(Json(PlayerResponse::new(player, &state.engine)));
    }

    player.apply_update(update);
    let player = database::players::save_profile(&conn, &player, Utc::now().naive_utc())?;
    Ok(Json(PlayerResponse::new(player, &state.engine)))
}

/// Soft delete: the player is deactivated and drops out of the rankings.
pub async fn deactivate_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let conn = state.pool.get()?;
    let mut player = load_player(&conn, player_id)?;

    player.set_active(false);
    database::players::save_profile(&conn, &player, Utc::now().naive_utc())?;
    info!("Deactivated player {}", player_id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_player_stats(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
) -> ApiResult<Json<PlayerStatsResponse>> {
    let conn = state.pool.get()?;
    let stats = statistics::player_statistics(&conn, &state.engine, player_id)?;
    Ok(Json(stats.into()))
}

pub async fn get_player_matches(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
    Query(paging): Query<PageParams>,
) -> ApiResult<Json<PaginatedResponse<MatchResponse>>> {
    let page = paging.resolve(&state.config.server);
    let conn = state.pool.get()?;
    load_player(&conn, player_id)?;

    let filter = MatchFilter {
        player_id: Some(player_id),
        tournament_id: None,
        limit: page.size,
        offset: page.offset,
    };
    let (matches, total) = database::matches::list_matches(&conn, &filter)?;

    Ok(Json(PaginatedResponse {
        items: matches.into_iter().map(MatchResponse::from).collect(),
        total,
        page: page.number,
        page_size: page.size,
    }))
}
