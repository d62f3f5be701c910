use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{AppState, PageParams};
use crate::api::models::{PaginatedResponse, StandingResponse, TournamentResponse};
use crate::database::{self, TournamentFilter};
use crate::domain::{NewTournament, TournamentStatus, TournamentUpdate};
use crate::errors::ApiResult;
use crate::services::tournaments;

#[derive(Debug, Default, Deserialize)]
pub struct TournamentQuery {
    pub status: Option<TournamentStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub player_id: i64,
}

pub async fn create_tournament(
    State(state): State<Arc<AppState>>,
    Json(new_tournament): Json<NewTournament>,
) -> ApiResult<(StatusCode, Json<TournamentResponse>)> {
    let conn = state.pool.get()?;
    let tournament = tournaments::create_tournament(&conn, &new_tournament)?;
    Ok((StatusCode::CREATED, Json(tournament.into())))
}

pub async fn get_tournaments(
    State(state): State<Arc<AppState>>,
    Query(paging): Query<PageParams>,
    Query(params): Query<TournamentQuery>,
) -> ApiResult<Json<PaginatedResponse<TournamentResponse>>> {
    let page = paging.resolve(&state.config.server);
    let conn = state.pool.get()?;

    let filter = TournamentFilter {
        status: params.status,
        limit: page.size,
        offset: page.offset,
    };
    let (items, total) = database::tournaments::list_tournaments(&conn, &filter)?;

    Ok(Json(PaginatedResponse {
        items: items.into_iter().map(TournamentResponse::from).collect(),
        total,
        page: page.number,
        page_size: page.size,
    }))
}

pub async fn get_tournament(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<i64>,
) -> ApiResult<Json<TournamentResponse>> {
    let conn = state.pool.get()?;
    let tournament = tournaments::get_tournament(&conn, tournament_id)?;
    Ok(Json(tournament.into()))
}

pub async fn update_tournament(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<i64>,
    Json(update): Json<TournamentUpdate>,
) -> ApiResult<Json<TournamentResponse>> {
    let conn = state.pool.get()?;
    let tournament = tournaments::update_tournament(&conn, tournament_id, update)?;
    Ok(Json(tournament.into()))
}

pub async fn register_player(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<i64>,
    Json(registration): Json<Registration>,
) -> ApiResult<(StatusCode, Json<TournamentResponse>)> {
    let mut conn = state.pool.get()?;
    let tournament = tournaments::register_player(&mut conn, tournament_id, registration.player_id)?;
    Ok((StatusCode::CREATED, Json(tournament.into())))
}

pub async fn get_standings(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<i64>,
) -> ApiResult<Json<Vec<StandingResponse>>> {
    let conn = state.pool.get()?;
    let rows = tournaments::standings(&conn, tournament_id)?;
    Ok(Json(StandingResponse::ranked(rows)))
}
