use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use log::warn;
use serde::Deserialize;
use std::sync::Arc;

use super::{AppState, PageParams};
use crate::api::models::{MatchResponse, PaginatedResponse, RecordedMatchResponse};
use crate::database::{self, MatchFilter};
use crate::domain::{MatchUpdate, NewMatch, validate_new_match};
use crate::errors::{ApiError, ApiResult, ServiceError};
use crate::services::recorder::{MatchRecorder, update_match_metadata};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    pub player_id: Option<i64>,
    pub tournament_id: Option<i64>,
}

pub async fn create_match(
    State(state): State<Arc<AppState>>,
    Json(new_match): Json<NewMatch>,
) -> ApiResult<(StatusCode, Json<RecordedMatchResponse>)> {
    let validated = validate_new_match(new_match).inspect_err(|e| warn!("Rejected match: {:#}", e))?;

    let mut conn = state.pool.get()?;
    let recorded = MatchRecorder::new(&state.engine).record_match_outcome(&mut conn, &validated)?;

    let stored = database::matches::find_by_id(&conn, recorded.match_id)?
        .ok_or_else(|| ApiError::Internal(format!("match {} missing after insert", recorded.match_id)))?;

    Ok((
        StatusCode::CREATED,
        Json(RecordedMatchResponse {
            recorded: stored.into(),
            player_rating: (&recorded.rating.first).into(),
            opponent_rating: (&recorded.rating.second).into(),
        }),
    ))
}

pub async fn get_matches(
    State(state): State<Arc<AppState>>,
    Query(paging): Query<PageParams>,
    Query(params): Query<MatchQuery>,
) -> ApiResult<Json<PaginatedResponse<MatchResponse>>> {
    let page = paging.resolve(&state.config.server);
    let conn = state.pool.get()?;

    let filter = MatchFilter {
        player_id: params.player_id,
        tournament_id: params.tournament_id,
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

pub async fn get_match(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
) -> ApiResult<Json<MatchResponse>> {
    let conn = state.pool.get()?;
    let found = database::matches::find_by_id(&conn, match_id)?
        .ok_or(ServiceError::not_found("Match", match_id))?;
    Ok(Json(found.into()))
}

pub async fn update_match(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<i64>,
    Json(update): Json<MatchUpdate>,
) -> ApiResult<Json<MatchResponse>> {
    let conn = state.pool.get()?;
    let updated = update_match_metadata(&conn, match_id, update)?;
    Ok(Json(updated.into()))
}
