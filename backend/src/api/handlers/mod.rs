use axum::response::Json;
use serde::Deserialize;

use crate::api::models::HealthResponse;
use crate::config::settings::{AppConfig, ServerSettings};
use crate::database::DbPool;
use crate::rating::RatingEngine;

pub mod matches;
pub mod players;
pub mod rankings;
pub mod statistics;
pub mod tournaments;

pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
    pub engine: RatingEngine,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// A resolved page: 1-based page number, page size and row offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
    pub offset: usize,
}

impl PageParams {
    pub fn resolve(&self, settings: &ServerSettings) -> Page {
        let number = self.page.unwrap_or(1).max(1);
        let size = self
            .page_size
            .unwrap_or(settings.default_page_size)
            .clamp(1, settings.max_page_size);
        Page {
            number,
            size,
            offset: (number - 1) * size,
        }
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
