use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Failures raised by the rating engine.
///
/// All of them are raised before any rating or history row is written.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("Invalid participant {player_id}: {reason}")]
    InvalidParticipant { player_id: i64, reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Match is not decisive: {reason}")]
    MatchNotDecisive { reason: String },
}

impl RatingError {
    pub fn configuration(message: impl Into<String>) -> Self {
        RatingError::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn missing_player(player_id: i64) -> Self {
        RatingError::InvalidParticipant {
            player_id,
            reason: "player does not exist".to_string(),
        }
    }

    pub fn inactive_player(player_id: i64) -> Self {
        RatingError::InvalidParticipant {
            player_id,
            reason: "player is not active".to_string(),
        }
    }
}

/// Malformed request data, rejected before it reaches the rating engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Game {game}: {reason}")]
    InvalidGameScore { game: usize, reason: String },

    #[error("Match must have between {min} and {max} games, got {count}")]
    InvalidGameCount { count: usize, min: usize, max: usize },

    #[error("Player and opponent must be different")]
    SamePlayers,

    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn field(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Lookup and state failures of the service layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{reason}")]
    Conflict { reason: String },
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        ServiceError::NotFound { entity, id }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        ServiceError::Conflict {
            reason: reason.into(),
        }
    }
}

/// Error returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Unprocessable(err.to_string())
    }
}

impl From<RatingError> for ApiError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::InvalidParticipant { .. } => ApiError::BadRequest(err.to_string()),
            RatingError::MatchNotDecisive { .. } => ApiError::Unprocessable(err.to_string()),
            RatingError::ConfigurationError { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ServiceError::Conflict { .. } => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> Self {
        log::error!("Failed to get database connection: {}", err);
        ApiError::Internal("DB Connection Error".to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(rating) = err.downcast_ref::<RatingError>() {
            return rating.clone().into();
        }
        if let Some(validation) = err.downcast_ref::<ValidationError>() {
            return validation.clone().into();
        }
        if let Some(service) = err.downcast_ref::<ServiceError>() {
            return service.clone().into();
        }
        if let Some(conflict) = unique_violation(&err) {
            return ApiError::Conflict(conflict);
        }
        log::error!("Request failed: {:?}", err);
        ApiError::Internal(err.to_string())
    }
}

fn unique_violation(err: &anyhow::Error) -> Option<String> {
    let sqlite = err.chain().find_map(|e| e.downcast_ref::<rusqlite::Error>())?;
    match sqlite {
        rusqlite::Error::SqliteFailure(code, message)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Some(message.clone().unwrap_or_else(|| "Duplicate entry".to_string()))
        }
        _ => None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_errors_map_to_status_codes() {
        let invalid: ApiError = RatingError::inactive_player(3).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let not_decisive: ApiError = RatingError::MatchNotDecisive {
            reason: "no side won 3 games".to_string(),
        }
        .into();
        assert_eq!(not_decisive.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let config: ApiError = RatingError::configuration("k_factor must be positive").into();
        assert_eq!(config.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_typed_errors_survive_anyhow_wrapping() {
        let err = anyhow::Error::new(RatingError::missing_player(42)).context("Failed to record match");
        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::BadRequest(_)));

        let err = anyhow::Error::new(ValidationError::SamePlayers);
        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::Unprocessable(_)));

        let err = anyhow::Error::new(ServiceError::not_found("Player", 7));
        let api: ApiError = err.into();
        assert_eq!(api.to_string(), "Player 7 not found");
        assert_eq!(api.status(), StatusCode::NOT_FOUND);
    }
}
