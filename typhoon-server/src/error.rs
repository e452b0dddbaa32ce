//! Error types for the HTTP API.
//!
//! [`ApiError`] converts into a JSON `{error, status}` response. Every variant
//! is raised before any state is produced, so a rejected turn never mutates.
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use typhoon_game::TurnError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error("invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Turn(TurnError::GameOver) => StatusCode::CONFLICT,
            Self::Turn(TurnError::UnknownChoice(_) | TurnError::ChoiceAlreadyUsed(_))
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        log::debug!("rejecting request: {self}");
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
