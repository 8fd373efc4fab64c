//! Error taxonomy surfaced to API clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use uci_engine::EngineError;

/// Everything a request can fail with.
///
/// Client-input failures never mutate a session. Engine failures abort
/// the whole submission with nothing committed. Commentary failures
/// never reach this type; they degrade to an empty analysis string
/// inside the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session registered under the requested id.
    #[error("Game not found")]
    NotFound,

    /// The move string matched neither notation form.
    #[error("Invalid move format")]
    InvalidFormat,

    /// Parseable move that is not legal in the current position.
    #[error("Illegal move")]
    IllegalMove,

    /// The legal-move filter is not a board coordinate.
    #[error("Invalid square")]
    InvalidSquare,

    /// Move submitted to a finished game.
    #[error("Game is already over")]
    GameOver,

    /// The opponent engine failed or timed out; the submission was not
    /// committed.
    #[error("Engine failure: {0}")]
    Engine(#[from] EngineError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidFormat | Self::IllegalMove | Self::InvalidSquare => {
                StatusCode::BAD_REQUEST
            }
            Self::GameOver => StatusCode::CONFLICT,
            Self::Engine(EngineError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Engine(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_error_statuses() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidFormat.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::IllegalMove.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidSquare.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::GameOver.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_engine_failures_are_gateway_errors() {
        let failure = ApiError::Engine(EngineError::Protocol("no reply".into()));
        assert_eq!(failure.status(), StatusCode::BAD_GATEWAY);

        let timeout = ApiError::Engine(EngineError::Timeout(Duration::from_millis(100)));
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
