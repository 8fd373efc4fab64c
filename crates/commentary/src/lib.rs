//! Client for the move-commentary service.
//!
//! The service receives the game so far (algebraic move list), the
//! current position as FEN and an engine suggestion, and returns a short
//! natural-language explanation. Failures here are typed but expected to
//! be absorbed by callers; a lost commentary must never cost a move.

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the commentary round trip.
#[derive(Debug, Error)]
pub enum CommentaryError {
    /// Transport-level failure (connect, timeout, malformed body).
    #[error("commentary request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("commentary service returned status {0}")]
    Status(u16),
}

#[derive(Serialize)]
struct ExplainRequest<'a> {
    moves: &'a [String],
    fen: &'a str,
    suggested_move: &'a str,
}

#[derive(Deserialize)]
struct ExplainResponse {
    commentary: String,
}

/// HTTP client for the commentary endpoint.
pub struct CommentaryClient {
    http: reqwest::Client,
    endpoint: String,
}

impl CommentaryClient {
    /// Build a client for `endpoint` with a bounded request timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, CommentaryError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// One-shot explanation request for the given game state.
    pub async fn explain(
        &self,
        moves: &[String],
        fen: &str,
        suggested_move: &str,
    ) -> Result<String, CommentaryError> {
        debug!("requesting commentary for {fen}");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ExplainRequest {
                moves,
                fen,
                suggested_move,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CommentaryError::Status(response.status().as_u16()));
        }
        let body: ExplainResponse = response.json().await?;
        Ok(body.commentary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let moves = vec!["e4".to_string(), "e5".to_string()];
        let request = ExplainRequest {
            moves: &moves,
            fen: "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2",
            suggested_move: "g1f3",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["moves"], serde_json::json!(["e4", "e5"]));
        assert_eq!(json["suggested_move"], "g1f3");
        assert!(json["fen"].as_str().unwrap().starts_with("rnbqkbnr"));
    }

    #[test]
    fn test_response_parses_commentary_field() {
        let body: ExplainResponse =
            serde_json::from_str(r#"{"commentary": "Develops the knight."}"#).unwrap();
        assert_eq!(body.commentary, "Develops the knight.");
    }
}
