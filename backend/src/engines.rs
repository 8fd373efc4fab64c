//! Seams for the external collaborators of the move pipeline.
//!
//! The pipeline talks to the opponent engine and the commentary service
//! through these traits so tests can script both sides without a
//! Stockfish binary or network access.

use std::time::Duration;

use async_trait::async_trait;

use commentary::{CommentaryClient, CommentaryError};
use uci_engine::{Engine, EngineError};

/// The automated opponent: one best move per query.
#[async_trait]
pub trait OpponentEngine: Send + Sync {
    /// Best move for the position `fen` in coordinate notation, under
    /// the given think budget.
    async fn best_move(&self, fen: &str, movetime: Duration) -> Result<String, EngineError>;
}

#[async_trait]
impl OpponentEngine for Engine {
    async fn best_move(&self, fen: &str, movetime: Duration) -> Result<String, EngineError> {
        Engine::best_move(self, fen, movetime).await
    }
}

/// The commentary service: free-text explanation of a game state.
#[async_trait]
pub trait Commentator: Send + Sync {
    async fn explain(
        &self,
        moves: &[String],
        fen: &str,
        suggested_move: &str,
    ) -> Result<String, CommentaryError>;
}

#[async_trait]
impl Commentator for CommentaryClient {
    async fn explain(
        &self,
        moves: &[String],
        fen: &str,
        suggested_move: &str,
    ) -> Result<String, CommentaryError> {
        CommentaryClient::explain(self, moves, fen, suggested_move).await
    }
}
