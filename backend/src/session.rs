//! Game sessions: the per-game registry and the move resolution
//! pipeline.
//!
//! `SessionStore` is the only owner of mutable game state. It is built
//! once at startup with its collaborators and injected into request
//! handlers; there is no ambient global registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use shakmaty::{Color, Move};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::engines::{Commentator, OpponentEngine};
use crate::error::ApiError;
use crate::notation::{self, NotationError};
use crate::rules::{self, BoardState};
use crate::view::GameView;

/// One chess game.
///
/// `position` is always the replay of `played_moves` from the starting
/// position. The pipeline stages moves on a scratch copy and commits
/// both fields together to keep them in lockstep.
pub struct Session {
    pub id: Uuid,
    pub position: BoardState,
    pub played_moves: Vec<Move>,
    pub analysis_enabled: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            position: BoardState::new(),
            played_moves: Vec::new(),
            analysis_enabled: false,
        }
    }
}

/// Process-wide session registry and pipeline orchestrator.
///
/// Each session sits behind its own lock, held for the whole pipeline
/// run (including the engine and commentary round trips), so two
/// submissions on one game serialize while other games proceed. The
/// outer map lock is only ever held for registry bookkeeping.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
    engine: Arc<dyn OpponentEngine>,
    commentator: Option<Arc<dyn Commentator>>,
    movetime: Duration,
}

impl SessionStore {
    pub fn new(
        engine: Arc<dyn OpponentEngine>,
        commentator: Option<Arc<dyn Commentator>>,
        movetime: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            engine,
            commentator,
            movetime,
        }
    }

    /// Register a fresh game and return its rendered view.
    pub async fn create(&self) -> GameView {
        let session = Session::new();
        debug!("created game {}", session.id);
        let view = GameView::render(&session, String::new());
        self.sessions
            .write()
            .await
            .insert(session.id, Arc::new(Mutex::new(session)));
        view
    }

    pub async fn get(&self, id: Uuid) -> Result<GameView, ApiError> {
        let session = self.lookup(id).await?;
        let session = session.lock().await;
        Ok(GameView::render(&session, String::new()))
    }

    /// Remove the session; later operations on the id see `NotFound`.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(ApiError::NotFound)
    }

    /// Flip the analysis flag. No move side effects.
    pub async fn toggle_analysis(&self, id: Uuid) -> Result<GameView, ApiError> {
        let session = self.lookup(id).await?;
        let mut session = session.lock().await;
        session.analysis_enabled = !session.analysis_enabled;
        Ok(GameView::render(&session, String::new()))
    }

    /// Legal moves in coordinate notation, optionally restricted to one
    /// origin square.
    pub async fn legal_moves(
        &self,
        id: Uuid,
        square: Option<&str>,
    ) -> Result<Vec<String>, ApiError> {
        let session = self.lookup(id).await?;
        let session = session.lock().await;
        let mut moves = session.position.legal_moves();
        if let Some(raw) = square {
            let square = rules::parse_square(raw).ok_or(ApiError::InvalidSquare)?;
            moves.retain(|m| m.from() == Some(square));
        }
        Ok(moves.iter().map(rules::coordinate).collect())
    }

    /// Validate and apply a player move, sequence the automated reply,
    /// and render the resulting state.
    pub async fn submit_move(&self, id: Uuid, raw: &str) -> Result<GameView, ApiError> {
        let session = self.lookup(id).await?;
        let mut session = session.lock().await;
        let analysis = self.apply_player_move(&mut session, raw).await?;
        Ok(GameView::render(&session, analysis))
    }

    async fn lookup(&self, id: Uuid) -> Result<Arc<Mutex<Session>>, ApiError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    /// The move resolution pipeline.
    ///
    /// Every gate fails without touching the session: the player move
    /// and the automated reply are staged on a scratch position and
    /// committed in one step, so an engine failure can never leave an
    /// unreplied automated turn behind.
    async fn apply_player_move(
        &self,
        session: &mut Session,
        raw: &str,
    ) -> Result<String, ApiError> {
        if session.position.is_game_over() {
            return Err(ApiError::GameOver);
        }

        let mv = notation::resolve(raw, &session.position).map_err(|err| match err {
            NotationError::Unparseable => ApiError::InvalidFormat,
            NotationError::Unplayable => ApiError::IllegalMove,
        })?;

        // Resolution can yield a well-formed but illegal move (e.g. a
        // pinned piece); membership in the legal set is its own gate.
        if !session.position.is_legal(&mv) {
            return Err(ApiError::IllegalMove);
        }

        let mut staged = session.position.clone();
        staged.apply(&mv);
        let mut staged_moves = vec![mv];

        // The automated side answers only when the player's move hands
        // it the turn and the game is still running.
        if staged.turn() == Color::Black && !staged.is_game_over() {
            let reply = self.engine.best_move(&staged.to_fen(), self.movetime).await?;
            let reply = staged.parse_coordinate(&reply).map_err(|_| {
                ApiError::Engine(uci_engine::EngineError::Protocol(format!(
                    "engine reply {reply:?} does not fit the position"
                )))
            })?;
            staged.apply(&reply);
            staged_moves.push(reply);
        }

        session.position = staged;
        session.played_moves.extend(staged_moves);

        Ok(self.analysis_for(session).await)
    }

    /// Post-move analysis: an engine suggestion plus a commentary call.
    /// Strictly best effort. The applied moves must never be lost
    /// because this step failed, so every error degrades to an empty
    /// string.
    async fn analysis_for(&self, session: &Session) -> String {
        if !session.analysis_enabled || session.position.is_game_over() {
            return String::new();
        }
        let Some(commentator) = self.commentator.as_ref() else {
            debug!("analysis enabled but no commentary service configured");
            return String::new();
        };

        let fen = session.position.to_fen();
        let suggestion = match self.engine.best_move(&fen, self.movetime).await {
            Ok(suggestion) => suggestion,
            Err(err) => {
                warn!("suggestion lookup failed: {err}");
                return String::new();
            }
        };

        let history = rules::san_history(&session.played_moves);
        match commentator.explain(&history, &fen, &suggestion).await {
            Ok(text) => text,
            Err(err) => {
                warn!("commentary failed: {err}");
                String::new()
            }
        }
    }
}
