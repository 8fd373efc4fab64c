//! Read-only projection of a session into the API response shape.

use serde::Serialize;

use crate::rules;
use crate::session::Session;

/// Everything a client sees about a game.
#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    pub game_id: String,
    pub fen: String,
    pub turn: &'static str,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    pub is_game_over: bool,
    pub legal_moves: Vec<String>,
    pub move_history: Vec<String>,
    pub board_svg: String,
    pub analysis: String,
    pub analysis_enabled: bool,
}

impl GameView {
    /// Derive the full view from a session without mutating it.
    /// Rendering twice in a row yields identical output.
    pub fn render(session: &Session, analysis: String) -> Self {
        let position = &session.position;
        Self {
            game_id: session.id.to_string(),
            fen: position.to_fen(),
            turn: if session.played_moves.len() % 2 == 0 {
                "white"
            } else {
                "black"
            },
            is_check: position.is_check(),
            is_checkmate: position.is_checkmate(),
            is_stalemate: position.is_stalemate(),
            is_game_over: position.is_game_over(),
            legal_moves: position.legal_moves().iter().map(rules::coordinate).collect(),
            move_history: rules::san_history(&session.played_moves),
            board_svg: position.render_svg(),
            analysis,
            analysis_enabled: session.analysis_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::BoardState;
    use uuid::Uuid;

    fn session_after(moves: &[&str]) -> Session {
        let mut position = BoardState::new();
        let mut played_moves = Vec::new();
        for raw in moves {
            let m = position.parse_coordinate(raw).unwrap();
            position.apply(&m);
            played_moves.push(m);
        }
        Session {
            id: Uuid::new_v4(),
            position,
            played_moves,
            analysis_enabled: false,
        }
    }

    #[test]
    fn test_new_game_view() {
        let view = GameView::render(&session_after(&[]), String::new());
        assert_eq!(view.turn, "white");
        assert_eq!(view.legal_moves.len(), 20);
        assert!(view.move_history.is_empty());
        assert!(!view.is_check && !view.is_game_over);
        assert!(!view.analysis_enabled);
        assert!(view.board_svg.starts_with("<svg"));
    }

    #[test]
    fn test_turn_follows_ply_parity() {
        assert_eq!(
            GameView::render(&session_after(&["e2e4"]), String::new()).turn,
            "black"
        );
        assert_eq!(
            GameView::render(&session_after(&["e2e4", "e7e5"]), String::new()).turn,
            "white"
        );
    }

    #[test]
    fn test_history_length_matches_played_moves() {
        let session = session_after(&["e2e4", "e7e5", "g1f3"]);
        let view = GameView::render(&session, String::new());
        assert_eq!(view.move_history.len(), session.played_moves.len());
        assert_eq!(view.move_history, vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let session = session_after(&["e2e4", "e7e5"]);
        let first = GameView::render(&session, "note".to_string());
        let second = GameView::render(&session, "note".to_string());
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_checkmate_flags() {
        let view = GameView::render(
            &session_after(&["f2f3", "e7e5", "g2g4", "d8h4"]),
            String::new(),
        );
        assert!(view.is_check);
        assert!(view.is_checkmate);
        assert!(view.is_game_over);
        assert!(!view.is_stalemate);
        assert!(view.legal_moves.is_empty());
    }
}
