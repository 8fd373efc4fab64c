//! Rules engine adapter over `shakmaty`.
//!
//! Everything the rest of the backend needs from the rules of chess goes
//! through here: legality, terminal-state queries, notation encode and
//! decode, history replay, and the board rendering served to clients.
//! No other module touches `shakmaty` position types directly.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Move, Position, Rank, Role, Square};

/// Why a coordinate-notation string failed to produce a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateMoveError {
    /// The string is not coordinate notation at all.
    Syntax,
    /// Valid syntax, but no such move exists from this position.
    Unplayable,
}

/// The authoritative game position for one session.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    position: Chess,
}

impl BoardState {
    /// Standard starting position.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    pub fn is_game_over(&self) -> bool {
        self.position.is_game_over()
    }

    /// All legal moves, in the move generator's natural order.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves().into_iter().collect()
    }

    pub fn is_legal(&self, m: &Move) -> bool {
        self.position.is_legal(m)
    }

    /// Apply a move already known to be legal for this position.
    pub fn apply(&mut self, m: &Move) {
        self.position.play_unchecked(m);
    }

    pub fn to_fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    /// Decode coordinate notation (`e2e4`, `a7a8q`) against this position.
    pub fn parse_coordinate(&self, raw: &str) -> Result<Move, CoordinateMoveError> {
        let uci: UciMove = raw.parse().map_err(|_| CoordinateMoveError::Syntax)?;
        uci.to_move(&self.position)
            .map_err(|_| CoordinateMoveError::Unplayable)
    }

    /// Decode algebraic notation (`e4`, `Nf3`, `Qh4#`) against this
    /// position. Requires the string to match exactly one move under
    /// standard disambiguation rules.
    pub fn parse_algebraic(&self, raw: &str) -> Option<Move> {
        let san: SanPlus = raw.parse().ok()?;
        san.san.to_move(&self.position).ok()
    }

    /// SVG rendering of the board, white at the bottom. Stands in for
    /// the diagram image the API serves alongside the position.
    pub fn render_svg(&self) -> String {
        let board = self.position.board();
        let mut svg = String::from(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 400" width="400" height="400">"#,
        );
        for row in 0..8u32 {
            for col in 0..8u32 {
                let square = Square::from_coords(File::new(col), Rank::new(7 - row));
                let (x, y) = (col * 50, row * 50);
                let fill = if (row + col) % 2 == 0 { "#ffce9e" } else { "#d18b47" };
                svg.push_str(&format!(
                    r#"<rect x="{x}" y="{y}" width="50" height="50" fill="{fill}"/>"#
                ));
                if let Some(piece) = board.piece_at(square) {
                    svg.push_str(&format!(
                        r#"<text x="{}" y="{}" font-size="40" text-anchor="middle">{}</text>"#,
                        x + 25,
                        y + 42,
                        piece_glyph(piece.color, piece.role)
                    ));
                }
            }
        }
        svg.push_str("</svg>");
        svg
    }
}

/// Coordinate notation for a move (castling rendered king-to-squares).
pub fn coordinate(m: &Move) -> String {
    UciMove::from_move(m, CastlingMode::Standard).to_string()
}

/// Algebraic notation for a full game, reconstructed by replaying the
/// moves from the starting position. Each ply's notation is only
/// meaningful relative to the position right before it, so there is no
/// shortcut through the final position.
pub fn san_history(moves: &[Move]) -> Vec<String> {
    let mut position = Chess::default();
    moves
        .iter()
        .map(|m| SanPlus::from_move_and_play_unchecked(&mut position, m).to_string())
        .collect()
}

/// Replay a move sequence from the starting position.
pub fn replay(moves: &[Move]) -> BoardState {
    let mut state = BoardState::new();
    for m in moves {
        state.apply(m);
    }
    state
}

/// Parse a board coordinate like `e2`.
pub fn parse_square(raw: &str) -> Option<Square> {
    raw.parse().ok()
}

fn piece_glyph(color: Color, role: Role) -> char {
    match (color, role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(state: &mut BoardState, raw: &str) {
        let m = state.parse_coordinate(raw).unwrap();
        assert!(state.is_legal(&m));
        state.apply(&m);
    }

    #[test]
    fn test_starting_position() {
        let state = BoardState::new();
        assert_eq!(state.turn(), Color::White);
        assert!(!state.is_check());
        assert!(!state.is_game_over());
        assert_eq!(state.legal_moves().len(), 20);
    }

    #[test]
    fn test_fen_of_starting_position() {
        assert_eq!(
            BoardState::new().to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn test_parse_coordinate_rejects_garbage() {
        let state = BoardState::new();
        assert_eq!(
            state.parse_coordinate("z9z9"),
            Err(CoordinateMoveError::Syntax)
        );
    }

    #[test]
    fn test_parse_coordinate_rejects_wrong_side() {
        // Valid syntax, but e7 holds a black pawn and white is to move.
        let state = BoardState::new();
        assert_eq!(
            state.parse_coordinate("e7e5"),
            Err(CoordinateMoveError::Unplayable)
        );
    }

    #[test]
    fn test_parse_algebraic() {
        let state = BoardState::new();
        let m = state.parse_algebraic("e4").unwrap();
        assert_eq!(coordinate(&m), "e2e4");
        assert!(state.parse_algebraic("Qh4").is_none());
    }

    #[test]
    fn test_san_history_replay() {
        let mut state = BoardState::new();
        let mut moves = Vec::new();
        for raw in ["e2e4", "e7e5", "g1f3"] {
            let m = state.parse_coordinate(raw).unwrap();
            state.apply(&m);
            moves.push(m);
        }
        assert_eq!(san_history(&moves), vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_san_history_marks_mate() {
        let mut state = BoardState::new();
        let mut moves = Vec::new();
        for raw in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            let m = state.parse_coordinate(raw).unwrap();
            state.apply(&m);
            moves.push(m);
        }
        assert!(state.is_checkmate());
        assert_eq!(san_history(&moves).last().unwrap(), "Qh4#");
    }

    #[test]
    fn test_replay_matches_incremental_application() {
        let mut state = BoardState::new();
        let mut moves = Vec::new();
        for raw in ["e2e4", "c7c5", "g1f3", "d7d6"] {
            let m = state.parse_coordinate(raw).unwrap();
            state.apply(&m);
            moves.push(m.clone());
        }
        assert_eq!(replay(&moves).to_fen(), state.to_fen());
    }

    #[test]
    fn test_fools_mate_is_game_over() {
        let mut state = BoardState::new();
        for raw in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            play(&mut state, raw);
        }
        assert!(state.is_check());
        assert!(state.is_checkmate());
        assert!(state.is_game_over());
        assert!(state.legal_moves().is_empty());
    }

    #[test]
    fn test_castling_coordinate_form() {
        let mut state = BoardState::new();
        for raw in ["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5"] {
            play(&mut state, raw);
        }
        let castle = state.parse_coordinate("e1g1").unwrap();
        assert!(state.is_legal(&castle));
        assert_eq!(coordinate(&castle), "e1g1");
    }

    #[test]
    fn test_render_svg_covers_the_board() {
        let svg = BoardState::new().render_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 64);
        // 32 pieces on the starting board.
        assert_eq!(svg.matches("<text").count(), 32);
        assert!(svg.contains('♔'));
        assert!(svg.contains('♟'));
    }

    #[test]
    fn test_parse_square() {
        assert_eq!(parse_square("e2"), Some(Square::E2));
        assert!(parse_square("j9").is_none());
        assert!(parse_square("").is_none());
    }
}
