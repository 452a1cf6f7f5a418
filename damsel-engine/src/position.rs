//! Holds Position struct, the most important data structure for the engine.
//! Position represents an International Draughts position.

use std::fmt::{self, Display};

use crate::bitboard::Bitboard;
use crate::coretypes::{Color, Move, MoveNotation, Piece, PieceKind, Square};
use crate::coretypes::{BOARD_SIZE, NUM_SQUARES};
use crate::error::{self, ErrorKind};
use crate::fen::Fen;
use crate::movegen as mg;
use crate::movelist::MoveList;

/// struct Position
/// A complete data set that can represent any draughts position.
/// # Members:
/// * board - the content of each of the 50 playable squares, in PDN order.
/// * player - Color of player whose turn it is.
///
/// Positions are small and `Copy`. Applying a move produces a new Position,
/// the original is never modified.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Position {
    pub(crate) board: [Option<Piece>; NUM_SQUARES],
    pub(crate) player: Color,
}

/// PositionKey is an exact, fixed width encoding of a Position:
/// one square set per color, one for kings, and the player to move.
/// Two positions have equal keys if and only if they are equal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PositionKey {
    white: Bitboard,
    black: Bitboard,
    kings: Bitboard,
    player: Color,
}

impl PositionKey {
    pub fn player(&self) -> Color {
        self.player
    }
}

/// The operations the search needs from a position: legal move generation,
/// copy-on-write move application, and keying.
pub trait PositionOps: Sized {
    /// All legal moves for the player to move, honoring the maximal capture rule.
    fn legal_moves(&self) -> MoveList;
    /// Returns the position reached by playing `move_`.
    /// Panics if the moving piece does not belong to the player to move.
    fn make_move(&self, move_: &Move) -> Self;
    /// Returns the same placement with the other player to move.
    fn make_null_move(&self) -> Self;
    /// The exact key of this position.
    fn key(&self) -> PositionKey;
}

impl Position {
    /// Standard International Draughts start position.
    /// Black men on 1-20, White men on 31-50, White to move.
    pub fn start_position() -> Self {
        let mut position = Self::empty(Color::White);
        for square in Square::iter() {
            match square.pdn() {
                1..=20 => position.board[square.idx()] = Some(Piece::new(Color::Black, PieceKind::Man)),
                31..=50 => position.board[square.idx()] = Some(Piece::new(Color::White, PieceKind::Man)),
                _ => (),
            }
        }
        position
    }

    /// A board with no pieces.
    pub fn empty(player: Color) -> Self {
        Self {
            board: [None; NUM_SQUARES],
            player,
        }
    }

    /// Const getters.
    pub fn player(&self) -> Color {
        self.player
    }
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.idx()]
    }
    pub fn is_empty_square(&self, square: Square) -> bool {
        self.board[square.idx()].is_none()
    }

    /// Returns true if `square` holds a piece of `color`.
    pub fn is_color(&self, square: Square, color: Color) -> bool {
        matches!(self.board[square.idx()], Some(piece) if piece.color == color)
    }

    /// Place or remove a piece. Used for building positions.
    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        self.board[square.idx()] = piece;
    }

    /// Returns a copy of this position with another player to move.
    pub fn with_player(&self, player: Color) -> Self {
        Self {
            board: self.board,
            player,
        }
    }

    /// Iterate the squares and pieces of one color.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(move |square| match self.board[square.idx()] {
            Some(piece) if piece.color == color => Some((square, piece)),
            _ => None,
        })
    }

    /// Squares occupied by `color`.
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.pieces(color).map(|(square, _)| square).collect()
    }

    /// Number of pieces of `color`.
    pub fn count(&self, color: Color) -> usize {
        self.pieces(color).count()
    }

    /// Number of pieces of a given color and kind.
    pub fn count_kind(&self, color: Color, kind: PieceKind) -> usize {
        self.pieces(color).filter(|(_, piece)| piece.kind == kind).count()
    }

    /// Number of pieces on the board.
    pub fn total_pieces(&self) -> usize {
        self.board.iter().filter(|cell| cell.is_some()).count()
    }

    /// Returns true if the player to move must capture.
    pub fn has_captures(&self) -> bool {
        mg::has_captures(self, self.player)
    }

    /// Returns true if the player to move has no legal moves and so has lost.
    pub fn is_lost(&self) -> bool {
        self.legal_moves().is_empty()
    }

    /// Find the legal move described by a notation.
    /// Multiple capture routes with the same ends are ambiguous and rejected.
    pub fn find_move(&self, notation: &MoveNotation) -> error::Result<Move> {
        let mut candidates = self
            .legal_moves()
            .into_iter()
            .filter(|move_| move_.matches(notation));

        match (candidates.next(), candidates.next()) {
            (Some(move_), None) => Ok(move_),
            (Some(_), Some(_)) => Err((ErrorKind::AmbiguousMove, notation).into()),
            (None, _) => Err((ErrorKind::IllegalMove, notation).into()),
        }
    }

    /// Pretty-printed board, row 0 on top. Light squares are blank.
    pub fn pretty(&self) -> String {
        let mut board = String::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let ch = match Square::from_coords(row as isize, col as isize) {
                    Some(square) => self.board[square.idx()].map_or('.', |piece| piece.to_char()),
                    None => ' ',
                };
                board.push(ch);
                board.push(' ');
            }
            board.pop();
            board.push('\n');
        }
        board
    }
}

impl PositionOps for Position {
    fn legal_moves(&self) -> MoveList {
        mg::generate_legal_moves(self)
    }

    fn make_move(&self, move_: &Move) -> Self {
        let piece = match self.board[move_.from.idx()] {
            Some(piece) if piece.color == self.player => piece,
            other => panic!(
                "corrupted move {}: square {} holds {:?}, {} to move",
                move_, move_.from, other, self.player
            ),
        };

        let mut next = *self;
        next.board[move_.from.idx()] = None;
        for captured in &move_.captures {
            debug_assert!(self.is_color(*captured, !self.player));
            next.board[captured.idx()] = None;
        }

        let kind = if piece.is_man() && move_.to.row() == self.player.promotion_row() {
            PieceKind::King
        } else {
            piece.kind
        };
        next.board[move_.to.idx()] = Some(Piece::new(self.player, kind));
        next.player = !self.player;
        next
    }

    fn make_null_move(&self) -> Self {
        self.with_player(!self.player)
    }

    fn key(&self) -> PositionKey {
        let mut key = PositionKey {
            white: Bitboard::EMPTY,
            black: Bitboard::EMPTY,
            kings: Bitboard::EMPTY,
            player: self.player,
        };
        for square in Square::iter() {
            if let Some(piece) = self.board[square.idx()] {
                match piece.color {
                    Color::White => key.white.set_square(square),
                    Color::Black => key.black.set_square(square),
                }
                if piece.is_king() {
                    key.kings.set_square(square);
                }
            }
        }
        key
    }
}

/// Defaults to standard draughts start position.
impl Default for Position {
    fn default() -> Self {
        Self::start_position()
    }
}

/// Displays pretty-printed draughts board and Fen string representing Position.
impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\n Fen: {}\n", self.pretty(), self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(pdn: u8) -> Square {
        Square::from_pdn(pdn).unwrap()
    }

    #[test]
    fn start_position_counts() {
        let pos = Position::start_position();
        assert_eq!(pos.count(Color::White), 20);
        assert_eq!(pos.count(Color::Black), 20);
        assert_eq!(pos.total_pieces(), 40);
        assert_eq!(pos.player(), Color::White);
        assert!(pos.is_empty_square(sq(25)));
        assert!(pos.is_color(sq(31), Color::White));
        assert!(pos.is_color(sq(20), Color::Black));
    }

    #[test]
    fn pretty_print_position() {
        let start_pos = Position::start_position();
        let pretty = start_pos.pretty();
        assert_eq!(pretty.lines().count(), 10);
        assert!(pretty.lines().next().unwrap().starts_with("  b"));
        println!("{}", start_pos);
    }

    #[test]
    fn make_move_does_not_mutate_original() {
        let pos = Position::start_position();
        let move_ = Move::quiet(sq(32), sq(28));
        let next = pos.make_move(&move_);

        assert_eq!(pos, Position::start_position());
        assert!(next.is_empty_square(sq(32)));
        assert!(next.is_color(sq(28), Color::White));
        assert_eq!(next.player(), Color::Black);
    }

    #[test]
    fn make_move_removes_captures_and_promotes() {
        let mut pos = Position::empty(Color::White);
        pos.set_piece(sq(12), Some(Piece::new(Color::White, PieceKind::Man)));
        pos.set_piece(sq(7), Some(Piece::new(Color::Black, PieceKind::Man)));
        let move_ = Move::capture(sq(12), sq(1), [sq(7)]);

        let next = pos.make_move(&move_);
        assert!(next.is_empty_square(sq(7)));
        assert!(next.is_empty_square(sq(12)));
        assert_eq!(next.piece_at(sq(1)), Some(Piece::new(Color::White, PieceKind::King)));
        assert_eq!(next, pos.make_move(&move_));
    }

    #[test]
    #[should_panic]
    fn make_move_from_empty_square_panics() {
        let pos = Position::start_position();
        let _ = pos.make_move(&Move::quiet(sq(25), sq(24)));
    }

    #[test]
    fn keys_follow_equality() {
        let pos = Position::start_position();
        let a = pos
            .make_move(&Move::quiet(sq(32), sq(28)))
            .make_move(&Move::quiet(sq(19), sq(23)))
            .make_move(&Move::quiet(sq(33), sq(29)));
        let b = pos
            .make_move(&Move::quiet(sq(33), sq(29)))
            .make_move(&Move::quiet(sq(19), sq(23)))
            .make_move(&Move::quiet(sq(32), sq(28)));

        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
        assert_ne!(pos.key(), pos.make_null_move().key());
    }

    #[test]
    fn find_move_resolves_notation() {
        let pos = Position::start_position();
        let move_ = pos.find_move(&"32-28".parse().unwrap()).unwrap();
        assert_eq!(move_, Move::quiet(sq(32), sq(28)));
        assert!(pos.find_move(&"31-22".parse().unwrap()).is_err());
    }
}
