//! Opening book interface.
//!
//! The engine does not own any opening data. A book is any value implementing
//! [`OpeningBook`]; moves it suggests are checked against the legal move list
//! before use.

use std::collections::HashMap;

use crate::coretypes::{Move, MoveNotation};
use crate::error;
use crate::position::{Position, PositionKey, PositionOps};

/// Source of opening moves.
pub trait OpeningBook: Send {
    /// A book move for `position`, reached by the moves in `history`.
    fn get_move(&self, position: &Position, history: &[String]) -> Option<Move>;

    /// True if `move_` is a book move in `position`.
    fn is_book_move(&self, position: &Position, move_: &Move) -> bool;
}

/// A book without moves.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoBook;

impl OpeningBook for NoBook {
    fn get_move(&self, _position: &Position, _history: &[String]) -> Option<Move> {
        None
    }

    fn is_book_move(&self, _position: &Position, _move_: &Move) -> bool {
        false
    }
}

/// An in memory book mapping positions to recommended moves.
/// Positions reached by transposition share their moves.
#[derive(Debug, Clone, Default)]
pub struct MemoryBook {
    moves: HashMap<PositionKey, Vec<Move>>,
}

impl MemoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from lines of moves played from the start position,
    /// such as `"32-28 19-23 28x19 14x23"`.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> error::Result<Self> {
        let mut book = Self::new();
        for line in lines {
            let mut position = Position::start_position();
            for notation in line.as_ref().split_whitespace() {
                let move_ = position.find_move(&notation.parse::<MoveNotation>()?)?;
                book.insert(&position, move_.clone());
                position = position.make_move(&move_);
            }
        }
        Ok(book)
    }

    /// Add a recommended move for a position.
    pub fn insert(&mut self, position: &Position, move_: Move) {
        let moves = self.moves.entry(position.key()).or_default();
        if !moves.contains(&move_) {
            moves.push(move_);
        }
    }

    /// Number of positions in the book.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl OpeningBook for MemoryBook {
    fn get_move(&self, position: &Position, _history: &[String]) -> Option<Move> {
        let legal_moves = position.legal_moves();
        self.moves
            .get(&position.key())?
            .iter()
            .find(|move_| legal_moves.contains(move_))
            .cloned()
    }

    fn is_book_move(&self, position: &Position, move_: &Move) -> bool {
        self.moves
            .get(&position.key())
            .map_or(false, |moves| moves.contains(move_))
    }
}
