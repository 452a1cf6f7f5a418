//! Game structure.

use crate::coretypes::Move;
use crate::error::{self, ErrorKind};
use crate::movelist::MoveHistory;
use crate::position::{Position, PositionOps};

/// Game contains information for an in progress game:
/// The base position the game started from, the sequence of moves that were
/// played, and the current position.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Game {
    pub base_position: Position,
    pub moves: MoveHistory,
    pub position: Position,
}

impl Game {
    /// Create a new Game from a base position and a sequence of moves.
    /// This generates the current position by applying the sequence of moves to the base.
    /// If a move in the move history was illegal, Err is returned.
    pub fn new(base_position: Position, moves: MoveHistory) -> error::Result<Self> {
        let mut game = Self::from(base_position);
        for move_ in moves {
            game.play(move_)?;
        }
        Ok(game)
    }

    /// Create a new game in the standard draughts start position.
    pub fn start_position() -> Self {
        Self::from(Position::start_position())
    }

    /// Append a move to the game, if it is legal in the current position.
    pub fn play(&mut self, move_: Move) -> error::Result<()> {
        if !self.position.legal_moves().contains(&move_) {
            return Err((ErrorKind::GameIllegalMove, &move_).into());
        }
        self.position = self.position.make_move(&move_);
        self.moves.push(move_);
        Ok(())
    }

    /// Number of half-moves played since the base position.
    pub fn ply(&self) -> usize {
        self.moves.len()
    }

    /// Every position of the game, from the base position up to and including the current one.
    pub fn positions(&self) -> Vec<Position> {
        let mut positions = Vec::with_capacity(self.moves.len() + 1);
        let mut position = self.base_position;
        positions.push(position);
        for move_ in &self.moves {
            position = position.make_move(move_);
            positions.push(position);
        }
        positions
    }

    /// Played moves in notation form, as consumed by an opening book.
    pub fn notations(&self) -> Vec<String> {
        self.moves.iter().map(ToString::to_string).collect()
    }
}

/// Convert a position to a Game with no past moves.
impl From<Position> for Game {
    fn from(position: Position) -> Self {
        Self {
            base_position: position,
            moves: MoveHistory::new(),
            position,
        }
    }
}
