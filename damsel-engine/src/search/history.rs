//! History structure used within search.

use crate::coretypes::Move;
use crate::game::Game;
use crate::position::{Position, PositionKey, PositionOps};

/// Returns true if no later position can repeat one from before `move_`.
/// Men never move backwards and captured pieces never return.
pub fn is_unrepeatable(position: &Position, move_: &Move) -> bool {
    move_.is_capture()
        || position
            .piece_at(move_.from())
            .map_or(true, |piece| piece.is_man())
}

/// History primary use is for tracking repeated positions along a line of play.
/// It is stateful, in that functions assume the next interaction comes from the next
/// possible move in a played game.
///
/// It contains the keys of all previously visited positions,
/// and the indices of positions which cannot be repeated in future positions.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct History {
    key_history: Vec<PositionKey>, // All visited position keys in order.
    unrepeatables: Vec<usize>,     // Stack of unrepeatable position indices.
    head: usize,                   // First position after the most recent unrepeatable one.
}

impl History {
    /// Create a new empty History.
    pub fn empty() -> Self {
        Self {
            key_history: Vec::new(),
            unrepeatables: Vec::new(),
            head: 0,
        }
    }

    /// Create a new History from the positions of a game.
    pub fn new(game: &Game) -> Self {
        let mut history = Self::empty();
        let mut position = game.base_position;

        // Only push a position once it is in the past.
        // The current position is not added to history because it is active.
        for move_ in &game.moves {
            history.push(position.key(), is_unrepeatable(&position, move_));
            position = position.make_move(move_);
        }

        debug_assert_eq!(position, game.position);
        history
    }

    /// Pushes a new position into the key history, and updates the most recent unrepeatable
    /// index if applicable.
    pub fn push(&mut self, key: PositionKey, is_unrepeatable: bool) {
        self.key_history.push(key);

        // The position left by an irreversible move can never recur,
        // so the window starts after it.
        if is_unrepeatable {
            self.unrepeatables.push(self.head);
            self.head = self.key_history.len();
        }
    }

    /// Pops a position from history stack. If the popped item was the most recent unrepeatable,
    /// then replace it with the previous unrepeatable index.
    pub fn pop(&mut self) {
        self.key_history.pop();

        // If the current head exceeds the limit, replace it with the previous unrepeatable index.
        if self.head > self.key_history.len() {
            self.head = self.unrepeatables.pop().unwrap_or(0);
        }
    }

    /// Number of positions held.
    pub fn len(&self) -> usize {
        self.key_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_history.is_empty()
    }

    /// Returns true if the position occurs at least once in history.
    pub fn contains(&self, key: PositionKey) -> bool {
        self.contains_n(key, 1)
    }

    /// Returns true if the position occurs in history at least `n` times,
    /// assuming the position to check may be the next position of this line.
    /// Only the history since the last unrepeatable position is checked.
    pub fn contains_n(&self, key: PositionKey, count: usize) -> bool {
        self.key_history[self.head..]
            .iter()
            .rev()
            .filter(|old_key| **old_key == key)
            .nth(count.saturating_sub(1))
            .is_some()
    }

    /// Returns true if the position was already seen twice, so this is its third occurrence.
    pub fn is_threefold_repetition(&self, key: PositionKey) -> bool {
        self.contains_n(key, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::Square;
    use crate::fen::Fen;

    fn sq(pdn: u8) -> Square {
        Square::from_pdn(pdn).unwrap()
    }

    #[test]
    fn position_with_no_history() {
        let game = Game::from(Position::start_position());
        let history = History::new(&game);

        assert_eq!(history.head, 0);
        assert!(history.is_empty());
        assert!(history.unrepeatables.is_empty());
    }

    #[test]
    fn king_shuffles_repeat() {
        let base = Position::parse_fen("W:WK50,35:BK5").unwrap();
        let shuffle = [
            Move::quiet(sq(50), sq(44)),
            Move::quiet(sq(5), sq(10)),
            Move::quiet(sq(44), sq(50)),
            Move::quiet(sq(10), sq(5)),
        ];
        let mut moves = shuffle.to_vec();
        moves.extend(shuffle.iter().cloned());
        let game = Game::new(base, moves).unwrap();
        let history = History::new(&game);

        assert_eq!(game.position, base);
        assert!(history.contains_n(base.key(), 2));
        assert!(history.is_threefold_repetition(base.key()));
        assert!(!history.contains_n(base.key(), 3));
    }

    #[test]
    fn man_moves_cut_history() {
        let base = Position::parse_fen("W:WK50,35:BK5").unwrap();
        let moves = vec![
            Move::quiet(sq(50), sq(44)),
            Move::quiet(sq(5), sq(10)),
            Move::quiet(sq(35), sq(30)),
            Move::quiet(sq(10), sq(5)),
        ];
        let game = Game::new(base, moves).unwrap();
        let mut history = History::new(&game);
        assert!(!history.contains(base.key()));

        // Pushing and popping a search line restores the previous window.
        let current = game.position;
        history.push(current.key(), true);
        history.pop();
        assert_eq!(history.len(), 4);
        assert!(history.contains(game.positions()[3].key()));
        assert!(!history.contains(game.positions()[2].key()));
    }

    #[test]
    fn popping_restores_window() {
        let base = Position::parse_fen("W:WK50,35:BK5").unwrap();
        let mut history = History::empty();
        history.push(base.key(), false);
        history.push(base.key(), true);
        assert_eq!(history.head, 2);
        assert!(!history.contains(base.key()));

        history.push(base.key(), false);
        history.pop();
        assert_eq!(history.head, 2);
        history.pop();
        assert_eq!(history.head, 0);
        assert!(history.contains(base.key()));
    }
}
