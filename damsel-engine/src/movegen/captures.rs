//! Capture sequence generation.
//!
//! A capture is found by depth first search over jumps. The moving piece is
//! lifted from its origin for the whole search, so it may pass over or land on
//! its own starting square. Jumped pieces stay on the board until the move is
//! complete: they still block movement, and no piece may be jumped twice.

use crate::arrayvec::ArrayVec;
use crate::bitboard::Bitboard;
use crate::coretypes::{Color, Direction, Move, Square, BOARD_SIZE, MAX_CAPTURES};
use crate::movegen::rays::ray;
use crate::movelist::{Captures, MoveList};
use crate::position::Position;

/// State of one capture search, rooted at a single piece.
struct CaptureSearch<'a> {
    origin: Square,
    is_king: bool,
    occupied: Bitboard,
    enemies: Bitboard,
    jumped: Bitboard,
    captures: Captures,
    moves: &'a mut MoveList,
}

impl<'a> CaptureSearch<'a> {
    fn can_jump(&self, square: Square) -> bool {
        self.enemies.has_square(square) && !self.jumped.has_square(square)
    }

    fn is_free(&self, square: Square) -> bool {
        !self.occupied.has_square(square)
    }

    fn jump(&mut self, over: Square, land: Square) {
        self.captures.push(over);
        self.jumped.set_square(over);
        self.extend(land);
        self.jumped.clear_square(over);
        self.captures.pop();
    }

    /// Extend the current sequence from `at`, recording it if no jump continues it.
    fn extend(&mut self, at: Square) {
        let mut extended = false;

        if self.captures.len() < MAX_CAPTURES {
            for direction in Direction::ALL {
                if self.is_king {
                    // Slide to the first occupied square, which must be a jumpable enemy,
                    // then every free square beyond it is a landing square.
                    let over = match ray(at, direction).find(|sq| !self.is_free(*sq)) {
                        Some(over) if self.can_jump(over) => over,
                        _ => continue,
                    };
                    let landings: ArrayVec<Square, BOARD_SIZE> = ray(over, direction)
                        .take_while(|sq| self.is_free(*sq))
                        .collect();
                    for land in landings {
                        self.jump(over, land);
                        extended = true;
                    }
                } else {
                    let over = match at.step(direction) {
                        Some(over) if self.can_jump(over) => over,
                        _ => continue,
                    };
                    if let Some(land) = over.step(direction).filter(|sq| self.is_free(*sq)) {
                        self.jump(over, land);
                        extended = true;
                    }
                }
            }
        }

        if !extended && !self.captures.is_empty() {
            self.moves
                .push(Move::new(self.origin, at, self.captures.clone()));
        }
    }
}

/// Append every complete capture sequence of the piece on `origin` to `moves`.
/// Sequences of every length are produced, the maximal capture rule is applied by the caller.
pub fn piece_captures(position: &Position, origin: Square, moves: &mut MoveList) {
    let piece = match position.piece_at(origin) {
        Some(piece) => piece,
        None => return,
    };
    let mut occupied = position.occupancy(Color::White) | position.occupancy(Color::Black);
    occupied.clear_square(origin);

    let mut search = CaptureSearch {
        origin,
        is_king: piece.is_king(),
        occupied,
        enemies: position.occupancy(!piece.color()),
        jumped: Bitboard::EMPTY,
        captures: Captures::new(),
        moves,
    };
    search.extend(origin);
}

/// Returns true if the piece on `origin` has at least one capture available.
pub fn piece_can_capture(position: &Position, origin: Square) -> bool {
    let piece = match position.piece_at(origin) {
        Some(piece) => piece,
        None => return false,
    };
    let enemy = !piece.color();

    Direction::ALL.iter().any(|direction| {
        let over = if piece.is_king() {
            ray(origin, *direction).find(|sq| !position.is_empty_square(*sq))
        } else {
            origin.step(*direction)
        };
        match over {
            Some(over) if position.is_color(over, enemy) => over
                .step(*direction)
                .map_or(false, |land| position.is_empty_square(land)),
            _ => false,
        }
    })
}
