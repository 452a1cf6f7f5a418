//! Legal move generation for International Draughts.
//!
//! Capturing is mandatory, and among captures only those taking the greatest
//! number of pieces are legal. Ties between equally long captures are all legal.
//! Two capture routes with the same origin, destination and captured set are
//! one move.

use std::collections::HashSet;

use crate::bitboard::Bitboard;
use crate::coretypes::{Color, Direction, Move, Square};
use crate::movelist::MoveList;
use crate::position::Position;

pub mod captures;
pub mod rays;
pub mod tables;

/// Generate all legal moves of the player to move.
pub fn generate_legal_moves(position: &Position) -> MoveList {
    let captures = capture_moves(position, position.player());
    if !captures.is_empty() {
        return captures;
    }
    quiet_moves(position, position.player())
}

/// All legal captures available to `color`, regardless of whose turn it is.
/// Only maximal captures are returned, and duplicate routes are merged.
pub fn capture_moves(position: &Position, color: Color) -> MoveList {
    let mut moves = MoveList::new();
    for (origin, _) in position.pieces(color) {
        captures::piece_captures(position, origin, &mut moves);
    }

    let longest = moves.iter().map(Move::num_captures).max().unwrap_or(0);
    let mut seen: HashSet<(Square, Square, Bitboard)> = HashSet::new();
    moves.retain(|move_| {
        move_.num_captures() == longest
            && seen.insert((move_.from(), move_.to(), move_.captured_set()))
    });
    moves
}

/// Non-capturing moves of `color`. Men step forward onto an empty neighbor,
/// kings slide any distance along a diagonal until blocked.
pub fn quiet_moves(position: &Position, color: Color) -> MoveList {
    let mut moves = MoveList::new();
    for (origin, piece) in position.pieces(color) {
        if piece.is_king() {
            for direction in Direction::ALL {
                rays::ray(origin, direction)
                    .take_while(|sq| position.is_empty_square(*sq))
                    .for_each(|to| moves.push(Move::quiet(origin, to)));
            }
        } else {
            for direction in Direction::forward(color) {
                if let Some(to) = origin.step(direction).filter(|sq| position.is_empty_square(*sq)) {
                    moves.push(Move::quiet(origin, to));
                }
            }
        }
    }
    moves
}

/// Returns true if `color` has any capture available.
pub fn has_captures(position: &Position, color: Color) -> bool {
    position
        .pieces(color)
        .any(|(origin, _)| captures::piece_can_capture(position, origin))
}

/// Number of moves `color` could play if it were their turn.
pub fn mobility(position: &Position, color: Color) -> usize {
    if has_captures(position, color) {
        capture_moves(position, color).len()
    } else {
        quiet_moves(position, color).len()
    }
}
