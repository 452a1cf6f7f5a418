//! Safety and tactical analysis.
//!
//! Static exchange evaluation, attacker and defender counting, and the
//! material safety check used both to order root moves and as the final gate
//! on the move chosen by search.
//!
//! Captures are mandatory in draughts, so exchanges here are sequences of
//! legal moves rather than free choices of attacker.

use crate::bitboard::Bitboard;
use crate::coretypes::{Color, Cp, Direction, Move, Square};
use crate::movegen::{self as mg, rays::ray};
use crate::position::{Position, PositionOps};

/// Exchanges longer than this are cut off and scored as they stand.
const SEE_MAX_DEPTH: usize = 8;

/// Value of the pieces a move takes, in `position` before the move.
pub fn captured_value(position: &Position, move_: &Move) -> Cp {
    move_
        .captures()
        .iter()
        .filter_map(|square| position.piece_at(*square))
        .fold(Cp(0), |acc, piece| acc + piece.value())
}

/// Value of the piece making a move.
pub fn mover_value(position: &Position, move_: &Move) -> Cp {
    position
        .piece_at(move_.from())
        .map_or(Cp(0), |piece| piece.value())
}

/// Static Exchange Evaluation of a move, from the mover's perspective.
///
/// The value captured by the move, less the exchange the opponent continues with
/// by the least valuable legal recapture onto the landing square.
/// A capture with no recapture is worth exactly what it takes.
pub fn see(position: &Position, move_: &Move) -> Cp {
    see_recursive(position, move_, 0)
}

fn see_recursive(position: &Position, move_: &Move, depth: usize) -> Cp {
    let gain = captured_value(position, move_);
    if depth >= SEE_MAX_DEPTH {
        return gain;
    }

    let after = position.make_move(move_);
    match least_valuable_recapture(&after, move_.to()) {
        Some(recapture) => gain - see_recursive(&after, &recapture, depth + 1),
        None => gain,
    }
}

/// The legal capture taking the piece on `target` made by the cheapest piece.
/// Ties go to the capture taking the most material.
fn least_valuable_recapture(position: &Position, target: Square) -> Option<Move> {
    position
        .legal_moves()
        .into_iter()
        .filter(|move_| move_.captures().contains(&target))
        .min_by_key(|move_| (mover_value(position, move_), -captured_value(position, move_)))
}

/// Enemy captures available in `position` (enemy to move) which take the piece on `target`.
fn captures_of(position: &Position, target: Square) -> Vec<Move> {
    position
        .legal_moves()
        .into_iter()
        .filter(|move_| move_.captures().contains(&target))
        .collect()
}

/// Squares of `by` pieces that can immediately jump the piece on `square`.
/// Men attack from an adjacent square, kings from anywhere along an open diagonal.
/// The square behind the target, seen from the attacker, must be empty.
pub fn attackers(position: &Position, square: Square, by: Color) -> Bitboard {
    let mut attackers = Bitboard::EMPTY;
    for direction in Direction::ALL {
        let has_landing = square
            .step(direction.opposite())
            .map_or(false, |landing| position.is_empty_square(landing));
        if !has_landing {
            continue;
        }
        if let Some(attacker) = first_piece_on_ray(position, square, direction, by) {
            attackers.set_square(attacker);
        }
    }
    attackers
}

/// Squares of `color` pieces guarding the piece on `square`: adjacent pieces, and
/// kings watching the square along an open diagonal.
pub fn defenders(position: &Position, square: Square, color: Color) -> Bitboard {
    Direction::ALL
        .iter()
        .filter_map(|direction| first_piece_on_ray(position, square, *direction, color))
        .collect()
}

/// True if the piece on `square` has at least one defender of `color`.
pub fn is_protected(position: &Position, square: Square, color: Color) -> bool {
    !defenders(position, square, color).is_empty()
}

/// The first piece met walking from `square` in `direction`, if it belongs to `color`
/// and is close enough to act on `square`: adjacent, or a king at any distance.
fn first_piece_on_ray(position: &Position, square: Square, direction: Direction, color: Color) -> Option<Square> {
    ray(square, direction)
        .enumerate()
        .find_map(|(distance, sq)| position.piece_at(sq).map(|piece| (distance, sq, piece)))
        .filter(|(distance, _, piece)| piece.color() == color && (*distance == 0 || piece.is_king()))
        .map(|(_, sq, _)| sq)
}

/// Returns true if the move does not lose material against the best adversarial reply.
///
/// Captures must not lose the exchange. A quiet move is safe when the moved piece
/// cannot be taken on its destination. If it can, a protected piece is safe when
/// the worst exchange costs at most half its value, and an undefended piece is safe
/// only when every enemy capture of it allows a recapture recovering 80% of its value.
pub fn is_move_really_safe(position: &Position, move_: &Move) -> bool {
    if move_.is_capture() {
        return see(position, move_) >= Cp(0);
    }

    let us = position.player();
    let after = position.make_move(move_);
    let threats = captures_of(&after, move_.to());
    if threats.is_empty() {
        return true;
    }

    let value = mover_value(position, move_);
    // The opponent moves next, so protection is counted for our color in the
    // position after the move.
    if is_protected(&after, move_.to(), us) {
        let worst = threats
            .iter()
            .map(|threat| -see(&after, threat))
            .min()
            .unwrap_or(Cp(0));
        worst >= Cp(-(value.0 / 2))
    } else {
        threats.iter().all(|threat| {
            let recovered = max_capture_gain(&after.make_move(threat));
            recovered.0 * 100 >= value.0 * 80
        })
    }
}

/// The most material the player to move can take with one legal move.
pub fn max_capture_gain(position: &Position) -> Cp {
    if !position.has_captures() {
        return Cp(0);
    }
    position
        .legal_moves()
        .iter()
        .map(|move_| captured_value(position, move_))
        .max()
        .unwrap_or(Cp(0))
}

/// True if, after a quiet move, the mover would have a capture on their next turn.
pub fn creates_threat(position: &Position, move_: &Move) -> bool {
    if move_.is_capture() {
        return false;
    }
    let after = position.make_move(move_);
    mg::has_captures(&after, position.player())
}

/// Number of legal captures available to `color` that take two or more pieces.
pub fn count_forks(position: &Position, color: Color) -> usize {
    if !mg::has_captures(position, color) {
        return 0;
    }
    mg::capture_moves(position, color)
        .iter()
        .filter(|move_| move_.num_captures() >= 2)
        .count()
}

/// Pieces of `color` which stand behind a friendly piece, on the square an enemy
/// would land on to capture it. Moving such a piece exposes its neighbor.
pub fn pinned_pieces(position: &Position, color: Color) -> Bitboard {
    let mut pinned = Bitboard::EMPTY;
    for (square, _) in position.pieces(color) {
        for direction in Direction::ALL {
            let blocker = match square.step(direction) {
                Some(blocker) if position.is_color(blocker, color) => blocker,
                _ => continue,
            };
            if first_piece_on_ray(position, square, direction.opposite(), !color).is_some() {
                pinned.set_square(blocker);
            }
        }
    }
    pinned
}

/// Finds a combination for the player to move: a move after which every enemy reply
/// is a forced capture, and our best answer to each reply wins material overall.
/// Returns the move with the best guaranteed gain.
pub fn find_combination(position: &Position) -> Option<Move> {
    let mut best: Option<(Cp, Move)> = None;

    for move_ in position.legal_moves() {
        let gained = captured_value(position, &move_);
        let after = position.make_move(&move_);
        let replies = after.legal_moves();
        if replies.is_empty() || !replies[0].is_capture() {
            continue;
        }

        let worst = replies
            .iter()
            .map(|reply| {
                let lost = captured_value(&after, reply);
                gained - lost + max_capture_gain(&after.make_move(reply))
            })
            .min()
            .unwrap_or(Cp(0));

        if worst > Cp(0) && best.as_ref().map_or(true, |(score, _)| worst > *score) {
            best = Some((worst, move_));
        }
    }

    best.map(|(_, move_)| move_)
}
