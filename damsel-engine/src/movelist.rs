//! MoveList types used in Damsel engine.
//!
//! The underlying type of MoveList may change at any time during
//! pre-1.0 development, so type aliases make changes easy.

use crate::arrayvec::ArrayVec;
use crate::coretypes::{Move, Square, MAX_CAPTURES, MAX_DEPTH};

/// MoveList holds every legal move of a position.
/// Tied maximal captures can multiply quickly, so the list is heap backed.
pub type MoveList = Vec<Move>;
/// Captures is the jump-ordered list of squares taken by a single move.
pub type Captures = ArrayVec<Square, MAX_CAPTURES>;
/// Line is a sequence of legal moves that can be applied to a position. Useful for retaining a principal variation
/// found from a search.
pub type Line = ArrayVec<Move, { MAX_DEPTH as usize }>;
/// MoveHistory is the record of moves played in a game.
pub type MoveHistory = Vec<Move>;
