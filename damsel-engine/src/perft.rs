//! Performance Test
//!
//! [Perft](https://www.chessprogramming.org/Perft)
//!
//! A simple debugging and testing function used to count
//! the number of nodes at a specific depth.

use std::ops::{Add, AddAssign};
use std::panic;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::coretypes::{Move, PlyKind};
use crate::movelist::MoveList;
use crate::position::{Position, PositionOps};

/// Debugging information about results of perft test.
/// nodes: Number of nodes at lowest depth of perft.
/// captures: Number of those nodes reached by a capture.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PerftInfo {
    pub nodes: u64,
    pub captures: u64,
}

impl PerftInfo {
    fn new(nodes: u64, captures: u64) -> Self {
        PerftInfo { nodes, captures }
    }
}

impl Add for PerftInfo {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        PerftInfo {
            nodes: self.nodes + rhs.nodes,
            captures: self.captures + rhs.captures,
        }
    }
}

impl AddAssign for PerftInfo {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
    }
}

// Count the number of nodes at a certain depth.
// This ignores higher terminal nodes.
// In other words, it counts the number of paths to the given depth.
pub fn perft(position: Position, ply: PlyKind, threads: usize) -> PerftInfo {
    // Guard easy to calculate inputs.
    if ply == 0 {
        // Ever only 1 position at 0 ply.
        return PerftInfo::new(1, 0);
    } else if ply <= 2 || threads <= 1 {
        // Simple enough to not require threads, or single threaded.
        return perft_recurse(&position, ply);
    }
    debug_assert!(ply > 2);
    debug_assert!(threads > 1);

    let legal_moves = position.legal_moves();
    // Guard no moves to search.
    if legal_moves.is_empty() {
        return PerftInfo::default();
    }

    let legal_moves = Arc::new(Mutex::new(legal_moves));
    let total_perft_info = Arc::new(Mutex::new(PerftInfo::default()));
    let mut handles = Vec::new();

    // Create threads to process partitioned moves.
    for _ in 0..threads {
        let legal_moves = Arc::clone(&legal_moves);
        let total_perft_info = Arc::clone(&total_perft_info);

        let handle = thread::spawn(move || {
            perft_executor(position, ply, legal_moves, total_perft_info);
        });

        handles.push(handle);
    }

    // Wait for all handles to finish, re-raising a worker's panic.
    for handle in handles {
        if let Err(payload) = handle.join() {
            panic::resume_unwind(payload);
        }
    }

    let total = *total_perft_info.lock().unwrap_or_else(PoisonError::into_inner);
    total
}

/// Perft of each root move, in move generation order.
pub fn perft_divide(position: Position, ply: PlyKind) -> Vec<(Move, PerftInfo)> {
    if ply == 0 {
        return Vec::new();
    }
    position
        .legal_moves()
        .into_iter()
        .map(|move_| {
            let child = position.make_move(&move_);
            let info = match ply {
                1 => PerftInfo::new(1, move_.is_capture() as u64),
                _ => perft_recurse(&child, ply - 1),
            };
            (move_, info)
        })
        .collect()
}

/// perft_executor works by stealing one move at a time from given moves list and running perft on that move.
/// When there are no moves left to steal, this function stores the data it has collected so far and returns.
/// params:
/// position - position to evaluate moves on.
/// ply - ply of provided position. Must be greater than 1.
/// moves - synchronous access to list of moves to steal from. Moves must be valid for given position.
/// perft_info - place to store information post execution.
#[inline(always)]
fn perft_executor(
    position: Position,
    ply: PlyKind,
    moves: Arc<Mutex<MoveList>>,
    total_perft_info: Arc<Mutex<PerftInfo>>,
) {
    debug_assert!(ply > 1);
    let steal = || moves.lock().unwrap_or_else(PoisonError::into_inner).pop();
    let mut perft_info = PerftInfo::default();

    while let Some(move_) = steal() {
        perft_info += perft_recurse(&position.make_move(&move_), ply - 1);
    }

    *total_perft_info.lock().unwrap_or_else(PoisonError::into_inner) += perft_info;
}

/// Ply must be non-zero.
fn perft_recurse(position: &Position, ply: PlyKind) -> PerftInfo {
    debug_assert_ne!(ply, 0);
    let legal_moves = position.legal_moves();
    if ply == 1 {
        // If we reach the depth before the end,
        // return the count of legal moves.
        let captures = legal_moves.iter().filter(|move_| move_.is_capture()).count();
        PerftInfo::new(legal_moves.len() as u64, captures as u64)
    } else {
        let mut perft_info = PerftInfo::default();
        for legal_move in legal_moves {
            perft_info += perft_recurse(&position.make_move(&legal_move), ply - 1);
        }
        perft_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_start_position() {
        let pos = Position::start_position();
        assert_eq!(perft(pos, 0, 1).nodes, 1);
        assert_eq!(perft(pos, 1, 1), PerftInfo::new(9, 0));
        assert_eq!(perft(pos, 2, 1).nodes, 81);
    }

    #[test]
    fn threads_agree_with_single_thread() {
        let pos = Position::start_position();
        assert_eq!(perft(pos, 4, 1), perft(pos, 4, 4));
    }

    #[test]
    fn divide_sums_to_perft() {
        let pos = Position::start_position();
        let divided = perft_divide(pos, 3);
        assert_eq!(divided.len(), 9);
        let total: u64 = divided.iter().map(|(_, info)| info.nodes).sum();
        assert_eq!(total, perft(pos, 3, 1).nodes);
    }
}
