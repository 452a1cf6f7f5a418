//! Various lookup tables useful for move generation.

use crate::coretypes::{Direction, Square, NUM_SQUARES, SQUARES_PER_ROW};

///////////////////////////////////
// Pre-generated neighbor lookup
//
// For each square and each of the four diagonal directions, the index of the
// adjacent playable square, or NO_SQUARE when the step leaves the board.
// Arrays are indexed by Square index, then Direction discriminant.

const NO_SQUARE: u8 = u8::MAX;

pub(crate) const NEIGHBORS: [[u8; 4]; NUM_SQUARES] = generate_neighbors();

/// Convenience function for pre-generated lookup array.
#[inline(always)]
pub(crate) fn neighbor(square: Square, direction: Direction) -> Option<Square> {
    match NEIGHBORS[square.idx()][direction.idx()] {
        NO_SQUARE => None,
        idx => Some(Square::new(idx)),
    }
}

const fn generate_neighbors() -> [[u8; 4]; NUM_SQUARES] {
    let mut neighbors = [[NO_SQUARE; 4]; NUM_SQUARES];
    let mut idx = 0;
    while idx < NUM_SQUARES {
        let row = (idx / SQUARES_PER_ROW) as isize;
        let col = (2 * (idx % SQUARES_PER_ROW)) as isize + if row % 2 == 0 { 1 } else { 0 };

        let mut dir = 0;
        while dir < 4 {
            let direction = Direction::ALL[dir];
            let (dr, dc) = direction.delta();
            if let Some(square) = Square::from_coords(row + dr, col + dc) {
                neighbors[idx][dir] = square.idx() as u8;
            }
            dir += 1;
        }
        idx += 1;
    }
    neighbors
}
