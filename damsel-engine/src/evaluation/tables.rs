//! Piece-square and control tables, indexed by square index from White's point of view.
//! Black reads the mirrored square.

use crate::coretypes::{Color, CpKind, Square, NUM_SQUARES, SQUARES_PER_ROW};

/// Men: advancement towards promotion, favoring the centre files,
/// plus a small guard bonus for staying on the back row.
#[rustfmt::skip]
const MEN_BY_ROW: [[CpKind; SQUARES_PER_ROW]; 10] = [
    [ 0,  0,  0,  0,  0],
    [40, 42, 44, 42, 38],
    [30, 34, 36, 34, 28],
    [20, 26, 30, 28, 18],
    [12, 20, 24, 22, 10],
    [ 8, 16, 20, 18,  6],
    [ 4, 10, 14, 12,  2],
    [ 2,  6,  8,  6,  0],
    [ 0,  4,  4,  2,  0],
    [ 6,  8,  8,  8,  6],
];

pub(crate) const MEN: [CpKind; NUM_SQUARES] = flatten(MEN_BY_ROW);
pub(crate) const KINGS: [CpKind; NUM_SQUARES] = generate_kings();
pub(crate) const CENTER: [CpKind; NUM_SQUARES] = generate_center();

const fn flatten(rows: [[CpKind; SQUARES_PER_ROW]; 10]) -> [CpKind; NUM_SQUARES] {
    let mut table = [0; NUM_SQUARES];
    let mut idx = 0;
    while idx < NUM_SQUARES {
        table[idx] = rows[idx / SQUARES_PER_ROW][idx % SQUARES_PER_ROW];
        idx += 1;
    }
    table
}

/// Distance in rings from the four centre cells, 0 in the centre and 4 on the edge.
pub(crate) const fn ring(square: Square) -> usize {
    let row = (2 * square.row() as isize - 9).abs() as usize / 2;
    let col = (2 * square.col() as isize - 9).abs() as usize / 2;
    if row > col {
        row
    } else {
        col
    }
}

/// Kings: the long diagonal and the double corner diagonals.
const fn generate_kings() -> [CpKind; NUM_SQUARES] {
    let mut table = [0; NUM_SQUARES];
    let mut idx = 0;
    while idx < NUM_SQUARES {
        let square = Square::new(idx as u8);
        let (row, col) = (square.row() as isize, square.col() as isize);
        table[idx] = if row + col == 9 {
            20
        } else if row - col == 1 || col - row == 1 {
            10
        } else {
            0
        };
        idx += 1;
    }
    table
}

const fn generate_center() -> [CpKind; NUM_SQUARES] {
    let mut table = [0; NUM_SQUARES];
    let mut idx = 0;
    while idx < NUM_SQUARES {
        let ring = ring(Square::new(idx as u8));
        table[idx] = if ring < 3 { (3 - ring) as CpKind * 5 } else { 0 };
        idx += 1;
    }
    table
}

/// Index into a White oriented table for a piece of `color` on `square`.
#[inline(always)]
pub(crate) fn oriented(square: Square, color: Color) -> usize {
    match color {
        Color::White => square.idx(),
        Color::Black => square.mirror().idx(),
    }
}

/// King centralization, 32 in the centre down to 0 on the edge.
#[inline(always)]
pub(crate) fn centralization(square: Square) -> CpKind {
    (4 - ring(square) as CpKind) * 8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(pdn: u8) -> Square {
        Square::from_pdn(pdn).unwrap()
    }

    #[test]
    fn rings() {
        assert_eq!(ring(sq(23)), 0);
        assert_eq!(ring(sq(28)), 0);
        assert_eq!(ring(sq(1)), 4);
        assert_eq!(ring(sq(46)), 4);
        assert_eq!(centralization(sq(28)), 32);
        assert_eq!(centralization(sq(5)), 0);
    }

    #[test]
    fn tables_are_mirrored_per_color() {
        assert_eq!(MEN[oriented(sq(6), Color::White)], 40);
        assert_eq!(MEN[oriented(sq(45), Color::Black)], 40);
        assert_eq!(KINGS[sq(46).idx()], 20);
        assert_eq!(KINGS[sq(5).idx()], 20);
        assert_eq!(CENTER[sq(23).idx()], 15);
        assert_eq!(CENTER[sq(1).idx()], 0);
    }
}
