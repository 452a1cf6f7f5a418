//! Bitboard
//!
//! A set of playable squares packed into the low 50 bits of a u64,
//! bit `n` standing for the square with index `n` (PDN number `n + 1`).

use std::fmt::{self, Display};
use std::iter::FromIterator;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, Not};

use crate::coretypes::{Square, NUM_SQUARES};

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Bitboard(pub(crate) u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const FULL: Bitboard = Bitboard((1u64 << NUM_SQUARES) - 1);

    pub const fn bits(&self) -> u64 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn has_square(&self, square: Square) -> bool {
        self.0 & (1u64 << square.idx()) != 0
    }

    pub fn set_square(&mut self, square: Square) {
        self.0 |= 1u64 << square.idx();
    }

    pub fn clear_square(&mut self, square: Square) {
        self.0 &= !(1u64 << square.idx());
    }

    pub const fn count_squares(&self) -> u32 {
        self.0.count_ones()
    }

    /// Lowest-indexed square in the set, if any.
    pub fn get_lowest_square(&self) -> Option<Square> {
        (!self.is_empty()).then(|| Square::new(self.0.trailing_zeros() as u8))
    }

    /// Iterate contained squares in ascending order.
    pub fn squares(&self) -> BitboardSquares {
        BitboardSquares(self.0)
    }
}

pub struct BitboardSquares(u64);

impl Iterator for BitboardSquares {
    type Item = Square;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let idx = self.0.trailing_zeros();
        self.0 &= self.0 - 1;
        Some(Square::new(idx as u8))
    }
}

impl From<Square> for Bitboard {
    fn from(square: Square) -> Self {
        Bitboard(1u64 << square.idx())
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut bb = Bitboard::EMPTY;
        for square in iter {
            bb.set_square(square);
        }
        bb
    }
}

impl BitOr for Bitboard {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}
impl BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
impl BitAnd for Bitboard {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}
impl BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}
impl BitXor for Bitboard {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}
impl Not for Bitboard {
    type Output = Self;
    fn not(self) -> Self::Output {
        Self(!self.0 & Self::FULL.0)
    }
}

impl Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let squares: Vec<String> = self.squares().map(|sq| sq.to_string()).collect();
        write!(f, "{{{}}}", squares.join(","))
    }
}
