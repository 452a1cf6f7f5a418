//! Diagonal rays used for flying king movement and long range attacks.

use crate::coretypes::{Direction, Square};

/// Iterator over the squares along a diagonal, from the origin exclusive to the board edge.
/// Callers stop at the first blocker themselves, since what counts as a blocker
/// differs between moving, capturing and attack counting.
#[derive(Debug, Clone)]
pub struct Ray {
    next: Option<Square>,
    direction: Direction,
}

impl Iterator for Ray {
    type Item = Square;
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.step(self.direction);
        Some(current)
    }
}

/// Returns the ray leaving `origin` in `direction`.
#[inline(always)]
pub fn ray(origin: Square, direction: Direction) -> Ray {
    Ray {
        next: origin.step(direction),
        direction,
    }
}
