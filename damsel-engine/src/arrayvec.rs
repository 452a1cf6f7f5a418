//! Array Vector Types
//!
//! Fixed capacity vectors used for capture lists and principal variations.

pub use ::arrayvec::ArrayVec;

use std::fmt::Display;

/// Returns a string with the displayed string format of an ArrayVec.
/// Display cannot be implemented on external types, so this stands in for it.
pub fn display<T: Display, const CAP: usize>(arrayvec: &ArrayVec<T, CAP>) -> String {
    let mut displayed = String::new();
    for item in arrayvec.iter() {
        displayed.push_str(&item.to_string());
        displayed.push(' ');
    }
    displayed.pop();

    displayed
}

/// Appends items of other to the ArrayVec until it is full.
pub fn append<T, const CAP: usize>(vec: &mut ArrayVec<T, CAP>, other: ArrayVec<T, CAP>) {
    for item in other {
        if vec.try_push(item).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_with_spaces() {
        let mut items: ArrayVec<u8, 4> = ArrayVec::new();
        assert_eq!(display(&items), "");
        items.push(1);
        items.push(2);
        assert_eq!(display(&items), "1 2");
    }

    #[test]
    fn append_stops_at_capacity() {
        let mut items: ArrayVec<u8, 3> = ArrayVec::new();
        items.push(1);
        let other: ArrayVec<u8, 3> = [2, 3, 4].into_iter().collect();
        append(&mut items, other);
        assert_eq!(items.as_slice(), &[1, 2, 3]);
    }
}
