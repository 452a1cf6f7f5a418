//! Difficulty levels.
//!
//! Each level fixes the search depth, the quiescence depth, the base thinking
//! time, a playing personality and how much random noise is added to root move
//! ordering. Level 6 plays without noise.

use std::convert::TryFrom;
use std::fmt::{self, Display};
use std::time::Duration;

use crate::coretypes::{CpKind, PlyKind};
use crate::error::{self, ErrorKind};

/// Style biases applied to root move ordering, in percent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Personality {
    /// Preference for captures and moves creating threats.
    pub aggression: CpKind,
    /// Preference for moves keeping capture options on the board.
    pub complexity: CpKind,
    /// How much the penalty on materially unsafe moves is softened.
    pub sacrifice: CpKind,
}

/// Fixed parameters of one difficulty level.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LevelSettings {
    pub max_depth: PlyKind,
    pub quiescence_depth: PlyKind,
    pub base_time: Duration,
    pub personality: Personality,
    /// Upper bound of the random bonus added to each root move.
    pub jitter: CpKind,
}

const fn settings(
    max_depth: PlyKind,
    quiescence_depth: PlyKind,
    base_millis: u64,
    (aggression, complexity, sacrifice): (CpKind, CpKind, CpKind),
    jitter: CpKind,
) -> LevelSettings {
    LevelSettings {
        max_depth,
        quiescence_depth,
        base_time: Duration::from_millis(base_millis),
        personality: Personality {
            aggression,
            complexity,
            sacrifice,
        },
        jitter,
    }
}

#[rustfmt::skip]
const LEVELS: [LevelSettings; 6] = [
    settings( 4, 2,    500, (60, 20, 40), 40),
    settings( 6, 3,  1_000, (50, 30, 30), 25),
    settings( 8, 4,  2_000, (40, 40, 20), 15),
    settings(10, 5,  4_000, (35, 50, 15),  8),
    settings(12, 6,  8_000, (30, 60, 10),  3),
    settings(14, 8, 15_000, (25, 70,  5),  0),
];

/// A difficulty level, 1 through 6.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Level(u8);

impl Level {
    pub const MIN: Level = Level(1);
    pub const MAX: Level = Level(6);

    /// Returns the level numbered `level`, if it exists.
    pub fn new(level: u8) -> error::Result<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&level) {
            Ok(Self(level))
        } else {
            Err((ErrorKind::InvalidLevel, level).into())
        }
    }

    pub const fn number(&self) -> u8 {
        self.0
    }

    pub const fn settings(&self) -> &'static LevelSettings {
        &LEVELS[self.0 as usize - 1]
    }

    /// True for the strongest level, which plays deterministically.
    pub const fn is_max(&self) -> bool {
        self.0 == Self::MAX.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Level(3)
    }
}

impl TryFrom<u8> for Level {
    type Error = error::Error;
    fn try_from(level: u8) -> error::Result<Self> {
        Self::new(level)
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_table() {
        let easiest = Level::new(1).unwrap().settings();
        assert_eq!(easiest.max_depth, 4);
        assert_eq!(easiest.quiescence_depth, 2);
        assert_eq!(easiest.base_time, Duration::from_millis(500));
        assert_eq!(easiest.jitter, 40);

        let hardest = Level::MAX.settings();
        assert_eq!(hardest.max_depth, 14);
        assert_eq!(hardest.quiescence_depth, 8);
        assert_eq!(hardest.base_time, Duration::from_secs(15));
        assert_eq!(hardest.jitter, 0);
        assert!(Level::MAX.is_max());
    }

    #[test]
    fn invalid_levels() {
        assert_eq!(Level::new(0).unwrap_err().kind(), ErrorKind::InvalidLevel);
        assert!(Level::new(7).is_err());
        assert!(Level::try_from(6).is_ok());
    }
}
