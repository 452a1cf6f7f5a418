//! Time Management

use std::convert::TryFrom;
use std::time::{Duration, Instant};

use crate::coretypes::PlyKind;
use crate::error::{self, ErrorKind};
use crate::level::LevelSettings;
use crate::movegen as mg;
use crate::position::Position;
use crate::safety;

const OVERHEAD: Duration = Duration::from_millis(10); // Expected amount of time loss in ms.
const MAX_BUDGET_FACTOR: u32 = 3; // Allocations never exceed 3x the level's base time.

// Returns true if the duration since the start of search is gte to the provided time to move.
fn is_out_of_time(start_time: Instant, move_time: Duration) -> bool {
    start_time.elapsed() + OVERHEAD >= move_time
}

/// There are 4 supported search modes, Level, Infinite, Depth, and MoveTime.
/// Level mode: search to the difficulty level's depth within its allocated time.
/// Infinite mode: do not stop searching. Search must be signaled externally to stop.
/// Depth mode: search to a given depth.
/// MoveTime mode: search for a specified time per move.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Mode {
    Level,              // Use the engine's difficulty settings. Requires `level`.
    Infinite,           // Search until told to stop. Requires `infinite`.
    Depth(Depth),       // Search to a given depth. Requires `depth`.
    MoveTime(MoveTime), // Search for a specified amount of time. Requires `movetime`.
}

impl Mode {
    /// Returns a new Infinite Mode.
    pub fn infinite() -> Self {
        Self::Infinite
    }

    /// Returns a new Depth Mode.
    pub fn depth(ply: PlyKind, movetime: Option<Duration>) -> Self {
        Self::Depth(Depth {
            depth: ply,
            movetime,
        })
    }

    /// Returns a new MoveTime mode.
    pub fn movetime(movetime: Duration, ply: Option<PlyKind>) -> Self {
        Self::MoveTime(MoveTime {
            movetime,
            depth: ply,
        })
    }

    /// Resolve this mode into concrete limits for one search.
    /// `allocated` is the level's time allocation for the position being searched.
    pub fn limits(&self, settings: &LevelSettings, allocated: Duration) -> Limits {
        match self {
            Mode::Level => Limits::new(settings.max_depth, Some(allocated), true)
                .with_ceiling(settings.base_time * MAX_BUDGET_FACTOR),
            Mode::Infinite => Limits::new(PlyKind::MAX, None, false),
            Mode::Depth(depth_mode) => Limits::new(depth_mode.depth, depth_mode.movetime, false),
            Mode::MoveTime(movetime_mode) => Limits::new(
                movetime_mode.depth.unwrap_or(PlyKind::MAX),
                Some(movetime_mode.movetime),
                false,
            ),
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Level
    }
}

/// Raw search parameters, as given on a command line.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct SearchControls {
    pub level: bool,
    pub infinite: bool,
    pub depth: Option<PlyKind>,
    pub move_time: Option<Duration>,
}

impl TryFrom<SearchControls> for Mode {
    type Error = error::Error;
    fn try_from(controls: SearchControls) -> error::Result<Self> {
        if controls.infinite {
            Ok(Mode::Infinite)
        } else if let Some(move_time) = controls.move_time {
            Ok(Mode::movetime(move_time, controls.depth))
        } else if let Some(depth) = controls.depth {
            Ok(Mode::depth(depth, controls.move_time))
        } else if controls.level {
            Ok(Mode::Level)
        } else {
            Err(ErrorKind::ModeNotSatisfied.into())
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Depth {
    pub depth: PlyKind,
    movetime: Option<Duration>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MoveTime {
    movetime: Duration,
    depth: Option<PlyKind>,
}

/// Concrete stopping conditions of a running search.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Limits {
    pub max_depth: PlyKind,
    pub movetime: Option<Duration>,
    extendable: bool,
    ceiling: Option<Duration>, // Extensions never grow movetime past this.
}

impl Limits {
    pub fn new(max_depth: PlyKind, movetime: Option<Duration>, extendable: bool) -> Self {
        Self {
            max_depth,
            movetime,
            extendable,
            ceiling: None,
        }
    }

    /// Cap the time an extension may grow the budget to.
    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    /// Returns true if the search must stop immediately.
    pub fn is_out_of_time(&self, start_time: Instant) -> bool {
        self.movetime
            .map_or(false, |movetime| is_out_of_time(start_time, movetime))
    }

    /// Returns true if an iteration at depth `ply` should not be started.
    /// A new iteration is not started once half of the time budget is used,
    /// since it is unlikely to complete.
    pub fn stop(&self, ply: PlyKind, start_time: Instant) -> bool {
        if ply > self.max_depth {
            return true;
        }
        match self.movetime {
            Some(movetime) => is_out_of_time(start_time, movetime / 2),
            None => false,
        }
    }

    /// Grow the time budget by half, once, without passing the ceiling.
    /// Returns true if the budget grew.
    pub fn extend(&mut self) -> bool {
        match (self.extendable, self.movetime) {
            (true, Some(movetime)) => {
                self.extendable = false;
                let extended = movetime * 3 / 2;
                let extended = self.ceiling.map_or(extended, |ceiling| extended.min(ceiling));
                self.movetime = Some(extended.max(movetime));
                extended > movetime
            }
            _ => false,
        }
    }
}

/// Time allocated to a move by a difficulty level.
///
/// The base time is scaled down in the opening, and up in the endgame and
/// in positions rich in captures or holding a combination, up to 3x the base.
pub fn allocate(settings: &LevelSettings, position: &Position, game_ply: usize) -> Duration {
    let base = settings.base_time;
    let mut percent: u32 = 100;

    if game_ply < 10 {
        percent = percent * 50 / 100;
    } else if game_ply < 20 {
        percent = percent * 75 / 100;
    }

    if position.total_pieces() <= 10 {
        percent = percent * 150 / 100;
    }

    if position.has_captures() {
        let captures = mg::capture_moves(position, position.player());
        let longest = captures.first().map_or(0, |move_| move_.num_captures()) as u32;
        let richness = (captures.len() as u32 * 10 + longest.saturating_sub(1) * 15).min(50);
        percent = percent * (100 + richness) / 100;
    }

    if safety::find_combination(position).is_some() {
        percent = percent * 120 / 100;
    }

    let percent = percent.min(MAX_BUDGET_FACTOR * 100);
    base * percent / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;
    use crate::level::Level;

    #[test]
    fn mode_from_controls() {
        let controls = SearchControls {
            depth: Some(6),
            ..Default::default()
        };
        assert_eq!(Mode::try_from(controls).unwrap(), Mode::depth(6, None));

        let controls = SearchControls {
            depth: Some(6),
            move_time: Some(Duration::from_millis(100)),
            ..Default::default()
        };
        assert!(matches!(Mode::try_from(controls), Ok(Mode::MoveTime(_))));

        let controls = SearchControls {
            level: true,
            ..Default::default()
        };
        assert_eq!(Mode::try_from(controls).unwrap(), Mode::Level);

        let err = Mode::try_from(SearchControls::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModeNotSatisfied);
    }

    #[test]
    fn opening_moves_are_quick() {
        let settings = Level::new(3).unwrap().settings();
        let start = Position::start_position();
        assert_eq!(allocate(settings, &start, 0), Duration::from_secs(1));
        assert_eq!(allocate(settings, &start, 12), Duration::from_millis(1500));
        assert_eq!(allocate(settings, &start, 30), Duration::from_secs(2));
    }

    #[test]
    fn allocation_is_capped() {
        let settings = Level::new(1).unwrap().settings();
        // Few pieces and several long captures available.
        let pos = Position::parse_fen("W:WK46,K50:B28,10,39,17").unwrap();
        let allocated = allocate(settings, &pos, 60);
        assert!(allocated > settings.base_time);
        assert!(allocated <= settings.base_time * 3);
    }

    #[test]
    fn extend_once() {
        let mut limits = Limits::new(10, Some(Duration::from_secs(2)), true);
        assert!(limits.extend());
        assert_eq!(limits.movetime, Some(Duration::from_secs(3)));
        assert!(!limits.extend());

        let mut fixed = Mode::movetime(Duration::from_secs(1), None)
            .limits(Level::default().settings(), Duration::from_secs(5));
        assert!(!fixed.extend());
        assert_eq!(fixed.max_depth, PlyKind::MAX);
    }

    #[test]
    fn extension_respects_budget_cap() {
        let settings = Level::new(2).unwrap().settings();
        let cap = settings.base_time * 3;

        let mut capped = Mode::Level.limits(settings, cap);
        assert!(!capped.extend());
        assert_eq!(capped.movetime, Some(cap));

        let mut limits = Mode::Level.limits(settings, settings.base_time * 5 / 2);
        assert!(limits.extend());
        assert_eq!(limits.movetime, Some(cap));

        let mut limits = Mode::Level.limits(settings, settings.base_time);
        assert!(limits.extend());
        assert_eq!(limits.movetime, Some(settings.base_time * 3 / 2));
    }

    #[test]
    fn depth_limit_stops_iterations() {
        let limits = Mode::depth(4, None).limits(Level::default().settings(), Duration::from_secs(1));
        let start = Instant::now();
        assert!(!limits.stop(4, start));
        assert!(limits.stop(5, start));
        assert!(!limits.is_out_of_time(start));
    }
}
