//! Search functions.

mod cache;
mod context;
mod history;
mod ids;
mod negamax;
mod quiescence;

pub use cache::*;
pub use context::*;
pub use history::*;
pub use ids::*;
pub use negamax::REPETITION_SCORE;

pub(crate) use negamax::negamax;
pub(crate) use quiescence::quiescence;

use std::fmt::{self, Display};
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::arrayvec::display;
use crate::book::NoBook;
use crate::coretypes::{Color, Cp, Move, PlyKind};
use crate::game::Game;
use crate::level::Level;
use crate::movelist::Line;
use crate::moveorder::{HistoryTable, KillerMoves};
use crate::timeman::Mode;

/// How the move of a search was chosen.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Decision {
    /// The player to move has no legal moves and has lost.
    NoLegalMoves,
    /// Exactly one legal move, played without searching.
    OnlyMove,
    /// A capture clearly better than all others, played without searching.
    ForcedCapture,
    /// Taken from the opening book.
    Book,
    /// Found by iterative deepening.
    Search,
    /// Search preferred an unsafe move, replaced by the safest move.
    SafetyFallback,
}

/// The results found from running a search on some root position.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The best move to make for a position discovered from search, None if the position is lost.
    pub best_move: Option<Move>,
    /// The score of making the best move, with absolute Cp (+White, -Black).
    pub score: Cp,
    /// The principal variation, or a sequence of the best moves that result in an evaluation of at least `score` Cp.
    pub pv: Line,
    /// The player to move for the root position that was searched.
    pub player: Color,
    /// Depth in plies of the last completed iteration.
    pub depth: PlyKind,
    /// Total number of nodes visited in a search, including main search nodes and quiescence nodes.
    pub nodes: u64,
    /// Total number of nodes visited in a quiescence search.
    pub q_nodes: u64,
    /// Total time elapsed from the start to the end of a search.
    pub elapsed: Duration,
    /// Flag that indicates this search was aborted or ran out of time.
    pub stopped: bool,

    /// Number of nodes where a beta-cutoff was performed.
    pub cut_nodes: u64,
    /// Number of nodes that improved local alpha value without reaching beta.
    pub pv_nodes: u64,
    /// Number of nodes that did not improve alpha or result in a cutoff.
    pub all_nodes: u64,
    /// Number of times a position was found in the transposition table.
    pub tt_hits: u64,
    /// Number of times a tt hit score could be used and returned immediately.
    pub tt_cuts: u64,

    pub decision: Decision,
}

impl SearchResult {
    /// Result of a search decided before any tree search was run.
    pub(crate) fn immediate(
        player: Color,
        best_move: Option<Move>,
        decision: Decision,
        start_time: Instant,
    ) -> Self {
        let score = match decision {
            Decision::NoLegalMoves => Cp::mated_in(0) * player.sign(),
            _ => Cp(0),
        };
        let mut pv = Line::new();
        pv.extend(best_move.clone());
        Self {
            best_move,
            score,
            pv,
            player,
            elapsed: start_time.elapsed(),
            decision,
            ..Self::default()
        }
    }

    /// Get average nodes per second of search.
    pub fn nps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.nodes as f64 / secs).round()
        } else {
            0.0
        }
    }

    /// Returns the percentage of tt hits that result in tt cuts.
    pub fn tt_cut_ratio(&self) -> f64 {
        if self.tt_hits == 0 {
            return 0.0;
        }
        self.tt_cuts as f64 / self.tt_hits as f64
    }

    /// Converts the score of the search into one that is relative to search's root player.
    pub fn relative_score(&self) -> Cp {
        self.score * self.player.sign()
    }

    /// Converts the score of the search into one that is absolute, with White as + and Black as -.
    pub fn absolute_score(&self) -> Cp {
        self.score
    }

    /// Returns the color who is leading in the search of the root position, or None if drawn.
    pub fn leading(&self) -> Option<Color> {
        match self.absolute_score().signum() {
            1 => Some(Color::White),
            -1 => Some(Color::Black),
            _ => None,
        }
    }
}

/// Note that this default does not represent any actual search.
impl Default for SearchResult {
    fn default() -> Self {
        Self {
            best_move: None,
            score: Cp(0),
            pv: Line::new(),
            player: Color::White,
            depth: 0,
            nodes: 0,
            q_nodes: 0,
            elapsed: Duration::ZERO,
            stopped: false,
            cut_nodes: 0,
            pv_nodes: 0,
            all_nodes: 0,
            tt_hits: 0,
            tt_cuts: 0,
            decision: Decision::Search,
        }
    }
}

impl Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let best_move = self
            .best_move
            .as_ref()
            .map_or_else(|| "none".to_string(), ToString::to_string);

        let mut displayed = String::new();
        displayed.push_str("SearchResult {\n");
        displayed.push_str(&format!("    best_move: {}\n", best_move));
        displayed.push_str(&format!("    decision : {:?}\n", self.decision));
        displayed.push_str(&format!("    abs_score: {}\n", self.absolute_score()));
        displayed.push_str(&format!("    pv       : {}\n", display(&self.pv)));
        displayed.push_str(&format!("    player   : {}\n", self.player));
        displayed.push_str(&format!("    depth    : {}\n", self.depth));
        displayed.push_str(&format!("    nodes    : {}\n", self.nodes));
        displayed.push_str(&format!("    q_nodes  : {}\n", self.q_nodes));
        displayed.push_str(&format!("    nps      : {}\n", self.nps()));
        displayed.push_str(&format!(
            "    elapsed  : {}.{:03}s\n",
            self.elapsed.as_secs(),
            self.elapsed.subsec_millis()
        ));
        displayed.push_str(&format!("    stopped  : {}\n", self.stopped));
        displayed.push_str(&format!("    pv_nodes : {}\n", self.pv_nodes));
        displayed.push_str(&format!("    cut_nodes: {}\n", self.cut_nodes));
        displayed.push_str(&format!("    all_nodes: {}\n", self.all_nodes));
        displayed.push_str(&format!("    tt_cuts  : {}\n", self.tt_cuts));
        displayed.push_str(&format!("    tt_hits  : {}\n", self.tt_hits));
        displayed.push_str(&format!("    tt_ratio : {:.2}\n", self.tt_cut_ratio()));
        displayed.push_str("}\n");

        write!(f, "{displayed}")
    }
}

/// Search a game with fresh tables, no opening book and a fixed seed.
/// Useful when no [`Engine`](crate::engine::Engine) state needs to be kept between moves.
pub fn search(game: &Game, mode: Mode, level: Level) -> SearchResult {
    let mut caches = Caches::default();
    let mut killers = KillerMoves::new();
    let mut history = HistoryTable::new();
    let mut rng = StdRng::seed_from_u64(0);
    let stopper = AtomicBool::new(false);

    let resources = SearchResources {
        cache: &mut caches,
        killers: &mut killers,
        history: &mut history,
        book: &NoBook,
        rng: &mut rng,
        stopper: &stopper,
    };
    ids(game, mode, level, resources, &mut |_| {})
}
