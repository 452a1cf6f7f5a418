//! Engine struct acts as a simplified API for the various parts of the Damsel engine.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::book::{NoBook, OpeningBook};
use crate::coretypes::Move;
use crate::error;
use crate::evaluation::EvalCache;
use crate::game::Game;
use crate::level::Level;
use crate::moveorder::{HistoryTable, KillerMoves};
use crate::search::{self, Caches, Decision, Progress, SearchResources, SearchResult};
use crate::timeman::Mode;
use crate::transposition::TranspositionTable;

/// Callback receiving a report after every completed search iteration.
pub type ProgressCallback = Box<dyn FnMut(&Progress) + Send>;

/// EngineBuilder allows for parameters of an Engine to be set and built once,
/// avoiding repeating costly initialization steps of making then changing an Engine.
///
/// Default values:
///
/// * `level`: 3
/// * `tt_capacity`: 100_000 entries
/// * `eval_cache_limit`: 200_000 entries
/// * `seed`: 0
/// * `book`: no book
/// * `debug`: false
pub struct EngineBuilder {
    level: Level,
    tt_capacity: usize,
    eval_cache_limit: usize,
    seed: u64,
    book: Box<dyn OpeningBook>,
    debug: bool,
}

impl EngineBuilder {
    /// Create a new default EngineBuilder.
    pub fn new() -> Self {
        Self {
            level: Level::default(),
            tt_capacity: TranspositionTable::DEFAULT_MAX_CAPACITY,
            eval_cache_limit: EvalCache::DEFAULT_LIMIT,
            seed: 0,
            book: Box::new(NoBook),
            debug: false,
        }
    }

    /// Create and return a new Engine.
    pub fn build(self) -> Engine {
        Engine {
            level: self.level,
            caches: Caches::new(
                TranspositionTable::with_capacity(self.tt_capacity),
                EvalCache::with_limit(self.eval_cache_limit),
            ),
            killers: KillerMoves::new(),
            history: HistoryTable::new(),
            book: self.book,
            rng: StdRng::seed_from_u64(self.seed),
            seed: self.seed,
            stopper: Arc::new(AtomicBool::new(false)),
            on_progress: None,
            debug: self.debug,
            statistics: Statistics::default(),
        }
    }

    /// Set the engine's initial difficulty level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the maximum number of transposition table entries.
    pub fn tt_capacity(mut self, tt_capacity: usize) -> Self {
        self.tt_capacity = tt_capacity;
        self
    }

    /// Set the transposition table capacity from a size in megabytes.
    pub fn transpositions_mb(mut self, mb: usize) -> Self {
        self.tt_capacity = TranspositionTable::with_mb(mb).capacity();
        self
    }

    /// Set the number of evaluations memoized before the cache is dropped.
    pub fn eval_cache_limit(mut self, eval_cache_limit: usize) -> Self {
        self.eval_cache_limit = eval_cache_limit;
        self
    }

    /// Set the seed of the random root move jitter.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the opening book consulted early in the game.
    pub fn book<B: OpeningBook + 'static>(mut self, book: B) -> Self {
        self.book = Box::new(book);
        self
    }

    /// Set whether the engine logs a full report of every search.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle which aborts the running search of an engine from any thread.
/// The search returns its best move so far.
#[derive(Debug, Clone)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Totals over the searches run since the engine was created or last reset.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Statistics {
    pub searches: u64,
    pub nodes: u64,
    pub q_nodes: u64,
    pub tt_hits: u64,
    pub tt_cuts: u64,
    pub tt_entries: usize,
    pub eval_cache_hits: u64,
    pub eval_cache_misses: u64,
    pub last_depth: u8,
    pub last_decision: Option<Decision>,
}

/// Engine wraps up all parameters required for running any kind of search.
/// It is stateful: the transposition table, evaluation cache and history
/// heuristic carry over between the moves of one game.
///
/// If a new game is going to be started, the engine needs to be told so.
pub struct Engine {
    level: Level,
    caches: Caches,
    killers: KillerMoves,
    history: HistoryTable,
    book: Box<dyn OpeningBook>,
    rng: StdRng,
    seed: u64,
    stopper: Arc<AtomicBool>,
    on_progress: Option<ProgressCallback>,
    debug: bool,
    statistics: Statistics,
}

impl Engine {
    pub fn new() -> Self {
        EngineBuilder::new().build()
    }

    /// Returns the engine's current difficulty level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns reference to current debug flag of engine.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Returns reference to engine's transposition table.
    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.caches.tt
    }

    /// Update the engine's debug parameter.
    pub fn set_debug(&mut self, new_debug: bool) {
        self.debug = new_debug;
    }

    /// Set the difficulty level, 1 through 6.
    pub fn set_difficulty(&mut self, level: u8) -> error::Result<()> {
        self.level = Level::new(level)?;
        debug!("difficulty set to {}", self.level);
        Ok(())
    }

    /// Register a callback receiving progress after each completed iteration.
    pub fn on_progress<F>(&mut self, callback: F)
    where
        F: FnMut(&Progress) + Send + 'static,
    {
        self.on_progress = Some(Box::new(callback));
    }

    /// A handle which can abort this engine's searches from another thread.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle(Arc::clone(&self.stopper))
    }

    /// Informs the active search to stop searching as soon as possible.
    pub fn abort(&self) {
        self.stopper.store(true, Ordering::Relaxed);
    }

    /// Informs engine that next search will be from a new game.
    /// Clears every table and restarts the random jitter sequence.
    pub fn reset_for_new_game(&mut self) {
        self.caches.clear();
        self.killers.clear();
        self.history.clear();
        self.rng = StdRng::seed_from_u64(self.seed);
        self.statistics = Statistics::default();
    }

    /// Totals over the searches run since creation or the last new game.
    pub fn statistics(&self) -> Statistics {
        Statistics {
            tt_entries: self.caches.tt.len(),
            eval_cache_hits: self.caches.evals.hits(),
            eval_cache_misses: self.caches.evals.misses(),
            ..self.statistics
        }
    }

    /// Choose a move for the current position of `game` at the engine's difficulty.
    /// Returns None if the player to move has no legal moves, and so has lost.
    pub fn compute_move(&mut self, game: &Game) -> Option<Move> {
        self.search(game, Mode::Level).best_move
    }

    /// Run a blocking search, returning every detail of it.
    pub fn search(&mut self, game: &Game, mode: Mode) -> SearchResult {
        let mut report = |progress: &Progress| {
            if let Some(callback) = self.on_progress.as_mut() {
                callback(progress);
            }
        };

        let resources = SearchResources {
            cache: &mut self.caches,
            killers: &mut self.killers,
            history: &mut self.history,
            book: self.book.as_ref(),
            rng: &mut self.rng,
            stopper: &self.stopper,
        };
        let result = search::ids(game, mode, self.level, resources, &mut report);

        self.statistics.searches += 1;
        self.statistics.nodes += result.nodes;
        self.statistics.q_nodes += result.q_nodes;
        self.statistics.tt_hits += result.tt_hits;
        self.statistics.tt_cuts += result.tt_cuts;
        self.statistics.last_depth = result.depth;
        self.statistics.last_decision = Some(result.decision);

        if self.debug {
            info!("{}", result);
        }
        result
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Engine")
            .field("level", &self.level)
            .field("tt_entries", &self.caches.tt.len())
            .field("seed", &self.seed)
            .field("debug", &self.debug)
            .finish()
    }
}
