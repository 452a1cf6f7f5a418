//! Memo tables consulted by search.

use crate::coretypes::{Cp, Move, PlyKind};
use crate::evaluation::EvalCache;
use crate::position::{Position, PositionKey};
use crate::transposition::{Bound, Probe, TranspositionTable};

/// The memoization search relies on: transposition lookups and stores, and
/// memoized static evaluation.
pub trait Cache {
    /// Look up a searched node. See [`TranspositionTable::lookup`].
    fn probe(&mut self, key: PositionKey, depth: PlyKind, alpha: Cp, beta: Cp) -> Option<Probe>;
    /// Record a searched node. See [`TranspositionTable::store`].
    fn store(&mut self, key: PositionKey, depth: PlyKind, score: Cp, bound: Bound, best_move: Option<Move>);
    /// Static evaluation relative to the player to move.
    fn evaluate(&mut self, position: &Position) -> Cp;
}

/// The transposition table and evaluation cache of one engine.
#[derive(Debug, Clone, Default)]
pub struct Caches {
    pub tt: TranspositionTable,
    pub evals: EvalCache,
}

impl Caches {
    pub fn new(tt: TranspositionTable, evals: EvalCache) -> Self {
        Self { tt, evals }
    }

    pub fn clear(&mut self) {
        self.tt.clear();
        self.evals.clear();
    }
}

impl Cache for Caches {
    fn probe(&mut self, key: PositionKey, depth: PlyKind, alpha: Cp, beta: Cp) -> Option<Probe> {
        self.tt.lookup(key, depth, alpha, beta)
    }

    fn store(&mut self, key: PositionKey, depth: PlyKind, score: Cp, bound: Bound, best_move: Option<Move>) {
        self.tt.store(key, depth, score, bound, best_move);
    }

    fn evaluate(&mut self, position: &Position) -> Cp {
        self.evals.evaluate(position)
    }
}
