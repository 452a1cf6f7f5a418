//! Transposition Table.

use std::collections::HashMap;
use std::mem;

use log::trace;

use crate::coretypes::{Cp, Move, PlyKind};
use crate::position::PositionKey;

/// The kind of score stored for a searched node.
/// See [Node Types](https://www.chessprogramming.org/Node_Types).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Bound {
    Exact, // Score is the true value of the node within the searched depth.
    Lower, // Node failed high, the true value is at least the score.
    Upper, // Node failed low, the true value is at most the score.
}

/// Entry contains information about a previously searched position.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Entry {
    pub depth: PlyKind,           // The depth searched to in this Position's subtree.
    pub score: Cp,                // Score of the position for the player to move.
    pub bound: Bound,             // How the score relates to the true value.
    pub best_move: Option<Move>,  // Best move or refutation move.
    pub(crate) last_access: u64,  // Table tick of the latest store or lookup.
    pub(crate) age: u32,          // Evictions this entry has survived.
}

impl Entry {
    /// True if this entry can be returned as the node's value without searching.
    pub fn is_usable(&self, min_depth: PlyKind, alpha: Cp, beta: Cp) -> bool {
        self.depth >= min_depth
            && match self.bound {
                Bound::Exact => true,
                Bound::Lower => self.score >= beta,
                Bound::Upper => self.score <= alpha,
            }
    }

    /// Eviction rank, lowest is evicted first. Recent, deep and young entries are kept.
    fn retention(&self) -> i64 {
        (self.last_access / 1000) as i64 + self.depth as i64 * 10 - self.age as i64 * 5
    }
}

/// Result of a table lookup. An entry which may not cut off the search still
/// carries a best move worth trying first.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Probe {
    pub entry: Entry,
    pub usable: bool,
}

/// Converts a size in Megabytes to a capacity.
fn mb_to_capacity(mb: usize) -> usize {
    let per_entry = mem::size_of::<PositionKey>() + mem::size_of::<Entry>();
    (mb * 1_000_000) / per_entry
}

/// A Transposition Table (tt) memoizing previously searched draughts positions.
///
/// Keys are exact, so unlike a hash indexed table there are no key collisions.
/// When the table is full, the lowest ranked 30% of entries are evicted at once
/// and the survivors grow older.
///
/// Example:
/// ```rust
/// # use damsel_engine::transposition::{Bound, TranspositionTable};
/// # use damsel_engine::position::{Position, PositionOps};
/// # use damsel_engine::coretypes::Cp;
/// let mut tt = TranspositionTable::with_capacity(100);
/// let key = Position::start_position().key();
///
/// tt.store(key, 5, Cp(20), Bound::Exact, None);
/// assert!(tt.lookup(key, 5, -Cp::INFINITY, Cp::INFINITY).unwrap().usable);
/// assert!(!tt.lookup(key, 6, -Cp::INFINITY, Cp::INFINITY).unwrap().usable);
/// ```
#[derive(Debug, Clone)]
pub struct TranspositionTable {
    max_capacity: usize,
    transpositions: HashMap<PositionKey, Entry>,
    tick: u64,
    hits: u64,
    stores: u64,
}

impl TranspositionTable {
    pub const DEFAULT_MAX_CAPACITY: usize = 100_000;
    /// Share of entries removed by a single eviction, in percent.
    const EVICT_PERCENT: usize = 30;

    /// Returns a new TranspositionTable with the default max capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_CAPACITY)
    }

    /// Returns a new TranspositionTable holding up to `max_capacity` entries.
    pub fn with_capacity(max_capacity: usize) -> Self {
        assert!(max_capacity > 0, "max capacity is not greater than 0");
        Self {
            max_capacity,
            transpositions: HashMap::new(),
            tick: 0,
            hits: 0,
            stores: 0,
        }
    }

    /// Returns a new TranspositionTable with capacity calculated to fill given Megabytes.
    pub fn with_mb(mb: usize) -> Self {
        Self::with_capacity(mb_to_capacity(mb).max(1))
    }

    /// Returns the capacity of the TranspositionTable.
    pub fn capacity(&self) -> usize {
        self.max_capacity
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.transpositions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transpositions.is_empty()
    }

    /// Lookups which found an entry since the table was created or cleared.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Stores which wrote an entry since the table was created or cleared.
    pub fn stores(&self) -> u64 {
        self.stores
    }

    /// Removes all items from TranspositionTable.
    pub fn clear(&mut self) {
        self.transpositions.clear();
        self.tick = 0;
        self.hits = 0;
        self.stores = 0;
    }

    /// Returns true if TranspositionTable contains a given key.
    pub fn contains(&self, key: &PositionKey) -> bool {
        self.transpositions.contains_key(key)
    }

    /// Returns the entry for `key` without touching its recency.
    pub fn get(&self, key: &PositionKey) -> Option<&Entry> {
        self.transpositions.get(key)
    }

    /// Look up a position. Any existing entry is returned, flagged usable only if
    /// it is deep enough and its bound is conclusive within the window (alpha, beta).
    pub fn lookup(&mut self, key: PositionKey, min_depth: PlyKind, alpha: Cp, beta: Cp) -> Option<Probe> {
        self.tick += 1;
        let tick = self.tick;
        let entry = self.transpositions.get_mut(&key)?;
        entry.last_access = tick;
        self.hits += 1;

        Some(Probe {
            usable: entry.is_usable(min_depth, alpha, beta),
            entry: entry.clone(),
        })
    }

    /// Store a search result. New keys are always inserted. An existing entry is
    /// replaced only by a strictly deeper result, or an equally deep exact one.
    pub fn store(
        &mut self,
        key: PositionKey,
        depth: PlyKind,
        score: Cp,
        bound: Bound,
        best_move: Option<Move>,
    ) {
        self.tick += 1;
        let tick = self.tick;

        if let Some(slotted) = self.transpositions.get_mut(&key) {
            let replaces = depth > slotted.depth || (depth == slotted.depth && bound == Bound::Exact);
            if replaces {
                *slotted = Entry {
                    depth,
                    score,
                    bound,
                    best_move,
                    last_access: tick,
                    age: 0,
                };
                self.stores += 1;
            }
            return;
        }

        if self.transpositions.len() >= self.max_capacity {
            self.evict();
        }
        self.transpositions.insert(
            key,
            Entry {
                depth,
                score,
                bound,
                best_move,
                last_access: tick,
                age: 0,
            },
        );
        self.stores += 1;
    }

    /// Remove the lowest ranked share of entries, and age every survivor.
    fn evict(&mut self) {
        let mut ranked: Vec<(i64, PositionKey)> = self
            .transpositions
            .iter()
            .map(|(key, entry)| (entry.retention(), *key))
            .collect();
        ranked.sort_unstable_by_key(|(retention, _)| *retention);

        let num_evicted = (ranked.len() * Self::EVICT_PERCENT / 100).max(1);
        for (_, key) in ranked.iter().take(num_evicted) {
            self.transpositions.remove(key);
        }
        for entry in self.transpositions.values_mut() {
            entry.age += 1;
        }
        trace!(
            "transposition table evicted {} entries, {} remain",
            num_evicted,
            self.transpositions.len()
        );
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::{Color, Piece, PieceKind, Square};
    use crate::position::{Position, PositionOps};

    fn sq(pdn: u8) -> Square {
        Square::from_pdn(pdn).unwrap()
    }

    fn keys(n: usize) -> Vec<PositionKey> {
        // Distinct positions from placing a lone king on different squares.
        Square::iter()
            .filter(|square| square.pdn() != 5)
            .take(n)
            .map(|square| {
                let mut position = Position::empty(Color::White);
                position.set_piece(sq(5), Some(Piece::new(Color::Black, PieceKind::Man)));
                position.set_piece(square, Some(Piece::new(Color::White, PieceKind::King)));
                position.key()
            })
            .collect()
    }

    #[test]
    fn store_then_lookup() {
        let mut tt = TranspositionTable::new();
        let key = Position::start_position().key();
        let best = Move::quiet(sq(32), sq(28));

        tt.store(key, 5, Cp(37), Bound::Exact, Some(best.clone()));
        let probe = tt.lookup(key, 5, -Cp::INFINITY, Cp::INFINITY).unwrap();
        assert!(probe.usable);
        assert_eq!(probe.entry.score, Cp(37));
        assert_eq!(probe.entry.best_move, Some(best.clone()));

        let probe = tt.lookup(key, 6, -Cp::INFINITY, Cp::INFINITY).unwrap();
        assert!(!probe.usable);
        assert_eq!(probe.entry.best_move, Some(best));

        let other = Position::start_position().make_null_move().key();
        assert_eq!(tt.lookup(other, 0, -Cp::INFINITY, Cp::INFINITY), None);
        assert_eq!(tt.hits(), 2);
    }

    #[test]
    fn bounds_respect_window() {
        let mut tt = TranspositionTable::new();
        let key = Position::start_position().key();

        tt.store(key, 4, Cp(50), Bound::Lower, None);
        assert!(tt.lookup(key, 4, Cp(0), Cp(40)).unwrap().usable);
        assert!(!tt.lookup(key, 4, Cp(0), Cp(60)).unwrap().usable);

        tt.clear();
        tt.store(key, 4, Cp(-50), Bound::Upper, None);
        assert!(tt.lookup(key, 4, Cp(-40), Cp(0)).unwrap().usable);
        assert!(!tt.lookup(key, 4, Cp(-60), Cp(0)).unwrap().usable);
    }

    #[test]
    fn replacement_prefers_depth_then_exact() {
        let mut tt = TranspositionTable::new();
        let key = Position::start_position().key();

        tt.store(key, 4, Cp(10), Bound::Lower, None);
        tt.store(key, 3, Cp(20), Bound::Exact, None);
        assert_eq!(tt.get(&key).unwrap().score, Cp(10));

        tt.store(key, 4, Cp(30), Bound::Upper, None);
        assert_eq!(tt.get(&key).unwrap().score, Cp(10));

        tt.store(key, 4, Cp(40), Bound::Exact, None);
        assert_eq!(tt.get(&key).unwrap().score, Cp(40));

        tt.store(key, 5, Cp(50), Bound::Upper, None);
        assert_eq!(tt.get(&key).unwrap().score, Cp(50));
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn full_table_evicts_shallow_entries() {
        let keys = keys(11);
        let mut tt = TranspositionTable::with_capacity(10);

        for (depth, key) in keys.iter().take(10).enumerate() {
            tt.store(*key, depth as PlyKind, Cp(0), Bound::Exact, None);
        }
        assert_eq!(tt.len(), 10);

        tt.store(keys[10], 1, Cp(0), Bound::Exact, None);
        assert_eq!(tt.len(), 8);
        assert!(tt.contains(&keys[10]));
        for key in &keys[..3] {
            assert!(!tt.contains(key));
        }
        for key in &keys[3..10] {
            assert_eq!(tt.get(key).unwrap().age, 1);
        }
    }
}
