//! State threaded through one top-level search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::coretypes::PlyKind;
use crate::moveorder::{HistoryTable, KillerMoves};
use crate::search::{Cache, History};
use crate::timeman::Limits;

/// The wall clock is only read once every this many nodes.
pub const CLOCK_CHECK_INTERVAL: u64 = 2048;

/// Node counters of one search.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct SearchStats {
    /// All visited nodes, main search and quiescence.
    pub nodes: u64,
    /// Nodes visited in quiescence search.
    pub q_nodes: u64,
    /// Nodes where a beta-cutoff was performed.
    pub cut_nodes: u64,
    /// Nodes that improved alpha without reaching beta.
    pub pv_nodes: u64,
    /// Nodes that did not improve alpha or result in a cutoff.
    pub all_nodes: u64,
    /// Positions found in the transposition table.
    pub tt_hits: u64,
    /// Table hits whose score was returned immediately.
    pub tt_cuts: u64,
}

/// Everything a search needs beyond the position being searched.
/// Passed by `&mut` through every recursive call.
pub struct SearchContext<'a> {
    pub(crate) cache: &'a mut dyn Cache,
    pub(crate) killers: &'a mut KillerMoves,
    pub(crate) history: &'a mut HistoryTable,
    /// Keys of the positions leading to the current node.
    pub(crate) repetitions: History,
    pub(crate) stopper: &'a AtomicBool,
    pub(crate) limits: Limits,
    pub(crate) start_time: Instant,
    pub(crate) quiescence_depth: PlyKind,
    pub(crate) stats: SearchStats,
}

impl<'a> SearchContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cache: &'a mut dyn Cache,
        killers: &'a mut KillerMoves,
        history: &'a mut HistoryTable,
        repetitions: History,
        stopper: &'a AtomicBool,
        limits: Limits,
        start_time: Instant,
        quiescence_depth: PlyKind,
    ) -> Self {
        Self {
            cache,
            killers,
            history,
            repetitions,
            stopper,
            limits,
            start_time,
            quiescence_depth,
            stats: SearchStats::default(),
        }
    }

    /// True once the search was aborted, externally or by running out of time.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopper.load(Ordering::Relaxed)
    }

    /// Raise the abort flag.
    pub fn stop(&self) {
        self.stopper.store(true, Ordering::Relaxed);
    }

    /// Periodic clock check, stopping the search once its time is up.
    #[inline]
    pub(crate) fn check_clock(&self) {
        if self.stats.nodes % CLOCK_CHECK_INTERVAL == 0 && self.limits.is_out_of_time(self.start_time) {
            self.stop();
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }
}
