//! Negamax implementation of Minimax with Alpha-Beta pruning.
//!
//! The player whose turn it is to move for a position is always treated as the maxing player.
//! Scores returned are relative to that player, so the score of a child node is negated.

use crate::arrayvec::append;
use crate::coretypes::{Cp, PlyKind, MAX_PLY};
use crate::movegen as mg;
use crate::movelist::Line;
use crate::moveorder::order_moves;
use crate::position::{Position, PositionOps};
use crate::safety;
use crate::search::{is_unrepeatable, quiescence, SearchContext};
use crate::transposition::Bound;

/// Score of a line repeating a position already visited twice.
pub const REPETITION_SCORE: Cp = Cp(-50);

/// Depth reduction of the null move search, on top of the move itself.
const NULL_MOVE_REDUCTION: PlyKind = 2;
const NULL_MOVE_MIN_DEPTH: PlyKind = 3;
const NULL_MOVE_MIN_MOVES: usize = 5;

/// Quiet moves ordered after this many are searched reduced.
const LMR_FULL_MOVES: usize = 3;
/// Moves ordered after this many are reduced twice.
const LMR_DEEP_MOVES: usize = 6;
const LMR_MIN_DEPTH: PlyKind = 3;

/// Interior node search.
///
/// Parameters:
///
/// ctx: shared state of this search.
/// position: current position to search.
/// pv_line: receives the principal variation of this node.
/// depth: remaining depth to search to.
/// ply: distance from the root.
/// alpha: Best (greatest) guaranteed value for current player.
/// beta: Best (lowest) guaranteed value for opposite player.
/// allow_null: false directly below a null move, so two passes are never made in a row.
#[allow(clippy::too_many_arguments)]
pub(crate) fn negamax(
    ctx: &mut SearchContext,
    position: &Position,
    pv_line: &mut Line,
    depth: PlyKind,
    ply: usize,
    mut alpha: Cp,
    beta: Cp,
    allow_null: bool,
) -> Cp {
    ctx.stats.nodes += 1;
    pv_line.clear();

    if ply >= MAX_PLY {
        return ctx.cache.evaluate(position);
    }

    ctx.check_clock();
    if ctx.is_stopped() {
        return Cp(0);
    }

    let key = position.key();
    if ply > 0 && ctx.repetitions.is_threefold_repetition(key) {
        return REPETITION_SCORE;
    }

    if depth == 0 {
        return quiescence(ctx, position, alpha, beta, ply, 0);
    }

    // Cached best moves are only ordering hints. Legality comes from the move generator.
    let mut hash_move = None;
    if let Some(probe) = ctx.cache.probe(key, depth, alpha, beta) {
        ctx.stats.tt_hits += 1;
        let mut entry = probe.entry;
        entry.score = entry.score.from_tt(ply);
        if ply > 0 && entry.is_usable(depth, alpha, beta) {
            ctx.stats.tt_cuts += 1;
            return entry.score;
        }
        hash_move = entry.best_move;
    }

    let legal_moves = position.legal_moves();
    if legal_moves.is_empty() {
        return Cp::mated_in(ply);
    }

    let us = position.player();
    let captures_pending = legal_moves[0].is_capture() || mg::has_captures(position, !us);
    if allow_null
        && ply > 0
        && depth >= NULL_MOVE_MIN_DEPTH
        && legal_moves.len() > NULL_MOVE_MIN_MOVES
        && !captures_pending
    {
        let passed = position.make_null_move();
        let mut null_pv = Line::new();
        let null_beta = -beta + Cp(1);
        let score = -negamax(
            ctx,
            &passed,
            &mut null_pv,
            depth - 1 - NULL_MOVE_REDUCTION.min(depth - 1),
            ply + 1,
            -beta,
            null_beta,
            false,
        );
        if ctx.is_stopped() {
            return Cp(0);
        }
        if score >= beta {
            return beta;
        }
    }

    let ordered_moves = order_moves(
        position,
        legal_moves,
        hash_move.as_ref(),
        &*ctx.killers,
        &*ctx.history,
        ply,
    );

    let original_alpha = alpha;
    let mut best_score = -Cp::INFINITY;
    let mut best_move = None;
    let mut local_pv = Line::new();

    for (index, scored) in ordered_moves.into_iter().enumerate() {
        let move_ = scored.move_;
        let child = position.make_move(&move_);

        let reduction = if index >= LMR_FULL_MOVES
            && depth >= LMR_MIN_DEPTH
            && !move_.is_capture()
            && !safety::creates_threat(position, &move_)
        {
            let reduction = if index >= LMR_DEEP_MOVES { 2 } else { 1 };
            reduction.min(depth - 1)
        } else {
            0
        };

        ctx.repetitions.push(key, is_unrepeatable(position, &move_));
        let mut score = -negamax(
            ctx,
            &child,
            &mut local_pv,
            depth - 1 - reduction,
            ply + 1,
            -beta,
            -alpha,
            true,
        );
        if reduction > 0 && score > alpha && !ctx.is_stopped() {
            score = -negamax(ctx, &child, &mut local_pv, depth - 1, ply + 1, -beta, -alpha, true);
        }
        ctx.repetitions.pop();

        if ctx.is_stopped() {
            return Cp(0);
        }

        if score > best_score {
            best_score = score;
            best_move = Some(move_.clone());
        }

        if score > alpha {
            alpha = score;
            pv_line.clear();
            pv_line.push(move_.clone());
            append(pv_line, local_pv.clone());
        }

        // Cut-off has occurred, no further children of this position need to be searched.
        if alpha >= beta {
            ctx.killers.store(ply, &move_);
            ctx.history.update(&move_, depth as u32);
            break;
        }
    }

    let bound = if best_score >= beta {
        ctx.stats.cut_nodes += 1;
        Bound::Lower
    } else if best_score > original_alpha {
        ctx.stats.pv_nodes += 1;
        Bound::Exact
    } else {
        ctx.stats.all_nodes += 1;
        Bound::Upper
    };
    ctx.cache.store(key, depth, best_score.to_tt(ply), bound, best_move);

    best_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::EvalCache;
    use crate::fen::Fen;
    use crate::moveorder::{HistoryTable, KillerMoves};
    use crate::search::{Caches, History};
    use crate::timeman::Limits;
    use crate::transposition::TranspositionTable;
    use std::sync::atomic::AtomicBool;
    use std::time::Instant;

    fn search(position: &Position, depth: PlyKind, history: History) -> (Cp, Line) {
        let mut caches = Caches::new(TranspositionTable::with_capacity(10_000), EvalCache::new());
        search_at(&mut caches, position, depth, 0, history)
    }

    fn search_at(
        caches: &mut Caches,
        position: &Position,
        depth: PlyKind,
        ply: usize,
        history: History,
    ) -> (Cp, Line) {
        let mut killers = KillerMoves::new();
        let mut table = HistoryTable::new();
        let stopper = AtomicBool::new(false);
        let mut ctx = SearchContext::new(
            caches,
            &mut killers,
            &mut table,
            history,
            &stopper,
            Limits::new(depth, None, false),
            Instant::now(),
            4,
        );
        let mut pv = Line::new();
        let score = negamax(&mut ctx, position, &mut pv, depth, ply, -Cp::INFINITY, Cp::INFINITY, true);
        (score, pv)
    }

    #[test]
    fn lost_position_scores_mate() {
        // White is blocked in.
        let pos = Position::parse_fen("W:W46:B41,37").unwrap();
        assert!(pos.is_lost());
        let (score, pv) = search(&pos, 3, History::empty());
        assert_eq!(score, Cp::mated_in(0));
        assert!(pv.is_empty());
    }

    #[test]
    fn finds_winning_capture() {
        let pos = Position::parse_fen("W:W28,45:B23,5").unwrap();
        let (score, pv) = search(&pos, 3, History::empty());
        assert!(score > Cp(50));
        assert_eq!(pv[0].to_string(), "28x19");
    }

    #[test]
    fn cached_mate_keeps_distance_from_node() {
        // 28x19 takes the last black man.
        let pos = Position::parse_fen("W:W28,45:B23").unwrap();
        let mut caches = Caches::default();
        let (at_root, _) = search_at(&mut caches, &pos, 3, 0, History::empty());
        assert_eq!(at_root, -Cp::mated_in(1));

        let (cached, _) = search_at(&mut caches, &pos, 3, 2, History::empty());
        let (fresh, _) = search_at(&mut Caches::default(), &pos, 3, 2, History::empty());
        assert_eq!(fresh, -Cp::mated_in(3));
        assert_eq!(cached, fresh);
    }

    #[test]
    fn aborted_search_returns_neutral() {
        let pos = Position::start_position();
        let mut caches = Caches::default();
        let mut killers = KillerMoves::new();
        let mut table = HistoryTable::new();
        let stopper = AtomicBool::new(true);
        let mut ctx = SearchContext::new(
            &mut caches,
            &mut killers,
            &mut table,
            History::empty(),
            &stopper,
            Limits::new(6, None, false),
            Instant::now(),
            4,
        );
        let mut pv = Line::new();
        let score = negamax(&mut ctx, &pos, &mut pv, 6, 0, -Cp::INFINITY, Cp::INFINITY, true);
        assert_eq!(score, Cp(0));
        assert!(pv.is_empty());
    }
}
