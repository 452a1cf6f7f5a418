//! Quiescence Search
//!
//! When a position is being searched, nodes at the final depth (leaf nodes)
//! can be either terminal or non-terminal.
//! Terminal nodes get an absolute score. Non-terminal nodes are scored
//! according to a static evaluation function that provides a best guess at to
//! that node's value.
//!
//! Statically evaluating non-terminal leaf nodes leads to the horizon effect.
//! An engine may see a leaf node where a man takes a king as a winning position,
//! while right over the horizon the capturing man is taken back along with two more.
//!
//! To reduce this horizon effect, a quiescence search is used in place of
//! a direct static evaluation of a leaf node.
//! Quiescence search searches a small sub-tree of captures below the leaf node,
//! so the evaluation of the original leaf node is more stable.

use crate::coretypes::{Cp, PieceKind, PlyKind, MAX_PLY};
use crate::position::{Position, PositionOps};
use crate::safety;
use crate::search::SearchContext;

/// Standing this far below alpha, not even winning a king catches up.
const DELTA_MARGIN: Cp = PieceKind::King.value();

/// Returns a score relative to the player to move.
///
/// The static evaluation stands as a lower bound, since the player to move may
/// usually decline to continue an exchange. Only captures with a non-negative
/// static exchange are explored, most valuable first.
pub(crate) fn quiescence(
    ctx: &mut SearchContext,
    position: &Position,
    mut alpha: Cp,
    beta: Cp,
    ply: usize,
    q_depth: PlyKind,
) -> Cp {
    ctx.stats.nodes += 1;
    ctx.stats.q_nodes += 1;

    ctx.check_clock();
    if ctx.is_stopped() {
        return Cp(0);
    }

    let legal_moves = position.legal_moves();
    if legal_moves.is_empty() {
        return Cp::mated_in(ply);
    }

    let stand_pat = ctx.cache.evaluate(position);
    if ply >= MAX_PLY - 1 || q_depth >= ctx.quiescence_depth || !legal_moves[0].is_capture() {
        return stand_pat;
    }

    if stand_pat >= beta {
        return stand_pat;
    }
    if stand_pat + DELTA_MARGIN < alpha {
        return alpha;
    }
    alpha = alpha.max(stand_pat);

    let mut captures: Vec<(Cp, _)> = legal_moves
        .into_iter()
        .filter(|move_| safety::see(position, move_) >= Cp(0))
        .map(|move_| (safety::captured_value(position, &move_), move_))
        .collect();
    captures.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, move_) in captures {
        let child = position.make_move(&move_);
        let score = -quiescence(ctx, &child, -beta, -alpha, ply + 1, q_depth + 1);

        if ctx.is_stopped() {
            return Cp(0);
        }
        if score >= beta {
            return score;
        }
        alpha = alpha.max(score);
    }

    alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;
    use crate::moveorder::{HistoryTable, KillerMoves};
    use crate::search::{Caches, History};
    use crate::timeman::Limits;
    use std::sync::atomic::AtomicBool;
    use std::time::Instant;

    fn quiesce(position: &Position, q_depth_limit: PlyKind) -> (Cp, u64) {
        let mut caches = Caches::default();
        let mut killers = KillerMoves::new();
        let mut table = HistoryTable::new();
        let stopper = AtomicBool::new(false);
        let mut ctx = SearchContext::new(
            &mut caches,
            &mut killers,
            &mut table,
            History::empty(),
            &stopper,
            Limits::new(1, None, false),
            Instant::now(),
            q_depth_limit,
        );
        let score = quiescence(&mut ctx, position, -Cp::INFINITY, Cp::INFINITY, 0, 0);
        (score, ctx.stats.q_nodes)
    }

    #[test]
    fn quiet_position_stands_pat() {
        let pos = Position::start_position();
        let (score, nodes) = quiesce(&pos, 4);
        assert_eq!(score, crate::evaluation::evaluate(&pos));
        assert_eq!(nodes, 1);
    }

    #[test]
    fn resolves_hanging_capture() {
        // White takes 23 for free.
        let pos = Position::parse_fen("W:W28,45:B23,5").unwrap();
        let (score, nodes) = quiesce(&pos, 4);
        let after = pos.make_move(&pos.legal_moves()[0]);
        assert!(nodes > 1);
        assert!(score >= -crate::evaluation::evaluate(&after));
    }

    #[test]
    fn depth_limit_stands_pat() {
        let pos = Position::parse_fen("W:W28,45:B23,5").unwrap();
        let (score, nodes) = quiesce(&pos, 0);
        assert_eq!(nodes, 1);
        assert_eq!(score, crate::evaluation::evaluate(&pos));
    }
}
