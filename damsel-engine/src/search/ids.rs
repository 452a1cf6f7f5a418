//! Iterative Deepening Search.
//!
//! Runs the root search for depth 1, 2, ... until the level or mode stops it,
//! reusing the previous iteration's best move as the first move searched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::StdRng;

use crate::arrayvec::{append, display};
use crate::book::OpeningBook;
use crate::coretypes::{Cp, Move, PlyKind, MAX_DEPTH};
use crate::game::Game;
use crate::level::Level;
use crate::movelist::{Line, MoveList};
use crate::moveorder::{order_root_moves, HistoryTable, KillerMoves, RootContext};
use crate::position::{Position, PositionOps};
use crate::safety;
use crate::search::{is_unrepeatable, negamax, Cache, Decision, History, SearchContext, SearchResult};
use crate::timeman::{self, Limits, Mode};
use crate::transposition::Bound;

/// A capture this much better than every other is played without searching.
pub const FORCED_MARGIN: Cp = Cp(100);
/// Aspiration window half width around the previous iteration's score.
pub const ASPIRATION_WINDOW: Cp = Cp(50);
/// Aspiration windows are used from this depth on.
const ASPIRATION_MIN_DEPTH: PlyKind = 4;
/// Aspiration windows are only used while the previous score is this small.
const ASPIRATION_MAX_SCORE: Cp = Cp(300);
/// A score at least this good, found below the maximum depth, earns more time.
pub const WINNING: Cp = Cp(1_000);
/// The opening book is consulted while the game is shorter than this.
pub const BOOK_PLIES: usize = 20;

/// Report of one completed iteration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Progress {
    pub depth: PlyKind,
    /// Score relative to the player to move at the root.
    pub score: Cp,
    pub nodes: u64,
    pub nps: u64,
    pub elapsed: Duration,
    pub best_move: Move,
}

/// The engine owned state a search borrows.
pub struct SearchResources<'a> {
    pub cache: &'a mut dyn Cache,
    pub killers: &'a mut KillerMoves,
    pub history: &'a mut HistoryTable,
    pub book: &'a dyn OpeningBook,
    pub rng: &'a mut StdRng,
    pub stopper: &'a AtomicBool,
}

/// Best line of one root search.
#[derive(Debug, Clone)]
struct Iteration {
    best_move: Move,
    score: Cp,
    pv: Line,
    depth: PlyKind,
}

/// Searches the current position of `game` using iterative deepening.
/// It returns the best move and score for the position in the search tree.
pub fn ids(
    game: &Game,
    mode: Mode,
    level: Level,
    resources: SearchResources,
    on_progress: &mut dyn FnMut(&Progress),
) -> SearchResult {
    let start_time = Instant::now();
    let position = game.position;
    let player = position.player();
    let settings = level.settings();

    resources.stopper.store(false, Ordering::Relaxed);
    resources.killers.clear();
    resources.history.age();

    let root_moves = position.legal_moves();
    match root_moves.len() {
        0 => return SearchResult::immediate(player, None, Decision::NoLegalMoves, start_time),
        1 => {
            let only_move = root_moves.into_iter().next();
            return SearchResult::immediate(player, only_move, Decision::OnlyMove, start_time);
        }
        _ => (),
    }

    if let Some(capture) = forced_capture(&position, &root_moves) {
        debug!("forced capture {}", capture);
        return SearchResult::immediate(player, Some(capture), Decision::ForcedCapture, start_time);
    }

    if game.ply() < BOOK_PLIES {
        let book_move = resources
            .book
            .get_move(&position, &game.notations())
            .filter(|move_| root_moves.contains(move_));
        if let Some(book_move) = book_move {
            debug!("book move {}", book_move);
            return SearchResult::immediate(player, Some(book_move), Decision::Book, start_time);
        }
    }

    let allocated = timeman::allocate(settings, &position, game.ply());
    let mut limits = mode.limits(settings, allocated);
    limits.max_depth = limits.max_depth.min(MAX_DEPTH);
    debug!(
        "searching {} moves, max depth {}, time {:?}",
        root_moves.len(),
        limits.max_depth,
        limits.movetime
    );

    let root_book_move = root_moves
        .iter()
        .find(|move_| resources.book.is_book_move(&position, move_))
        .cloned();
    let combination = safety::find_combination(&position);

    let SearchResources {
        cache,
        killers,
        history,
        rng,
        stopper,
        ..
    } = resources;

    let hash_move = cache
        .probe(position.key(), 0, -Cp::INFINITY, Cp::INFINITY)
        .and_then(|probe| probe.entry.best_move);
    let root = RootContext {
        hash_move: hash_move.as_ref(),
        book_move: root_book_move.as_ref(),
        combination: combination.as_ref(),
        personality: settings.personality,
        jitter: settings.jitter,
    };
    let mut ordered: MoveList = order_root_moves(&position, root_moves, &*history, &root, rng)
        .into_iter()
        .map(|scored| scored.move_)
        .collect();

    let mut ctx = SearchContext::new(
        cache,
        killers,
        history,
        History::new(game),
        stopper,
        limits,
        start_time,
        settings.quiescence_depth,
    );

    let mut best: Option<Iteration> = None;
    let mut depth: PlyKind = 1;

    while !ctx.is_stopped() && !ctx.limits.stop(depth, start_time) {
        let previous = best.as_ref().map(|iteration| iteration.score);
        let window = aspiration_window(previous, depth);
        let (alpha, beta) = window.unwrap_or((-Cp::INFINITY, Cp::INFINITY));

        let mut outcome = search_root(&mut ctx, &position, &ordered, depth, alpha, beta);
        if let Some(iteration) = &outcome {
            let failed = iteration.score <= alpha || iteration.score >= beta;
            if window.is_some() && failed && !ctx.is_stopped() {
                debug!(
                    "depth {} aspiration ({}, {}) failed with {}, re-searching",
                    depth, alpha, beta, iteration.score
                );
                outcome = search_root(&mut ctx, &position, &ordered, depth, -Cp::INFINITY, Cp::INFINITY);
            }
        }

        let stopped = ctx.is_stopped();
        match outcome {
            Some(iteration) if !stopped => {
                if let Some(index) = ordered.iter().position(|move_| *move_ == iteration.best_move) {
                    let best_move = ordered.remove(index);
                    ordered.insert(0, best_move);
                }
                let progress = progress(&ctx, &iteration);
                info!(
                    "depth {} score {} nodes {} nps {} pv {}",
                    progress.depth,
                    progress.score,
                    progress.nodes,
                    progress.nps,
                    display(&iteration.pv)
                );
                on_progress(&progress);
                best = Some(iteration);
            }
            // An interrupted iteration is only trusted when nothing else was completed.
            Some(iteration) if best.is_none() => best = Some(iteration),
            _ => (),
        }
        if stopped {
            break;
        }

        if let Some(iteration) = &best {
            if iteration.score.is_decisive() {
                debug!("decisive score {} at depth {}", iteration.score, depth);
                break;
            }
            if extend_for_win(&mut ctx.limits, iteration.score, depth) {
                debug!("winning score {} at depth {}, extending time", iteration.score, depth);
            }
        }
        depth += 1;
    }

    let stopped = ctx.is_stopped();
    let mut decision = Decision::Search;
    let mut best = best.unwrap_or_else(|| Iteration {
        best_move: ordered[0].clone(),
        score: Cp(0),
        pv: Line::new(),
        depth: 0,
    });

    if let Some(safe_move) = safety_gate(ctx.cache, &position, &ordered, &best) {
        warn!(
            "searched move {} is unsafe, playing {} instead",
            best.best_move, safe_move
        );
        best.best_move = safe_move.clone();
        best.pv.clear();
        best.pv.push(safe_move);
        decision = Decision::SafetyFallback;
    }

    info!("best move {} score {} depth {}", best.best_move, best.score, best.depth);

    let stats = ctx.stats;
    SearchResult {
        best_move: Some(best.best_move),
        score: best.score * player.sign(),
        pv: best.pv,
        player,
        depth: best.depth,
        nodes: stats.nodes,
        q_nodes: stats.q_nodes,
        elapsed: start_time.elapsed(),
        stopped,
        cut_nodes: stats.cut_nodes,
        pv_nodes: stats.pv_nodes,
        all_nodes: stats.all_nodes,
        tt_hits: stats.tt_hits,
        tt_cuts: stats.tt_cuts,
        decision,
    }
}

/// Principal Variation Search over the root moves.
/// The first move gets the full window, later moves a null window, re-searched
/// in full when they land inside the window.
fn search_root(
    ctx: &mut SearchContext,
    position: &Position,
    moves: &[Move],
    depth: PlyKind,
    mut alpha: Cp,
    beta: Cp,
) -> Option<Iteration> {
    ctx.stats.nodes += 1;
    let key = position.key();
    let original_alpha = alpha;
    let mut best: Option<Iteration> = None;
    let mut line = Line::new();

    for (index, move_) in moves.iter().enumerate() {
        if ctx.limits.is_out_of_time(ctx.start_time) {
            ctx.stop();
        }
        if ctx.is_stopped() {
            break;
        }

        let child = position.make_move(move_);
        ctx.repetitions.push(key, is_unrepeatable(position, move_));
        let score = if index == 0 {
            -negamax(ctx, &child, &mut line, depth - 1, 1, -beta, -alpha, true)
        } else {
            let null_alpha = -alpha - Cp(1);
            let score = -negamax(ctx, &child, &mut line, depth - 1, 1, null_alpha, -alpha, true);
            if score > alpha && score < beta && !ctx.is_stopped() {
                -negamax(ctx, &child, &mut line, depth - 1, 1, -beta, -alpha, true)
            } else {
                score
            }
        };
        ctx.repetitions.pop();

        if ctx.is_stopped() {
            break;
        }

        if best.as_ref().map_or(true, |iteration| score > iteration.score) {
            let mut pv = Line::new();
            pv.push(move_.clone());
            append(&mut pv, line.clone());
            best = Some(Iteration {
                best_move: move_.clone(),
                score,
                pv,
                depth,
            });
        }

        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }

    if let (Some(iteration), false) = (&best, ctx.is_stopped()) {
        let bound = if iteration.score >= beta {
            Bound::Lower
        } else if iteration.score > original_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        ctx.cache
            .store(key, depth, iteration.score.to_tt(0), bound, Some(iteration.best_move.clone()));
    }

    best
}

/// Window to search `depth` with, given the score of the previous iteration.
/// None means the full window.
fn aspiration_window(previous: Option<Cp>, depth: PlyKind) -> Option<(Cp, Cp)> {
    match previous {
        Some(score) if depth >= ASPIRATION_MIN_DEPTH && score.abs() < ASPIRATION_MAX_SCORE => {
            Some((score - ASPIRATION_WINDOW, score + ASPIRATION_WINDOW))
        }
        _ => None,
    }
}

/// A winning score found below the maximum depth buys time to look for a faster win.
fn extend_for_win(limits: &mut Limits, score: Cp, depth: PlyKind) -> bool {
    score >= WINNING && depth < limits.max_depth && limits.extend()
}

/// The move to play instead of `best` when `best` hangs material.
/// A proven forced win is trusted over the static safety check.
fn safety_gate(cache: &mut dyn Cache, position: &Position, moves: &[Move], best: &Iteration) -> Option<Move> {
    let proven_win = best.score.is_mate() && best.score > Cp(0);
    if proven_win || safety::is_move_really_safe(position, &best.best_move) {
        return None;
    }
    safest_move(cache, position, moves)
}

/// When captures are forced and one is clearly best by static exchange, return it.
fn forced_capture(position: &Position, moves: &[Move]) -> Option<Move> {
    if moves.len() < 2 || !moves[0].is_capture() {
        return None;
    }
    let mut valued: Vec<(Cp, &Move)> = moves
        .iter()
        .map(|move_| (safety::see(position, move_), move_))
        .collect();
    valued.sort_by(|a, b| b.0.cmp(&a.0));

    (valued[0].0 - valued[1].0 > FORCED_MARGIN).then(|| valued[0].1.clone())
}

/// The safe root move with the best one-ply static evaluation, if any move is safe.
fn safest_move(cache: &mut dyn Cache, position: &Position, moves: &[Move]) -> Option<Move> {
    moves
        .iter()
        .filter(|move_| safety::is_move_really_safe(position, move_))
        .map(|move_| (-cache.evaluate(&position.make_move(move_)), move_))
        .max_by_key(|(score, _)| *score)
        .map(|(_, move_)| move_.clone())
}

fn progress(ctx: &SearchContext, iteration: &Iteration) -> Progress {
    let elapsed = ctx.start_time.elapsed();
    let nps = match elapsed.as_secs_f64() {
        secs if secs > 0.0 => (ctx.stats.nodes as f64 / secs) as u64,
        _ => 0,
    };
    Progress {
        depth: iteration.depth,
        score: iteration.score,
        nodes: ctx.stats.nodes,
        nps,
        elapsed,
        best_move: iteration.best_move.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{MemoryBook, NoBook};
    use crate::coretypes::Square;
    use crate::fen::Fen;
    use crate::search::Caches;
    use rand::SeedableRng;

    fn sq(pdn: u8) -> Square {
        Square::from_pdn(pdn).unwrap()
    }

    fn run(game: &Game, mode: Mode, book: &dyn OpeningBook) -> SearchResult {
        let mut caches = Caches::default();
        let mut killers = KillerMoves::new();
        let mut history = HistoryTable::new();
        let mut rng = StdRng::seed_from_u64(0);
        let stopper = AtomicBool::new(false);
        let resources = SearchResources {
            cache: &mut caches,
            killers: &mut killers,
            history: &mut history,
            book,
            rng: &mut rng,
            stopper: &stopper,
        };
        ids(game, mode, Level::MAX, resources, &mut |_: &Progress| ())
    }

    fn root_search(position: &Position, depth: PlyKind, alpha: Cp, beta: Cp) -> Iteration {
        let mut caches = Caches::default();
        let mut killers = KillerMoves::new();
        let mut history = HistoryTable::new();
        let stopper = AtomicBool::new(false);
        let mut ctx = SearchContext::new(
            &mut caches,
            &mut killers,
            &mut history,
            History::empty(),
            &stopper,
            Limits::new(depth, None, false),
            Instant::now(),
            4,
        );
        let moves = position.legal_moves();
        search_root(&mut ctx, position, &moves, depth, alpha, beta).unwrap()
    }

    #[test]
    fn book_moves_skip_search() {
        let book = MemoryBook::from_lines(&["32-28 19-23"]).unwrap();
        let mut game = Game::start_position();

        let result = run(&game, Mode::depth(4, None), &book);
        assert_eq!(result.decision, Decision::Book);
        assert_eq!(result.best_move, Some(Move::quiet(sq(32), sq(28))));
        assert_eq!(result.nodes, 0);

        game.play(Move::quiet(sq(32), sq(28))).unwrap();
        let result = run(&game, Mode::depth(4, None), &book);
        assert_eq!(result.decision, Decision::Book);
        assert_eq!(result.best_move, Some(Move::quiet(sq(19), sq(23))));
    }

    #[test]
    fn out_of_book_searches() {
        let book = MemoryBook::from_lines(&["32-28 19-23"]).unwrap();
        let mut game = Game::start_position();
        game.play(Move::quiet(sq(33), sq(29))).unwrap();

        let result = run(&game, Mode::depth(2, None), &book);
        assert_eq!(result.decision, Decision::Search);
        assert!(result.nodes > 0);
        assert_eq!(run(&game, Mode::depth(2, None), &NoBook).best_move, result.best_move);
    }

    #[test]
    fn aspiration_only_for_quiet_scores() {
        assert_eq!(aspiration_window(None, 6), None);
        assert_eq!(aspiration_window(Some(Cp(20)), 3), None);
        assert_eq!(aspiration_window(Some(Cp(20)), 4), Some((Cp(-30), Cp(70))));
        assert_eq!(aspiration_window(Some(Cp(-400)), 6), None);
    }

    #[test]
    fn failed_window_is_searched_again() {
        let pos = Position::start_position();
        let full = root_search(&pos, 2, -Cp::INFINITY, Cp::INFINITY);

        // A window well above the true score fails low.
        let alpha = full.score + Cp(200);
        let failed = root_search(&pos, 2, alpha, alpha + ASPIRATION_WINDOW * 2);
        assert!(failed.score <= alpha);

        let again = root_search(&pos, 2, -Cp::INFINITY, Cp::INFINITY);
        assert_eq!(again.score, full.score);
        assert_eq!(again.best_move, full.best_move);
    }

    #[test]
    fn winning_score_extends_once() {
        let settings = Level::new(3).unwrap().settings();
        let mut limits = Mode::Level.limits(settings, settings.base_time);

        assert!(!extend_for_win(&mut limits, Cp(500), 2));
        assert!(!extend_for_win(&mut limits, WINNING, settings.max_depth));
        assert!(extend_for_win(&mut limits, WINNING, 2));
        assert_eq!(limits.movetime, Some(settings.base_time * 3 / 2));
        assert!(!extend_for_win(&mut limits, Cp(2_000), 3));
    }

    #[test]
    fn unsafe_choice_is_replaced() {
        // 33-29 walks into 24x33.
        let pos = Position::parse_fen("W:W33,45:B24").unwrap();
        let moves = pos.legal_moves();
        let mut caches = Caches::default();
        let hanging = Iteration {
            best_move: Move::quiet(sq(33), sq(29)),
            score: Cp(0),
            pv: Line::new(),
            depth: 1,
        };

        let replacement = safety_gate(&mut caches, &pos, &moves, &hanging).unwrap();
        assert_ne!(replacement, hanging.best_move);
        assert!(safety::is_move_really_safe(&pos, &replacement));

        let proven = Iteration {
            score: -Cp::mated_in(3),
            ..hanging.clone()
        };
        assert_eq!(safety_gate(&mut caches, &pos, &moves, &proven), None);

        let safe = Iteration {
            best_move: Move::quiet(sq(33), sq(28)),
            ..hanging
        };
        assert_eq!(safety_gate(&mut caches, &pos, &moves, &safe), None);
    }

    #[test]
    fn forced_capture_needs_a_margin() {
        // 28x19 takes a king, 46x37 only a man.
        let pos = Position::parse_fen("W:W28,46:BK23,41").unwrap();
        let moves = pos.legal_moves();
        assert_eq!(moves.len(), 2);
        assert_eq!(forced_capture(&pos, &moves).unwrap().from(), sq(28));

        let pos = Position::start_position();
        assert_eq!(forced_capture(&pos, &pos.legal_moves()), None);
    }
}
