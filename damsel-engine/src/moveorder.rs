//! Move Ordering
//!
//! Functions used for ordering a list of moves from best to worst.
//!
//! Move ordering is important for alpha-beta pruning performance.
//! If the best or good moves are searched early on in an alpha-beta search,
//! pruning occurs more frequently.
//!
//! Every move is scored once and the list sorted by descending score.
//! Interior nodes use hash move, captures (MVV-LVA), killers and history.
//! The root additionally weighs safety, opponent mobility, book knowledge,
//! combinations and the level's personality.

use rand::Rng;

use crate::coretypes::{CpKind, Move, MAX_PLY, NUM_SQUARES};
use crate::evaluation::tables::{self, MEN};
use crate::level::Personality;
use crate::movegen as mg;
use crate::position::{Position, PositionOps};
use crate::safety;

// Interior node scores.
const HASH_MOVE: CpKind = 10_000;
const CAPTURE_BASE: CpKind = 1_000;
const EXTRA_CAPTURE: CpKind = 100;
const KILLER_SLOTS: [CpKind; 2] = [900, 800];
const HISTORY_CAP: CpKind = 400;
const PROMOTION: CpKind = 700;
const PROMOTION_CAPTURE: CpKind = 200;
const CENTER_STEP: CpKind = 10;
const THREAT: CpKind = 150;

// Root only scores.
const UNSAFE: CpKind = -1_000;
const RESTRICTION_STEP: CpKind = 10;
const RESTRICTION_LIMIT: usize = 10;
const BOOK_MOVE: CpKind = 500;
const COMBINATION: CpKind = 600;

/// A move annotated with its ordering score.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ScoredMove {
    pub move_: Move,
    pub score: CpKind,
}

/// Two killer moves per ply: quiet moves which caused a beta cutoff at that ply.
#[derive(Debug, Clone)]
pub struct KillerMoves {
    slots: Vec<[Option<Move>; 2]>,
}

impl KillerMoves {
    pub fn new() -> Self {
        Self {
            slots: vec![[None, None]; MAX_PLY],
        }
    }

    /// Forget all killers, done at the start of every top-level search.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = [None, None]);
    }

    /// Record a cutoff move at `ply`. Captures are never stored, and a move already
    /// in the first slot is not duplicated into the second.
    pub fn store(&mut self, ply: usize, move_: &Move) {
        if move_.is_capture() || ply >= self.slots.len() {
            return;
        }
        let slot = &mut self.slots[ply];
        if slot[0].as_ref() == Some(move_) {
            return;
        }
        slot[1] = slot[0].take();
        slot[0] = Some(move_.clone());
    }

    /// The killer slot holding `move_` at `ply`, if any.
    pub fn slot_of(&self, ply: usize, move_: &Move) -> Option<usize> {
        self.slots
            .get(ply)?
            .iter()
            .position(|killer| killer.as_ref() == Some(move_))
    }
}

impl Default for KillerMoves {
    fn default() -> Self {
        Self::new()
    }
}

/// History heuristic: how often a quiet (from, to) move caused cutoffs, weighted by depth.
/// Persists between searches of one game and is aged before every search.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    scores: Vec<u32>,
    max: u32,
}

impl HistoryTable {
    /// Entries above this halve the whole table.
    pub const LIMIT: u32 = 10_000;

    pub fn new() -> Self {
        Self {
            scores: vec![0; NUM_SQUARES * NUM_SQUARES],
            max: 0,
        }
    }

    fn index(move_: &Move) -> usize {
        move_.from().idx() * NUM_SQUARES + move_.to().idx()
    }

    /// Reward a quiet cutoff move searched to `depth`.
    pub fn update(&mut self, move_: &Move, depth: u32) {
        if move_.is_capture() {
            return;
        }
        if self.max > Self::LIMIT {
            self.age();
        }
        let score = &mut self.scores[Self::index(move_)];
        *score += depth * depth;
        self.max = self.max.max(*score);
    }

    pub fn score(&self, move_: &Move) -> u32 {
        self.scores[Self::index(move_)]
    }

    /// Halve every entry.
    pub fn age(&mut self) {
        self.scores.iter_mut().for_each(|score| *score /= 2);
        self.max /= 2;
    }

    pub fn clear(&mut self) {
        self.scores.iter_mut().for_each(|score| *score = 0);
        self.max = 0;
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordering score of one move at an interior node.
pub fn score_move(
    position: &Position,
    move_: &Move,
    hash_move: Option<&Move>,
    killers: &KillerMoves,
    history: &HistoryTable,
    ply: usize,
) -> CpKind {
    let mut score = 0;
    let us = position.player();

    if hash_move == Some(move_) {
        score += HASH_MOVE;
    }

    let piece = match position.piece_at(move_.from()) {
        Some(piece) => piece,
        None => return score,
    };

    if move_.is_capture() {
        let captured = safety::captured_value(position, move_).0;
        let extra = (move_.num_captures() as CpKind - 1) * EXTRA_CAPTURE;
        score += CAPTURE_BASE + captured - piece.value().0 / 10 + extra;
    } else {
        if let Some(slot) = killers.slot_of(ply, move_) {
            score += KILLER_SLOTS[slot];
        }
        score += (history.score(move_) as CpKind).min(HISTORY_CAP);
        if safety::creates_threat(position, move_) {
            score += THREAT;
        }
    }

    if piece.is_man() && move_.to().row() == us.promotion_row() {
        score += PROMOTION;
        if move_.is_capture() {
            score += PROMOTION_CAPTURE;
        }
    }

    let center_gain = tables::ring(move_.from()) as CpKind - tables::ring(move_.to()) as CpKind;
    if center_gain > 0 {
        score += center_gain * CENTER_STEP;
    }

    if piece.is_man() {
        score += MEN[tables::oriented(move_.to(), us)] - MEN[tables::oriented(move_.from(), us)];
    }

    score
}

/// Order moves for an interior node, best first.
pub fn order_moves(
    position: &Position,
    moves: Vec<Move>,
    hash_move: Option<&Move>,
    killers: &KillerMoves,
    history: &HistoryTable,
    ply: usize,
) -> Vec<ScoredMove> {
    let mut scored: Vec<ScoredMove> = moves
        .into_iter()
        .map(|move_| ScoredMove {
            score: score_move(position, &move_, hash_move, killers, history, ply),
            move_,
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Root specific knowledge added on top of interior ordering.
#[derive(Debug, Clone, Copy)]
pub struct RootContext<'a> {
    pub hash_move: Option<&'a Move>,
    pub book_move: Option<&'a Move>,
    pub combination: Option<&'a Move>,
    pub personality: Personality,
    /// Upper bound of the random bonus per move, 0 for deterministic ordering.
    pub jitter: CpKind,
}

/// Order the root moves, best first.
pub fn order_root_moves<R: Rng>(
    position: &Position,
    moves: Vec<Move>,
    history: &HistoryTable,
    root: &RootContext,
    rng: &mut R,
) -> Vec<ScoredMove> {
    let killers = KillerMoves::new();
    let personality = &root.personality;
    let them = !position.player();

    let mut scored: Vec<ScoredMove> = moves
        .into_iter()
        .map(|move_| {
            let mut score = score_move(position, &move_, root.hash_move, &killers, history, 0);

            if !safety::is_move_really_safe(position, &move_) {
                score += UNSAFE * (100 - personality.sacrifice) / 100;
            }

            let after = position.make_move(&move_);
            let replies = mg::mobility(&after, them);
            score += RESTRICTION_LIMIT.saturating_sub(replies) as CpKind * RESTRICTION_STEP;

            if root.book_move == Some(&move_) {
                score += BOOK_MOVE;
            }
            if root.combination == Some(&move_) {
                score += COMBINATION;
            }

            if move_.is_capture() || safety::creates_threat(position, &move_) {
                score += personality.aggression;
            }
            if after.has_captures() || mg::has_captures(&after, position.player()) {
                score += personality.complexity / 2;
            }

            if root.jitter > 0 {
                score += rng.gen_range(0..=root.jitter);
            }

            ScoredMove { move_, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::Square;
    use crate::fen::Fen;
    use crate::level::Level;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sq(pdn: u8) -> Square {
        Square::from_pdn(pdn).unwrap()
    }

    #[test]
    fn killer_slots_shift() {
        let mut killers = KillerMoves::new();
        let a = Move::quiet(sq(32), sq(28));
        let b = Move::quiet(sq(33), sq(29));

        killers.store(3, &a);
        killers.store(3, &a);
        assert_eq!(killers.slot_of(3, &a), Some(0));
        assert_eq!(killers.slot_of(3, &b), None);

        killers.store(3, &b);
        assert_eq!(killers.slot_of(3, &b), Some(0));
        assert_eq!(killers.slot_of(3, &a), Some(1));
        assert_eq!(killers.slot_of(4, &a), None);

        killers.store(5, &Move::capture(sq(28), sq(19), [sq(23)]));
        assert!(killers.slots[5].iter().all(Option::is_none));

        killers.clear();
        assert_eq!(killers.slot_of(3, &b), None);
    }

    #[test]
    fn history_updates_and_ages() {
        let mut history = HistoryTable::new();
        let quiet = Move::quiet(sq(32), sq(28));
        history.update(&quiet, 4);
        history.update(&quiet, 3);
        assert_eq!(history.score(&quiet), 25);

        history.update(&Move::capture(sq(28), sq(19), [sq(23)]), 8);
        assert_eq!(history.score(&Move::quiet(sq(28), sq(19))), 0);

        for _ in 0..200 {
            history.update(&quiet, 10);
        }
        assert!(history.score(&quiet) <= HistoryTable::LIMIT + 100);

        history.age();
        history.clear();
        assert_eq!(history.score(&quiet), 0);
    }

    #[test]
    fn hash_move_and_captures_first() {
        let pos = Position::start_position();
        let moves = pos.legal_moves();
        let hash = Move::quiet(sq(35), sq(30));
        let ordered = order_moves(&pos, moves, Some(&hash), &KillerMoves::new(), &HistoryTable::new(), 0);
        assert_eq!(ordered.len(), 9);
        assert_eq!(ordered[0].move_, hash);
        assert!(ordered.windows(2).all(|pair| pair[0].score >= pair[1].score));

        // Longest captures only, and the double capture is the only legal move.
        let pos = Position::parse_fen("W:W32,35:B28,18,30").unwrap();
        let ordered = order_moves(&pos, pos.legal_moves(), None, &KillerMoves::new(), &HistoryTable::new(), 0);
        assert_eq!(ordered.len(), 1);
        assert!(ordered[0].score >= CAPTURE_BASE + 200 - 10 + EXTRA_CAPTURE);
    }

    #[test]
    fn promotion_is_preferred() {
        let pos = Position::parse_fen("W:W7,45:B50").unwrap();
        let ordered = order_moves(&pos, pos.legal_moves(), None, &KillerMoves::new(), &HistoryTable::new(), 0);
        assert_eq!(ordered[0].move_.to().row(), 0);
    }

    #[test]
    fn root_ordering_is_deterministic_without_jitter() {
        let pos = Position::start_position();
        let settings = Level::MAX.settings();
        let root = RootContext {
            hash_move: None,
            book_move: None,
            combination: None,
            personality: settings.personality,
            jitter: settings.jitter,
        };
        let history = HistoryTable::new();
        let a = order_root_moves(&pos, pos.legal_moves(), &history, &root, &mut StdRng::seed_from_u64(1));
        let b = order_root_moves(&pos, pos.legal_moves(), &history, &root, &mut StdRng::seed_from_u64(2));
        assert_eq!(a, b);
    }

    #[test]
    fn root_ordering_penalizes_unsafe_moves() {
        // 33-29 hangs the man to 24x33.
        let pos = Position::parse_fen("W:W33,45:B24").unwrap();
        let root = RootContext {
            hash_move: None,
            book_move: None,
            combination: None,
            personality: Level::MAX.settings().personality,
            jitter: 0,
        };
        let ordered = order_root_moves(
            &pos,
            pos.legal_moves(),
            &HistoryTable::new(),
            &root,
            &mut StdRng::seed_from_u64(0),
        );
        assert_eq!(ordered.last().unwrap().move_, Move::quiet(sq(33), sq(29)));
    }
}
