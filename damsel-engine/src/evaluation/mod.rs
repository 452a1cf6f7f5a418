//! Static Evaluation Functions.
//!
//! An evaluation function may have two types of calls: relative or absolute.
//!
//! An absolute score treats White as a maxing player and Black as a minning player,
//! so a score of +10 is winning for White, while -10 is winning for Black.
//! A relative score treats the player to move as the maxing player, so if it is
//! Black to move, +10 is winning for Black.

use std::collections::HashMap;
use std::fmt::{self, Display};

use crate::coretypes::{Color, Cp, CpKind};
use crate::movegen as mg;
use crate::position::{Position, PositionKey, PositionOps};

pub mod tables;
pub mod terms;

/// Game phase, decided by the number of pieces left on the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Phase {
    Opening,
    Middlegame,
    Endgame,
}

impl Phase {
    pub fn of(position: &Position) -> Self {
        match position.total_pieces() {
            n if n > 16 => Phase::Opening,
            n if n > 10 => Phase::Middlegame,
            _ => Phase::Endgame,
        }
    }

    /// Percentage weight of each term in this phase.
    pub const fn weights(&self) -> Weights {
        match self {
            Phase::Opening => Weights {
                material: 100,
                positional: 100,
                mobility: 80,
                tactical: 100,
                strategic: 120,
                formations: 110,
                heatmap: 80,
                endgame: 0,
            },
            Phase::Middlegame => Weights {
                material: 100,
                positional: 100,
                mobility: 100,
                tactical: 110,
                strategic: 100,
                formations: 100,
                heatmap: 100,
                endgame: 40,
            },
            Phase::Endgame => Weights {
                material: 100,
                positional: 70,
                mobility: 120,
                tactical: 100,
                strategic: 50,
                formations: 60,
                heatmap: 80,
                endgame: 100,
            },
        }
    }
}

/// Per term weights, in percent.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Weights {
    pub material: CpKind,
    pub positional: CpKind,
    pub mobility: CpKind,
    pub tactical: CpKind,
    pub strategic: CpKind,
    pub formations: CpKind,
    pub heatmap: CpKind,
    pub endgame: CpKind,
}

/// Unweighted absolute value of each evaluation term for one position.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Terms {
    pub material: Cp,
    pub positional: Cp,
    pub mobility: Cp,
    pub tactical: Cp,
    pub strategic: Cp,
    pub formations: Cp,
    pub heatmap: Cp,
    pub endgame: Cp,
}

impl Terms {
    /// Compute every term of a non-terminal position.
    pub fn of(position: &Position, phase: Phase, white_moves: usize, black_moves: usize) -> Self {
        Self {
            material: terms::material(position),
            positional: terms::positional(position, phase),
            mobility: terms::mobility(white_moves, black_moves),
            tactical: terms::tactical(position),
            strategic: terms::strategic(position, phase),
            formations: terms::formations(position),
            heatmap: terms::heat_pressure(position),
            endgame: terms::endgame(position),
        }
    }

    /// Phase weighted sum of all terms.
    pub fn total(&self, weights: &Weights) -> Cp {
        let weighted = |term: Cp, weight: CpKind| term.0 * weight / 100;
        Cp(weighted(self.material, weights.material)
            + weighted(self.positional, weights.positional)
            + weighted(self.mobility, weights.mobility)
            + weighted(self.tactical, weights.tactical)
            + weighted(self.strategic, weights.strategic)
            + weighted(self.formations, weights.formations)
            + weighted(self.heatmap, weights.heatmap)
            + weighted(self.endgame, weights.endgame))
    }
}

impl Display for Terms {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "material   {}", self.material)?;
        writeln!(f, "positional {}", self.positional)?;
        writeln!(f, "mobility   {}", self.mobility)?;
        writeln!(f, "tactical   {}", self.tactical)?;
        writeln!(f, "strategic  {}", self.strategic)?;
        writeln!(f, "formations {}", self.formations)?;
        writeln!(f, "heatmap    {}", self.heatmap)?;
        write!(f, "endgame    {}", self.endgame)
    }
}

// Relative Evaluation Functions

/// Primary hand-crafted evaluate function for engine, with return relative to player to move.
pub fn evaluate(position: &Position) -> Cp {
    evaluate_abs(position) * position.player().sign()
}

// Absolute Evaluation Functions

/// Score of a finished game: the side without pieces, or without moves, has lost.
pub fn terminal_abs(position: &Position) -> Option<Cp> {
    for color in Color::ALL {
        if position.count(color) == 0 {
            return Some(-Cp::MATE * color.sign());
        }
    }
    None
}

/// Primary evaluate function for engine.
/// Statically evaluate a position using a variety of heuristics.
/// Non-terminal scores are clamped strictly inside the mate range.
pub fn evaluate_abs(position: &Position) -> Cp {
    if let Some(score) = terminal_abs(position) {
        return score;
    }

    let white_moves = mg::mobility(position, Color::White);
    let black_moves = mg::mobility(position, Color::Black);
    let to_move = match position.player() {
        Color::White => white_moves,
        Color::Black => black_moves,
    };
    if to_move == 0 {
        return -Cp::MATE * position.player().sign();
    }

    let phase = Phase::of(position);
    Terms::of(position, phase, white_moves, black_moves)
        .total(&phase.weights())
        .clamp_eval()
}

/// Breakdown of the evaluation of a position, for analysis output.
pub fn breakdown(position: &Position) -> (Phase, Terms) {
    let phase = Phase::of(position);
    let white_moves = mg::mobility(position, Color::White);
    let black_moves = mg::mobility(position, Color::Black);
    (phase, Terms::of(position, phase, white_moves, black_moves))
}

/// Memo of absolute evaluations by position key.
/// The cache is dropped wholesale once it holds more than its limit.
#[derive(Debug, Clone)]
pub struct EvalCache {
    scores: HashMap<PositionKey, Cp>,
    limit: usize,
    hits: u64,
    misses: u64,
}

impl EvalCache {
    pub const DEFAULT_LIMIT: usize = 200_000;

    pub fn new() -> Self {
        Self::with_limit(Self::DEFAULT_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            scores: HashMap::new(),
            limit,
            hits: 0,
            misses: 0,
        }
    }

    /// Relative evaluation of `position`, memoized.
    pub fn evaluate(&mut self, position: &Position) -> Cp {
        let key = position.key();
        let score = match self.scores.get(&key) {
            Some(score) => {
                self.hits += 1;
                *score
            }
            None => {
                self.misses += 1;
                if self.scores.len() >= self.limit {
                    self.scores.clear();
                }
                let score = evaluate_abs(position);
                self.scores.insert(key, score);
                score
            }
        };
        score * position.player().sign()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.scores.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl Default for EvalCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;

    #[test]
    fn start_pos_equal_eval() {
        let pos = Position::start_position();
        assert_eq!(evaluate_abs(&pos), Cp(0));
        assert_eq!(evaluate(&pos), Cp(0));
        assert_eq!(Phase::of(&pos), Phase::Opening);
    }

    #[test]
    fn relative_flips_with_player() {
        let pos = Position::parse_fen("W:W31,32,33:B3").unwrap();
        let abs = evaluate_abs(&pos);
        assert!(abs > Cp(0));
        assert_eq!(evaluate(&pos), abs);
        let black = pos.with_player(Color::Black);
        assert_eq!(evaluate(&black), -evaluate_abs(&black));
    }

    #[test]
    fn breakdown_sums_to_evaluation() {
        let pos = Position::parse_fen("W:W31,32,33:B3").unwrap();
        let (phase, terms) = breakdown(&pos);
        assert_eq!(phase, Phase::of(&pos));
        assert_eq!(terms.total(&phase.weights()).clamp_eval(), evaluate_abs(&pos));
        assert!(terms.material > Cp(0));
    }

    #[test]
    fn terminal_scores() {
        let no_black = Position::parse_fen("B:W31:B").unwrap();
        assert_eq!(evaluate_abs(&no_black), Cp::MATE);
        assert_eq!(evaluate(&no_black), -Cp::MATE);

        // Black to move, 36 is stuck behind 41 and cannot jump it while 47 is occupied.
        let blocked = Position::parse_fen("B:W41,47:B36").unwrap();
        assert!(blocked.legal_moves().is_empty());
        assert_eq!(evaluate(&blocked), -Cp::MATE);
        assert!(evaluate(&blocked) < -Cp::EVAL_LIMIT);
    }

    #[test]
    fn cache_matches_uncached() {
        let pos = Position::parse_fen("W:W28,32,K46:B12,17,23").unwrap();
        let mut cache = EvalCache::new();
        let uncached = evaluate(&pos);

        assert_eq!(cache.evaluate(&pos), uncached);
        assert_eq!(cache.evaluate(&pos), uncached);
        assert_eq!(cache.hits(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.evaluate(&pos), uncached);
        let black = pos.with_player(Color::Black);
        assert_eq!(cache.evaluate(&black), evaluate(&black));
    }

    #[test]
    fn cache_is_cleared_past_limit() {
        let mut cache = EvalCache::with_limit(2);
        let a = Position::start_position();
        let b = a.make_null_move();
        let c = Position::parse_fen("W:W31:B1").unwrap();

        cache.evaluate(&a);
        cache.evaluate(&b);
        assert_eq!(cache.len(), 2);
        cache.evaluate(&c);
        assert_eq!(cache.len(), 1);
    }
}
