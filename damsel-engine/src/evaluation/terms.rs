//! Individual evaluation terms. Every term is absolute: positive favors White.

use crate::coretypes::{Color, Cp, CpKind, Direction, PieceKind, Square, NUM_SQUARES};
use crate::evaluation::tables::{self, CENTER, KINGS, MEN};
use crate::evaluation::Phase;
use crate::movegen::rays::ray;
use crate::position::Position;
use crate::safety;

// Tactical threats
const HANGING_MAN: CpKind = 60;
const HANGING_KING: CpKind = 150;
const FORK_BONUS: CpKind = 40;
const PINNED_PENALTY: CpKind = 8;

// Strategic control
const BACK_RANK_BONUS: CpKind = 25;

// Formations
const TRIANGLE_BONUS: CpKind = 15;
const CHAIN_BONUS: CpKind = 5;
const PHALANX_BONUS: CpKind = 6;
const PROTECTOR_BONUS: CpKind = 3;

// Threat heatmap
const MAN_HEAT: CpKind = 10;
const KING_HEAT: CpKind = 14;
const KING_HEAT_DECAY: CpKind = 3;
const MIN_KING_HEAT: CpKind = 2;

// Endgame
const KING_ONLY_DIFF: CpKind = 300;
const OPPOSITION_BONUS: CpKind = 20;

/// Sum of piece values.
pub fn material(position: &Position) -> Cp {
    Color::ALL
        .iter()
        .flat_map(|color| position.pieces(*color))
        .fold(Cp(0), |acc, (_, piece)| acc + piece.value() * piece.color().sign())
}

/// Piece-square tables. Kings gain a centralization bonus, doubled in the endgame.
pub fn positional(position: &Position, phase: Phase) -> Cp {
    let king_center_scale = match phase {
        Phase::Endgame => 2,
        _ => 1,
    };

    let mut score = Cp(0);
    for color in Color::ALL {
        for (square, piece) in position.pieces(color) {
            let idx = tables::oriented(square, color);
            let value = match piece.kind() {
                PieceKind::Man => MEN[idx],
                PieceKind::King => KINGS[idx] + tables::centralization(square) * king_center_scale,
            };
            score += Cp(value) * color.sign();
        }
    }
    score
}

/// Mobility difference, plus a growing bonus against a side running out of moves.
/// Takes precomputed move counts so the caller can share them with terminal detection.
pub fn mobility(white_moves: usize, black_moves: usize) -> Cp {
    let squeeze = |moves: usize| -> CpKind {
        match moves {
            0 => 200,
            1 => 70,
            2 | 3 => 30,
            _ => 0,
        }
    };

    let diff = (white_moves as CpKind - black_moves as CpKind) * 5;
    Cp(diff + squeeze(black_moves) - squeeze(white_moves))
}

/// Pieces with more attackers than defenders are penalized per surplus attacker,
/// each available multi-piece capture is a bonus for its side, and pieces tied
/// to guarding a neighbor cost a little.
pub fn tactical(position: &Position) -> Cp {
    let mut score = Cp(0);
    for color in Color::ALL {
        for (square, piece) in position.pieces(color) {
            let attackers = safety::attackers(position, square, !color).count_squares() as CpKind;
            if attackers == 0 {
                continue;
            }
            let defenders = safety::defenders(position, square, color).count_squares() as CpKind;
            let surplus = attackers - defenders;
            if surplus > 0 {
                let per_attacker = match piece.kind() {
                    PieceKind::Man => HANGING_MAN,
                    PieceKind::King => HANGING_KING,
                };
                score -= Cp(surplus * per_attacker) * color.sign();
            }
        }
        let forks = safety::count_forks(position, color) as CpKind;
        score += Cp(forks * FORK_BONUS) * color.sign();
        let pinned = safety::pinned_pieces(position, color).count_squares() as CpKind;
        score -= Cp(pinned * PINNED_PENALTY) * color.sign();
    }
    score
}

/// Central control, weighted up in the middlegame, and pieces on the enemy back rank.
pub fn strategic(position: &Position, phase: Phase) -> Cp {
    let (num, den) = match phase {
        Phase::Middlegame => (3, 2),
        _ => (1, 1),
    };

    let mut score = Cp(0);
    for color in Color::ALL {
        let mut control = 0;
        for (square, _) in position.pieces(color) {
            control += CENTER[square.idx()] * num / den;
            if square.row() == color.promotion_row() {
                control += BACK_RANK_BONUS;
            }
        }
        score += Cp(control) * color.sign();
    }
    score
}

/// Men formations: triangles, chains and side by side phalanxes,
/// plus a small bonus per friendly neighbor of every piece.
pub fn formations(position: &Position) -> Cp {
    let mut score = Cp(0);
    for color in Color::ALL {
        let mut value = 0;
        for (square, piece) in position.pieces(color) {
            let neighbors = Direction::ALL
                .iter()
                .filter(|direction| {
                    square
                        .step(**direction)
                        .map_or(false, |sq| position.is_color(sq, color))
                })
                .count() as CpKind;
            value += neighbors * PROTECTOR_BONUS;

            if piece.is_king() {
                continue;
            }
            let supporters = Direction::backward(color)
                .iter()
                .filter(|direction| {
                    square
                        .step(**direction)
                        .and_then(|sq| position.piece_at(sq))
                        .map_or(false, |p| p.color() == color && p.is_man())
                })
                .count();
            value += match supporters {
                2 => TRIANGLE_BONUS,
                1 => CHAIN_BONUS,
                _ => 0,
            };

            // Pair with the man two columns to the right, so each pair counts once.
            let beside = Square::from_coords(square.row() as isize, square.col() as isize + 2);
            if let Some(beside) = beside {
                if matches!(position.piece_at(beside), Some(p) if p.color() == color && p.is_man()) {
                    value += PHALANX_BONUS;
                }
            }
        }
        score += Cp(value) * color.sign();
    }
    score
}

/// Threat heat each color projects onto every square.
/// Men heat their four neighbors, kings heat along open diagonals with decay
/// with distance, up to and including the first occupied square.
pub fn heatmap(position: &Position, color: Color) -> [CpKind; NUM_SQUARES] {
    let mut heat = [0; NUM_SQUARES];
    for (square, piece) in position.pieces(color) {
        for direction in Direction::ALL {
            if piece.is_man() {
                if let Some(target) = square.step(direction) {
                    heat[target.idx()] += MAN_HEAT;
                }
                continue;
            }
            for (distance, target) in ray(square, direction).enumerate() {
                let intensity = KING_HEAT - KING_HEAT_DECAY * distance as CpKind;
                heat[target.idx()] += intensity.max(MIN_KING_HEAT);
                if !position.is_empty_square(target) {
                    break;
                }
            }
        }
    }
    heat
}

/// Pieces standing in hostile heat are penalized, kings more than men.
pub fn heat_pressure(position: &Position) -> Cp {
    let mut score = Cp(0);
    for color in Color::ALL {
        let hostile = heatmap(position, !color);
        let pressure: CpKind = position
            .pieces(color)
            .map(|(square, piece)| match piece.kind() {
                PieceKind::Man => hostile[square.idx()] / 2,
                PieceKind::King => hostile[square.idx()],
            })
            .sum();
        score -= Cp(pressure) * color.sign();
    }
    score
}

/// Endgame knowledge: king count dominates once all men are gone, kings centralize
/// in balanced king endings, and very sparse boards consider the opposition.
pub fn endgame(position: &Position) -> Cp {
    let white_kings = position.count_kind(Color::White, PieceKind::King) as CpKind;
    let black_kings = position.count_kind(Color::Black, PieceKind::King) as CpKind;
    let no_men = position.count_kind(Color::White, PieceKind::Man) == 0
        && position.count_kind(Color::Black, PieceKind::Man) == 0;

    let mut score = Cp(0);
    if no_men {
        score += Cp((white_kings - black_kings) * KING_ONLY_DIFF);
    }

    if white_kings > 0 && black_kings > 0 && (white_kings - black_kings).abs() <= 1 {
        for color in Color::ALL {
            let center: CpKind = position
                .pieces(color)
                .filter(|(_, piece)| piece.is_king())
                .map(|(square, _)| tables::centralization(square) / 2)
                .sum();
            score += Cp(center) * color.sign();
        }
    }

    if position.total_pieces() <= 4 {
        score += opposition(position);
    }
    score
}

/// With an even distance between the kings, the side not to move holds the opposition.
fn opposition(position: &Position) -> Cp {
    let king_of = |color: Color| {
        position
            .pieces(color)
            .find(|(_, piece)| piece.is_king())
            .map(|(square, _)| square)
    };
    match (king_of(Color::White), king_of(Color::Black)) {
        (Some(white), Some(black)) => {
            let holder = if white.distance(black) % 2 == 0 {
                !position.player()
            } else {
                position.player()
            };
            Cp(OPPOSITION_BONUS) * holder.sign()
        }
        _ => Cp(0),
    }
}
