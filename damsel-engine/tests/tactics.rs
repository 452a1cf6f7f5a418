//! Tactics
//!
//! Capture rules of International Draughts and the engine's answers to them.

use damsel_engine::coretypes::MoveNotation;
use damsel_engine::fen::Fen;
use damsel_engine::*;

fn play_notations(game: &mut Game, notations: &[&str]) {
    for notation in notations {
        let notation: MoveNotation = notation.parse().unwrap();
        let move_ = game.position.find_move(&notation).unwrap();
        game.play(move_).unwrap();
    }
}

#[test]
fn flying_king_lands_anywhere_past_the_capture() {
    let position = Position::parse_fen("W:WK46:B28").unwrap();
    let mut landings: Vec<String> = position
        .legal_moves()
        .iter()
        .inspect(|move_| assert_eq!(move_.num_captures(), 1))
        .map(ToString::to_string)
        .collect();
    landings.sort();
    assert_eq!(landings, ["46x10", "46x14", "46x19", "46x23", "46x5"]);
}

#[test]
fn only_the_maximal_capture_is_legal() {
    // Taking 32 alone is shorter than continuing over 22.
    let position = Position::parse_fen("W:W37:B32,22").unwrap();
    let moves = position.legal_moves();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].to_string(), "37x17");
    assert_eq!(moves[0].num_captures(), 2);

    let after = position.make_move(&moves[0]);
    assert_eq!(after.count(Color::Black), 0);
    assert!(after.is_lost());
}

#[test]
fn man_captures_backwards() {
    // White man on 28 has no forward capture, only the one over 33.
    let position = Position::parse_fen("W:W28:B33").unwrap();
    let moves = position.legal_moves();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].to_string(), "28x39");
}

#[test]
fn single_capture_is_played_without_search() {
    let mut engine = Engine::new();
    let game = Game::from(Position::parse_fen("W:W28,45:B23,5").unwrap());
    let result = engine.search(&game, Mode::depth(6, None));

    assert_eq!(result.best_move.unwrap().to_string(), "28x19");
    assert_eq!(result.decision, Decision::OnlyMove);
    assert_eq!(result.nodes, 0);
}

#[test]
fn recapture_after_exchange() {
    let mut game = Game::start_position();
    play_notations(&mut game, &["32-28", "19-23", "28x19"]);

    let mut engine = EngineBuilder::new().level(Level::MAX).build();
    let result = engine.search(&game, Mode::depth(4, None));
    let best_move = result.best_move.unwrap();

    assert!(best_move.is_capture());
    assert!(game.position.legal_moves().contains(&best_move));
    assert_eq!(result.player, Color::Black);
}

#[test]
fn search_is_deterministic_at_max_level() {
    let game = Game::start_position();
    let search = || {
        let mut engine = EngineBuilder::new().level(Level::MAX).seed(11).build();
        engine.search(&game, Mode::depth(4, None))
    };

    let first = search();
    let second = search();
    assert_eq!(first.best_move, second.best_move);
    assert_eq!(first.score, second.score);
    assert_eq!(first.nodes, second.nodes);
}
