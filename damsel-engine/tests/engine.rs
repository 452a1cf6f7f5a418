//! Engine
//!
//! Tests of the stateful engine interface: difficulty, aborting and progress reports.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use damsel_engine::fen::Fen;
use damsel_engine::*;

#[test]
fn compute_move_is_legal() {
    let mut engine = EngineBuilder::new().level(Level::MIN).build();
    let game = Game::start_position();
    let move_ = engine.compute_move(&game).unwrap();
    assert!(game.position.legal_moves().contains(&move_));
}

#[test]
fn compute_move_without_moves() {
    // White's only man is blocked on 46 by Black men.
    let game = Game::from(Position::parse_fen("W:W46:B41,37").unwrap());
    let mut engine = Engine::new();
    assert_eq!(engine.compute_move(&game), None);

    let result = engine.search(&game, Mode::Level);
    assert_eq!(result.decision, Decision::NoLegalMoves);
    assert_eq!(result.leading(), Some(Color::Black));
}

#[test]
fn every_level_moves() {
    let game = Game::start_position();
    let mut engine = Engine::new();
    for level in Level::MIN.number()..=Level::MAX.number() {
        engine.set_difficulty(level).unwrap();
        assert_eq!(engine.level().number(), level);
        let result = engine.search(&game, Mode::depth(2, None));
        assert!(game.position.legal_moves().contains(&result.best_move.unwrap()));
    }
    assert_eq!(engine.statistics().searches, 6);
}

#[test]
fn invalid_difficulty_rejected() {
    let mut engine = Engine::new();
    assert!(engine.set_difficulty(0).is_err());
    assert!(engine.set_difficulty(Level::MAX.number() + 1).is_err());
    assert_eq!(engine.level(), Level::default());
}

#[test]
fn abort_infinite_search() {
    let mut engine = Engine::new();
    let abort = engine.abort_handle();
    let game = Game::start_position();

    let aborter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        abort.abort();
    });
    let result = engine.search(&game, Mode::Infinite);
    aborter.join().unwrap();

    assert!(result.stopped);
    assert!(game.position.legal_moves().contains(&result.best_move.unwrap()));
}

#[test]
fn progress_reported_per_iteration() {
    let depths = Arc::new(Mutex::new(Vec::new()));
    let mut engine = EngineBuilder::new().level(Level::MAX).build();
    {
        let depths = Arc::clone(&depths);
        engine.on_progress(move |progress| depths.lock().unwrap().push(progress.depth));
    }

    let result = engine.search(&Game::start_position(), Mode::depth(3, None));
    assert_eq!(*depths.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(result.depth, 3);
}

#[test]
fn movetime_is_respected() {
    let mut engine = Engine::new();
    let result = engine.search(&Game::start_position(), Mode::movetime(Duration::from_millis(100), None));
    assert!(result.best_move.is_some());
    assert!(result.elapsed < Duration::from_secs(2));
}
