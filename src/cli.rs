//! Interactive game against the engine.

use std::io::{self, Write};

use damsel_engine::coretypes::MoveNotation;
use damsel_engine::evaluation::evaluate_abs;
use damsel_engine::{Engine, Game, Position, PositionOps};

enum InputKind {
    Exit,
    Newgame,
    Help,
    Error,
    Undo,
    Moves,
    Level(u8),
    GameMove(MoveNotation),
}

impl From<&str> for InputKind {
    fn from(s: &str) -> Self {
        let maybe_move: Result<MoveNotation, _> = s.trim().parse();
        if let Ok(notation) = maybe_move {
            return Self::GameMove(notation);
        }
        let mut words = s.split_whitespace();
        match (words.next(), words.next()) {
            (Some("exit"), None) => Self::Exit,
            (Some("newgame" | "ng"), None) => Self::Newgame,
            (Some("help"), None) => Self::Help,
            (Some("undo"), None) => Self::Undo,
            (Some("moves"), None) => Self::Moves,
            (Some("level"), Some(level)) => level.parse().map_or(Self::Error, Self::Level),
            _ => Self::Error,
        }
    }
}

/// Let the engine answer, returning false if it has no move and lost.
fn engine_turn(engine: &mut Engine, game: &mut Game) -> bool {
    println!("{}\nthinking...", game.position);
    match engine.compute_move(game) {
        Some(move_) => {
            println!("Damsel played move {}.", move_);
            // A move chosen from the legal move list is always playable.
            if let Err(err) = game.play(move_) {
                println!("engine error: {}", err);
            }
            true
        }
        None => false,
    }
}

/// Rebuild the game without its last `count` moves.
fn take_back(game: &Game, count: usize) -> Game {
    let keep = game.moves.len().saturating_sub(count);
    let mut previous = Game::from(game.base_position);
    for move_ in &game.moves[..keep] {
        // Every recorded move was legal when played.
        let _ = previous.play(move_.clone());
    }
    previous
}

pub fn play(mut engine: Engine, start: Position, engine_first: bool) -> io::Result<()> {
    println!("Damsel CLI {}\n", env!("CARGO_PKG_VERSION"));
    let mut input = String::new();
    let mut game = Game::from(start);

    if engine_first && !engine_turn(&mut engine, &mut game) {
        println!("Damsel has no legal moves.");
        return Ok(());
    }

    loop {
        println!("Current Static cp  : {}", evaluate_abs(&game.position));
        println!("{}", game.position);
        print!("> ");
        io::stdout().flush()?;
        input.clear();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        match InputKind::from(input.trim()) {
            InputKind::Exit => break,
            InputKind::Newgame => {
                game = Game::from(start);
                engine.reset_for_new_game();
                println!("Starting new game...");
            }
            InputKind::Help => {
                println!("Commands:");
                println!("newgame | ng => Begin a new game.");
                println!("undo => Undo the position to return to your last move.");
                println!("moves => List the legal moves.");
                println!("level <1-6> => Change the engine's difficulty.");
                println!("help => Print this help text.");
                println!("exit => end CLI.");
                println!("\nTo make a move, enter it in PDN notation.");
                println!("Examples: 32-28 -> Move the piece on 32 to 28, 28x19 -> capture from 28 to 19.");
            }
            InputKind::Undo => {
                game = take_back(&game, 2);
                println!("Undo to ply {}.", game.ply());
            }
            InputKind::Moves => {
                let moves: Vec<String> = game.position.legal_moves().iter().map(ToString::to_string).collect();
                println!("{}", moves.join(" "));
            }
            InputKind::Level(level) => match engine.set_difficulty(level) {
                Ok(()) => println!("Level set to {}.", level),
                Err(err) => println!("{}", err),
            },
            InputKind::Error => println!("Invalid command: {}", input.trim()),
            InputKind::GameMove(notation) => {
                let move_ = match game.position.find_move(&notation) {
                    Ok(move_) => move_,
                    Err(err) => {
                        println!("{}! No action taken.", err);
                        continue;
                    }
                };
                if let Err(err) = game.play(move_) {
                    println!("{}! No action taken.", err);
                    continue;
                }

                if game.position.is_lost() {
                    println!("{}", game.position);
                    println!("Congrats!! Damsel has no moves left and you WON. Type ng to start a new game.");
                    continue;
                }
                if !engine_turn(&mut engine, &mut game) {
                    println!("Damsel has no legal moves.");
                    continue;
                }
                if game.position.is_lost() {
                    println!("{}", game.position);
                    println!("Oh no!! You have no moves left, Damsel WON. Type ng to start a new game.");
                }
            }
        }
    }
    Ok(())
}
