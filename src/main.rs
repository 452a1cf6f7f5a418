//! Command line front end to the Damsel engine.

mod cli;

use std::error::Error;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use log::info;

use damsel_engine::book::MemoryBook;
use damsel_engine::coretypes::MoveNotation;
use damsel_engine::evaluation::{breakdown, evaluate_abs};
use damsel_engine::perft::{perft, perft_divide};
use damsel_engine::timeman::SearchControls;
use damsel_engine::{EngineBuilder, Fen, Game, Level, Mode, Position};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Difficulty level, 1 through 6
    #[arg(short, long, default_value_t = 3, global = true)]
    level: u8,

    /// Seed of the random move ordering jitter
    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Transposition table size in megabytes
    #[arg(long, default_value_t = 16, global = true)]
    hash: usize,

    /// File of opening lines, one game prefix like `32-28 19-23` per line
    #[arg(long, global = true)]
    book: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search a position and print the result.
    Analyse {
        /// Position in draughts FEN, the start position if omitted
        #[arg(long)]
        fen: Option<String>,
        /// Moves played from the position, like 32-28 19-23
        #[arg(long, num_args = 0..)]
        moves: Vec<String>,
        /// Search to this depth in plies
        #[arg(long)]
        depth: Option<u8>,
        /// Search for this many milliseconds
        #[arg(long)]
        movetime: Option<u64>,
        /// Search until Enter is pressed
        #[arg(long)]
        infinite: bool,
    },
    /// Count the leaf nodes of the move generator tree.
    Perft {
        #[arg(long)]
        fen: Option<String>,
        #[arg(short, long, default_value_t = 5)]
        depth: u8,
        #[arg(short, long, default_value_t = 1)]
        threads: usize,
        /// Print the count below every root move
        #[arg(long)]
        divide: bool,
    },
    /// Play a game against the engine.
    Play {
        #[arg(long)]
        fen: Option<String>,
        /// Let the engine move first
        #[arg(long)]
        engine_first: bool,
    },
}

fn parse_position(fen: Option<&str>) -> Result<Position, Box<dyn Error>> {
    match fen {
        Some(fen) => Ok(Position::parse_fen(fen)?),
        None => Ok(Position::start_position()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .init();

    let level = Level::new(args.level)?;
    let mut builder = EngineBuilder::new()
        .level(level)
        .seed(args.seed)
        .transpositions_mb(args.hash)
        .debug(args.verbose);
    if let Some(path) = &args.book {
        let text = fs::read_to_string(path)?;
        let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
        let book = MemoryBook::from_lines(&lines)?;
        info!("loaded {} book positions from {}", book.len(), path.display());
        builder = builder.book(book);
    }
    let engine = builder.build();

    match args.command {
        Command::Analyse {
            fen,
            moves,
            depth,
            movetime,
            infinite,
        } => {
            let mut game = Game::from(parse_position(fen.as_deref())?);
            for notation in &moves {
                let move_ = game.position.find_move(&notation.parse::<MoveNotation>()?)?;
                game.play(move_)?;
            }

            let controls = SearchControls {
                level: true,
                infinite,
                depth,
                move_time: movetime.map(Duration::from_millis),
            };
            let mode = Mode::try_from(controls)?;

            let mut engine = engine;
            engine.on_progress(|progress| {
                println!(
                    "depth {} score {} nodes {} nps {} time {} best {}",
                    progress.depth,
                    progress.score,
                    progress.nodes,
                    progress.nps,
                    progress.elapsed.as_millis(),
                    progress.best_move
                );
            });
            if infinite {
                let abort = engine.abort_handle();
                thread::spawn(move || {
                    let mut line = String::new();
                    let _ = io::stdin().read_line(&mut line);
                    abort.abort();
                });
                println!("searching, press Enter to stop");
            }

            println!("{}", game.position);
            let (phase, terms) = breakdown(&game.position);
            println!("static evaluation ({:?}): {}", phase, evaluate_abs(&game.position));
            println!("{}", terms);
            let result = engine.search(&game, mode);
            println!("{}", result);
            match result.best_move {
                Some(best_move) => println!("bestmove {}", best_move),
                None => println!("no legal moves, {} has lost", game.position.player()),
            }
        }

        Command::Perft {
            fen,
            depth,
            threads,
            divide,
        } => {
            let position = parse_position(fen.as_deref())?;
            let start = Instant::now();
            if divide {
                for (move_, info) in perft_divide(position, depth) {
                    println!("{}: {}", move_, info.nodes);
                }
            }
            let info = perft(position, depth, threads);
            info!("perft {} finished in {:?}", depth, start.elapsed());
            println!("nodes {} captures {}", info.nodes, info.captures);
            println!("time {}ms", start.elapsed().as_millis());
        }

        Command::Play { fen, engine_first } => {
            let position = parse_position(fen.as_deref())?;
            cli::play(engine, position, engine_first)?;
        }
    }

    Ok(())
}
