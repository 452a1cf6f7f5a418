pub mod arrayvec;
pub mod bitboard;
pub mod book;
pub mod coretypes;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod fen;
pub mod game;
pub mod level;
pub(crate) mod movegen;
pub mod movelist;
pub mod moveorder;
pub mod perft;
pub mod position;
pub mod safety;
pub mod search;
pub mod timeman;
pub mod transposition;

pub use coretypes::{Color, Cp, Move, Piece, PieceKind, Square};
pub use engine::{AbortHandle, Engine, EngineBuilder, Statistics};
pub use fen::Fen;
pub use game::Game;
pub use level::Level;
pub use position::{Position, PositionOps};
pub use search::{Decision, Progress, SearchResult};
pub use timeman::Mode;
