//! Damsel Engine error type.

use std::error;
use std::result;

use thiserror::Error;

use crate::fen::ParseFenError;

/// Damsel Engine generic result type.
pub type Result<T> = result::Result<T, Error>;

/// A list specifying general errors for Damsel engine.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Fen error kinds.
    #[error("fen")]
    Fen,

    /// Square parse string malformed.
    #[error("parse square malformed")]
    ParseSquareMalformed,
    /// Move notation string malformed.
    #[error("parse move malformed")]
    ParseMoveMalformed,
    /// Color parse string malformed.
    #[error("parse color malformed")]
    ParseColorMalformed,

    /// A move notation names no legal move in the position.
    #[error("illegal move")]
    IllegalMove,
    /// A move notation names more than one legal move in the position.
    #[error("ambiguous move")]
    AmbiguousMove,

    /// Difficulty levels run from 1 through 6.
    #[error("invalid difficulty level")]
    InvalidLevel,

    /// Time Management Mode cannot be created, missing fields.
    #[error("mode not satisfied")]
    ModeNotSatisfied,

    // An illegal move was provided, and could not be applied to some base position.
    #[error("game record illegal move")]
    GameIllegalMove,
}

/// The primary and general error type for the Damsel Engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Simple(ErrorKind),
    #[error("{0}: {1}")]
    Message(ErrorKind, String),
    #[error("{0}, error: {1}")]
    Custom(ErrorKind, #[source] Box<dyn error::Error + Send + Sync>),
}

impl Error {
    pub fn new<E>(error_kind: ErrorKind, inner_error: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self::Custom(error_kind, inner_error.into())
    }

    /// The general category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Simple(kind) | Error::Message(kind, _) | Error::Custom(kind, _) => *kind,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(error_kind: ErrorKind) -> Self {
        Self::Simple(error_kind)
    }
}

impl From<ParseFenError> for Error {
    fn from(error: ParseFenError) -> Self {
        Self::Custom(ErrorKind::Fen, error.into())
    }
}

impl<S: ToString> From<(ErrorKind, S)> for Error {
    fn from((error_kind, stringable): (ErrorKind, S)) -> Self {
        Self::Message(error_kind, stringable.to_string())
    }
}
