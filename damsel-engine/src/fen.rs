//! Draughts FEN
//!
//! Positions are written as the player to move followed by one piece list per color,
//! separated by colons: `W:W31,32,K45:B1-20`. Kings carry a `K` prefix,
//! and runs of men may be abbreviated as inclusive ranges.

use std::convert::TryFrom;

use thiserror::Error;

use crate::coretypes::{Color, Piece, PieceKind, Square};
use crate::position::Position;

/// Reasons a FEN string is rejected.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ParseFenError {
    #[error("fen must have 3 colon separated fields, found {0}")]
    FieldCount(usize),
    #[error("malformed player to move `{0}`")]
    PlayerToMove(String),
    #[error("malformed piece list `{0}`")]
    PieceList(String),
    #[error("malformed square `{0}`")]
    Square(String),
    #[error("square {0} is listed twice")]
    DuplicateSquare(u8),
}

/// Conversion between a value and its FEN text.
pub trait Fen: Sized {
    fn parse_fen(fen: &str) -> Result<Self, ParseFenError>;
    fn to_fen(&self) -> String;
}

impl Fen for Position {
    fn parse_fen(fen: &str) -> Result<Self, ParseFenError> {
        let fen = fen.trim().trim_end_matches('.');
        let fields: Vec<&str> = fen.split(':').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(ParseFenError::FieldCount(fields.len()));
        }

        let player = parse_color(fields[0])
            .ok_or_else(|| ParseFenError::PlayerToMove(fields[0].to_string()))?;
        let mut position = Position::empty(player);

        for field in &fields[1..] {
            let mut chars = field.chars();
            let color = chars
                .next()
                .and_then(|ch| Color::try_from(ch).ok())
                .ok_or_else(|| ParseFenError::PieceList(field.to_string()))?;
            parse_piece_list(&mut position, color, chars.as_str())?;
        }

        Ok(position)
    }

    fn to_fen(&self) -> String {
        let mut fen = String::new();
        fen.push(self.player().to_char());
        for color in Color::ALL {
            fen.push(':');
            fen.push(color.to_char());
            fen.push_str(&piece_list(self, color));
        }
        fen
    }
}

fn parse_color(s: &str) -> Option<Color> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Color::try_from(ch).ok(),
        _ => None,
    }
}

fn parse_square(s: &str) -> Result<Square, ParseFenError> {
    s.trim()
        .parse::<Square>()
        .map_err(|_| ParseFenError::Square(s.to_string()))
}

fn place(position: &mut Position, square: Square, piece: Piece) -> Result<(), ParseFenError> {
    if !position.is_empty_square(square) {
        return Err(ParseFenError::DuplicateSquare(square.pdn()));
    }
    position.set_piece(square, Some(piece));
    Ok(())
}

fn parse_piece_list(position: &mut Position, color: Color, list: &str) -> Result<(), ParseFenError> {
    for entry in list.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (kind, squares) = match entry.strip_prefix('K') {
            Some(rest) => (PieceKind::King, rest),
            None => (PieceKind::Man, entry),
        };
        let piece = Piece::new(color, kind);

        match squares.split_once('-') {
            Some((first, last)) => {
                let (first, last) = (parse_square(first)?, parse_square(last)?);
                if first > last {
                    return Err(ParseFenError::PieceList(entry.to_string()));
                }
                for pdn in first.pdn()..=last.pdn() {
                    let square = Square::from_pdn(pdn)
                        .ok_or_else(|| ParseFenError::Square(pdn.to_string()))?;
                    place(position, square, piece)?;
                }
            }
            None => place(position, parse_square(squares)?, piece)?,
        }
    }
    Ok(())
}

/// Comma separated piece list of one color. Kings are listed one by one,
/// runs of three or more men on consecutive squares become ranges.
fn piece_list(position: &Position, color: Color) -> String {
    let mut entries: Vec<String> = Vec::new();
    let mut run: Vec<u8> = Vec::new();

    let flush = |run: &mut Vec<u8>, entries: &mut Vec<String>| {
        match run.len() {
            0 => (),
            1 | 2 => entries.extend(run.iter().map(u8::to_string)),
            _ => entries.push(format!("{}-{}", run[0], run[run.len() - 1])),
        }
        run.clear();
    };

    for (square, piece) in position.pieces(color) {
        if piece.is_king() {
            flush(&mut run, &mut entries);
            entries.push(format!("K{}", square.pdn()));
        } else {
            if run.last().map_or(false, |last| last + 1 != square.pdn()) {
                flush(&mut run, &mut entries);
            }
            run.push(square.pdn());
        }
    }
    flush(&mut run, &mut entries);

    entries.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_round_trip() {
        let start = Position::start_position();
        assert_eq!(start.to_fen(), "W:W31-50:B1-20");
        assert_eq!(Position::parse_fen("W:W31-50:B1-20").unwrap(), start);
        assert_eq!(Position::parse_fen(&start.to_fen()).unwrap(), start);
    }

    #[test]
    fn parse_kings_and_lists() {
        let pos = Position::parse_fen("B:W31,32,K45:BK1,7,8,9").unwrap();
        assert_eq!(pos.player(), Color::Black);
        assert_eq!(pos.count(Color::White), 3);
        assert_eq!(pos.count(Color::Black), 4);
        assert_eq!(pos.count_kind(Color::White, PieceKind::King), 1);
        assert_eq!(
            pos.piece_at(Square::from_pdn(1).unwrap()),
            Some(Piece::new(Color::Black, PieceKind::King))
        );
        assert_eq!(pos.to_fen(), "B:W31,32,K45:BK1,7-9");
    }

    #[test]
    fn empty_piece_lists_are_allowed() {
        let pos = Position::parse_fen("W:W:B").unwrap();
        assert_eq!(pos.total_pieces(), 0);
        assert_eq!(pos.to_fen(), "W:W:B");
    }

    #[test]
    fn reject_malformed() {
        assert_eq!(Position::parse_fen("W:W31"), Err(ParseFenError::FieldCount(2)));
        assert!(matches!(Position::parse_fen("X:W31:B1"), Err(ParseFenError::PlayerToMove(_))));
        assert!(matches!(Position::parse_fen("W:W51:B1"), Err(ParseFenError::Square(_))));
        assert!(matches!(Position::parse_fen("W:W31:B31"), Err(ParseFenError::DuplicateSquare(31))));
        assert!(matches!(Position::parse_fen("W:Q31:B1"), Err(ParseFenError::PieceList(_))));
        assert!(matches!(Position::parse_fen("W:W20-10:B1"), Err(ParseFenError::PieceList(_))));
    }
}
