//! The fundamental and simple types of `damsel_engine`.

use std::convert::TryFrom;
use std::fmt::{self, Display, Write};
use std::ops::{Add, AddAssign, Mul, Neg, Not, Sub, SubAssign};
use std::str::FromStr;

use crate::bitboard::Bitboard;
use crate::error::{self, ErrorKind};
use crate::movegen::tables;
use crate::movelist::Captures;

///////////////
// Constants //
///////////////
pub const BOARD_SIZE: usize = 10; // 10 rows, 10 columns.
pub const SQUARES_PER_ROW: usize = 5; // Dark squares per row.
pub const NUM_SQUARES: usize = BOARD_SIZE * SQUARES_PER_ROW;

// Each side starts with 20 men, so no capture chain can be longer than this.
// This also bounds the recursion depth of capture generation.
pub const MAX_CAPTURES: usize = 20;

// The greatest nominal depth reachable during search.
// This also expresses the maximum number of moves than can be in a line.
pub const MAX_DEPTH: PlyKind = 64;

// Hard recursion ceiling for the main search plus quiescence.
pub const MAX_PLY: usize = 128;

/////////////////////////
// Data and Structures //
/////////////////////////

/// Type alias for max ply/depth.
pub type PlyKind = u8;

// Type alias to make changing Cp inner type easy if needed.
pub type CpKind = i32;

/// Centi-man, the unit of evaluation, where 100 Cp == 1 man.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Cp(pub CpKind);

/// Color can represent the color of a piece, or a player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Color {
    White,
    Black,
}

/// The two kinds of draughts pieces.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PieceKind {
    Man,
    King,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Piece {
    pub(crate) color: Color,
    pub(crate) kind: PieceKind,
}

/// Square
/// One of the 50 playable dark squares, stored as its PDN number minus one.
/// Square 1 is the dark square at row 0, column 1 (top left, seen from White),
/// square 50 the one at row 9, column 8.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Square(u8);

/// The four diagonal directions. North points towards row 0, the side White promotes on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Direction {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

/// Move
/// A complete draughts move: the moving piece's origin and final square,
/// and every square whose piece is taken along the way, in jump order.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Move {
    pub(crate) from: Square,
    pub(crate) to: Square,
    pub(crate) captures: Captures,
}

/// The textual shape of a move (`32-28`, `28x19`) before it is matched against a position.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MoveNotation {
    pub from: Square,
    pub to: Square,
    pub capture: bool,
}

//////////////////////
/// Implementations //
//////////////////////

impl Cp {
    pub const INFINITY: Cp = Cp(1_000_000);
    pub const MATE: Cp = Cp(30_000);
    /// Any score at least this large in magnitude is a forced win or loss.
    pub const MATE_BOUND: Cp = Cp(30_000 - MAX_PLY as CpKind);
    /// Any score at least this large in magnitude decides the game in practice.
    pub const DECISIVE: Cp = Cp(5_000);
    /// Non-terminal evaluations are clamped into +/- this value.
    pub const EVAL_LIMIT: Cp = Cp(20_000);

    /// Returns the sign of Cp value, either 1, -1, or 0.
    pub const fn signum(&self) -> CpKind {
        self.0.signum()
    }

    pub const fn abs(&self) -> Cp {
        Cp(self.0.abs())
    }

    /// Score of being mated `ply` plies from the root.
    pub const fn mated_in(ply: usize) -> Cp {
        Cp(-Self::MATE.0 + ply as CpKind)
    }

    /// True if this score is a proven forced win or loss.
    pub const fn is_mate(&self) -> bool {
        self.0.abs() >= Self::MATE_BOUND.0
    }

    /// True if this score is beyond the decisive threshold.
    pub const fn is_decisive(&self) -> bool {
        self.0.abs() > Self::DECISIVE.0
    }

    /// Mate scores count plies from the root. Stored in a table they must count
    /// from the node instead, so the same position reached at another ply keeps
    /// its true mate distance.
    pub const fn to_tt(self, ply: usize) -> Cp {
        let ply = ply as CpKind;
        if self.0 >= Self::MATE_BOUND.0 {
            Cp(self.0 + ply)
        } else if self.0 <= -Self::MATE_BOUND.0 {
            Cp(self.0 - ply)
        } else {
            self
        }
    }

    /// Inverse of [`Cp::to_tt`] for a node `ply` plies from the root.
    pub const fn from_tt(self, ply: usize) -> Cp {
        let ply = ply as CpKind;
        if self.0 >= Self::MATE_BOUND.0 {
            Cp(self.0 - ply)
        } else if self.0 <= -Self::MATE_BOUND.0 {
            Cp(self.0 + ply)
        } else {
            self
        }
    }

    pub fn clamp_eval(self) -> Cp {
        Cp(self.0.clamp(-Self::EVAL_LIMIT.0, Self::EVAL_LIMIT.0))
    }
}

impl Add for Cp {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl AddAssign for Cp {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}
impl Sub for Cp {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl SubAssign for Cp {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0
    }
}
impl Mul for Cp {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}
impl Mul<CpKind> for Cp {
    type Output = Cp;
    fn mul(self, rhs: CpKind) -> Self::Output {
        Self(self.0 * rhs)
    }
}
impl Neg for Cp {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}
impl Display for Cp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

impl Color {
    /// FEN compliant conversion.
    pub const fn to_char(&self) -> char {
        match self {
            Color::White => 'W',
            Color::Black => 'B',
        }
    }

    /// Returns the absolute sign of a Color in Cp.
    /// A positive value is good for white and a negative value is good for Black.
    pub const fn sign(&self) -> Cp {
        match self {
            Color::White => Cp(1),
            Color::Black => Cp(-1),
        }
    }

    /// Row delta of a forward step for this color's men.
    pub const fn forward(&self) -> isize {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// The row on which this color's men promote.
    pub const fn promotion_row(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => BOARD_SIZE - 1,
        }
    }


    pub const fn idx(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    pub const ALL: [Color; 2] = [Color::White, Color::Black];
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl Not for &Color {
    type Output = Color;
    fn not(self) -> Self::Output {
        Color::not(*self)
    }
}

impl From<Color> for char {
    fn from(color: Color) -> Self {
        color.to_char()
    }
}

impl TryFrom<char> for Color {
    type Error = error::Error;
    fn try_from(ch: char) -> error::Result<Self> {
        match ch {
            'W' | 'w' => Ok(Color::White),
            'B' | 'b' => Ok(Color::Black),
            _ => Err((ErrorKind::ParseColorMalformed, "char is not W|B").into()),
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(char::from(*self))
    }
}

impl PieceKind {
    /// Default, color independent material value per piece kind.
    pub const fn value(&self) -> Cp {
        match self {
            PieceKind::Man => Cp(100),
            PieceKind::King => Cp(450),
        }
    }
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }
    pub const fn color(&self) -> Color {
        self.color
    }
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }
    pub const fn value(&self) -> Cp {
        self.kind.value()
    }
    pub fn is_man(&self) -> bool {
        self.kind == PieceKind::Man
    }
    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }

    /// Board diagram character: men lowercase, kings uppercase.
    pub const fn to_char(&self) -> char {
        match (self.color, self.kind) {
            (Color::White, PieceKind::Man) => 'w',
            (Color::White, PieceKind::King) => 'W',
            (Color::Black, PieceKind::Man) => 'b',
            (Color::Black, PieceKind::King) => 'B',
        }
    }
}

impl From<(Color, PieceKind)> for Piece {
    fn from((color, kind): (Color, PieceKind)) -> Self {
        Self::new(color, kind)
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(self.to_char())
    }
}

/// Returns true if a row/column pair lies on the 10x10 board.
pub const fn is_valid_coord(row: isize, col: isize) -> bool {
    row >= 0 && row < BOARD_SIZE as isize && col >= 0 && col < BOARD_SIZE as isize
}

/// Returns true if a row/column pair is a dark, playable square.
pub const fn is_dark_square(row: isize, col: isize) -> bool {
    (row + col) % 2 == 1
}

impl Square {
    /// Create a square from its 0-based index.
    /// Panics if the index does not name one of the 50 playable squares.
    pub const fn new(idx: u8) -> Self {
        assert!((idx as usize) < NUM_SQUARES, "square index out of range");
        Self(idx)
    }

    /// Create a square from its PDN number, 1 through 50.
    pub const fn from_pdn(number: u8) -> Option<Self> {
        if number >= 1 && number as usize <= NUM_SQUARES {
            Some(Self(number - 1))
        } else {
            None
        }
    }

    /// Create a square from board coordinates, if they name a playable square.
    pub const fn from_coords(row: isize, col: isize) -> Option<Self> {
        if is_valid_coord(row, col) && is_dark_square(row, col) {
            Some(Self((row * SQUARES_PER_ROW as isize + col / 2) as u8))
        } else {
            None
        }
    }

    pub const fn idx(&self) -> usize {
        self.0 as usize
    }

    /// PDN number of this square, 1 through 50.
    pub const fn pdn(&self) -> u8 {
        self.0 + 1
    }

    pub const fn row(&self) -> usize {
        self.0 as usize / SQUARES_PER_ROW
    }

    pub const fn col(&self) -> usize {
        let offset = if self.row() % 2 == 0 { 1 } else { 0 };
        2 * (self.0 as usize % SQUARES_PER_ROW) + offset
    }

    /// The diagonal neighbor in a direction, if it is on the board.
    #[inline]
    pub fn step(&self, direction: Direction) -> Option<Square> {
        tables::neighbor(*self, direction)
    }

    /// The same square seen from the other side of the board.
    pub const fn mirror(&self) -> Square {
        Square(NUM_SQUARES as u8 - 1 - self.0)
    }


    /// Chebyshev distance between two squares.
    pub fn distance(&self, other: Square) -> usize {
        self.row()
            .abs_diff(other.row())
            .max(self.col().abs_diff(other.col()))
    }

    /// Iterate all 50 playable squares in PDN order.
    pub fn iter() -> impl Iterator<Item = Square> {
        (0..NUM_SQUARES as u8).map(Square)
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pdn())
    }
}

impl FromStr for Square {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        let number: u8 = s
            .trim()
            .parse()
            .map_err(|_| (ErrorKind::ParseSquareMalformed, s))?;
        Square::from_pdn(number).ok_or_else(|| (ErrorKind::ParseSquareMalformed, s).into())
    }
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// (row delta, column delta) of a single step.
    pub const fn delta(&self) -> (isize, isize) {
        match self {
            Direction::NorthWest => (-1, -1),
            Direction::NorthEast => (-1, 1),
            Direction::SouthWest => (1, -1),
            Direction::SouthEast => (1, 1),
        }
    }

    pub const fn opposite(&self) -> Direction {
        match self {
            Direction::NorthWest => Direction::SouthEast,
            Direction::NorthEast => Direction::SouthWest,
            Direction::SouthWest => Direction::NorthEast,
            Direction::SouthEast => Direction::NorthWest,
        }
    }

    /// The two directions a man of `color` moves in.
    pub const fn forward(color: Color) -> [Direction; 2] {
        match color {
            Color::White => [Direction::NorthWest, Direction::NorthEast],
            Color::Black => [Direction::SouthWest, Direction::SouthEast],
        }
    }

    /// The two directions pointing back towards `color`'s own side.
    pub const fn backward(color: Color) -> [Direction; 2] {
        Self::forward(match color {
            Color::White => Color::Black,
            Color::Black => Color::White,
        })
    }

    pub const fn idx(&self) -> usize {
        *self as usize
    }
}

impl Move {
    pub fn new(from: Square, to: Square, captures: Captures) -> Self {
        Self {
            from,
            to,
            captures,
        }
    }

    /// A non-capturing move.
    pub fn quiet(from: Square, to: Square) -> Self {
        Self::new(from, to, Captures::new())
    }

    /// A capturing move, with captured squares given in jump order.
    pub fn capture<I: IntoIterator<Item = Square>>(from: Square, to: Square, captures: I) -> Self {
        Self::new(from, to, captures.into_iter().collect())
    }

    pub fn from(&self) -> Square {
        self.from
    }
    pub fn to(&self) -> Square {
        self.to
    }
    pub fn captures(&self) -> &[Square] {
        &self.captures
    }
    pub fn is_capture(&self) -> bool {
        !self.captures.is_empty()
    }
    pub fn num_captures(&self) -> usize {
        self.captures.len()
    }

    /// The set of captured squares, ignoring jump order.
    pub fn captured_set(&self) -> Bitboard {
        self.captures.iter().copied().collect()
    }

    /// True if the move matches a parsed notation.
    pub fn matches(&self, notation: &MoveNotation) -> bool {
        self.from == notation.from
            && self.to == notation.to
            && self.is_capture() == notation.capture
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let separator = if self.is_capture() { 'x' } else { '-' };
        write!(f, "{}{}{}", self.from, separator, self.to)
    }
}

/// Parses `32-28` quiet moves and `28x19` or `28x19x10` captures.
/// Intermediate landing squares are accepted but only the ends are kept.
impl FromStr for MoveNotation {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        let s = s.trim();
        let capture = s.contains('x') || s.contains('X');
        let separators: &[char] = if capture { &['x', 'X'] } else { &['-'] };
        let squares = s
            .split(separators)
            .map(|part| part.parse::<Square>())
            .collect::<error::Result<Vec<_>>>()
            .map_err(|_| (ErrorKind::ParseMoveMalformed, s))?;

        // A king may capture its way around and finish on its own square,
        // a quiet move never does.
        let well_formed = if capture {
            squares.len() >= 2
        } else {
            squares.len() == 2 && squares[0] != squares[1]
        };
        if !well_formed {
            return Err((ErrorKind::ParseMoveMalformed, s).into());
        }

        Ok(Self {
            from: squares[0],
            to: squares[squares.len() - 1],
            capture,
        })
    }
}

impl Display for MoveNotation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let separator = if self.capture { 'x' } else { '-' };
        write!(f, "{}{}{}", self.from, separator, self.to)
    }
}
