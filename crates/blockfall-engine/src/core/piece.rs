use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    BOARD_WIDTH,
    board::Board,
    kick::kick_offsets,
    shape::{ShapeMatrix, shape},
};

/// A falling piece: kind, rotation state and bounding-box origin.
///
/// Pieces are immutable values. Movement and rotation return new `Piece`
/// instances; the caller decides whether a candidate is committed. The
/// occupied cells are derived from `(kind, rotation)` through the static
/// shape table and never stored.
///
/// # Coordinate System
///
/// - `x` grows rightward from the left wall (column 0)
/// - `y` grows downward from the top of the hidden buffer (row 0)
/// - Negative `y` is above the board; such cells are never checked for
///   occupancy
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, MoveDirection, Piece, PieceKind, RotationDirection};
///
/// let board = Board::EMPTY;
/// let piece = Piece::spawn(PieceKind::T);
/// let moved = piece.moved(MoveDirection::Right, &board).unwrap();
/// let rotated = moved
///     .super_rotated(RotationDirection::Clockwise, &board)
///     .unwrap();
/// assert_eq!(rotated.rotation().as_u8(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

/// Direction of a one-cell translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    Left,
    Right,
    Down,
}

impl MoveDirection {
    const fn offset(self) -> (i8, i8) {
        match self {
            MoveDirection::Left => (-1, 0),
            MoveDirection::Right => (1, 0),
            MoveDirection::Down => (0, 1),
        }
    }
}

/// Direction of a quarter-turn rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: PieceRotation, position: PiecePosition) -> Self {
        Self {
            position,
            rotation,
            kind,
        }
    }

    /// Builds the spawn form of a piece: rotation 0, horizontally centered,
    /// with its topmost occupied row on the top row of the hidden buffer.
    #[must_use]
    pub fn spawn(kind: PieceKind) -> Self {
        let rotation = PieceRotation::SPAWN;
        let shape = shape(kind, rotation);
        #[expect(clippy::cast_possible_truncation)]
        let position = PiecePosition::new(
            ((BOARD_WIDTH - shape.size()) / 2) as i8,
            -(shape.top_row() as i8),
        );
        Self::new(kind, rotation, position)
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &'static ShapeMatrix {
        shape(self.kind, self.rotation)
    }

    /// Returns the absolute `(x, y)` board coordinates of the occupied cells.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let x0 = i32::from(self.position.x);
        let y0 = i32::from(self.position.y);
        self.shape()
            .cells()
            .map(move |(dx, dy)| (x0 + i32::from(dx), y0 + i32::from(dy)))
    }

    /// Returns this piece shifted by `(dx, dy)` without any validity check.
    #[must_use]
    pub fn translated(&self, dx: i8, dy: i8) -> Self {
        Self {
            position: self.position.offset(dx, dy),
            ..*self
        }
    }

    /// Returns this piece turned a quarter in place, without any validity check.
    #[must_use]
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        let rotation = match direction {
            RotationDirection::Clockwise => self.rotation.rotated_right(),
            RotationDirection::CounterClockwise => self.rotation.rotated_left(),
        };
        Self { rotation, ..*self }
    }

    /// Moves one cell in `direction` if the target is valid on `board`.
    #[must_use]
    pub fn moved(&self, direction: MoveDirection, board: &Board) -> Option<Self> {
        let (dx, dy) = direction.offset();
        Some(self.translated(dx, dy)).filter(|piece| board.is_valid(piece))
    }

    /// Rotates with wall kicks.
    ///
    /// Tries the kick candidates for this piece's `from -> to` transition in
    /// order and returns the first valid placement. Returns `None` when every
    /// candidate collides, leaving the caller's piece untouched.
    #[must_use]
    pub fn super_rotated(&self, direction: RotationDirection, board: &Board) -> Option<Self> {
        let rotated = self.rotated(direction);
        kick_offsets(self.kind, self.rotation, rotated.rotation)
            .iter()
            .map(|&(dx, dy)| rotated.translated(dx, dy))
            .find(|candidate| board.is_valid(candidate))
    }

    /// A piece is grounded when it cannot move down one more row.
    #[must_use]
    pub fn is_grounded(&self, board: &Board) -> bool {
        self.moved(MoveDirection::Down, board).is_none()
    }

    /// Returns the resting position reached by repeated one-row drops.
    ///
    /// This is the ghost piece: it is pure and used both for hard drops and
    /// for rendering.
    #[must_use]
    pub fn drop_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while let Some(piece) = dropped.moved(MoveDirection::Down, board) {
            dropped = piece;
        }
        dropped
    }
}

// Format: "kind#rotation@x,y" (e.g., "S#1@4,-1")
impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.position.x,
            self.position.y
        )
    }
}

/// Error returned when parsing a [`Piece`] from its `kind#rotation@x,y` form.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid piece '{input}': {reason}")]
pub struct ParsePieceError {
    input: String,
    reason: &'static str,
}

impl FromStr for Piece {
    type Err = ParsePieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParsePieceError {
            input: s.to_owned(),
            reason,
        };

        let (kind_str, rest) = s.split_once('#').ok_or_else(|| err("missing '#'"))?;
        let (rotation_str, position_str) =
            rest.split_once('@').ok_or_else(|| err("missing '@'"))?;
        let (x_str, y_str) = position_str
            .split_once(',')
            .ok_or_else(|| err("missing ','"))?;

        let mut kind_chars = kind_str.chars();
        let kind = match (kind_chars.next(), kind_chars.next()) {
            (Some(c), None) => PieceKind::from_char(c).ok_or_else(|| err("unknown piece kind"))?,
            _ => return Err(err("piece kind must be a single character")),
        };
        let rotation = rotation_str
            .parse::<u8>()
            .ok()
            .and_then(PieceRotation::from_u8)
            .ok_or_else(|| err("rotation must be 0-3"))?;
        let x = x_str.parse::<i8>().map_err(|_| err("invalid x coordinate"))?;
        let y = y_str.parse::<i8>().map_err(|_| err("invalid y coordinate"))?;

        Ok(Piece::new(kind, rotation, PiecePosition::new(x, y)))
    }
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Origin of a piece's bounding box on the board.
///
/// Coordinates are signed: kicks may push the bounding box past the left
/// wall or above the buffer while the occupied cells stay in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PiecePosition {
    x: i8,
    y: i8,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i8 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i8 {
        self.y
    }

    #[must_use]
    pub const fn offset(self, dx: i8, dy: i8) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: one quarter turn clockwise
/// - `2`: half turn
/// - `3`: one quarter turn counterclockwise
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const SPAWN: Self = Self(0);
    pub const ALL: [Self; 4] = [Self(0), Self(1), Self(2), Self(3)];

    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        if value < 4 { Some(Self(value)) } else { None }
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn rotated_left(self) -> Self {
        PieceRotation((self.0 + 3) % 4)
    }

    pub(crate) const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds in table order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}
