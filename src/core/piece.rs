use super::errors::ParsePieceError;
use crate::core::Colour;

/******************************************\
|==========================================|
|                  Piece                   |
|==========================================|
\******************************************/

/// # Piece representation
///
/// - A coloured piece, packed as `colour | piece_type << 1`

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    WhitePawn, BlackPawn, WhiteKnight, BlackKnight, WhiteBishop, BlackBishop,
    WhiteRook, BlackRook, WhiteQueen, BlackQueen, WhiteKing, BlackKing,
}

impl Piece {
    /// Number of elements in the Piece enum
    pub const NUM: usize = 12;
}

crate::impl_from_to_primitive!(Piece);
crate::impl_enum_iter!(Piece);

/******************************************\
|==========================================|
|                Piece Type                |
|==========================================|
\******************************************/

/// # Piece Type representation

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceType {
   Pawn, Knight, Bishop, Rook, Queen, King,
}

impl PieceType {
    /// Number of elements in the PieceType enum
    pub const NUM: usize = 6;
}

crate::impl_from_to_primitive!(PieceType);
crate::impl_enum_iter!(PieceType);

/******************************************\
|==========================================|
|              Implementation              |
|==========================================|
\******************************************/

impl Piece {
    /// Returns the piece type of the piece
    pub const fn pt(self) -> PieceType {
        unsafe { PieceType::from_unchecked(self as u8 >> 1) }
    }

    /// Returns the colour of the piece
    pub const fn colour(self) -> Colour {
        unsafe { Colour::from_unchecked(self as u8 & 1) }
    }

    /// Combines a colour and a piece type into a piece
    ///
    /// ## Examples
    ///
    /// ```
    /// use cardinal::core::{Piece, Colour, PieceType};
    ///
    /// assert_eq!(Piece::from_parts(Colour::White, PieceType::Pawn), Piece::WhitePawn);
    /// assert_eq!(Piece::from_parts(Colour::Black, PieceType::King), Piece::BlackKing);
    /// ```
    pub const fn from_parts(colour: Colour, piece_type: PieceType) -> Self {
        unsafe { Piece::from_unchecked(colour as u8 | (piece_type as u8) << 1) }
    }
}

/******************************************\
|==========================================|
|                 Display                  |
|==========================================|
\******************************************/

/// FEN characters for every piece, in `Piece` discriminant order
const PIECE_STR: &str = "PpNnBbRrQqKk";

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let piece_char = PIECE_STR.chars().nth(self.index()).unwrap();
        write!(f, "{}", piece_char)
    }
}

impl std::fmt::Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let piece_char = PIECE_STR
            .chars()
            .nth(self.index() << 1)
            .unwrap()
            .to_ascii_lowercase();
        write!(f, "{}", piece_char)
    }
}

/******************************************\
|==========================================|
|               Parse Piece                |
|==========================================|
\******************************************/

impl std::str::FromStr for Piece {
    type Err = ParsePieceError;

    /// Parses a FEN piece character into a Piece
    ///
    /// ## Examples
    ///
    /// ```
    /// use cardinal::core::Piece;
    ///
    /// assert_eq!("P".parse::<Piece>().unwrap(), Piece::WhitePawn);
    /// assert_eq!("k".parse::<Piece>().unwrap(), Piece::BlackKing);
    /// assert!("X".parse::<Piece>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 1 {
            return Err(ParsePieceError::InvalidLength(s.len()));
        }

        let piece_char = s.chars().next().ok_or(ParsePieceError::InvalidLength(0))?;
        let index = PIECE_STR
            .chars()
            .position(|c| c == piece_char)
            .ok_or(ParsePieceError::InvalidChar(piece_char))? as u8;

        unsafe { Ok(Piece::from_unchecked(index)) }
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
