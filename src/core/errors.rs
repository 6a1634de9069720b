//! Error types for the driver-facing boundary of the crate.
//!
//! The board core itself runs under strict preconditions (debug assertions on
//! the hot path); recoverable errors only arise where externally supplied
//! data enters: text parsing and position construction.

use thiserror::Error;

/******************************************\
|==========================================|
|            Piece Parse Error             |
|==========================================|
\******************************************/

/// Errors from parsing a [`Piece`](crate::core::Piece) out of a FEN character.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsePieceError {
    /// The input was not a single character.
    #[error("Invalid length for piece string: {0}, expected 1")]
    InvalidLength(usize),
    /// The character does not name a piece.
    #[error("Invalid character for piece string: '{0}', expected one of \"PpNnBbRrQqKk\"")]
    InvalidChar(char),
}

/******************************************\
|==========================================|
|            Square Add Errors             |
|==========================================|
\******************************************/

/// Errors from square arithmetic (adding a [`Direction`](crate::core::Direction)).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareAddError {
    /// The step would leave the board or wrap around an edge.
    #[error("Square operation resulted in an out-of-bounds position")]
    OutOfBounds,
}

/******************************************\
|==========================================|
|           Square Parse Errors            |
|==========================================|
\******************************************/

/// Errors from parsing a [`File`](crate::core::File) out of a character.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFileError {
    /// The input was not a single character.
    #[error("Invalid length for file string: {0}, expected 1")]
    InvalidLength(usize),
    /// The character is outside 'a'..='h'.
    #[error("Invalid character for file string: '{0}', expected 'a'-'h'")]
    InvalidChar(char),
}

/// Errors from parsing a [`Rank`](crate::core::Rank) out of a character.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseRankError {
    /// The input was not a single character.
    #[error("Invalid length for rank string: {0}, expected 1")]
    InvalidLength(usize),
    /// The character is outside '1'..='8'.
    #[error("Invalid character for rank string: '{0}', expected '1'-'8'")]
    InvalidChar(char),
}

/// Errors from parsing a [`Square`](crate::core::Square) out of algebraic
/// notation such as "e4".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseSquareError {
    /// The input was not exactly two characters.
    #[error("Invalid length for square string: {0}, expected 2")]
    InvalidLength(usize),
    /// The first character is not a file.
    #[error("Invalid character for file string: '{0}', expected 'a'-'h'")]
    InvalidFileChar(char),
    /// The second character is not a rank.
    #[error("Invalid character for rank string: '{0}', expected '1'-'8'")]
    InvalidRankChar(char),
}

/******************************************\
|==========================================|
|            Fen Parse Errors              |
|==========================================|
\******************************************/

/// Errors from parsing a FEN record.
///
/// A valid FEN has six whitespace-separated fields: piece placement, side to
/// move, castling availability, en passant target, halfmove clock, fullmove
/// number. Example: `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenParseError {
    /// The record did not contain exactly six fields.
    #[error("FEN string must have 6 fields separated by spaces")]
    InvalidNumberOfFields,
    /// An unexpected character in the piece placement field.
    #[error("Invalid character in FEN piece placement: '{0}'")]
    InvalidPiecePlacementChar(char),
    /// A rank of the placement field does not describe exactly eight files.
    #[error("Invalid rank format in FEN piece placement: {0}")]
    InvalidRankFormat(String),
    /// The side-to-move field was not 'w' or 'b'.
    #[error("Invalid side to move in FEN: '{0}', expected 'w' or 'b'")]
    InvalidSideToMove(String),
    /// The castling field held a character other than 'K', 'Q', 'k', 'q', '-'.
    #[error("Invalid character in FEN castling availability: '{0}'")]
    InvalidCastlingChar(char),
    /// The en passant field was neither '-' nor a square on rank 3/6.
    #[error("Invalid en passant target square in FEN: '{0}'")]
    InvalidEnPassantSquare(String),
    /// The halfmove clock could not be parsed as a non-negative integer.
    #[error("Invalid halfmove clock value in FEN: '{0}'")]
    InvalidHalfmoveClock(String),
    /// The fullmove number could not be parsed as a positive integer.
    #[error("Invalid fullmove number value in FEN: '{0}'")]
    InvalidFullmoveNumber(String),
    /// The described position cannot be represented by a board.
    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] BoardBuilderError),
}

/******************************************\
|==========================================|
|           Board Builder Errors           |
|==========================================|
\******************************************/

/// Errors from assembling a [`Board`](crate::board::Board) through the builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardBuilderError {
    /// Two pieces were placed on the same square.
    #[error("Square {0} is occupied by more than one piece")]
    OverlappingPieces(crate::core::Square),
    /// A side is missing its king, or has more than one.
    #[error("Each side must have exactly one king")]
    InvalidKingCount,
    /// The en passant square is not on the capture rank for the side to move.
    #[error("En passant square {0} is not a valid target for the side to move")]
    InvalidEnPassantSquare(crate::core::Square),
}
