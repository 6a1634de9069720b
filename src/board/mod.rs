pub mod defaults;
pub mod fen;
pub mod mask;
pub mod movegen;
pub mod movement;
pub mod zobrist;

pub use defaults::Defaults;
pub use fen::{KILLER_FEN, START_FEN, TRICKY_FEN};
pub use mask::CheckType;
pub use movegen::{
    CaptureGen, LegalGen, MoveList, QuietGen, attacks, bishop_attacks, king_attack, knight_attack,
    pawn_attack, queen_attacks, rook_attacks,
};
pub use zobrist::KeyBundle;

use crate::core::*;

/******************************************\
|==========================================|
|                Constants                 |
|==========================================|
\******************************************/

/// History capacity pre-allocated at construction; deeper games still work,
/// they just pay one reallocation outside the hot path.
pub const MAX_PLY: usize = 256;

/******************************************\
|==========================================|
|               Board State                |
|==========================================|
\******************************************/

/// Per-ply record: everything make/unmake cannot recompute when reversing a
/// move, plus the analysis masks derived after each move.
///
/// Records form a stack owned by the board. `make_move` pushes the previous
/// record and `undo_move` pops it; records must be unwound in strict LIFO
/// order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BoardState {
    /// Distance to the repeated position, 0 if none (negated for twofold).
    pub repetitions: i8,

    pub(crate) fifty_move: u8,

    pub(crate) captured: Option<Piece>,

    pub(crate) enpassant: Option<Square>,

    pub(crate) castle: Castling,

    pub(crate) keys: KeyBundle,

    /// Enemy pieces currently giving check.
    pub(crate) checkers: Bitboard,

    /// Squares a non-king move may land on: full board when not in check,
    /// interior + checker square under single check, empty under double check.
    pub(crate) check_mask: Bitboard,

    pub(crate) diag_pin: Bitboard,

    pub(crate) hv_pin: Bitboard,

    /// All squares the opponent attacks (defending king removed from
    /// occupancy, so sliders see through it).
    pub(crate) attacked: Bitboard,

    /// En passant capture vetoed by a discovered check.
    pub(crate) ep_pin: bool,
}

impl BoardState {
    /// The part of the record that carries forward into the next ply; the
    /// analysis masks are recomputed from scratch after every move.
    pub(super) fn snapshot(&self) -> Self {
        Self {
            fifty_move: self.fifty_move,
            castle: self.castle,
            keys: self.keys,
            enpassant: self.enpassant,
            ..Default::default()
        }
    }
}

/******************************************\
|==========================================|
|                  Board                   |
|==========================================|
\******************************************/

/// A chess position: piece-type and colour bitboards kept in lock-step with a
/// square-indexed mailbox, the side to move, and the state-record stack that
/// makes moves reversible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    board: [Option<Piece>; Square::NUM],

    pub pieces: [Bitboard; PieceType::NUM],

    pub occupied: [Bitboard; Colour::NUM],

    half_moves: u16,

    stm: Colour,

    pub state: BoardState,

    history: Vec<BoardState>,
}

/******************************************\
|==========================================|
|           Basic Implementation           |
|==========================================|
\******************************************/

impl Default for Board {
    fn default() -> Board {
        Board::from_fen(START_FEN).unwrap()
    }
}

impl Board {
    pub(crate) fn new() -> Board {
        Board {
            board: [None; Square::NUM],
            pieces: [Bitboard::EMPTY; PieceType::NUM],
            occupied: [Bitboard::EMPTY; Colour::NUM],
            stm: Colour::White,
            half_moves: 0,
            state: BoardState::default(),
            history: Vec::with_capacity(MAX_PLY),
        }
    }

    /// The piece standing on `square`, if any.
    #[inline]
    pub fn on(&self, square: Square) -> Option<Piece> {
        unsafe { *self.board.get_unchecked(square.index()) }
    }

    /// The piece standing on `square`.
    ///
    /// # Safety
    /// The square must be occupied.
    #[inline]
    pub unsafe fn on_unchecked(&self, square: Square) -> Piece {
        unsafe { self.board[square.index()].unwrap_unchecked() }
    }

    /// All pieces of one type, both colours.
    #[inline]
    pub fn piecetype_bb(&self, piecetype: PieceType) -> Bitboard {
        unsafe { *self.pieces.get_unchecked(piecetype.index()) }
    }

    /// All pieces of one colour.
    #[inline]
    pub fn occupied_bb(&self, colour: Colour) -> Bitboard {
        unsafe { *self.occupied.get_unchecked(colour.index()) }
    }

    /// All pieces of both colours.
    #[inline]
    pub fn all_occupied_bb(&self) -> Bitboard {
        self.occupied_bb(Colour::White) | self.occupied_bb(Colour::Black)
    }

    /// Pieces of one colour and type.
    #[inline]
    pub fn piece_bb(&self, col: Colour, pt: PieceType) -> Bitboard {
        self.piecetype_bb(pt) & self.occupied_bb(col)
    }

    #[inline]
    pub fn side_to_move(&self) -> Colour {
        self.stm
    }

    /// Half-moves played since the root position.
    #[inline]
    pub fn half_moves(&self) -> u16 {
        self.half_moves
    }

    /// Half-move clock for the fifty-move rule.
    #[inline]
    pub fn fifty_move(&self) -> u8 {
        self.state.fifty_move
    }

    /// The en passant target square (the square passed over by the last
    /// double push), if one is live.
    #[inline]
    pub fn ep(&self) -> Option<Square> {
        self.state.enpassant
    }

    /// The square of the pawn that would be captured en passant.
    #[inline]
    pub fn ep_target(&self) -> Option<Square> {
        self.state
            .enpassant
            .map(|sq| unsafe { sq.add_unchecked(-self.stm.forward()) })
    }

    /// Current castling rights, all four bits.
    #[inline]
    pub fn castling(&self) -> Castling {
        self.state.castle
    }

    /// Current castling rights for one side.
    #[inline]
    pub fn castling_for(&self, side: Colour) -> Castling {
        self.state.castle & Castling::side(side)
    }

    /// Whether `side` still holds the given wing's right.
    #[inline]
    pub fn has_castling_right(&self, side: Colour, king_side: bool) -> bool {
        let right = match king_side {
            true => Castling::king_side(side),
            false => Castling::queen_side(side),
        };
        self.state.castle.has(right)
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.state.keys.key
    }

    #[inline]
    pub fn pawn_key(&self) -> u64 {
        self.state.keys.pawn_key
    }

    #[inline]
    pub fn non_pawn_keys(&self) -> [u64; Colour::NUM] {
        self.state.keys.non_pawn_key
    }

    /// Whether the side to move is in check.
    #[inline]
    pub fn in_check(&self) -> bool {
        self.state.checkers.is_occupied()
    }

    /// Classifies the check on the side to move's king.
    #[inline]
    pub fn check_type(&self) -> CheckType {
        CheckType::classify(self.state.checkers)
    }

    /// Depth of the state-record stack (number of un-retracted moves).
    #[inline]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Opposing pieces attacking `sq`, from the point of view of `us`.
    ///
    /// Occupancy excludes whatever piece of ours stands on `sq`, so sliders
    /// attack "through" it; this is what king-evasion queries need.
    pub fn attackers_to(&self, sq: Square, us: Colour) -> Bitboard {
        use crate::core::PieceType::*;
        let them = !us;
        let occ = self.all_occupied_bb() & !(sq.bb() & self.occupied_bb(us));

        pawn_attack(us, sq) & self.piece_bb(them, Pawn)
            | knight_attack(sq) & self.piece_bb(them, Knight)
            | bishop_attacks(sq, occ) & self.bishop_queen_bb(them)
            | rook_attacks(sq, occ) & self.rook_queen_bb(them)
            | king_attack(sq) & self.piece_bb(them, King)
    }
}

/******************************************\
|==========================================|
|              Board Builder               |
|==========================================|
\******************************************/

/// Assembles a [`Board`] from scratch: piece placement, side to move, four
/// independent castling rights and the en passant square.
///
/// ```
/// use cardinal::{Board, BoardBuilder};
/// use cardinal::core::{Castling, Colour, PieceType, Square};
///
/// let board = BoardBuilder::new()
///     .piece(Colour::White, PieceType::King, Square::E1)
///     .piece(Colour::White, PieceType::Rook, Square::H1)
///     .piece(Colour::Black, PieceType::King, Square::E8)
///     .castling(Castling::WK)
///     .side_to_move(Colour::White)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct BoardBuilder {
    placement: [Option<Piece>; Square::NUM],
    stm: Colour,
    castle: Castling,
    enpassant: Option<Square>,
    overlap: Option<Square>,
}

impl Default for BoardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardBuilder {
    pub fn new() -> Self {
        Self {
            placement: [None; Square::NUM],
            stm: Colour::White,
            castle: Castling::NONE,
            enpassant: None,
            overlap: None,
        }
    }

    /// Places a piece. Placing two pieces on one square makes `build` fail.
    pub fn piece(mut self, col: Colour, pt: PieceType, sq: Square) -> Self {
        if self.placement[sq.index()].is_some() {
            self.overlap.get_or_insert(sq);
        }
        self.placement[sq.index()] = Some(Piece::from_parts(col, pt));
        self
    }

    pub fn side_to_move(mut self, col: Colour) -> Self {
        self.stm = col;
        self
    }

    /// Sets all four rights bits at once.
    pub fn castling(mut self, castle: Castling) -> Self {
        self.castle = castle;
        self
    }

    /// Sets or clears a single right.
    pub fn castling_right(mut self, col: Colour, king_side: bool, allowed: bool) -> Self {
        let right = match king_side {
            true => Castling::king_side(col),
            false => Castling::queen_side(col),
        };
        match allowed {
            true => self.castle.set(right),
            false => self.castle.remove(right),
        }
        self
    }

    /// Sets the en passant target square (the passed-over square).
    pub fn en_passant(mut self, sq: Square) -> Self {
        self.enpassant = Some(sq);
        self
    }

    /// Validates the description and produces a ready board with its root
    /// state record.
    pub fn build(self) -> Result<Board, BoardBuilderError> {
        if let Some(sq) = self.overlap {
            return Err(BoardBuilderError::OverlappingPieces(sq));
        }

        let mut board = Board::new();

        for sq in Square::iter() {
            if let Some(piece) = self.placement[sq.index()] {
                board.add_piece(piece, sq);
            }
        }

        for col in Colour::iter() {
            if board.piece_bb(col, PieceType::King).count_bits() != 1 {
                return Err(BoardBuilderError::InvalidKingCount);
            }
        }

        board.stm = self.stm;

        // A right only survives if its king and rook still stand at home.
        let mut castle = self.castle;
        for col in Colour::iter() {
            let x = Defaults::of(col);
            if board.on(x.king_from) != Some(Piece::from_parts(col, PieceType::King)) {
                castle.remove(Castling::side(col));
            }
            let rook = Some(Piece::from_parts(col, PieceType::Rook));
            if board.on(x.ks_rook_from) != rook {
                castle.remove(Castling::king_side(col));
            }
            if board.on(x.qs_rook_from) != rook {
                castle.remove(Castling::queen_side(col));
            }
        }
        board.state.castle = castle;

        if let Some(ep_sq) = self.enpassant {
            // The target must sit on the rank passed over by an enemy double
            // push, with the jumped pawn in place ahead of it.
            let valid_rank = match self.stm {
                Colour::White => Rank::Rank6,
                Colour::Black => Rank::Rank3,
            };
            let target = ep_sq
                .add(-self.stm.forward())
                .map_err(|_| BoardBuilderError::InvalidEnPassantSquare(ep_sq))?;
            let jumped_pawn = Piece::from_parts(!self.stm, PieceType::Pawn);
            if ep_sq.rank() != valid_rank || board.on(target) != Some(jumped_pawn) {
                return Err(BoardBuilderError::InvalidEnPassantSquare(ep_sq));
            }
            board.state.enpassant = Some(ep_sq);
        }

        board.state.keys = KeyBundle::compute(&board);
        board.update_masks();

        Ok(board)
    }
}

/******************************************\
|==========================================|
|                 Display                  |
|==========================================|
\******************************************/

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const SEPARATOR: &str = "\n     +---+---+---+---+---+---+---+---+";

        writeln!(f, "{}", SEPARATOR)?;

        for rank in Rank::iter().rev() {
            write!(f, " {}   |", rank as u8 + 1)?;

            for file in File::iter() {
                let square = Square::from_parts(file, rank);
                let cell = match self.on(square) {
                    Some(piece) => piece.to_string(),
                    None => " ".to_string(),
                };
                write!(f, " {} |", cell)?;
            }

            writeln!(f, "{}", SEPARATOR)?;
        }

        writeln!(f)?;
        writeln!(f, "       A   B   C   D   E   F   G   H")?;
        writeln!(f)?;
        writeln!(f, "Current Side: {:?}", self.side_to_move())?;
        writeln!(f, "Castling: {}", self.state.castle)?;
        writeln!(
            f,
            "En Passant Square: {}",
            match self.state.enpassant {
                Some(square) => square.to_string(),
                None => "None".to_string(),
            }
        )?;
        writeln!(f, "Half Move Clock: {}", self.state.fifty_move)?;
        writeln!(f, "Full Move: {}", self.half_moves / 2 + 1)?;
        writeln!(f, "Fen: {}", self.fen())?;
        writeln!(f, "Key: {:#X}", self.state.keys.key)
    }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_start_position() {
        use PieceType::*;

        let mut builder = BoardBuilder::new()
            .side_to_move(Colour::White)
            .castling(Castling::ALL);

        let back_rank = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        for (file, pt) in File::iter().zip(back_rank) {
            builder = builder
                .piece(Colour::White, pt, Square::from_parts(file, Rank::Rank1))
                .piece(Colour::White, Pawn, Square::from_parts(file, Rank::Rank2))
                .piece(Colour::Black, Pawn, Square::from_parts(file, Rank::Rank7))
                .piece(Colour::Black, pt, Square::from_parts(file, Rank::Rank8));
        }

        let board = builder.build().unwrap();
        assert_eq!(board, Board::from_fen(START_FEN).unwrap());
    }

    #[test]
    fn test_builder_rejects_overlap() {
        let result = BoardBuilder::new()
            .piece(Colour::White, PieceType::King, Square::E1)
            .piece(Colour::White, PieceType::Queen, Square::E1)
            .piece(Colour::Black, PieceType::King, Square::E8)
            .build();
        assert_eq!(
            result.unwrap_err(),
            BoardBuilderError::OverlappingPieces(Square::E1)
        );
    }

    #[test]
    fn test_builder_rejects_missing_king() {
        let result = BoardBuilder::new()
            .piece(Colour::White, PieceType::King, Square::E1)
            .build();
        assert_eq!(result.unwrap_err(), BoardBuilderError::InvalidKingCount);
    }

    #[test]
    fn test_builder_narrows_unfounded_rights() {
        // rights requested, but the kingside rook is gone
        let board = BoardBuilder::new()
            .piece(Colour::White, PieceType::King, Square::E1)
            .piece(Colour::White, PieceType::Rook, Square::A1)
            .piece(Colour::Black, PieceType::King, Square::E8)
            .castling(Castling::ALL)
            .build()
            .unwrap();

        assert_eq!(board.castling(), Castling::WQ);
    }

    #[test]
    fn test_builder_ep_square() {
        let board = BoardBuilder::new()
            .piece(Colour::White, PieceType::King, Square::E1)
            .piece(Colour::Black, PieceType::King, Square::E8)
            .piece(Colour::White, PieceType::Pawn, Square::E5)
            .piece(Colour::Black, PieceType::Pawn, Square::D5)
            .en_passant(Square::D6)
            .build()
            .unwrap();
        assert_eq!(board.ep(), Some(Square::D6));
        assert_eq!(board.ep_target(), Some(Square::D5));

        // no jumped pawn behind the target square
        let result = BoardBuilder::new()
            .piece(Colour::White, PieceType::King, Square::E1)
            .piece(Colour::Black, PieceType::King, Square::E8)
            .en_passant(Square::D6)
            .build();
        assert_eq!(
            result.unwrap_err(),
            BoardBuilderError::InvalidEnPassantSquare(Square::D6)
        );
    }

    #[test]
    fn test_attackers_to() {
        let board =
            Board::from_fen("4k3/8/8/8/4r3/8/8/4K3 w - - 0 1").unwrap();
        let attackers = board.attackers_to(Square::E1, Colour::White);
        assert_eq!(attackers, Square::E4.bb());

        // attacker blocked by an intervening piece
        let board =
            Board::from_fen("4k3/8/8/8/4r3/4P3/8/4K3 w - - 0 1").unwrap();
        assert!(board.attackers_to(Square::E1, Colour::White).is_empty());
    }
}
