use super::Board;
use crate::core::*;
use crate::utils::PRNG;

/******************************************\
|==========================================|
|              Key Definition              |
|==========================================|
\******************************************/

/// A Zobrist hash key.
pub type Key = u64;

/******************************************\
|==========================================|
|                Key Bundle                |
|==========================================|
\******************************************/

/// The Zobrist keys carried in every state record: the main position key,
/// a pawn-structure key, and per-colour non-pawn material keys.
///
/// Maintained incrementally by make/unmake; [`KeyBundle::compute`] rebuilds
/// the bundle from scratch for cross-checking.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct KeyBundle {
    /// The main Zobrist key for the entire position.
    pub key: Key,
    /// Key over the pawn structure only.
    pub pawn_key: Key,
    /// Keys over non-pawn material, indexed by `Colour::index()`.
    pub non_pawn_key: [Key; Colour::NUM],
}

impl KeyBundle {
    /// Toggles a piece on a square, in the main key and the matching
    /// pawn/non-pawn key.
    #[inline]
    pub fn toggle_piece(&mut self, piece: Piece, sq: Square) {
        if piece.pt() as u8 == PieceType::Pawn as u8 {
            self.pawn_key ^= piece_key(piece, sq);
        } else {
            self.non_pawn_key[piece.colour().index()] ^= piece_key(piece, sq);
        }
        self.key ^= piece_key(piece, sq);
    }

    /// Toggles a castling-rights mask in the main key.
    #[inline]
    pub fn toggle_castle(&mut self, flag: Castling) {
        self.key ^= castle_key(flag);
    }

    /// Toggles the side to move in the main key.
    #[inline]
    pub fn toggle_colour(&mut self) {
        self.key ^= side_key();
    }

    /// Toggles the en passant file in the main key.
    #[inline]
    pub fn toggle_ep(&mut self, file: File) {
        self.key ^= ep_key(file);
    }

    /// Computes the full bundle for a board from scratch.
    pub fn compute(board: &Board) -> KeyBundle {
        let mut keys = KeyBundle::default();

        for sq in Square::iter() {
            if let Some(piece) = board.on(sq) {
                keys.toggle_piece(piece, sq);
            }
        }

        if board.side_to_move() as u8 == Colour::Black as u8 {
            keys.toggle_colour();
        }

        keys.toggle_castle(board.castling());

        if let Some(ep_square) = board.ep() {
            keys.toggle_ep(ep_square.file());
        }

        keys
    }
}

/******************************************\
|==========================================|
|              Zobrist Table               |
|==========================================|
\******************************************/

/// The precomputed random keys: one per (piece, square), per castling-rights
/// mask, per en passant file, and one for the side to move.
#[derive(Debug)]
pub struct ZobristTable {
    pub pieces: [[Key; Square::NUM]; Piece::NUM],
    pub side_to_move: Key,
    pub castling: [Key; Castling::NUM],
    pub enpassant: [Key; File::NUM],
}

/// Global table, built at compile time.
pub const ZOBRIST: ZobristTable = init_zobrist_table();

/******************************************\
|==========================================|
|              Initialisation              |
|==========================================|
\******************************************/

const fn init_zobrist_table() -> ZobristTable {
    let mut rng = PRNG::new(0xDEADBEEFCAFEBABE);

    let mut pieces = [[0; Square::NUM]; Piece::NUM];
    let mut castling = [0; Castling::NUM];
    let mut enpassant = [0; File::NUM];

    let mut i = 0;
    while i < Piece::NUM {
        let mut j = 0;
        while j < Square::NUM {
            pieces[i][j] = rng.random_u64();
            j += 1;
        }
        i += 1;
    }

    let side_to_move = rng.random_u64();

    i = 0;
    while i < Castling::NUM {
        castling[i] = rng.random_u64();
        i += 1;
    }

    i = 0;
    while i < File::NUM {
        enpassant[i] = rng.random_u64();
        i += 1;
    }

    ZobristTable {
        pieces,
        side_to_move,
        castling,
        enpassant,
    }
}

/******************************************\
|==========================================|
|             Access Functions             |
|==========================================|
\******************************************/

/// The key for a specific piece on a specific square.
#[inline]
pub fn piece_key(piece: Piece, sq: Square) -> Key {
    unsafe {
        *ZOBRIST
            .pieces
            .get_unchecked(piece.index())
            .get_unchecked(sq.index())
    }
}

/// The key XORed in when Black is to move.
#[inline]
pub fn side_key() -> Key {
    ZOBRIST.side_to_move
}

/// The key for a castling-rights mask.
#[inline]
pub fn castle_key(flag: Castling) -> Key {
    ZOBRIST.castling[flag.0 as usize]
}

/// The key for an en passant capture being possible on a file.
#[inline]
pub fn ep_key(file: File) -> Key {
    unsafe { *ZOBRIST.enpassant.get_unchecked(file.index()) }
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
