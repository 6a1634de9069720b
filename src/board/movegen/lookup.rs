//! # Module: `lookup`
//!
//! Precomputed attack and geometry tables.
//!
//! - `PAWN_ATTACKS` / `KNIGHT_ATTACKS` / `KING_ATTACKS`: per-square attack
//!   sets for the non-sliding pieces.
//! - `BISHOP_TABLE` / `ROOK_TABLE` (in [`magic`](super::magic)): sliding
//!   attacks under an occupancy mask.
//! - `LINE_BB`: the full line through two squares (both directions, out to
//!   the board edges), empty if they are not aligned.
//! - `BETWEEN_BB`: the squares strictly between two aligned squares.
//! - `PIN_BB`: interior plus the far endpoint; the destination mask for a
//!   pinned piece and the evasion mask against a sliding checker.
//!
//! All tables are built in const context; the sliding tables are
//! materialized once behind a `LazyLock`.

use super::init::*;
use crate::core::{Bitboard, Colour, Direction, PieceType, Square};

/******************************************\
|==========================================|
|             Type Definitions             |
|==========================================|
\******************************************/

/// Attack table for a single piece type indexed by square
pub(super) type AttackTable = [Bitboard; Square::NUM];
/// Attack table for pawns indexed by colour and square
type PawnAttackTable = [[Bitboard; Square::NUM]; Colour::NUM];
/// Table mapping square pairs to bitboards
pub(super) type SquarePairTable = [[Bitboard; Square::NUM]; Square::NUM];

/******************************************\
|==========================================|
|              Attack Tables               |
|==========================================|
\******************************************/

use Direction::*;

use super::magic::{BISHOP_MAGICS, BISHOP_TABLE, ROOK_MAGICS, ROOK_TABLE};

/// Precomputed pawn attacks, indexed by `[Colour][Square]`.
const PAWN_ATTACKS: PawnAttackTable = [
    init_pseudo_attacks(&[NE, NW]), // White pawn attacks (index 0)
    init_pseudo_attacks(&[SE, SW]), // Black pawn attacks (index 1)
];

/// Precomputed knight attacks, indexed by `[Square]`.
const KNIGHT_ATTACKS: AttackTable = init_pseudo_attacks(&[NNE, NNW, NEE, NWW, SEE, SWW, SSE, SSW]);

/// Precomputed king attacks, indexed by `[Square]`.
const KING_ATTACKS: AttackTable = init_pseudo_attacks(&[N, NE, NW, E, W, SE, SW, S]);

/******************************************\
|==========================================|
|              Lookup Tables               |
|==========================================|
\******************************************/

/// Full lines through square pairs, indexed by `[Square][Square]`.
const LINE_BB: SquarePairTable = init_line_bb_table();

/// Exclusive interiors between square pairs, indexed by `[Square][Square]`.
const BETWEEN_BB: SquarePairTable = init_between_bb_table();

/// Pin/evasion masks between square pairs, indexed by `[Square][Square]`.
const PIN_BB: SquarePairTable = init_pin_bb_table();

/******************************************\
|==========================================|
|               Get Attacks                |
|==========================================|
\******************************************/

/// Squares a pawn of `col` on `sq` attacks.
#[inline]
pub fn pawn_attack(col: Colour, sq: Square) -> Bitboard {
    unsafe {
        *PAWN_ATTACKS
            .get_unchecked(col.index())
            .get_unchecked(sq.index())
    }
}

/// Squares a knight on `sq` attacks.
#[inline]
pub fn knight_attack(sq: Square) -> Bitboard {
    unsafe { *KNIGHT_ATTACKS.get_unchecked(sq.index()) }
}

/// Squares a king on `sq` attacks.
#[inline]
pub fn king_attack(sq: Square) -> Bitboard {
    unsafe { *KING_ATTACKS.get_unchecked(sq.index()) }
}

/// Squares a bishop on `sq` attacks under `occ`.
#[inline]
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    unsafe { *BISHOP_TABLE.get_unchecked(BISHOP_MAGICS[sq.index()].index(occ)) }
}

/// Squares a rook on `sq` attacks under `occ`.
#[inline]
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    unsafe { *ROOK_TABLE.get_unchecked(ROOK_MAGICS[sq.index()].index(occ)) }
}

/// Squares a queen on `sq` attacks under `occ`.
#[inline]
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    bishop_attacks(sq, occ) | rook_attacks(sq, occ)
}

/// Precomputed attacks for a knight or king.
#[inline]
pub(crate) fn leaper_attack(pt: PieceType, sq: Square) -> Bitboard {
    debug_assert!(matches!(pt, PieceType::Knight | PieceType::King));
    match pt {
        PieceType::Knight => knight_attack(sq),
        _ => king_attack(sq),
    }
}

/// Magic-table attacks for a bishop or rook under `occ`.
#[inline]
pub(crate) fn slider_attack(pt: PieceType, sq: Square, occ: Bitboard) -> Bitboard {
    debug_assert!(matches!(pt, PieceType::Bishop | PieceType::Rook));
    match pt {
        PieceType::Bishop => bishop_attacks(sq, occ),
        _ => rook_attacks(sq, occ),
    }
}

/// Attack set for any piece of `col` on `sq` under `occ`.
#[inline]
pub fn attacks(col: Colour, pt: PieceType, sq: Square, occ: Bitboard) -> Bitboard {
    match pt {
        PieceType::Pawn => pawn_attack(col, sq),
        PieceType::Knight => knight_attack(sq),
        PieceType::King => king_attack(sq),
        PieceType::Bishop => bishop_attacks(sq, occ),
        PieceType::Rook => rook_attacks(sq, occ),
        PieceType::Queen => queen_attacks(sq, occ),
    }
}

/******************************************\
|==========================================|
|           Get Bitboard Lookups           |
|==========================================|
\******************************************/

/// The full line through `from` and `to`, extended to the board edges,
/// endpoints included. Empty if the squares are not aligned (or equal).
#[inline]
pub fn line_bb(from: Square, to: Square) -> Bitboard {
    LINE_BB[from.index()][to.index()]
}

/// The squares strictly between `from` and `to`. Empty if the squares are
/// not aligned, equal, or adjacent.
#[inline]
pub fn between_bb(from: Square, to: Square) -> Bitboard {
    BETWEEN_BB[from.index()][to.index()]
}

/// The destination mask along a pin or check line: the squares strictly
/// between `king` and `pinner`, plus the pinner's own square (capturing it
/// is allowed). Excludes the king's square; empty if not aligned.
#[inline]
pub fn pin_bb(king: Square, pinner: Square) -> Bitboard {
    PIN_BB[king.index()][pinner.index()]
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
