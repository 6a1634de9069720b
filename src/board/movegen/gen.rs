//! # Module: `gen`
//!
//! The per-piece-type legal move generators.
//!
//! Every generator works set-wise on bitboards: pseudo-legal targets from
//! the lookup tables are intersected with the caller's filter (captures /
//! quiets / all), the check-evasion mask, and - for pinned pieces - the pin
//! ray through the king. What survives is legal by construction, so nothing
//! is generated and then taken back.
//!
//! Flow per call: classify the check; under double check emit king moves
//! only; otherwise run the pawn, knight, slider and king generators, and
//! castling when quiet moves are wanted and the king is not in check.
use super::*;
use crate::board::Board;
use crate::board::defaults::Defaults;
use crate::board::mask::CheckType;
use crate::core::*;

/******************************************\
|==========================================|
|             Helper Functions             |
|==========================================|
\******************************************/

/// Adds the four promotion moves (queen, rook, bishop, knight) for one
/// pawn step.
#[inline]
fn add_promotions(from: Square, to: Square, move_list: &mut MoveList) {
    move_list.add_move(Move::promotion(from, to, PieceType::Queen));
    move_list.add_move(Move::promotion(from, to, PieceType::Rook));
    move_list.add_move(Move::promotion(from, to, PieceType::Bishop));
    move_list.add_move(Move::promotion(from, to, PieceType::Knight));
}

/// Adds one move per pawn in `bb`, each stepping in `dir`; promotions fan
/// out into four moves.
///
/// `bb` holds origin squares for which the step has already been proven
/// legal, so the unchecked square arithmetic cannot leave the board.
#[inline]
fn add_pawn_moves<const PROMO: bool>(
    bb: Bitboard,
    move_list: &mut MoveList,
    dir: Direction,
    kind: MoveKind,
) {
    bb.for_each(|from| {
        let to = unsafe { from.add_unchecked(dir) };
        if PROMO {
            add_promotions(from, to, move_list);
        } else {
            move_list.add_move(Move::new(from, to, kind));
        }
    })
}

/// Splits a piece's legal destination set into captures and quiets and adds
/// the halves selected by `G`.
#[inline]
fn add_piece_moves<G: GenTypeTrait>(
    board: &Board,
    from: Square,
    dest: Bitboard,
    move_list: &mut MoveList,
) {
    let us = board.side_to_move();
    let them = !us;

    let enemy_bb = board.occupied_bb(them);
    let empty_bb = !board.all_occupied_bb();

    if G::gen_type() != MoveGenType::Quiet {
        (dest & enemy_bb).for_each(|to| {
            move_list.add_move(Move::new(from, to, MoveKind::FreeForm));
        });
    }

    if G::gen_type() != MoveGenType::Capture {
        (dest & empty_bb).for_each(|to| {
            move_list.add_move(Move::new(from, to, MoveKind::FreeForm));
        })
    }
}

/// Adds one wing's castling move if the right is held and the path is legal.
#[inline]
fn add_castling_move(castle: Castling, board: &Board, move_list: &mut MoveList) {
    if board.castling().has(castle) && board.can_castle(castle) {
        let us = board.side_to_move();
        let (dest, _, _) = Defaults::of(us).castle_wing(castle);

        move_list.add_move(Move::new(board.ksq(us), dest, MoveKind::Castling));
    }
}

/******************************************\
|==========================================|
|             Move Generation              |
|==========================================|
\******************************************/

/// Generates the legal moves selected by `G` for the current position.
pub(crate) fn generate_move<G: GenTypeTrait>(board: &Board, move_list: &mut MoveList) {
    match board.check_type() {
        // Under double check only the king can move.
        CheckType::Double => gen_king_moves::<G>(board, move_list),
        check_type => {
            gen_pawn_moves::<G>(board, move_list);
            gen_knight_moves::<G>(board, move_list);
            gen_diag_slider_moves::<G>(board, move_list);
            gen_hv_slider_moves::<G>(board, move_list);
            gen_king_moves::<G>(board, move_list);

            if check_type == CheckType::None && G::gen_type() != MoveGenType::Capture {
                gen_castling_moves(board, move_list);
            }
        }
    }
}

/// Pawn moves, dispatched into the quiet and capture halves.
fn gen_pawn_moves<G: GenTypeTrait>(board: &Board, move_list: &mut MoveList) {
    match G::gen_type() {
        MoveGenType::Quiet => gen_pawn_quiets(board, move_list),
        MoveGenType::Capture => gen_pawn_captures(board, move_list),
        MoveGenType::Legal => {
            gen_pawn_captures(board, move_list);
            gen_pawn_quiets(board, move_list);
        }
    }
}

/// Single pushes, double pushes and quiet promotions.
fn gen_pawn_quiets(board: &Board, move_list: &mut MoveList) {
    let us = board.side_to_move();
    let x = Defaults::of(us);

    let push = x.up;
    let double_push = us.double_forward();

    let empty_bb = !board.all_occupied_bb();
    let diag_pin = board.diag_pin();
    let hv_pin = board.hv_pin();
    let check_mask = board.check_mask();

    // A diagonally pinned pawn can never push.
    let moveable = board.piece_bb(us, PieceType::Pawn) & !diag_pin;
    // Pawns with an empty square ahead (pin and check filters come below).
    let mut pushable = moveable & empty_bb.shift(-push);
    // Double pushes additionally need the start rank, a second empty square
    // that satisfies the evasion mask, and an intact file pin if any.
    let double_pushable = pushable
        & (empty_bb & check_mask).shift(-double_push)
        & x.pawn_start
        & (!hv_pin | hv_pin.shift(-double_push));

    // Single pushes: land on the evasion mask, stay on the file pin if any.
    pushable &= check_mask.shift(-push) & (!hv_pin | hv_pin.shift(-push));

    if (pushable & x.promo_from).is_occupied() {
        add_pawn_moves::<true>(pushable & x.promo_from, move_list, push, MoveKind::FreeForm);
        add_pawn_moves::<false>(pushable & !x.promo_from, move_list, push, MoveKind::FreeForm);
    } else {
        add_pawn_moves::<false>(pushable, move_list, push, MoveKind::FreeForm);
    }

    add_pawn_moves::<false>(double_pushable, move_list, double_push, MoveKind::PawnJump);
}

/// Diagonal captures, capture promotions and en passant.
fn gen_pawn_captures(board: &Board, move_list: &mut MoveList) {
    let us = board.side_to_move();
    let them = !us;
    let x = Defaults::of(us);

    let left = x.up_left;
    let right = x.up_right;

    let enemy_bb = board.occupied_bb(them);
    let diag_pin = board.diag_pin();
    let hv_pin = board.hv_pin();
    let check_mask = board.check_mask();

    // A pawn pinned along a rank or file can never capture.
    let movable = board.piece_bb(us, PieceType::Pawn) & !hv_pin;

    // Capture targets must hold an enemy piece and satisfy the evasion mask;
    // a diagonally pinned pawn only captures along its pin ray.
    let mut pawn_left = movable & (enemy_bb & check_mask).shift(-left);
    pawn_left &= !diag_pin | diag_pin.shift(-left);

    let mut pawn_right = movable & (enemy_bb & check_mask).shift(-right);
    pawn_right &= !diag_pin | diag_pin.shift(-right);

    // --- En passant ---
    if let Some(ep_sq) = board.ep() {
        if !board.ep_pin() {
            // Safety: an en passant square always has the jumped pawn ahead of it.
            let ep_target = unsafe { ep_sq.add_unchecked(x.down) };

            // Under single check the capture must either take the checking
            // pawn or land on the blocking square.
            if check_mask.contains(ep_target) || check_mask.contains(ep_sq) {
                let candidates = movable
                    & (ep_target.bb().shift(Direction::E) | ep_target.bb().shift(Direction::W));

                candidates.for_each(|from| {
                    // An ordinary diagonal pin still binds the capture.
                    if !diag_pin.contains(from) || diag_pin.contains(ep_sq) {
                        move_list.add_move(Move::new(from, ep_sq, MoveKind::EnPassant));
                    }
                });
            }
        }
    }

    // --- Add capture moves ---
    if ((pawn_left | pawn_right) & x.promo_from).is_occupied() {
        add_pawn_moves::<true>(pawn_left & x.promo_from, move_list, left, MoveKind::FreeForm);
        add_pawn_moves::<true>(
            pawn_right & x.promo_from,
            move_list,
            right,
            MoveKind::FreeForm,
        );
        add_pawn_moves::<false>(
            pawn_left & !x.promo_from,
            move_list,
            left,
            MoveKind::FreeForm,
        );
        add_pawn_moves::<false>(
            pawn_right & !x.promo_from,
            move_list,
            right,
            MoveKind::FreeForm,
        );
    } else {
        add_pawn_moves::<false>(pawn_left, move_list, left, MoveKind::FreeForm);
        add_pawn_moves::<false>(pawn_right, move_list, right, MoveKind::FreeForm);
    }
}

/// Knight moves. A pinned knight can never move, whatever the pin line.
fn gen_knight_moves<G: GenTypeTrait>(board: &Board, move_list: &mut MoveList) {
    let us = board.side_to_move();

    let check_mask = board.check_mask();
    let pin_mask = board.diag_pin() | board.hv_pin();

    let knights = board.piece_bb(us, PieceType::Knight) & !pin_mask;

    knights.for_each(|from| {
        let dest = leaper_attack(PieceType::Knight, from) & check_mask;
        add_piece_moves::<G>(board, from, dest, move_list);
    })
}

/// Bishop and queen diagonal moves, pinned pieces confined to their ray.
fn gen_diag_slider_moves<G: GenTypeTrait>(board: &Board, move_list: &mut MoveList) {
    let us = board.side_to_move();

    let check_mask = board.check_mask();
    let diag_pin = board.diag_pin();
    let hv_pin = board.hv_pin();
    let all_occ = board.all_occupied_bb();

    // A diagonal mover pinned along a rank or file has no moves at all.
    let pieces =
        (board.piece_bb(us, PieceType::Queen) | board.piece_bb(us, PieceType::Bishop)) & !hv_pin;

    let pinned = pieces & diag_pin;
    let non_pinned = pieces & !diag_pin;

    pinned.for_each(|from| {
        let dest = slider_attack(PieceType::Bishop, from, all_occ) & check_mask & diag_pin;
        add_piece_moves::<G>(board, from, dest, move_list);
    });

    non_pinned.for_each(|from| {
        let dest = slider_attack(PieceType::Bishop, from, all_occ) & check_mask;
        add_piece_moves::<G>(board, from, dest, move_list);
    })
}

/// Rook and queen rank/file moves, pinned pieces confined to their ray.
fn gen_hv_slider_moves<G: GenTypeTrait>(board: &Board, move_list: &mut MoveList) {
    let us = board.side_to_move();

    let check_mask = board.check_mask();
    let diag_pin = board.diag_pin();
    let hv_pin = board.hv_pin();
    let all_occ = board.all_occupied_bb();

    let pieces =
        (board.piece_bb(us, PieceType::Queen) | board.piece_bb(us, PieceType::Rook)) & !diag_pin;

    let pinned = pieces & hv_pin;
    let non_pinned = pieces & !hv_pin;

    pinned.for_each(|from| {
        let dest = slider_attack(PieceType::Rook, from, all_occ) & check_mask & hv_pin;
        add_piece_moves::<G>(board, from, dest, move_list);
    });

    non_pinned.for_each(|from| {
        let dest = slider_attack(PieceType::Rook, from, all_occ) & check_mask;
        add_piece_moves::<G>(board, from, dest, move_list);
    })
}

/// King steps. Legality comes from the enemy attack map, not the evasion
/// mask: the king leaves the checking line instead of blocking it.
fn gen_king_moves<G: GenTypeTrait>(board: &Board, move_list: &mut MoveList) {
    let us = board.side_to_move();

    let from = board.ksq(us);
    let dest = leaper_attack(PieceType::King, from) & !board.attacked();
    add_piece_moves::<G>(board, from, dest, move_list);
}

/// Both wings' castling moves. Only called when the king is not in check and
/// quiet moves are wanted.
fn gen_castling_moves(board: &Board, move_list: &mut MoveList) {
    let us = board.side_to_move();

    add_castling_move(Castling::king_side(us), board, move_list);
    add_castling_move(Castling::queen_side(us), board, move_list);
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/
