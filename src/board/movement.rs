use super::Board;
use super::defaults::Defaults;
use crate::core::*;

/******************************************\
|==========================================|
|       Castling Rights Narrowing          |
|==========================================|
\******************************************/

/// Rights remaining after a move touches a square, indexed by square.
///
/// Moving the king off its origin clears both wings; moving a rook off its
/// origin clears that wing; and because the table is applied to a move's
/// destination as well, capturing a rook on its origin square clears the
/// victim's wing too.
const CASTLING_RIGHTS: [Castling; Square::NUM] = {
    let mut table = [Castling::ALL; Square::NUM];
    table[Square::A1 as usize] = Castling(Castling::ALL.0 & !Castling::WQ.0);
    table[Square::E1 as usize] = Castling(Castling::ALL.0 & !Castling::WHITE_CASTLING.0);
    table[Square::H1 as usize] = Castling(Castling::ALL.0 & !Castling::WK.0);
    table[Square::A8 as usize] = Castling(Castling::ALL.0 & !Castling::BQ.0);
    table[Square::E8 as usize] = Castling(Castling::ALL.0 & !Castling::BLACK_CASTLING.0);
    table[Square::H8 as usize] = Castling(Castling::ALL.0 & !Castling::BK.0);
    table
};

impl Board {
    /******************************************\
    |==========================================|
    |     Mailbox / Bitboard Mutators          |
    |==========================================|
    \******************************************/

    // Every board mutation goes through these three, so the mailbox and the
    // bitboards cannot drift apart. They deliberately know nothing about
    // keys, clocks or rights.

    /// Adds a piece to the board at the specified square.
    #[inline]
    pub(crate) fn add_piece(&mut self, piece: Piece, square: Square) {
        debug_assert!(self.on(square).is_none(), "add_piece: 'square' is occupied");
        self.board[square.index()] = Some(piece);
        self.pieces[piece.pt().index()].set(square);
        self.occupied[piece.colour().index()].set(square);
    }

    /// Removes the piece standing on the specified square.
    #[inline]
    pub(crate) fn remove_piece(&mut self, square: Square) {
        debug_assert!(self.on(square).is_some(), "remove_piece: 'square' is empty");
        let piece = unsafe { self.on(square).unwrap_unchecked() };
        self.board[square.index()] = None;
        self.pieces[piece.pt().index()].clear(square);
        self.occupied[piece.colour().index()].clear(square);
    }

    /// Moves a piece between two squares; the destination must be empty.
    #[inline]
    pub(crate) fn move_piece(&mut self, from: Square, to: Square) {
        debug_assert!(
            self.on(from).is_some(),
            "move_piece: 'from' square is empty"
        );
        debug_assert!(self.on(to).is_none(), "move_piece: 'to' square is occupied");
        let piece = unsafe { self.on(from).unwrap_unchecked() };
        self.board[from.index()] = None;
        self.board[to.index()] = Some(piece);
        self.pieces[piece.pt().index()].clear(from);
        self.pieces[piece.pt().index()].set(to);
        self.occupied[piece.colour().index()].clear(from);
        self.occupied[piece.colour().index()].set(to);
    }

    /******************************************\
    |==========================================|
    |             Move Application             |
    |==========================================|
    \******************************************/

    /// Records the en passant square behind a double push from `from` and
    /// folds it into the key.
    #[inline]
    fn set_ep(&mut self, from: Square) {
        let us = self.side_to_move();
        let ep_sq = unsafe { from.add_unchecked(us.forward()) };
        self.state.enpassant = Some(ep_sq);
        self.state.keys.toggle_ep(ep_sq.file());
    }

    /// Shuttles the rook for a castling move. The wing is read off the king's
    /// destination square.
    #[inline]
    fn castle_rook(&mut self, king_to: Square) {
        let us = self.side_to_move();
        let x = Defaults::of(us);
        let piece = Piece::from_parts(us, PieceType::Rook);

        let (rook_from, rook_to) = if king_to == x.ks_king_to {
            (x.ks_rook_from, x.ks_rook_to)
        } else {
            (x.qs_rook_from, x.qs_rook_to)
        };

        self.move_piece(rook_from, rook_to);

        self.state.keys.toggle_piece(piece, rook_from);
        self.state.keys.toggle_piece(piece, rook_to);
    }

    /// Reverses the rook shuttle of a castling move. Key restoration is the
    /// caller's concern (the whole bundle comes back with the popped record).
    #[inline]
    fn undo_castle_rook(&mut self, king_to: Square) {
        let us = self.side_to_move();
        let x = Defaults::of(us);

        let (rook_from, rook_to) = if king_to == x.ks_king_to {
            (x.ks_rook_from, x.ks_rook_to)
        } else {
            (x.qs_rook_from, x.qs_rook_to)
        };

        self.move_piece(rook_to, rook_from);
    }

    /// Narrows the castling rights for a move between `from` and `to`,
    /// keeping the key in sync.
    #[inline]
    fn update_castle_rights(&mut self, from: Square, to: Square) {
        self.state.keys.toggle_castle(self.state.castle);
        self.state
            .castle
            .mask(CASTLING_RIGHTS[from.index()] & CASTLING_RIGHTS[to.index()]);
        self.state.keys.toggle_castle(self.state.castle);
    }

    /// Scans the reversible tail of the history for a repetition of the
    /// current position and records its distance (negated once the position
    /// has occurred twice before).
    #[inline]
    fn update_repetitions(&mut self) {
        self.state.repetitions = 0;

        let roll_back: usize = 1 + self.state.fifty_move as usize;

        let iterator = self
            .history
            .iter()
            .rev()
            .enumerate()
            .take(roll_back)
            .skip(1)
            .step_by(2);

        for (idx, state) in iterator {
            if state.keys.key == self.state.keys.key {
                if state.repetitions == 0 {
                    self.state.repetitions = idx as i8;
                } else {
                    self.state.repetitions = -(idx as i8);
                }
                break;
            }
        }
    }

    /// Applies a move, pushing the previous state record.
    ///
    /// The move must be legal for the current position: this function does
    /// not re-validate. Captures are read off the mailbox - the move word
    /// carries no capture bit - so an en passant capture is the only case
    /// where the captured pawn is not on the destination square.
    pub fn make_move(&mut self, move_: Move) {
        let state = self.state.snapshot();
        let old = std::mem::replace(&mut self.state, state);
        self.history.push(old);
        self.half_moves += 1;

        let from = move_.from();
        let to = move_.to();
        let us = self.side_to_move();
        let them = !us;
        debug_assert!(self.on(from).is_some(), "make_move: 'from' square is empty");
        let piece = unsafe { self.on(from).unwrap_unchecked() };

        // Incremented by default, reset below by pawn moves and captures.
        self.state.fifty_move += 1;

        // A stale en passant square never carries forward. Must happen before
        // a double push sets the new one.
        if let Some(ep_sq) = self.state.enpassant {
            self.state.keys.toggle_ep(ep_sq.file());
            self.state.enpassant = None;
        }

        if move_.is_promotion() {
            self.state.fifty_move = 0;
            if let Some(captured) = self.on(to) {
                self.state.captured = Some(captured);
                self.remove_piece(to);
                self.state.keys.toggle_piece(captured, to);
            }
            // The pawn leaves the board and the promoted piece enters.
            let promo_piece = Piece::from_parts(us, move_.promotion_pt());
            self.remove_piece(from);
            self.state.keys.toggle_piece(piece, from);
            self.add_piece(promo_piece, to);
            self.state.keys.toggle_piece(promo_piece, to);
            // A capture on a corner square can take a rook's rights with it.
            self.update_castle_rights(from, to);
        } else {
            match move_.kind() {
                MoveKind::FreeForm => {
                    if piece.pt() == PieceType::Pawn {
                        self.state.fifty_move = 0;
                    }
                    if let Some(captured) = self.on(to) {
                        self.state.fifty_move = 0;
                        self.state.captured = Some(captured);
                        self.remove_piece(to);
                        self.state.keys.toggle_piece(captured, to);
                    }
                    self.move_piece(from, to);
                    self.state.keys.toggle_piece(piece, from);
                    self.state.keys.toggle_piece(piece, to);
                    self.update_castle_rights(from, to);
                }
                MoveKind::PawnJump => {
                    self.state.fifty_move = 0;
                    self.set_ep(from);
                    self.move_piece(from, to);
                    self.state.keys.toggle_piece(piece, from);
                    self.state.keys.toggle_piece(piece, to);
                }
                MoveKind::Castling => {
                    // Lift the king first so the rook can cross its square.
                    self.remove_piece(from);
                    self.state.keys.toggle_piece(piece, from);
                    self.castle_rook(to);
                    self.add_piece(piece, to);
                    self.state.keys.toggle_piece(piece, to);
                    self.update_castle_rights(from, to);
                }
                MoveKind::EnPassant => {
                    self.state.fifty_move = 0;
                    let cap_sq = unsafe { to.add_unchecked(-us.forward()) };
                    let captured_pawn = Piece::from_parts(them, PieceType::Pawn);
                    self.state.captured = Some(captured_pawn);
                    self.remove_piece(cap_sq);
                    self.state.keys.toggle_piece(captured_pawn, cap_sq);
                    self.move_piece(from, to);
                    self.state.keys.toggle_piece(piece, from);
                    self.state.keys.toggle_piece(piece, to);
                }
            }
        }

        self.stm = !self.stm;
        self.state.keys.toggle_colour();
        self.update_masks();
        self.update_repetitions();
    }

    /// Reverses the move that produced the current state record and pops it.
    ///
    /// Must receive exactly the move passed to the matching `make_move`, in
    /// strict LIFO order; the captured piece is read from the record being
    /// popped. Keys, rights, clocks and analysis masks all come back with
    /// the restored record, so nothing is recomputed here.
    pub fn undo_move(&mut self, move_: Move) {
        self.stm = !self.stm;
        self.half_moves -= 1;

        let from = move_.from();
        let to = move_.to();
        let us = self.side_to_move();
        let captured = self.state.captured;

        debug_assert!(!self.history.is_empty(), "undo_move without a prior make_move");
        self.state = self.history.pop().unwrap();

        if move_.is_promotion() {
            self.remove_piece(to);
            if let Some(captured) = captured {
                self.add_piece(captured, to);
            }
            self.add_piece(Piece::from_parts(us, PieceType::Pawn), from);
        } else {
            match move_.kind() {
                MoveKind::FreeForm => {
                    self.move_piece(to, from);
                    if let Some(captured) = captured {
                        self.add_piece(captured, to);
                    }
                }
                MoveKind::PawnJump => {
                    self.move_piece(to, from);
                }
                MoveKind::Castling => {
                    self.remove_piece(to);
                    self.undo_castle_rook(to);
                    self.add_piece(Piece::from_parts(us, PieceType::King), from);
                }
                MoveKind::EnPassant => {
                    self.move_piece(to, from);
                    let cap_sq = unsafe { to.add_unchecked(-us.forward()) };
                    debug_assert!(
                        captured.is_some(),
                        "undo_move: en passant record has no captured piece"
                    );
                    self.add_piece(unsafe { captured.unwrap_unchecked() }, cap_sq);
                }
            }
        }
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
    use crate::board::START_FEN;
    use crate::board::zobrist::KeyBundle;

    /// Applies `move_to_test`, checks the resulting FEN, reverses it and
    /// checks full restoration (FEN, keys, record-stack depth).
    fn test_make_undo(fen_before: &str, move_to_test: Move, fen_after: &str) {
        let mut board = Board::from_fen(fen_before).expect("Test FEN should be valid");
        let keys_before = board.state.keys;
        let ply_before = board.ply();

        board.make_move(move_to_test);

        assert_eq!(
            board.fen(),
            fen_after,
            "FEN mismatch after make_move for '{}'",
            move_to_test
        );
        assert_eq!(board.ply(), ply_before + 1);
        assert_ne!(
            keys_before.key, board.state.keys.key,
            "Key should change after make_move for '{}'",
            move_to_test
        );
        // The incremental key must agree with a from-scratch computation.
        assert_eq!(
            board.state.keys,
            KeyBundle::compute(&board),
            "Incremental keys diverged after '{}'",
            move_to_test
        );

        board.undo_move(move_to_test);

        assert_eq!(
            board.fen(),
            fen_before,
            "FEN mismatch after undo_move for '{}'",
            move_to_test
        );
        assert_eq!(board.ply(), ply_before);
        assert_eq!(
            board.state.keys, keys_before,
            "Key mismatch after undo_move for '{}'",
            move_to_test
        );
    }

    #[test]
    fn test_double_pawn_push() {
        test_make_undo(
            START_FEN,
            Move::new(Square::E2, Square::E4, MoveKind::PawnJump), // e2e4
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        );
    }

    #[test]
    fn test_quiet_knight_move() {
        test_make_undo(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1", // After 1. e4
            Move::new(Square::G8, Square::F6, MoveKind::FreeForm),         // ...Nf6
            "rnbqkb1r/pppppppp/5n2/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 1 2",
        );
    }

    #[test]
    fn test_capture() {
        test_make_undo(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2", // After 1.e4 d5
            Move::new(Square::E4, Square::D5, MoveKind::FreeForm),           // exd5
            "rnbqkbnr/ppp1pppp/8/3P4/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2",
        );
    }

    #[test]
    fn test_en_passant_capture() {
        let fen_before_ep = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
        test_make_undo(
            fen_before_ep,
            Move::new(Square::E5, Square::D6, MoveKind::EnPassant), // exd6 e.p.
            "rnbqkbnr/ppp1pppp/3P4/8/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3",
        );
    }

    #[test]
    fn test_black_en_passant_capture() {
        let mut board = Board::from_fen(START_FEN).unwrap();
        board.make_move(Move::new(Square::D2, Square::D4, MoveKind::PawnJump)); // 1. d4
        board.make_move(Move::new(Square::F7, Square::F5, MoveKind::PawnJump)); // 1... f5
        board.make_move(Move::new(Square::D4, Square::D5, MoveKind::FreeForm)); // 2. d5
        board.make_move(Move::new(Square::E7, Square::E5, MoveKind::PawnJump)); // 2... e5

        let fen_before_ep = board.fen();
        assert_eq!(
            fen_before_ep,
            "rnbqkbnr/pppp2pp/8/3Ppp2/8/8/PPP1PPPP/RNBQKBNR w KQkq e6 0 3"
        );

        test_make_undo(
            &fen_before_ep,
            Move::new(Square::D5, Square::E6, MoveKind::EnPassant), // dxe6 e.p.
            "rnbqkbnr/pppp2pp/4P3/5p2/8/8/PPP1PPPP/RNBQKBNR b KQkq - 0 3",
        );
    }

    #[test]
    fn test_white_kingside_castle() {
        let fen_before_castle = "rnbq1bnr/pppppkpp/8/8/8/8/PPPPPPPP/RNBQK2R w KQ - 0 5";
        test_make_undo(
            fen_before_castle,
            Move::new(Square::E1, Square::G1, MoveKind::Castling), // O-O
            "rnbq1bnr/pppppkpp/8/8/8/8/PPPPPPPP/RNBQ1RK1 b - - 1 5",
        );
    }

    #[test]
    fn test_black_queenside_castle() {
        let fen_before_castle = "r3kbnr/p1pp1ppp/bpn1p3/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 7";
        test_make_undo(
            fen_before_castle,
            Move::new(Square::E8, Square::C8, MoveKind::Castling), // O-O-O
            "2kr1bnr/p1pp1ppp/bpn1p3/8/8/8/PPPPPPPP/RNBQKBNR w KQ - 1 8",
        );
    }

    #[test]
    fn test_promotion_quiet() {
        let fen_before_promo = "r1bqkbnr/pPpppppp/8/8/8/8/1PPPPPPP/RNBQKBNR w KQkq - 0 6";
        test_make_undo(
            fen_before_promo,
            Move::promotion(Square::B7, Square::B8, PieceType::Queen), // b8=Q
            "rQbqkbnr/p1pppppp/8/8/8/8/1PPPPPPP/RNBQKBNR b KQkq - 0 6",
        );
    }

    #[test]
    fn test_promotion_capture() {
        let fen_before_promo_cap = "r1bqkbnr/pPpppppp/8/8/8/8/1PPPPPPP/RNBQKBNR w KQkq - 0 6";
        test_make_undo(
            fen_before_promo_cap,
            Move::promotion(Square::B7, Square::A8, PieceType::Knight), // bxa8=N
            "N1bqkbnr/p1pppppp/8/8/8/8/1PPPPPPP/RNBQKBNR b KQk - 0 6",
        );
    }

    #[test]
    fn test_castling_rights_king_move() {
        test_make_undo(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1",
            Move::new(Square::E1, Square::E2, MoveKind::FreeForm), // Ke2
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPKPPP/RNBQ1BNR b kq - 1 1",
        );
        test_make_undo(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1",
            Move::new(Square::E1, Square::D1, MoveKind::FreeForm), // Kd1
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBK1BNR b kq - 1 1",
        );
    }

    #[test]
    fn test_castling_rights_rook_move() {
        test_make_undo(
            "rnbqkbnr/pppppppp/8/8/8/8/1PPPPPPP/RNBQKBNR w KQkq - 0 1",
            Move::new(Square::A1, Square::A2, MoveKind::FreeForm), // Ra2
            "rnbqkbnr/pppppppp/8/8/8/8/RPPPPPPP/1NBQKBNR b Kkq - 1 1",
        );
        test_make_undo(
            "rnbqkbnr/ppppppp1/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1",
            Move::new(Square::H8, Square::H6, MoveKind::FreeForm), // Rh6
            "rnbqkbn1/ppppppp1/7r/8/8/8/PPPPPPPP/RNBQKBNR w KQq - 1 2",
        );
    }

    #[test]
    fn test_castling_rights_rook_capture() {
        // capturing the A8 rook must clear black's queenside right
        test_make_undo(
            "rnbqkbnr/pppppppp/1N6/8/8/8/PPPPPPPP/R1BQKBNR w KQkq - 0 1",
            Move::new(Square::B6, Square::A8, MoveKind::FreeForm), // Nxa8
            "Nnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/R1BQKBNR b KQk - 0 1",
        );
    }

    #[test]
    fn test_fifty_move_counter() {
        let mut board = Board::from_fen(START_FEN).unwrap();
        assert_eq!(board.fifty_move(), 0);

        // pawn move resets
        board.make_move(Move::new(Square::E2, Square::E4, MoveKind::PawnJump));
        assert_eq!(board.fifty_move(), 0);
        board.undo_move(Move::new(Square::E2, Square::E4, MoveKind::PawnJump));

        // capture resets
        board.make_move(Move::new(Square::E2, Square::E4, MoveKind::PawnJump));
        board.make_move(Move::new(Square::D7, Square::D5, MoveKind::PawnJump));
        board.make_move(Move::new(Square::E4, Square::D5, MoveKind::FreeForm));
        assert_eq!(board.fifty_move(), 0);
        board.undo_move(Move::new(Square::E4, Square::D5, MoveKind::FreeForm));
        board.undo_move(Move::new(Square::D7, Square::D5, MoveKind::PawnJump));
        board.undo_move(Move::new(Square::E2, Square::E4, MoveKind::PawnJump));

        // quiet piece move increments
        board.make_move(Move::new(Square::G1, Square::F3, MoveKind::FreeForm));
        assert_eq!(board.fifty_move(), 1);
    }

    #[test]
    fn test_ep_square_lives_one_ply() {
        let mut board = Board::from_fen(START_FEN).unwrap();
        board.make_move(Move::new(Square::E2, Square::E4, MoveKind::PawnJump));
        assert_eq!(board.ep(), Some(Square::E3));

        // any reply that is not a double push clears it
        board.make_move(Move::new(Square::G8, Square::F6, MoveKind::FreeForm));
        assert_eq!(board.ep(), None);

        board.undo_move(Move::new(Square::G8, Square::F6, MoveKind::FreeForm));
        assert_eq!(board.ep(), Some(Square::E3));
    }

    #[test]
    fn test_three_fold_repetition() {
        let mut board = Board::from_fen(START_FEN).unwrap();

        let nf3 = Move::new(Square::G1, Square::F3, MoveKind::FreeForm);
        let nc6 = Move::new(Square::B8, Square::C6, MoveKind::FreeForm);
        let ng1 = Move::new(Square::F3, Square::G1, MoveKind::FreeForm);
        let nb8 = Move::new(Square::C6, Square::B8, MoveKind::FreeForm);

        board.make_move(nf3);
        board.make_move(nc6);
        assert_eq!(board.state.repetitions, 0);
        board.make_move(ng1);
        board.make_move(nb8);
        assert_eq!(board.state.repetitions, 3);
        board.make_move(nf3);
        board.make_move(nc6);
        assert_eq!(board.state.repetitions, 3);
        board.make_move(ng1);
        board.make_move(nb8);
        assert_eq!(board.state.repetitions, -3);
    }

    #[test]
    fn test_round_trip_restores_all_boards() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut board = Board::from_fen(fen).unwrap();
        let reference = board.clone();

        let moves = [
            Move::new(Square::E2, Square::A6, MoveKind::FreeForm), // Bxa6
            Move::new(Square::B4, Square::C3, MoveKind::FreeForm), // bxc3
            Move::new(Square::E1, Square::G1, MoveKind::Castling), // O-O
        ];

        for m in moves {
            board.make_move(m);
        }
        for m in moves.iter().rev() {
            board.undo_move(*m);
        }

        assert_eq!(board.pieces, reference.pieces);
        assert_eq!(board.occupied, reference.occupied);
        assert_eq!(board.side_to_move(), reference.side_to_move());
        assert_eq!(board.ply(), reference.ply());
        for sq in Square::iter() {
            assert_eq!(board.on(sq), reference.on(sq));
        }
        assert_eq!(board.fen(), reference.fen());
    }
}
