use super::Board;
use super::defaults::Defaults;
use super::movegen::*;
use crate::core::*;

/******************************************\
|==========================================|
|                Check Type                |
|==========================================|
\******************************************/

/// Classification of the attack on the side to move's king.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckType {
    None,
    Single,
    Double,
}

impl CheckType {
    /// Two-bit classification of a checkers bitboard: empty, one bit set, or
    /// more than one (`b & (b - 1) != 0`).
    #[inline]
    pub const fn classify(checkers: Bitboard) -> CheckType {
        if checkers.is_empty() {
            CheckType::None
        } else if checkers.more_than_one() {
            CheckType::Double
        } else {
            CheckType::Single
        }
    }
}

/******************************************\
|==========================================|
|          Check / Pin Analysis            |
|==========================================|
\******************************************/

impl Board {
    /// Bishops and queens of one colour.
    #[inline]
    pub(crate) fn bishop_queen_bb(&self, col: Colour) -> Bitboard {
        self.piece_bb(col, PieceType::Bishop) | self.piece_bb(col, PieceType::Queen)
    }

    /// Rooks and queens of one colour.
    #[inline]
    pub(crate) fn rook_queen_bb(&self, col: Colour) -> Bitboard {
        self.piece_bb(col, PieceType::Rook) | self.piece_bb(col, PieceType::Queen)
    }

    /// The king square for a colour.
    #[inline]
    pub fn ksq(&self, col: Colour) -> Square {
        debug_assert!(
            !self.piece_bb(col, PieceType::King).is_empty(),
            "King must exist for colour {:?}",
            col
        );

        self.piece_bb(col, PieceType::King).lsb_unchecked()
    }

    /// All squares the opponent attacks (defending king removed).
    #[inline]
    pub const fn attacked(&self) -> Bitboard {
        self.state.attacked
    }

    /// Enemy pieces giving check to the side to move.
    #[inline]
    pub const fn checkers(&self) -> Bitboard {
        self.state.checkers
    }

    /// Squares a non-king move may land on (see [`BoardState::check_mask`](super::BoardState)).
    #[inline]
    pub const fn check_mask(&self) -> Bitboard {
        self.state.check_mask
    }

    /// Squares on diagonal pin lines of the side to move.
    #[inline]
    pub const fn diag_pin(&self) -> Bitboard {
        self.state.diag_pin
    }

    /// Squares on rank/file pin lines of the side to move.
    #[inline]
    pub const fn hv_pin(&self) -> Bitboard {
        self.state.hv_pin
    }

    /// Whether the current en passant capture is vetoed by a discovered check.
    #[inline]
    pub const fn ep_pin(&self) -> bool {
        self.state.ep_pin
    }

    /// Every square attacked by the opponent of the side to move.
    ///
    /// Occupancy excludes our king: a slider giving check must also attack
    /// the squares behind the king, or the king could "retreat" along the
    /// checking ray.
    #[inline]
    fn calc_attacked_bb(&self) -> Bitboard {
        let us = self.side_to_move();
        let them = !us;
        let occ = self.all_occupied_bb() ^ self.piece_bb(us, PieceType::King);

        let mut threatened = Bitboard::pawn_attacks(them, self.piece_bb(them, PieceType::Pawn));

        self.piece_bb(them, PieceType::Knight).for_each(|sq| {
            threatened |= knight_attack(sq);
        });

        self.bishop_queen_bb(them).for_each(|sq| {
            threatened |= bishop_attacks(sq, occ);
        });

        self.rook_queen_bb(them).for_each(|sq| {
            threatened |= rook_attacks(sq, occ);
        });

        threatened | king_attack(self.ksq(them))
    }

    /// Finds the pieces pinned to the side to move's king.
    ///
    /// Lift every friendly piece the king sees along queen rays off the
    /// board at once; any enemy slider that becomes visible was x-raying
    /// exactly one of them, and its whole line (interior + sniper square) is
    /// accumulated into the matching pin mask. Enemy blockers are left in
    /// place, so a line with an enemy piece on it never produces a pin, and
    /// a line with two friendly pieces keeps the second one as a blocker.
    #[inline]
    fn calc_pin_mask(&self) -> (Bitboard, Bitboard) {
        let us = self.side_to_move();
        let them = !us;
        let ksq = self.ksq(us);

        let all_occ = self.all_occupied_bb();
        let our_occ = self.occupied_bb(us);
        let them_occ = self.occupied_bb(them);

        let mut diag_pin = Bitboard::EMPTY;
        let mut hv_pin = Bitboard::EMPTY;

        let probe_rays = queen_attacks(ksq, all_occ);
        let potential_pinned = probe_rays & our_occ;
        // Enemy pieces the king already sees are checkers, not snipers.
        let potential_checkers = probe_rays & them_occ;
        let occ = all_occ ^ potential_pinned;

        let diag_pinners =
            bishop_attacks(ksq, occ) & self.bishop_queen_bb(them) & !potential_checkers;
        diag_pinners.for_each(|sq| diag_pin |= pin_bb(ksq, sq));

        let hv_pinners = rook_attacks(ksq, occ) & self.rook_queen_bb(them) & !potential_checkers;
        hv_pinners.for_each(|sq| hv_pin |= pin_bb(ksq, sq));

        (diag_pin, hv_pin)
    }

    /// Decides whether capturing en passant would discover a check.
    ///
    /// The ordinary pin rule cannot catch this: the capture removes the
    /// jumped pawn from a line the capturing pawn itself is not on.
    ///
    /// Two snipers are probed with the jumped pawn lifted off the board:
    /// a diagonal bishop/queen whose line to the king was blocked only by
    /// that pawn, and - when a single pawn of ours can capture - a rook or
    /// queen on the en passant rank that sees the king once both the jumped
    /// pawn and the capturing pawn are gone. With two capturing pawns the
    /// horizontal case cannot arise: one of them stays on the rank.
    #[inline]
    fn calc_ep_pin(&self, ep_target: Square, attackers: Bitboard) -> bool {
        let us = self.side_to_move();
        let them = !us;
        let ksq = self.ksq(us);
        let all_occ = self.all_occupied_bb();
        let them_occ = self.occupied_bb(them);

        let ep_target_bb = ep_target.bb();

        let potential_checkers = queen_attacks(ksq, all_occ) & them_occ;
        let occ = all_occ ^ ep_target_bb;
        let diag_pinners =
            bishop_attacks(ksq, occ) & !potential_checkers & self.bishop_queen_bb(them);

        if diag_pinners.is_occupied() {
            return true;
        }

        if attackers.is_singleton() {
            let ep_rank = Defaults::of(us).ep_rank;
            let occ = all_occ ^ ep_target_bb ^ attackers;
            let h_pinners =
                rook_attacks(ksq, occ) & ep_rank & !potential_checkers & self.rook_queen_bb(them);
            if h_pinners.is_occupied() {
                return true;
            }
        }

        false
    }

    /// The check-evasion mask for the current checkers.
    ///
    /// Full board when not in check; empty under double check (only king
    /// moves exist); under single check, the squares that capture the
    /// checker or block its line - the checker square alone for pawn and
    /// knight checkers, interior plus checker square for sliders.
    #[inline]
    fn calc_check_mask(&self, checkers: Bitboard) -> Bitboard {
        let us = self.side_to_move();
        let them = !us;
        let ksq = self.ksq(us);

        match CheckType::classify(checkers) {
            CheckType::None => Bitboard::FULL,
            CheckType::Double => Bitboard::EMPTY,
            CheckType::Single => {
                let checker_sq = checkers.lsb_unchecked();
                let contact = self.piece_bb(them, PieceType::Pawn)
                    | self.piece_bb(them, PieceType::Knight);

                if contact.contains(checker_sq) {
                    checkers
                } else {
                    pin_bb(ksq, checker_sq)
                }
            }
        }
    }

    /// Recomputes the analysis masks after the board changed.
    ///
    /// Pins and the en passant veto are only needed when move generation
    /// will run non-king generators, so they are skipped under double check.
    pub(crate) fn update_masks(&mut self) {
        let us = self.side_to_move();

        self.state.attacked = self.calc_attacked_bb();

        let checkers = self.attackers_to(self.ksq(us), us);
        self.state.checkers = checkers;
        self.state.check_mask = self.calc_check_mask(checkers);

        if !self.state.check_mask.is_empty() {
            (self.state.diag_pin, self.state.hv_pin) = self.calc_pin_mask();

            if let Some(ep_target) = self.ep_target() {
                let our_pawns = self.piece_bb(us, PieceType::Pawn);

                let ep_target_bb = ep_target.bb();

                let attackers = our_pawns
                    & (ep_target_bb.shift(Direction::E) | ep_target_bb.shift(Direction::W));

                if attackers.is_occupied() {
                    self.state.ep_pin = self.calc_ep_pin(ep_target, attackers);
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

    #[test]
    fn test_ksq() {
        let board = Board::from_fen(crate::board::START_FEN).unwrap();
        assert_eq!(board.ksq(Colour::White), Square::E1);
        assert_eq!(board.ksq(Colour::Black), Square::E8);
    }

    #[test]
    fn test_attacked_bb_initial_pos() {
        let board = Board::from_fen(crate::board::START_FEN).unwrap();
        let attacked_by_black = board.attacked();

        let expected = Rank::Rank6.bb()
            | Rank::Rank7.bb()
            | Rank::Rank8.bb() ^ Square::A8.bb() ^ Square::H8.bb();

        assert_eq!(attacked_by_black, expected);
    }

    #[test]
    fn test_attacked_bb_attack_through_king() {
        let board = Board::from_fen("4rk2/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();

        let attacked_by_black = board.attacked();

        // the rook's file must be attacked through the white king (E1 included)
        let expected = rook_attacks(Square::E8, board.all_occupied_bb() ^ Square::E1.bb())
            | king_attack(Square::F8);

        assert_eq!(attacked_by_black, expected);
        assert!(attacked_by_black.contains(Square::E1));
    }

    #[test]
    fn test_no_check_no_pin() {
        let board = Board::from_fen(crate::board::START_FEN).unwrap();
        assert_eq!(board.check_type(), CheckType::None);
        assert_eq!(board.checkers(), Bitboard::EMPTY);
        assert_eq!(board.check_mask(), Bitboard::FULL);
        assert_eq!(board.diag_pin(), Bitboard::EMPTY);
        assert_eq!(board.hv_pin(), Bitboard::EMPTY);
    }

    #[test]
    fn test_hv_pin() {
        // black rook E8 pins white rook E2 against king E1
        let board = Board::from_fen("4rk2/8/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        assert_eq!(board.check_type(), CheckType::None);
        assert_eq!(board.diag_pin(), Bitboard::EMPTY);
        assert_eq!(board.hv_pin(), pin_bb(Square::E1, Square::E8));
        assert!(board.hv_pin().contains(Square::E2));
    }

    #[test]
    fn test_diag_pin() {
        // black bishop A5 pins white bishop D2 against king E1
        let board = Board::from_fen("5k2/8/8/b7/8/8/3B4/4K3 w - - 0 1").unwrap();
        assert_eq!(board.check_type(), CheckType::None);
        assert_eq!(board.diag_pin(), pin_bb(Square::E1, Square::A5));
        assert_eq!(board.hv_pin(), Bitboard::EMPTY);
    }

    #[test]
    fn test_single_slider_check() {
        let board = Board::from_fen("4rk2/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();

        assert_eq!(board.check_type(), CheckType::Single);
        assert_eq!(board.checkers(), Square::E8.bb());
        // evasion mask: block the file or capture the rook
        assert_eq!(board.check_mask(), pin_bb(Square::E1, Square::E8));
        assert_eq!(board.diag_pin(), Bitboard::EMPTY);
        assert_eq!(board.hv_pin(), Bitboard::EMPTY);
    }

    #[test]
    fn test_single_knight_check() {
        let board = Board::from_fen("4k3/8/8/8/8/3n4/8/4K3 w - - 0 1").unwrap();

        assert_eq!(board.check_type(), CheckType::Single);
        // a contact checker can only be captured, not blocked
        assert_eq!(board.check_mask(), Square::D3.bb());
    }

    #[test]
    fn test_pawn_check() {
        let board = Board::from_fen("4k3/3P4/8/8/8/8/8/4K3 b - - 0 1").unwrap();

        assert_eq!(board.check_type(), CheckType::Single);
        assert_eq!(board.check_mask(), Square::D7.bb());
    }

    #[test]
    fn test_queen_check_diagonal() {
        let board = Board::from_fen("4k3/8/8/8/1q6/8/8/4K3 w - - 0 1").unwrap();

        assert_eq!(board.check_mask(), pin_bb(Square::E1, Square::B4));
    }

    #[test]
    fn test_double_check() {
        let board = Board::from_fen("4rk2/8/8/8/8/3n4/8/4K3 w - - 0 1").unwrap();

        assert_eq!(board.check_type(), CheckType::Double);
        assert_eq!(board.checkers(), Square::E8.bb() | Square::D3.bb());
        assert_eq!(board.check_mask(), Bitboard::EMPTY);
        assert_eq!(board.diag_pin(), Bitboard::EMPTY);
        assert_eq!(board.hv_pin(), Bitboard::EMPTY);
    }

    #[test]
    fn test_check_and_pin_together() {
        // knight D3 gives check while rook E8 pins rook E2
        let board = Board::from_fen("4rk2/8/8/8/8/3n4/4R3/4K3 w - - 0 1").unwrap();

        assert_eq!(board.check_type(), CheckType::Single);
        assert_eq!(board.check_mask(), Square::D3.bb());
        assert_eq!(board.diag_pin(), Bitboard::EMPTY);
        assert_eq!(board.hv_pin(), pin_bb(Square::E1, Square::E8));
    }

    #[test]
    fn test_multiple_pins() {
        let board = Board::from_fen("r6k/8/8/8/3b4/N7/1R6/K1B4q w - - 0 1").unwrap();

        let ksq = Square::A1;
        let expected_diag_pin = pin_bb(ksq, Square::D4);
        let expected_hv_pin = pin_bb(ksq, Square::A8) | pin_bb(ksq, Square::H1);

        assert_eq!(board.check_type(), CheckType::None);
        assert_eq!(board.diag_pin(), expected_diag_pin);
        assert_eq!(board.hv_pin(), expected_hv_pin);
    }

    #[test]
    fn test_two_blockers_are_no_pin() {
        // bishop E3 and rook E2 both stand between the E8 rook and the king
        let board = Board::from_fen("4rk2/8/8/8/8/4B3/4R3/4K3 w - - 0 1").unwrap();

        assert_eq!(board.check_type(), CheckType::None);
        assert_eq!(board.diag_pin(), Bitboard::EMPTY);
        assert_eq!(board.hv_pin(), Bitboard::EMPTY);
    }

    #[test]
    fn test_enemy_blocker_is_no_pin() {
        // the sole piece between the E8 rook and the king is black's own
        // knight; nothing of ours is pinned
        let board = Board::from_fen("4rk2/8/8/8/4n3/8/8/4K3 w - - 0 1").unwrap();

        assert_eq!(board.check_type(), CheckType::None);
        assert_eq!(board.diag_pin(), Bitboard::EMPTY);
        assert_eq!(board.hv_pin(), Bitboard::EMPTY);
    }

    fn get_ep_pin(fen: &str) -> bool {
        Board::from_fen(fen).unwrap().ep_pin()
    }

    #[test]
    fn test_ep_h_pin() {
        assert!(get_ep_pin("2k5/8/8/K2pP2r/8/8/8/8 w - d6 0 1"));
        assert!(!get_ep_pin("2k5/8/8/K2pPP1r/8/8/8/8 w - d6 0 1"));
        assert!(!get_ep_pin("2k5/8/8/K1PpP2r/8/8/8/8 w - d6 0 1"));
        assert!(!get_ep_pin("2k5/8/8/KP1pP2r/8/8/8/8 w - d6 0 1"));
        assert!(get_ep_pin("2k5/8/8/K4pPr/8/8/8/8 w - f6 0 1"));
        assert!(!get_ep_pin("2k5/8/8/K2r1pP1/8/8/8/8 w - - 0 1"));
        assert!(!get_ep_pin("2k5/8/8/K1n2pPr/8/8/8/8 w - f6 0 1"));
        assert!(!get_ep_pin("2k5/8/8/K2N1pPr/8/8/8/8 w - f6 0 1"));
        assert!(!get_ep_pin("2k5/8/1K6/5pPq/8/8/8/8 w - f6 0 1"));
    }

    #[test]
    fn test_ep_diag_pin() {
        assert!(get_ep_pin("5b2/7k/8/2pP4/8/K7/8/8 w - c6 0 1"));
        assert!(get_ep_pin("5b2/7k/8/1Pp5/8/K7/8/8 w - c6 0 1"));
        assert!(!get_ep_pin("5b2/7k/8/2p5/1P6/K7/8/8 w - c6 0 1"));
        assert!(!get_ep_pin("5b2/7k/3P4/2p5/8/K7/8/8 w - c6 0 1"));
        assert!(!get_ep_pin("5b2/7k/3P4/2pP4/8/K7/8/8 w - c6 0 1"));
        assert!(get_ep_pin("5q2/7k/8/2pP4/8/K7/8/8 w - c6 0 1"));
        assert!(!get_ep_pin("5q2/7k/3N4/2pP4/8/K7/8/8 w - c6 0 1"));
        assert!(!get_ep_pin("5q2/7k/8/2pP4/1B6/K7/8/8 w - c6 0 1"));
        assert!(!get_ep_pin("5q2/7k/8/2pP4/1r6/K7/8/8 w - c6 0 1"));
    }
}
