use super::{Board, BoardBuilder};
use crate::core::*;

/******************************************\
|==========================================|
|            Useful fen strings            |
|==========================================|
\******************************************/

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const TRICKY_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

pub const KILLER_FEN: &str = "rnbqkb1r/pp1p1pPp/8/2p1pP2/1P1P4/3P3P/P1P1P3/RNBQKBNR w KQkq e6 0 1";

/******************************************\
|==========================================|
|                Parse Fen                 |
|==========================================|
\******************************************/

impl Board {
    /// Parses a FEN record into a ready board.
    ///
    /// Standard FEN only: castling availability is `KQkq` subsets, rights
    /// that have no king and rook on their home squares are dropped.
    pub fn from_fen(fen: &str) -> Result<Self, FenParseError> {
        let mut parts = fen.split_whitespace();

        let piece_placement = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;
        let side_to_move = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;
        let castling = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;
        let enpassant = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;
        let fifty_move_token = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;
        let full_move_token = parts.next().ok_or(FenParseError::InvalidNumberOfFields)?;

        if parts.next().is_some() {
            return Err(FenParseError::InvalidNumberOfFields);
        }

        let mut builder = BoardBuilder::new();

        builder = parse_piece_placement(builder, piece_placement)?;

        let stm = parse_side_to_move(side_to_move)?;
        builder = builder.side_to_move(stm);

        builder = builder.castling(parse_castling(castling)?);

        if let Some(ep_sq) = parse_enpassant(enpassant)? {
            builder = builder.en_passant(ep_sq);
        }

        let fifty_move = fifty_move_token
            .parse::<u8>()
            .map_err(|_| FenParseError::InvalidHalfmoveClock(fifty_move_token.to_string()))?;

        let full_move = parse_full_move(full_move_token)?;

        let mut board = builder.build()?;

        // Clocks sit outside the builder; neither participates in the keys.
        board.state.fifty_move = fifty_move;
        board.half_moves = (full_move - 1) * 2 + stm as u16;

        Ok(board)
    }

    /// Writes the position as a FEN record.
    pub fn fen(&self) -> String {
        let mut fen = String::new();

        for rank in Rank::iter().rev() {
            let mut empty_count = 0;
            for file in File::iter() {
                let square = Square::from_parts(file, rank);
                match self.on(square) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push_str(&piece.to_string());
                    }
                    None => {
                        empty_count += 1;
                    }
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank != Rank::Rank1 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push_str(match self.side_to_move() {
            Colour::White => "w",
            Colour::Black => "b",
        });

        fen.push(' ');
        fen.push_str(&self.state.castle.to_string());

        fen.push(' ');
        match self.state.enpassant {
            Some(square) => fen.push_str(&square.to_string()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {}", self.state.fifty_move));

        fen.push_str(&format!(" {}", (self.half_moves / 2) + 1));

        fen
    }
}

/******************************************\
|==========================================|
|             Parsing Helpers              |
|==========================================|
\******************************************/

fn parse_separator(
    rank_iter: &mut impl DoubleEndedIterator<Item = Rank>,
    rank: Rank,
    file: u8,
) -> Result<(Rank, u8), FenParseError> {
    if file != 8 {
        return Err(FenParseError::InvalidRankFormat(format!(
            "Rank {:?} ended prematurely at file index {} (expected 8) before '/'",
            rank, file
        )));
    }

    let next_rank = rank_iter.next().ok_or_else(|| {
        FenParseError::InvalidRankFormat(format!(
            "Too many rank separators ('/') found after completing rank {:?}",
            rank
        ))
    })?;

    Ok((next_rank, 0))
}

fn parse_skip(skip: char, idx: usize, rank: Rank, file: u8) -> Result<u8, FenParseError> {
    let skip_val = skip.to_digit(10).unwrap();

    if !(1..=8).contains(&skip_val) {
        return Err(FenParseError::InvalidRankFormat(format!(
            "Invalid skip digit '{}' (must be 1-8) at char index {}",
            skip, idx
        )));
    }

    let skip_u8 = skip_val as u8;

    if file + skip_u8 > 8 {
        return Err(FenParseError::InvalidRankFormat(format!(
            "Skip value {} exceeds rank length at file index {} on rank {:?}",
            skip_u8, file, rank
        )));
    }

    Ok(skip_u8)
}

fn parse_piece_placement(
    mut builder: BoardBuilder,
    piece_placement: &str,
) -> Result<BoardBuilder, FenParseError> {
    let mut rank_iter = Rank::iter().rev();

    let mut rank = rank_iter
        .next()
        .ok_or_else(|| FenParseError::InvalidRankFormat("Board has no ranks?".to_string()))?;

    let mut file: u8 = 0;

    for (i, char) in piece_placement.chars().enumerate() {
        match char {
            '/' => {
                (rank, file) = parse_separator(&mut rank_iter, rank, file)?;
            }

            skip if skip.is_ascii_digit() => {
                file += parse_skip(skip, i, rank, file)?;
            }

            piece_char => {
                if file >= 8 {
                    return Err(FenParseError::InvalidRankFormat(format!(
                        "Piece placement '{}' attempted beyond file H (index >= 8) on rank {:?}",
                        piece_char, rank
                    )));
                }

                let piece = piece_char
                    .to_string()
                    .parse::<Piece>()
                    .map_err(|_| FenParseError::InvalidPiecePlacementChar(piece_char))?;

                let sq = Square::from_parts(unsafe { File::from_unchecked(file) }, rank);
                builder = builder.piece(piece.colour(), piece.pt(), sq);
                file += 1;
            }
        }
    }

    if file != 8 {
        return Err(FenParseError::InvalidRankFormat(format!(
            "Final rank {:?} ended prematurely at file index {} (expected 8)",
            rank, file
        )));
    }

    if rank_iter.next().is_some() {
        return Err(FenParseError::InvalidRankFormat(
            "Not enough ranks specified in FEN string (expected 8)".to_string(),
        ));
    }

    Ok(builder)
}

fn parse_side_to_move(side_to_move: &str) -> Result<Colour, FenParseError> {
    match side_to_move {
        "w" => Ok(Colour::White),
        "b" => Ok(Colour::Black),
        _ => Err(FenParseError::InvalidSideToMove(side_to_move.to_string())),
    }
}

fn parse_castling(castling: &str) -> Result<Castling, FenParseError> {
    let mut castle = Castling::NONE;

    if castling == "-" {
        return Ok(castle);
    }

    for c in castling.chars() {
        match c {
            'K' => castle.set(Castling::WK),
            'Q' => castle.set(Castling::WQ),
            'k' => castle.set(Castling::BK),
            'q' => castle.set(Castling::BQ),
            _ => return Err(FenParseError::InvalidCastlingChar(c)),
        };
    }

    Ok(castle)
}

fn parse_enpassant(enpassant: &str) -> Result<Option<Square>, FenParseError> {
    match enpassant {
        "-" => Ok(None),

        _ => {
            let square = enpassant
                .parse::<Square>()
                .map_err(|_| FenParseError::InvalidEnPassantSquare(enpassant.to_string()))?;

            if ![Rank::Rank3, Rank::Rank6].contains(&square.rank()) {
                return Err(FenParseError::InvalidEnPassantSquare(format!(
                    "{square} is not a valid enpassant square"
                )));
            }
            Ok(Some(square))
        }
    }
}

fn parse_full_move(full_move_token: &str) -> Result<u16, FenParseError> {
    let full_move_number = full_move_token
        .parse::<u16>()
        .map_err(|_| FenParseError::InvalidFullmoveNumber(full_move_token.to_string()))?;

    if full_move_number == 0 {
        return Err(FenParseError::InvalidFullmoveNumber(format!(
            "Fullmove number cannot be 0, found: {}",
            full_move_token
        )));
    }

    Ok(full_move_number)
}

/******************************************\
|==========================================|
|                Unit Tests                |
|==========================================|
\******************************************/

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(fen: &str) {
        let board = Board::from_fen(fen).expect("Test FEN should be valid");
        assert_eq!(board.fen(), fen, "FEN did not round-trip");
    }

    #[test]
    fn test_round_trip_start_position() {
        round_trip(START_FEN);
    }

    #[test]
    fn test_round_trip_known_positions() {
        round_trip(TRICKY_FEN);
        round_trip(KILLER_FEN);
        round_trip("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        round_trip("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1");
        round_trip("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8");
        round_trip("4k3/8/8/8/8/8/8/4K2R w K - 11 31");
    }

    #[test]
    fn test_start_position_contents() {
        let board = Board::from_fen(START_FEN).unwrap();

        assert_eq!(board.side_to_move(), Colour::White);
        assert_eq!(board.castling(), Castling::ALL);
        assert_eq!(board.ep(), None);
        assert_eq!(board.fifty_move(), 0);
        assert_eq!(board.half_moves(), 0);

        assert_eq!(board.on(Square::E1), Some(Piece::WhiteKing));
        assert_eq!(board.on(Square::D8), Some(Piece::BlackQueen));
        assert_eq!(board.on(Square::A7), Some(Piece::BlackPawn));
        assert_eq!(board.on(Square::E4), None);

        assert_eq!(board.piecetype_bb(PieceType::Pawn).count_bits(), 16);
        assert_eq!(board.all_occupied_bb().count_bits(), 32);
    }

    #[test]
    fn test_half_move_counter_from_fullmove() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 40").unwrap();
        assert_eq!(board.half_moves(), 78);

        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R b K - 0 40").unwrap();
        assert_eq!(board.half_moves(), 79);
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0"),
            Err(FenParseError::InvalidNumberOfFields)
        );
        assert_eq!(
            Board::from_fen(""),
            Err(FenParseError::InvalidNumberOfFields)
        );
        assert_eq!(
            Board::from_fen(&format!("{START_FEN} extra")),
            Err(FenParseError::InvalidNumberOfFields)
        );
    }

    #[test]
    fn test_bad_piece_placement() {
        assert_eq!(
            Board::from_fen("rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::InvalidPiecePlacementChar('x'))
        );
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp1/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::InvalidRankFormat(_))
        ));
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::InvalidRankFormat(_))
        ));
    }

    #[test]
    fn test_bad_side_to_move() {
        assert_eq!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"),
            Err(FenParseError::InvalidSideToMove("x".to_string()))
        );
    }

    #[test]
    fn test_bad_castling() {
        assert_eq!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQXkq - 0 1"),
            Err(FenParseError::InvalidCastlingChar('X'))
        );
    }

    #[test]
    fn test_unfounded_castling_rights_are_dropped() {
        // kingside rook is missing, so 'K' silently narrows away
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w KQ - 0 1").unwrap();
        assert_eq!(board.castling(), Castling::WQ);
    }

    #[test]
    fn test_bad_enpassant() {
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e9 0 1"),
            Err(FenParseError::InvalidEnPassantSquare(_))
        ));
        // right notation, wrong rank
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e4 0 1"),
            Err(FenParseError::InvalidEnPassantSquare(_))
        ));
        // rank 6 while black is to move
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e6 0 1"),
            Err(FenParseError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_bad_clocks() {
        assert_eq!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - fifty 1"),
            Err(FenParseError::InvalidHalfmoveClock("fifty".to_string()))
        );
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0"),
            Err(FenParseError::InvalidFullmoveNumber(_))
        ));
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 zero"),
            Err(FenParseError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn test_missing_king_is_rejected() {
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenParseError::InvalidPosition(
                BoardBuilderError::InvalidKingCount
            ))
        ));
    }
}
