//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{Board, Color, EMPTY_SQ};
use crate::error::EngineError;
use crate::square::Square;

fn invalid(fen: &str, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidFen {
        fen: fen.to_string(),
        reason: reason.into(),
    }
}

impl Board {
    /// Loads a FEN string into this board, replacing all prior state.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), EngineError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(invalid(fen, "expected at least 4 space-separated fields"));
        }

        *self = Board::new_empty();

        self.load_piece_placement(fen, fields[0])?;
        self.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(invalid(fen, format!("bad side-to-move field `{other}`"))),
        };

        self.castling_rights = 0;
        if fields[2] != "-" {
            // Each character sets exactly the one right it names; unlike a
            // fallthrough switch, an absent `break` never leaks into the
            // other three rights.
            for ch in fields[2].chars() {
                match ch {
                    'K' => self.castling_rights |= CASTLE_WK,
                    'Q' => self.castling_rights |= CASTLE_WQ,
                    'k' => self.castling_rights |= CASTLE_BK,
                    'q' => self.castling_rights |= CASTLE_BQ,
                    other => {
                        return Err(invalid(fen, format!("bad castling character `{other}`")));
                    }
                }
            }
        }

        self.en_passant = match fields[3] {
            "-" => None,
            notation => Some(
                Square::from_notation(notation)
                    .ok_or_else(|| invalid(fen, format!("bad en passant square `{notation}`")))?,
            ),
        };

        self.halfmove_clock = fields
            .get(4)
            .map(|s| s.parse::<u32>())
            .transpose()
            .map_err(|_| invalid(fen, "bad halfmove clock"))?
            .unwrap_or(0);
        self.fullmove_number = fields
            .get(5)
            .map(|s| s.parse::<u32>())
            .transpose()
            .map_err(|_| invalid(fen, "bad fullmove number"))?
            .unwrap_or(1);

        self.validate().map_err(|reason| invalid(fen, reason))?;
        self.refresh_zobrist();
        self.history.clear();
        Ok(())
    }

    fn load_piece_placement(&mut self, fen: &str, placement: &str) -> Result<(), EngineError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid(fen, "piece placement must have 8 ranks"));
        }

        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top;
            let mut file = 0usize;
            for ch in rank_str.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                if file >= 8 {
                    return Err(invalid(fen, "rank has too many squares"));
                }
                let (piece, color) = CHAR_TO_PC[ch as usize]
                    .ok_or_else(|| invalid(fen, format!("unrecognized piece glyph `{ch}`")))?;
                let sq = Square::from_index((rank * 8 + file) as u8);
                let bb = self.bb(color, piece) | (1u64 << sq.index());
                self.set_bb(color, piece, bb);
                file += 1;
            }
            if file != 8 {
                return Err(invalid(fen, "rank does not cover all 8 files"));
            }
        }
        Ok(())
    }

    /// Serializes this board back to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut out = String::new();

        for rank_from_top in 0..8 {
            let rank = 7 - rank_from_top;
            let mut empty_run = 0u32;
            for file in 0..8 {
                let sq = (rank * 8 + file) as usize;
                let val = self.piece_on_sq[sq];
                if val == EMPTY_SQ {
                    empty_run += 1;
                    continue;
                }
                if empty_run > 0 {
                    out.push_str(&empty_run.to_string());
                    empty_run = 0;
                }
                let color = (val >> 3) & 1;
                let piece = val & 0b111;
                out.push(PC_TO_CHAR[(color as usize) * 6 + piece as usize]);
            }
            if empty_run > 0 {
                out.push_str(&empty_run.to_string());
            }
            if rank_from_top != 7 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(if self.side_to_move == Color::White {
            'w'
        } else {
            'b'
        });

        out.push(' ');
        if self.castling_rights == 0 {
            out.push('-');
        } else {
            if self.castling_rights & CASTLE_WK != 0 {
                out.push('K');
            }
            if self.castling_rights & CASTLE_WQ != 0 {
                out.push('Q');
            }
            if self.castling_rights & CASTLE_BK != 0 {
                out.push('k');
            }
            if self.castling_rights & CASTLE_BQ != 0 {
                out.push('q');
            }
        }

        out.push(' ');
        match self.en_passant {
            Some(sq) => out.push_str(&sq.to_notation()),
            None => out.push('-'),
        }

        out.push(' ');
        out.push_str(&self.halfmove_clock.to_string());
        out.push(' ');
        out.push_str(&self.fullmove_number.to_string());

        out
    }
}

use super::castle_bits::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn start_position_round_trips() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let board = Board::from_str(fen).unwrap();
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn single_castling_right_sets_exactly_one_bit() {
        let board = Board::from_str("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        assert_eq!(board.castling_rights, CASTLE_WK);
        assert_eq!(board.castling_rights.count_ones(), 1);
    }

    #[test]
    fn all_four_castling_rights_round_trip() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let board = Board::from_str(fen).unwrap();
        assert_eq!(
            board.castling_rights,
            CASTLE_WK | CASTLE_WQ | CASTLE_BK | CASTLE_BQ
        );
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn en_passant_square_parses() {
        let board =
            Board::from_str("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        assert_eq!(board.en_passant.unwrap().to_notation(), "d6");
    }

    #[test]
    fn rejects_short_fen() {
        assert!(Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w").is_err());
    }

    #[test]
    fn rejects_bad_piece_glyph() {
        assert!(Board::from_str("rnbqkbnx/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
    }

    #[test]
    fn rejects_incomplete_rank() {
        assert!(Board::from_str("rnbqkbn/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
    }

    #[test]
    fn halfmove_and_fullmove_retained() {
        let board =
            Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 7 12").unwrap();
        assert_eq!(board.halfmove_clock, 7);
        assert_eq!(board.fullmove_number, 12);
    }
}
