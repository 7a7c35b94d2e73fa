//! Forsyth–Edwards Notation parsing and printing.
//!
//! A FEN string packs the same fields `Position` tracks: piece placement, side to move,
//! castling rights, en-passant square, the fifty-move counter and the fullmove number. Parsing
//! builds the position through `setup_put_piece`/`setup_finish` so the Zobrist key comes out
//! incrementally folded rather than recomputed after the fact.

use crate::castle_rights::CastleRights;
use crate::position::Position;
use crate::sq::{NO_SQ, SQ};
use crate::types::{File, Piece, PieceType, Player, Rank};
use thiserror::Error;

/// The FEN of the standard chess starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Why a FEN string failed to parse. The caller guarantees well-formed positions in the search
/// path (see the crate's error-handling design); this type exists for the FEN-consuming
/// boundary (UCI `position fen ...`, test fixtures) where malformed input is a real
/// possibility.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenParseError {
    #[error("expected 6 whitespace-separated fields, found {found}")]
    WrongFieldCount { found: usize },
    #[error("piece placement field has {found} ranks, expected 8")]
    WrongRankCount { found: usize },
    #[error("rank {rank} describes {found} squares, expected 8")]
    WrongFileCount { rank: usize, found: usize },
    #[error("unrecognized piece character '{ch}'")]
    BadPieceChar { ch: char },
    #[error("side-to-move field must be 'w' or 'b', found '{found}'")]
    BadSideToMove { found: String },
    #[error("castling field contains an invalid character '{ch}'")]
    BadCastlingChar { ch: char },
    #[error("en-passant square '{found}' is not a valid square")]
    BadEpSquare { found: String },
    #[error("half-move clock '{found}' is not a number")]
    BadHalfMoveClock { found: String },
}

impl Position {
    /// Parses a FEN string into a `Position`. Accepts the 4-field "board only" shorthand (no
    /// half-move clock or fullmove number, both of which then default to the start-of-game
    /// values) in addition to the full 6-field form.
    pub fn from_fen(fen: &str) -> Result<Position, FenParseError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 4 && fields.len() != 6 {
            return Err(FenParseError::WrongFieldCount {
                found: fields.len(),
            });
        }

        let mut pos = Position::blank();
        parse_placement(&mut pos, fields[0])?;

        let turn = match fields[1] {
            "w" => Player::White,
            "b" => Player::Black,
            other => {
                return Err(FenParseError::BadSideToMove {
                    found: other.to_owned(),
                })
            }
        };

        let castling = parse_castling(fields[2])?;
        let ep_square = parse_ep_square(fields[3])?;

        let rule_50 = if fields.len() == 6 {
            fields[4].parse::<u16>().map_err(|_| FenParseError::BadHalfMoveClock {
                found: fields[4].to_owned(),
            })? as u8
        } else {
            0
        };

        pos.setup_finish(turn, castling, ep_square, rule_50);
        Ok(pos)
    }

    /// Renders this position back to FEN. The fullmove number is not tracked by `Position` (it
    /// plays no role in search) so it is always printed as `1`; round-tripping through
    /// `from_fen` is exact for every field search cares about.
    pub fn to_fen(&self) -> String {
        let mut ranks = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            ranks.push(self.pretty_fen_rank(rank));
        }
        format!(
            "{} {} {} {} {} 1",
            ranks.join("/"),
            if self.turn() == Player::White { "w" } else { "b" },
            self.castling().pretty_string(),
            if self.ep_square().is_okay() {
                self.ep_square().to_string()
            } else {
                "-".to_owned()
            },
            self.rule_50(),
        )
    }
}

fn parse_placement(pos: &mut Position, field: &str) -> Result<(), FenParseError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenParseError::WrongRankCount { found: ranks.len() });
    }
    // FEN lists ranks from 8 down to 1; `Position` numbers ranks 0 (rank 1) up to 7 (rank 8).
    for (i, rank_str) in ranks.iter().enumerate() {
        let rank_idx = 7 - i;
        let mut file_idx = 0usize;
        for ch in rank_str.chars() {
            if let Some(digit) = ch.to_digit(10) {
                file_idx += digit as usize;
            } else {
                let piece = piece_from_char(ch)?;
                if file_idx >= 8 {
                    return Err(FenParseError::WrongFileCount {
                        rank: rank_idx + 1,
                        found: file_idx + 1,
                    });
                }
                let sq = SQ::make(File::from_idx(file_idx as u8), Rank::from_idx(rank_idx as u8));
                pos.setup_put_piece(sq, piece);
                file_idx += 1;
            }
        }
        if file_idx != 8 {
            return Err(FenParseError::WrongFileCount {
                rank: rank_idx + 1,
                found: file_idx,
            });
        }
    }
    Ok(())
}

fn piece_from_char(ch: char) -> Result<Piece, FenParseError> {
    let player = if ch.is_ascii_uppercase() {
        Player::White
    } else {
        Player::Black
    };
    let pt = match ch.to_ascii_lowercase() {
        'p' => PieceType::P,
        'n' => PieceType::N,
        'b' => PieceType::B,
        'r' => PieceType::R,
        'q' => PieceType::Q,
        'k' => PieceType::K,
        _ => return Err(FenParseError::BadPieceChar { ch }),
    };
    Ok(Piece::make(player, pt))
}

fn parse_castling(field: &str) -> Result<CastleRights, FenParseError> {
    if field == "-" {
        return Ok(CastleRights::all());
    }
    let mut rights = CastleRights::all();
    for ch in field.chars() {
        let bit = match ch {
            'K' => CastleRights::WHITE_K_LOST,
            'Q' => CastleRights::WHITE_Q_LOST,
            'k' => CastleRights::BLACK_K_LOST,
            'q' => CastleRights::BLACK_Q_LOST,
            _ => return Err(FenParseError::BadCastlingChar { ch }),
        };
        rights.remove(bit);
    }
    Ok(rights)
}

fn parse_ep_square(field: &str) -> Result<SQ, FenParseError> {
    if field == "-" {
        return Ok(NO_SQ);
    }
    let bytes = field.as_bytes();
    if bytes.len() != 2 {
        return Err(FenParseError::BadEpSquare {
            found: field.to_owned(),
        });
    }
    let file = bytes[0];
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(FenParseError::BadEpSquare {
            found: field.to_owned(),
        });
    }
    Ok(SQ::make(
        File::from_idx(file - b'a'),
        Rank::from_idx(rank - b'1'),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_fen_round_trips_to_start_pos() {
        let pos = Position::from_fen(START_FEN).unwrap();
        let start = Position::start_pos();
        assert_eq!(pos, start);
        assert_eq!(pos.key(), start.key());
    }

    #[test]
    fn kiwipete_parses_with_expected_ep_and_castling() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 10";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.turn(), Player::White);
        assert!(!pos.ep_square().is_okay());
        assert!(pos.castling().can_castle_king_side(Player::White));
        assert!(pos.castling().can_castle_queen_side(Player::Black));
        assert_eq!(pos.to_fen().split(' ').next(), fen.split(' ').next());
    }

    #[test]
    fn rejects_malformed_field_count() {
        assert_eq!(
            Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"),
            Err(FenParseError::WrongFieldCount { found: 3 })
        );
    }

    #[test]
    fn rejects_bad_piece_char() {
        let err = Position::from_fen("rnbqkbnx/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap_err();
        assert_eq!(err, FenParseError::BadPieceChar { ch: 'x' });
    }
}
