//! Board representation, move generation, and the other chess primitives shared by every
//! consumer: bitboards, magic attack tables, Zobrist hashing, FEN parsing, and perft.
//!
//! This crate has no notion of search; it only knows how to represent a position and enumerate
//! legal continuations from it.

pub mod bit_twiddles;
pub mod bitboard;
pub mod castle_rights;
pub mod fen;
pub mod globals;
pub mod magic;
pub mod mono_traits;
pub mod move_list;
pub mod movegen;
pub mod masks;
pub mod perft;
pub mod piece_move;
pub mod position;
pub mod prng;
pub mod sq;
pub mod types;
pub mod zobrist;

pub use bitboard::BitBoard;
pub use castle_rights::CastleRights;
pub use fen::{FenParseError, START_FEN};
pub use move_list::{EvaledMoveList, MoveList};
pub use movegen::{generate_all_captures, generate_all_legal_moves, generate_all_moves};
pub use piece_move::{BitMove, EvaledMove, MoveType, PreMoveInfo};
pub use position::Position;
pub use sq::SQ;
pub use types::{File, GenTypes, Piece, PieceType, Player, Rank};
