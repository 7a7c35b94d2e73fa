//! Compile-time player/generation-type dispatch.
//!
//! Move generation is direction-heavy: pawn pushes, captures and en-passant squares all depend
//! on which side is moving. Rather than branch on `Player` at runtime inside every inner loop,
//! `movegen` is generic over a `PlayerTrait` implementation and the compiler monomorphizes one
//! copy of the generator per side. `WhiteType`/`BlackType` exist only to carry that
//! specialization; never construct one.

use crate::bitboard::BitBoard;
use crate::sq::SQ;
use crate::types::{GenTypes, Player};

pub trait PlayerTrait {
    fn player() -> Player;
    fn opp_player() -> Player;
    fn player_idx() -> usize;

    fn down(sq: SQ) -> SQ;
    fn up(sq: SQ) -> SQ;
    fn down_left(sq: SQ) -> SQ;
    fn down_right(sq: SQ) -> SQ;
    fn up_left(sq: SQ) -> SQ;
    fn up_right(sq: SQ) -> SQ;

    fn shift_up(bb: BitBoard) -> BitBoard;
    fn shift_down(bb: BitBoard) -> BitBoard;
    fn shift_up_left(bb: BitBoard) -> BitBoard;
    fn shift_up_right(bb: BitBoard) -> BitBoard;
    fn shift_down_left(bb: BitBoard) -> BitBoard;
    fn shift_down_right(bb: BitBoard) -> BitBoard;

    /// Rank a pawn must reach to promote.
    fn promo_rank_bb() -> BitBoard;
    /// Rank a pawn sits on before a double push.
    fn start_rank_bb() -> BitBoard;
    /// Rank a single push lands on — the only rank a double push can continue from.
    fn third_rank_bb() -> BitBoard;

    /// The square delta of a single pawn push, signed for this player's direction.
    fn up_delta() -> i8;
    /// The square delta of a capture toward the "left" (from White's point of view, a-file
    /// side) diagonal push.
    fn up_left_delta() -> i8;
    /// The square delta of a capture toward the "right" (h-file side) diagonal push.
    fn up_right_delta() -> i8;
}

pub struct WhiteType;
pub struct BlackType;

impl PlayerTrait for WhiteType {
    #[inline(always)]
    fn player() -> Player {
        Player::White
    }
    #[inline(always)]
    fn opp_player() -> Player {
        Player::Black
    }
    #[inline(always)]
    fn player_idx() -> usize {
        Player::White as usize
    }
    #[inline(always)]
    fn down(sq: SQ) -> SQ {
        sq - 8
    }
    #[inline(always)]
    fn up(sq: SQ) -> SQ {
        sq + 8
    }
    #[inline(always)]
    fn down_left(sq: SQ) -> SQ {
        sq - 9
    }
    #[inline(always)]
    fn down_right(sq: SQ) -> SQ {
        sq - 7
    }
    #[inline(always)]
    fn up_left(sq: SQ) -> SQ {
        sq + 7
    }
    #[inline(always)]
    fn up_right(sq: SQ) -> SQ {
        sq + 9
    }
    #[inline(always)]
    fn shift_up(bb: BitBoard) -> BitBoard {
        bb << 8
    }
    #[inline(always)]
    fn shift_down(bb: BitBoard) -> BitBoard {
        bb >> 8
    }
    #[inline(always)]
    fn shift_up_left(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_A) << 7
    }
    #[inline(always)]
    fn shift_up_right(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_H) << 9
    }
    #[inline(always)]
    fn shift_down_left(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_A) >> 9
    }
    #[inline(always)]
    fn shift_down_right(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_H) >> 7
    }
    #[inline(always)]
    fn promo_rank_bb() -> BitBoard {
        BitBoard::RANK_8
    }
    #[inline(always)]
    fn start_rank_bb() -> BitBoard {
        BitBoard(crate::masks::RANK_2)
    }
    #[inline(always)]
    fn third_rank_bb() -> BitBoard {
        BitBoard(crate::masks::RANK_3)
    }
    #[inline(always)]
    fn up_delta() -> i8 {
        crate::masks::NORTH
    }
    #[inline(always)]
    fn up_left_delta() -> i8 {
        crate::masks::NORTH_WEST
    }
    #[inline(always)]
    fn up_right_delta() -> i8 {
        crate::masks::NORTH_EAST
    }
}

impl PlayerTrait for BlackType {
    #[inline(always)]
    fn player() -> Player {
        Player::Black
    }
    #[inline(always)]
    fn opp_player() -> Player {
        Player::White
    }
    #[inline(always)]
    fn player_idx() -> usize {
        Player::Black as usize
    }
    #[inline(always)]
    fn down(sq: SQ) -> SQ {
        sq + 8
    }
    #[inline(always)]
    fn up(sq: SQ) -> SQ {
        sq - 8
    }
    #[inline(always)]
    fn down_left(sq: SQ) -> SQ {
        sq + 9
    }
    #[inline(always)]
    fn down_right(sq: SQ) -> SQ {
        sq + 7
    }
    #[inline(always)]
    fn up_left(sq: SQ) -> SQ {
        sq - 7
    }
    #[inline(always)]
    fn up_right(sq: SQ) -> SQ {
        sq - 9
    }
    #[inline(always)]
    fn shift_up(bb: BitBoard) -> BitBoard {
        bb >> 8
    }
    #[inline(always)]
    fn shift_down(bb: BitBoard) -> BitBoard {
        bb << 8
    }
    #[inline(always)]
    fn shift_up_left(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_H) >> 7
    }
    #[inline(always)]
    fn shift_up_right(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_A) >> 9
    }
    #[inline(always)]
    fn shift_down_left(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_H) << 9
    }
    #[inline(always)]
    fn shift_down_right(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_A) << 7
    }
    #[inline(always)]
    fn promo_rank_bb() -> BitBoard {
        BitBoard::RANK_1
    }
    #[inline(always)]
    fn start_rank_bb() -> BitBoard {
        BitBoard(crate::masks::RANK_7)
    }
    #[inline(always)]
    fn third_rank_bb() -> BitBoard {
        BitBoard(crate::masks::RANK_6)
    }
    #[inline(always)]
    fn up_delta() -> i8 {
        crate::masks::SOUTH
    }
    #[inline(always)]
    fn up_left_delta() -> i8 {
        crate::masks::SOUTH_EAST
    }
    #[inline(always)]
    fn up_right_delta() -> i8 {
        crate::masks::SOUTH_WEST
    }
}

pub trait GenTypeTrait {
    fn gen_type() -> GenTypes;
}

pub struct AllGenType;
pub struct CapturesGenType;

impl GenTypeTrait for AllGenType {
    #[inline(always)]
    fn gen_type() -> GenTypes {
        GenTypes::All
    }
}

impl GenTypeTrait for CapturesGenType {
    #[inline(always)]
    fn gen_type() -> GenTypes {
        GenTypes::Captures
    }
}
