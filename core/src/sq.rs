//! A single square of a chessboard.
//!
//! Squares are numbered file-major, `a1 = 0` through `h8 = 63`:
//!
//! ```md,ignore
//! 8 | 56 57 58 59 60 61 62 63
//! 7 | 48 49 50 51 52 53 54 55
//! 6 | 40 41 42 43 44 45 46 47
//! 5 | 32 33 34 35 36 37 38 39
//! 4 | 24 25 26 27 28 29 30 31
//! 3 | 16 17 18 19 20 21 22 23
//! 2 | 8  9  10 11 12 13 14 15
//! 1 | 0  1  2  3  4  5  6  7
//!   -------------------------
//!      a  b  c  d  e  f  g  h
//! ```

use crate::bit_twiddles::diff;
use crate::bitboard::BitBoard;
use crate::masks::*;
use crate::types::{File, Player, Rank};

use std::fmt;
use std::ops::{Add, BitXor, Sub};

/// A square, `0..=63`. `SQ(64)` ("no square") is used in place of `Option<SQ>`.
#[derive(Copy, Clone, Default, Hash, PartialEq, PartialOrd, Eq, Ord, Debug)]
#[repr(transparent)]
pub struct SQ(pub u8);

/// The sentinel "no square" value, used for an absent en-passant square.
pub const NO_SQ: SQ = SQ(64);

impl SQ {
    pub const NONE: SQ = NO_SQ;

    #[inline(always)]
    pub const fn is_okay(self) -> bool {
        self.0 < 64
    }

    #[inline]
    pub fn distance(self, other: SQ) -> u8 {
        let x = diff(self.rank_idx(), other.rank_idx());
        let y = diff(self.file_idx(), other.file_idx());
        x.max(y)
    }

    #[inline(always)]
    pub fn to_bb(self) -> BitBoard {
        debug_assert!(self.is_okay());
        BitBoard(1u64 << self.0)
    }

    #[inline(always)]
    pub fn rank(self) -> Rank {
        Rank::from_idx((self.0 >> 3) & 0b111)
    }

    #[inline(always)]
    pub fn rank_idx(self) -> u8 {
        self.0 >> 3
    }

    #[inline(always)]
    pub fn file(self) -> File {
        File::from_idx(self.0 & 0b111)
    }

    #[inline(always)]
    pub fn file_idx(self) -> u8 {
        self.0 & 0b111
    }

    /// Castling-rights bits lost when a piece moves to or from this square (0 if none).
    #[inline]
    pub fn castle_rights_mask(self) -> u8 {
        match self.0 {
            ROOK_WHITE_QSIDE_START => C_WHITE_Q_MASK,
            ROOK_WHITE_KSIDE_START => C_WHITE_K_MASK,
            ROOK_BLACK_QSIDE_START => C_BLACK_Q_MASK,
            ROOK_BLACK_KSIDE_START => C_BLACK_K_MASK,
            WHITE_KING_START => C_WHITE_K_MASK | C_WHITE_Q_MASK,
            BLACK_KING_START => C_BLACK_K_MASK | C_BLACK_Q_MASK,
            _ => 0,
        }
    }

    #[inline(always)]
    pub const fn make(file: File, rank: Rank) -> SQ {
        SQ((rank as u8) * 8 + (file as u8))
    }

    #[inline(always)]
    pub fn on_dark_square(self) -> bool {
        (self.to_bb() & BitBoard(DARK_SQUARES)).is_not_empty()
    }

    /// Flips the rank: `a1 <-> a8`.
    #[inline(always)]
    pub fn flip(self) -> SQ {
        SQ(self.0 ^ 0b111000)
    }

    #[inline(always)]
    pub fn opposite_colors(self, other: SQ) -> bool {
        let s = self.0 ^ other.0;
        ((s >> 3) ^ s) & 1 != 0
    }

    /// Relative to `player`: flips rank for Black so pawn-push direction is uniform.
    #[inline(always)]
    pub fn relative(self, player: Player) -> SQ {
        SQ(self.0 ^ ((player as u8) * 56))
    }
}

impl Add<i8> for SQ {
    type Output = SQ;
    #[inline(always)]
    fn add(self, rhs: i8) -> SQ {
        SQ((self.0 as i16 + rhs as i16) as u8)
    }
}

impl Sub<i8> for SQ {
    type Output = SQ;
    #[inline(always)]
    fn sub(self, rhs: i8) -> SQ {
        SQ((self.0 as i16 - rhs as i16) as u8)
    }
}

impl BitXor<u8> for SQ {
    type Output = SQ;
    #[inline(always)]
    fn bitxor(self, rhs: u8) -> SQ {
        SQ(self.0 ^ rhs)
    }
}

const SQ_DISPLAY: [&str; 65] = [
    "a1", "b1", "c1", "d1", "e1", "f1", "g1", "h1", "a2", "b2", "c2", "d2", "e2", "f2", "g2", "h2",
    "a3", "b3", "c3", "d3", "e3", "f3", "g3", "h3", "a4", "b4", "c4", "d4", "e4", "f4", "g4", "h4",
    "a5", "b5", "c5", "d5", "e5", "f5", "g5", "h5", "a6", "b6", "c6", "d6", "e6", "f6", "g6", "h6",
    "a7", "b7", "c7", "d7", "e7", "f7", "g7", "h7", "a8", "b8", "c8", "d8", "e8", "f8", "g8", "h8",
    "-",
];

impl fmt::Display for SQ {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", SQ_DISPLAY[self.0.min(64) as usize])
    }
}

macro_rules! sq_consts {
    ($($name:ident = $val:expr),* $(,)?) => {
        #[allow(missing_docs)]
        impl SQ {
            $(pub const $name: SQ = SQ($val);)*
        }
    };
}

sq_consts! {
    A1 = 0, B1 = 1, C1 = 2, D1 = 3, E1 = 4, F1 = 5, G1 = 6, H1 = 7,
    A2 = 8, B2 = 9, C2 = 10, D2 = 11, E2 = 12, F2 = 13, G2 = 14, H2 = 15,
    A3 = 16, B3 = 17, C3 = 18, D3 = 19, E3 = 20, F3 = 21, G3 = 22, H3 = 23,
    A4 = 24, B4 = 25, C4 = 26, D4 = 27, E4 = 28, F4 = 29, G4 = 30, H4 = 31,
    A5 = 32, B5 = 33, C5 = 34, D5 = 35, E5 = 36, F5 = 37, G5 = 38, H5 = 39,
    A6 = 40, B6 = 41, C6 = 42, D6 = 43, E6 = 44, F6 = 45, G6 = 46, H6 = 47,
    A7 = 48, B7 = 49, C7 = 50, D7 = 51, E7 = 52, F7 = 53, G7 = 54, H7 = 55,
    A8 = 56, B8 = 57, C8 = 58, D8 = 59, E8 = 60, F8 = 61, G8 = 62, H8 = 63,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_chebyshev() {
        assert_eq!(SQ::A1.distance(SQ::A1), 0);
        assert_eq!(SQ::A1.distance(SQ::B2), 1);
        assert_eq!(SQ::A1.distance(SQ::B3), 2);
    }

    #[test]
    fn make_round_trips_file_rank() {
        let sq = SQ::make(File::F, Rank::R2);
        assert_eq!(sq, SQ::F2);
        assert_eq!(sq.file(), File::F);
        assert_eq!(sq.rank(), Rank::R2);
    }

    #[test]
    fn flip_swaps_rank() {
        assert_eq!(SQ::A1.flip(), SQ::A8);
        assert_eq!(SQ::H4.flip(), SQ::H5);
    }
}
