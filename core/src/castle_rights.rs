//! Castling-rights tracking.
//!
//! Unlike a traditional "has the right to castle" flag set, `CastleRights` here tracks what has
//! been *lost*: a set bit means that castling right is gone for good. This makes the update rule
//! monotonic (bits are only ever added, never cleared), matching the position invariant that
//! castling-lost flags are never cleared once set.

use crate::sq::SQ;
use crate::types::Player;
use std::fmt;

bitflags::bitflags! {
    #[derive(Default)]
    pub struct CastleRights: u8 {
        const WHITE_K_LOST = 0b0001;
        const WHITE_Q_LOST = 0b0010;
        const BLACK_K_LOST = 0b0100;
        const BLACK_Q_LOST = 0b1000;
        const WHITE_LOST = Self::WHITE_K_LOST.bits | Self::WHITE_Q_LOST.bits;
        const BLACK_LOST = Self::BLACK_K_LOST.bits | Self::BLACK_Q_LOST.bits;
    }
}

impl CastleRights {
    #[inline]
    pub fn can_castle_king_side(self, player: Player) -> bool {
        match player {
            Player::White => !self.contains(CastleRights::WHITE_K_LOST),
            Player::Black => !self.contains(CastleRights::BLACK_K_LOST),
        }
    }

    #[inline]
    pub fn can_castle_queen_side(self, player: Player) -> bool {
        match player {
            Player::White => !self.contains(CastleRights::WHITE_Q_LOST),
            Player::Black => !self.contains(CastleRights::BLACK_Q_LOST),
        }
    }

    #[inline]
    pub fn can_castle_any(self, player: Player) -> bool {
        match player {
            Player::White => !self.contains(CastleRights::WHITE_LOST),
            Player::Black => !self.contains(CastleRights::BLACK_LOST),
        }
    }

    /// Marks both of `player`'s castling rights as lost (the king has moved).
    #[inline]
    pub fn lose_both(&mut self, player: Player) {
        match player {
            Player::White => self.insert(CastleRights::WHITE_LOST),
            Player::Black => self.insert(CastleRights::BLACK_LOST),
        }
    }

    /// Applies the rights lost because a piece moved to or from `sq` (e.g. a rook leaving its
    /// home square, or a rook being captured there).
    #[inline]
    pub fn lose_from_square(&mut self, sq: SQ) {
        self.bits |= sq.castle_rights_mask();
    }

    pub fn pretty_string(self) -> String {
        if self.is_all() {
            return "-".to_owned();
        }
        let mut s = String::new();
        if !self.contains(CastleRights::WHITE_K_LOST) {
            s.push('K');
        }
        if !self.contains(CastleRights::WHITE_Q_LOST) {
            s.push('Q');
        }
        if !self.contains(CastleRights::BLACK_K_LOST) {
            s.push('k');
        }
        if !self.contains(CastleRights::BLACK_Q_LOST) {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_nothing_lost() {
        let c = CastleRights::empty();
        assert!(c.can_castle_any(Player::White));
        assert!(c.can_castle_any(Player::Black));
        assert_eq!(c.pretty_string(), "KQkq");
    }

    #[test]
    fn king_move_loses_both_sides() {
        let mut c = CastleRights::empty();
        c.lose_both(Player::White);
        assert!(!c.can_castle_king_side(Player::White));
        assert!(!c.can_castle_queen_side(Player::White));
        assert!(c.can_castle_any(Player::Black));
    }
}
