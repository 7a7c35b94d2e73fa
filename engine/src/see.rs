//! Static Exchange Evaluation: estimate the material result of a capture sequence on one square
//! without searching it, by replaying least-valuable-attacker-first captures off
//! `Position::attackers_to`. Used by move ordering to separate winning from losing captures and
//! by the search to prune captures that cannot recoup a large deficit.

use corvid_core::{BitBoard, BitMove, Piece, PieceType, Player, Position};

fn piece_value(pt: PieceType) -> i32 {
    pt.value()
}

/// Replays the capture sequence on `m`'s destination square and returns the net material swing
/// for the side making `m`, positive meaning `m`'s side comes out ahead.
///
/// Standard swap-off algorithm: repeatedly let whichever side is "on move" in the exchange
/// capture with its least valuable remaining attacker, stopping early via a running minimax over
/// the gain array once a side would rather not continue.
pub fn see(pos: &Position, m: BitMove) -> i32 {
    let dst = m.dst();
    let mut occ = pos.occupied();
    let attacker_sq = m.src();
    let mut attacker_value = piece_value(m.moved_piece());

    let mut gains = [0i32; 32];
    gains[0] = if m.is_en_passant() {
        piece_value(PieceType::P)
    } else {
        piece_value(m.captured_piece())
    };

    let mut side = pos.turn().other_player();
    let mut depth = 0usize;

    occ ^= attacker_sq.to_bb();
    if m.is_en_passant() {
        // The captured pawn sits behind the destination square, not on it.
        let captured_pawn_sq = corvid_core::SQ(if pos.turn() == Player::White {
            dst.0 - 8
        } else {
            dst.0 + 8
        });
        occ ^= captured_pawn_sq.to_bb();
    }

    loop {
        depth += 1;
        if depth >= gains.len() {
            break;
        }
        gains[depth] = attacker_value - gains[depth - 1];
        if gains[depth].max(-gains[depth - 1]) < 0 {
            // Even the most optimistic continuation can't improve on stopping here.
            break;
        }

        let attackers = pos.attackers_to(dst, occ) & occ;
        let side_attackers = attackers & pos.occupied_by(side);
        if side_attackers.is_empty() {
            break;
        }
        let (next_sq, next_value) = least_valuable_attacker(pos, side_attackers);
        occ ^= next_sq.to_bb();
        attacker_value = next_value;
        side = side.other_player();
    }

    while depth > 0 {
        depth -= 1;
        gains[depth] = -gains[depth + 1].max(-gains[depth]);
    }
    gains[0]
}

fn least_valuable_attacker(pos: &Position, attackers: BitBoard) -> (corvid_core::SQ, i32) {
    const ORDER: [PieceType; 6] = [
        PieceType::P,
        PieceType::N,
        PieceType::B,
        PieceType::R,
        PieceType::Q,
        PieceType::K,
    ];
    for &pt in &ORDER {
        let candidates = attackers & pos.piece_bb(pt);
        if candidates.is_not_empty() {
            let sq = candidates.bit_scan_forward();
            return (sq, piece_value(pt));
        }
    }
    unreachable!("attackers bitboard was non-empty but no piece type matched it")
}

/// Whether playing `m` nets at least `threshold` centipawns under static exchange evaluation.
/// Used to gate quiescence-search captures and to prune clearly losing captures in the main
/// search, without paying for a full `see` call when the answer is obvious (even the capture's
/// face-value gain already clears the bar, or even losing the moved piece outright still clears
/// it).
pub fn see_above(pos: &Position, m: BitMove, threshold: i32) -> bool {
    let piece_on_dst = pos.piece_at(m.dst());
    let captured_value = if m.is_en_passant() {
        piece_value(PieceType::P)
    } else if piece_on_dst != Piece::None {
        piece_value(m.captured_piece())
    } else {
        0
    };
    if captured_value >= threshold {
        return see(pos, m) >= threshold;
    }
    if captured_value - piece_value(m.moved_piece()) >= threshold {
        return true;
    }
    see(pos, m) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::{generate_all_captures, MoveList, SQ};

    fn find_capture(pos: &Position, src: SQ, dst: SQ) -> BitMove {
        let mut list = MoveList::default();
        generate_all_captures(pos, &mut list);
        list.iter()
            .copied()
            .find(|m| m.src() == src && m.dst() == dst)
            .expect("expected capture not found among generated captures")
    }

    #[test]
    fn pawn_takes_undefended_knight_wins_material() {
        let pos = Position::from_fen("4k3/8/8/8/3n4/4P3/8/4K3 w - - 0 1").unwrap();
        let m = find_capture(&pos, SQ::E3, SQ::D4);
        assert_eq!(see(&pos, m), PieceType::N.value());
    }

    #[test]
    fn queen_takes_pawn_defended_by_pawn_loses_material() {
        let pos = Position::from_fen("4k3/8/2p5/3p4/4Q3/8/8/4K3 w - - 0 1").unwrap();
        let m = find_capture(&pos, SQ::E4, SQ::D5);
        assert_eq!(see(&pos, m), PieceType::P.value() - PieceType::Q.value());
    }

    #[test]
    fn see_above_zero_matches_see_sign_for_losing_trade() {
        let pos = Position::from_fen("4k3/8/2p5/3p4/4Q3/8/8/4K3 w - - 0 1").unwrap();
        let m = find_capture(&pos, SQ::E4, SQ::D5);
        assert!(!see_above(&pos, m, 0));
    }
}
