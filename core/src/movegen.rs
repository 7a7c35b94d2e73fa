//! Pseudo-legal move generation.
//!
//! `generate_all_moves` and `generate_all_captures` both write directly into a caller-owned
//! `MoveList`; nothing here allocates. "Pseudo-legal" means every chess rule is respected except
//! the king-safety check, which `Position::make_move` applies uniformly to every move type —
//! the one exception is castling, whose legality (king not in or passing through check) is
//! cheap to check here and excluded at generation time per the end-to-end castling scenario.

use crate::globals::ATTACK_TABLES;
use crate::masks::*;
use crate::mono_traits::{BlackType, PlayerTrait, WhiteType};
use crate::move_list::MoveList;
use crate::piece_move::{BitMove, MoveType, PreMoveInfo};
use crate::position::Position;
use crate::sq::SQ;
use crate::types::{GenTypes, PieceType, Player};

/// Emits every pseudo-legal move available to the side to move.
pub fn generate_all_moves(pos: &Position, buf: &mut MoveList) {
    match pos.turn() {
        Player::White => generate::<WhiteType>(pos, buf, GenTypes::All),
        Player::Black => generate::<BlackType>(pos, buf, GenTypes::All),
    }
}

/// Emits captures and queen promotions only — the subset quiescence search wants.
pub fn generate_all_captures(pos: &Position, buf: &mut MoveList) {
    match pos.turn() {
        Player::White => generate::<WhiteType>(pos, buf, GenTypes::Captures),
        Player::Black => generate::<BlackType>(pos, buf, GenTypes::Captures),
    }
}

/// Every legal move from `pos`: the pseudo-legal list, filtered down to the moves whose
/// `make_move` actually succeeds. Used at the search root, where the resulting list can be
/// replayed with `make_legal_move` (skipping the redundant legality check).
pub fn generate_all_legal_moves(pos: &Position, buf: &mut MoveList) {
    let mut pseudo = MoveList::default();
    generate_all_moves(pos, &mut pseudo);
    let mut child = Position::blank();
    for &m in pseudo.iter() {
        if pos.make_move(m, &mut child) {
            buf.push(m);
        }
    }
}

fn generate<P: PlayerTrait>(pos: &Position, buf: &mut MoveList, gen_type: GenTypes) {
    let us = P::player();
    let them = P::opp_player();
    let our_occ = pos.occupied_by(us);
    let their_occ = pos.occupied_by(them);
    let occ = our_occ | their_occ;
    let captures_only = gen_type == GenTypes::Captures;

    gen_pawn_moves::<P>(pos, buf, their_occ, occ, captures_only);

    for &(pt, piece_bb) in &[
        (PieceType::N, pos.piece_bb_player(us, PieceType::N)),
        (PieceType::B, pos.piece_bb_player(us, PieceType::B)),
        (PieceType::R, pos.piece_bb_player(us, PieceType::R)),
        (PieceType::Q, pos.piece_bb_player(us, PieceType::Q)),
    ] {
        let mut pieces = piece_bb;
        while pieces.is_not_empty() {
            let from = pieces.pop_lsb();
            let mut targets = pos.attacks_from(pt, from, us) & !our_occ;
            if captures_only {
                targets &= their_occ;
            }
            while targets.is_not_empty() {
                let to = targets.pop_lsb();
                push_normal_move(pos, buf, from, to, pt, their_occ);
            }
        }
    }

    gen_king_moves::<P>(pos, buf, our_occ, their_occ, captures_only);
    if !captures_only {
        gen_castles::<P>(pos, buf, occ);
    }
}

#[inline]
fn push_normal_move(pos: &Position, buf: &mut MoveList, from: SQ, to: SQ, moved: PieceType, their_occ: crate::bitboard::BitBoard) {
    let is_capture = (their_occ & to.to_bb()).is_not_empty();
    let captured = if is_capture {
        pos.piece_at(to).type_of()
    } else {
        PieceType::None
    };
    let flag = if is_capture {
        MoveType::Capture
    } else {
        MoveType::Quiet
    };
    buf.push(BitMove::new(PreMoveInfo {
        src: from,
        dst: to,
        flag,
        moved,
        captured,
    }));
}

fn gen_king_moves<P: PlayerTrait>(
    pos: &Position,
    buf: &mut MoveList,
    our_occ: crate::bitboard::BitBoard,
    their_occ: crate::bitboard::BitBoard,
    captures_only: bool,
) {
    let from = pos.king_sq(P::player());
    let mut targets = ATTACK_TABLES.king_attacks(from) & !our_occ;
    if captures_only {
        targets &= their_occ;
    }
    while targets.is_not_empty() {
        let to = targets.pop_lsb();
        push_normal_move(pos, buf, from, to, PieceType::K, their_occ);
    }
}

fn gen_castles<P: PlayerTrait>(pos: &Position, buf: &mut MoveList, occ: crate::bitboard::BitBoard) {
    let us = P::player();
    let them = P::opp_player();
    let castling = pos.castling();
    let king_from = pos.king_sq(us);

    if pos.is_square_attacked(king_from, them) {
        return;
    }

    if castling.can_castle_king_side(us) {
        let (between, king_to, rook_from) = king_side_squares(us);
        if (occ & between).is_empty() {
            let path_clear = squares_between(king_from, king_to)
                .all(|sq| !pos.is_square_attacked(sq, them));
            if path_clear && !pos.is_square_attacked(king_to, them) {
                buf.push(BitMove::new(PreMoveInfo {
                    src: king_from,
                    dst: rook_from,
                    flag: MoveType::KingCastle,
                    moved: PieceType::K,
                    captured: PieceType::None,
                }));
            }
        }
    }

    if castling.can_castle_queen_side(us) {
        let (between, king_to, rook_from) = queen_side_squares(us);
        if (occ & between).is_empty() {
            let path_clear = squares_between(king_from, king_to)
                .all(|sq| !pos.is_square_attacked(sq, them));
            if path_clear && !pos.is_square_attacked(king_to, them) {
                buf.push(BitMove::new(PreMoveInfo {
                    src: king_from,
                    dst: rook_from,
                    flag: MoveType::QueenCastle,
                    moved: PieceType::K,
                    captured: PieceType::None,
                }));
            }
        }
    }
}

/// Squares from `a` to `b` inclusive of both ends, walking along the king's one-rank path.
fn squares_between(a: SQ, b: SQ) -> impl Iterator<Item = SQ> {
    let lo = a.0.min(b.0);
    let hi = a.0.max(b.0);
    (lo..=hi).map(SQ)
}

/// (squares that must be empty, king destination, rook home square) for king-side castling.
fn king_side_squares(player: Player) -> (crate::bitboard::BitBoard, SQ, SQ) {
    match player {
        Player::White => (
            crate::bitboard::BitBoard(sq_mask(&[5, 6])),
            SQ::G1,
            SQ(ROOK_WHITE_KSIDE_START),
        ),
        Player::Black => (
            crate::bitboard::BitBoard(sq_mask(&[61, 62])),
            SQ::G8,
            SQ(ROOK_BLACK_KSIDE_START),
        ),
    }
}

fn queen_side_squares(player: Player) -> (crate::bitboard::BitBoard, SQ, SQ) {
    match player {
        Player::White => (
            crate::bitboard::BitBoard(sq_mask(&[1, 2, 3])),
            SQ::C1,
            SQ(ROOK_WHITE_QSIDE_START),
        ),
        Player::Black => (
            crate::bitboard::BitBoard(sq_mask(&[57, 58, 59])),
            SQ::C8,
            SQ(ROOK_BLACK_QSIDE_START),
        ),
    }
}

fn sq_mask(sqs: &[u8]) -> u64 {
    sqs.iter().fold(0u64, |acc, &s| acc | (1u64 << s))
}

fn gen_pawn_moves<P: PlayerTrait>(
    pos: &Position,
    buf: &mut MoveList,
    their_occ: crate::bitboard::BitBoard,
    occ: crate::bitboard::BitBoard,
    captures_only: bool,
) {
    let us = P::player();
    let pawns = pos.piece_bb_player(us, PieceType::P);
    let promo_rank = P::promo_rank_bb();
    let empty = !occ;

    let single_push = P::shift_up(pawns) & empty;
    if captures_only {
        // Captures-only generation (quiescence) still needs quiet queen promotions: a pawn
        // pushing to the back rank is as tactically loud as a capture even though it takes
        // nothing.
        emit_quiet_queen_promotions::<P>(buf, single_push & promo_rank, P::up_delta());
    } else {
        emit_pawn_pushes::<P>(buf, single_push & !promo_rank, P::up_delta(), MoveType::Quiet);
        emit_pawn_promotions::<P>(buf, single_push & promo_rank, P::up_delta(), false);

        let double_push = P::shift_up(single_push & P::third_rank_bb()) & empty;
        emit_pawn_pushes::<P>(buf, double_push, P::up_delta() * 2, MoveType::DoublePawnPush);
    }

    let left = P::shift_up_left(pawns) & their_occ;
    emit_pawn_captures::<P>(pos, buf, left, P::up_left_delta(), promo_rank);
    let right = P::shift_up_right(pawns) & their_occ;
    emit_pawn_captures::<P>(pos, buf, right, P::up_right_delta(), promo_rank);

    if pos.ep_square().is_okay() {
        let ep_bb = pos.ep_square().to_bb();
        let left_ep = P::shift_up_left(pawns) & ep_bb;
        let right_ep = P::shift_up_right(pawns) & ep_bb;
        if left_ep.is_not_empty() {
            let to = pos.ep_square();
            let from = SQ((to.0 as i16 - P::up_left_delta() as i16) as u8);
            buf.push(BitMove::new(PreMoveInfo {
                src: from,
                dst: to,
                flag: MoveType::EnPassant,
                moved: PieceType::P,
                captured: PieceType::P,
            }));
        }
        if right_ep.is_not_empty() {
            let to = pos.ep_square();
            let from = SQ((to.0 as i16 - P::up_right_delta() as i16) as u8);
            buf.push(BitMove::new(PreMoveInfo {
                src: from,
                dst: to,
                flag: MoveType::EnPassant,
                moved: PieceType::P,
                captured: PieceType::P,
            }));
        }
    }
}

fn emit_pawn_pushes<P: PlayerTrait>(
    buf: &mut MoveList,
    mut targets: crate::bitboard::BitBoard,
    delta: i8,
    flag: MoveType,
) {
    while targets.is_not_empty() {
        let to = targets.pop_lsb();
        let from = SQ((to.0 as i16 - delta as i16) as u8);
        buf.push(BitMove::new(PreMoveInfo {
            src: from,
            dst: to,
            flag,
            moved: PieceType::P,
            captured: PieceType::None,
        }));
    }
    let _ = P::player();
}

fn emit_pawn_promotions<P: PlayerTrait>(
    buf: &mut MoveList,
    mut targets: crate::bitboard::BitBoard,
    delta: i8,
    is_capture: bool,
) {
    const PROMOS: [(MoveType, MoveType); 4] = [
        (MoveType::PromotionN, MoveType::PromotionCaptureN),
        (MoveType::PromotionB, MoveType::PromotionCaptureB),
        (MoveType::PromotionR, MoveType::PromotionCaptureR),
        (MoveType::PromotionQ, MoveType::PromotionCaptureQ),
    ];
    while targets.is_not_empty() {
        let to = targets.pop_lsb();
        let from = SQ((to.0 as i16 - delta as i16) as u8);
        for &(quiet_flag, capture_flag) in &PROMOS {
            buf.push(BitMove::new(PreMoveInfo {
                src: from,
                dst: to,
                flag: if is_capture { capture_flag } else { quiet_flag },
                moved: PieceType::P,
                captured: PieceType::None,
            }));
        }
    }
    let _ = P::player();
}

fn emit_quiet_queen_promotions<P: PlayerTrait>(buf: &mut MoveList, mut targets: crate::bitboard::BitBoard, delta: i8) {
    while targets.is_not_empty() {
        let to = targets.pop_lsb();
        let from = SQ((to.0 as i16 - delta as i16) as u8);
        buf.push(BitMove::new(PreMoveInfo {
            src: from,
            dst: to,
            flag: MoveType::PromotionQ,
            moved: PieceType::P,
            captured: PieceType::None,
        }));
    }
    let _ = P::player();
}

fn emit_pawn_captures<P: PlayerTrait>(
    pos: &Position,
    buf: &mut MoveList,
    mut targets: crate::bitboard::BitBoard,
    delta: i8,
    promo_rank: crate::bitboard::BitBoard,
) {
    let promos = targets & promo_rank;
    emit_pawn_promotions::<P>(buf, promos, delta, true);
    targets &= !promo_rank;
    while targets.is_not_empty() {
        let to = targets.pop_lsb();
        let from = SQ((to.0 as i16 - delta as i16) as u8);
        let captured = pos.piece_at(to).type_of();
        buf.push(BitMove::new(PreMoveInfo {
            src: from,
            dst: to,
            flag: MoveType::Capture,
            moved: PieceType::P,
            captured,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_twenty_moves() {
        let pos = Position::start_pos();
        let mut buf = MoveList::default();
        generate_all_moves(&pos, &mut buf);
        assert_eq!(buf.len(), 20);
    }

    #[test]
    fn en_passant_square_generates_ep_capture() {
        // White pawn e5, black pawn on d7: play d7d5 so the ep square (d6) is set, then
        // verify exd6 e.p. is generated.
        let before = Position::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
        let mut after = Position::blank();
        let double_push = BitMove::new(PreMoveInfo {
            src: SQ::D7,
            dst: SQ::D5,
            flag: MoveType::DoublePawnPush,
            moved: PieceType::P,
            captured: PieceType::None,
        });
        assert!(before.make_move(double_push, &mut after));
        assert_eq!(after.ep_square(), SQ::D6);

        let mut buf = MoveList::default();
        generate_all_moves(&after, &mut buf);
        assert!(buf.iter().any(|m| m.is_en_passant()));
    }

    #[test]
    fn legal_moves_are_exactly_the_pseudo_legal_moves_that_survive_make_move() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 10",
        )
        .unwrap();
        let mut pseudo = MoveList::default();
        generate_all_moves(&pos, &mut pseudo);
        let mut legal = MoveList::default();
        generate_all_legal_moves(&pos, &mut legal);

        let mut child = Position::blank();
        let expected: Vec<BitMove> = pseudo
            .iter()
            .copied()
            .filter(|&m| pos.make_move(m, &mut child))
            .collect();
        assert_eq!(legal.len(), expected.len());
        for m in expected {
            assert!(legal.contains(m));
        }
    }
}
