//! Recursive negamax with alpha-beta pruning: the single-threaded search core every worker
//! thread runs against the shared transposition table. `Thread` holds everything that must stay
//! private to one worker (its own history table, killer slots, node counter); the transposition
//! table and pawn-king cache are the only state shared across threads, both lockless.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;

use corvid_core::{generate_all_captures, generate_all_legal_moves, generate_all_moves, BitMove, EvaledMoveList, MoveList, PieceType, Player, Position};

use crate::eval::{ClassicalEval, Evaluate, PAWN_VALUE_MG};
use crate::order::{score_moves, sort_moves, HistoryTable, KillerMoves};
use crate::pawn_table::PawnTable;
use crate::see::see_above;
use crate::tt::{Bound, TranspositionTable};

/// Plies deep the search stack is ever allowed to reach. Large enough that no real game or
/// extension chain overflows the per-ply arrays below.
pub const MAX_PLY: usize = 128;

pub const MATE: i32 = 32_000;
pub const VALUE_WIN: i32 = MATE - 150;
const CONTEMPT: i32 = 0;

/// Signals that the search was cancelled mid-node; every frame on the call stack converts this
/// into an immediate return via `?` so no transposition-table or history write happens on a
/// half-finished node.
#[derive(Debug, Clone, Copy)]
pub struct Timeout;

/// Everything one worker thread owns exclusively: its own move-ordering heuristics, its node
/// counter, and the positions visited on the path from the search root to the current node
/// (used for in-search repetition detection, since this engine never unmakes a move — each
/// recursive call just holds its own child `Position`).
pub struct Thread {
    pub id: usize,
    pub tt: Arc<TranspositionTable>,
    pub pawn_table: Arc<PawnTable>,
    pub stop: Arc<AtomicBool>,
    /// Cache-line-padded so every worker's per-256-node flush doesn't false-share this counter's
    /// line with something else in the same allocation.
    pub nodes: Arc<CachePadded<AtomicU64>>,
    evaluator: ClassicalEval,
    killers: Vec<KillerMoves>,
    history: HistoryTable,
    eval_history: Vec<i32>,
    path_keys: Vec<(u64, bool)>,
    game_history_keys: Vec<u64>,
    local_nodes: u64,
}

impl Thread {
    pub fn new(
        id: usize,
        tt: Arc<TranspositionTable>,
        pawn_table: Arc<PawnTable>,
        stop: Arc<AtomicBool>,
        nodes: Arc<CachePadded<AtomicU64>>,
        game_history_keys: Vec<u64>,
    ) -> Self {
        Thread {
            id,
            tt,
            pawn_table,
            stop,
            nodes,
            evaluator: ClassicalEval::new(),
            killers: vec![KillerMoves::default(); MAX_PLY],
            history: HistoryTable::default(),
            eval_history: vec![0; MAX_PLY],
            path_keys: Vec::with_capacity(MAX_PLY),
            game_history_keys,
            local_nodes: 0,
        }
    }

    fn poll_cancellation(&mut self) -> Result<(), Timeout> {
        self.local_nodes += 1;
        if self.local_nodes % 256 == 0 {
            self.nodes.fetch_add(256, Ordering::Relaxed);
            if self.stop.load(Ordering::Relaxed) {
                return Err(Timeout);
            }
        }
        Ok(())
    }

    fn flush_node_count(&mut self) {
        let remainder = self.local_nodes % 256;
        if remainder != 0 {
            self.nodes.fetch_add(remainder, Ordering::Relaxed);
            self.local_nodes -= remainder;
        }
    }
}

fn has_non_pawn_material(pos: &Position, player: Player) -> bool {
    [PieceType::N, PieceType::B, PieceType::R, PieceType::Q]
        .iter()
        .any(|&pt| pos.piece_bb_player(player, pt).is_not_empty())
}

fn is_insufficient_material(pos: &Position) -> bool {
    let no_heavy = pos.piece_bb(PieceType::P).is_empty()
        && pos.piece_bb(PieceType::R).is_empty()
        && pos.piece_bb(PieceType::Q).is_empty();
    if !no_heavy {
        return false;
    }
    let minors = pos.piece_bb(PieceType::N).count_bits() + pos.piece_bb(PieceType::B).count_bits();
    minors <= 1
}

/// `isDraw`: fifty-move rule, starved material, or repetition (either within the current search
/// stack since the last irreversible move, or twice already in the game before the root).
fn is_draw(pos: &Position, path_keys: &[(u64, bool)], game_history_keys: &[u64]) -> bool {
    if pos.rule_50() > 100 {
        return true;
    }
    if is_insufficient_material(pos) {
        return true;
    }
    let key = pos.key();
    let mut seen_in_path = 0;
    for &(k, is_null) in path_keys.iter().rev() {
        if is_null {
            break;
        }
        if k == key {
            seen_in_path += 1;
        }
    }
    if seen_in_path >= 1 {
        return true;
    }
    let seen_before_root = game_history_keys.iter().filter(|&&k| k == key).count();
    seen_before_root >= 2
}

fn loss_in(height: u16) -> i32 {
    -(MATE - height as i32)
}

fn lmr_reduction(depth: i16, move_count: usize, is_pv: bool, improving: bool) -> i16 {
    let base = 0.75 + (depth as f64).ln() * (move_count as f64).ln() / 2.45;
    let mut r = base.round() as i16;
    if !is_pv {
        r += 1;
    }
    if !improving {
        r += 1;
    }
    r.clamp(0, (depth - 2).max(0))
}

/// Negamax search of `pos` to `depth` plies, within window `(alpha, beta)`, `height` plies from
/// the search root. Returns the score from the perspective of `pos.turn()`, plus the principal
/// variation through `pv` (root move first).
pub fn negamax(
    thread: &mut Thread,
    pos: &Position,
    mut depth: i16,
    mut alpha: i32,
    mut beta: i32,
    height: u16,
    is_pv: bool,
    pv: &mut Vec<BitMove>,
) -> Result<i32, Timeout> {
    pv.clear();
    thread.poll_cancellation()?;

    if height > 0 && is_draw(pos, &thread.path_keys, &thread.game_history_keys) {
        return Ok(CONTEMPT);
    }

    let key = pos.key();
    let tt_hit = thread.tt.probe(key, height);
    let tt_move = tt_hit.map(|h| h.best_move).unwrap_or_else(BitMove::null);
    if let Some(hit) = tt_hit {
        if hit.depth as i16 >= depth && (!is_pv || depth == 0) {
            match hit.bound {
                Bound::Exact => return Ok(hit.score),
                Bound::Upper if hit.score <= alpha => return Ok(alpha),
                Bound::Lower if hit.score >= beta => return Ok(beta),
                _ => {}
            }
        }
    }

    if depth <= 0 {
        return qsearch(thread, pos, alpha, beta, height, 0);
    }

    let in_check = pos.in_check();
    let static_eval = if in_check { -MATE } else { thread.evaluator.eval(pos) };
    if (height as usize) < MAX_PLY {
        thread.eval_history[height as usize] = static_eval;
    }
    let improving = height <= 2
        || (height as usize) < MAX_PLY && thread.eval_history[height as usize] >= thread.eval_history[height as usize - 2];

    // Null-move pruning.
    if !pos.last_move().is_null()
        && depth >= 2
        && !in_check
        && static_eval >= beta
        && has_non_pawn_material(pos, pos.turn())
    {
        let mut null_pos = Position::blank();
        pos.make_null_move(&mut null_pos);
        let r = (3i16).max(1 + depth / 3);
        thread.path_keys.push((key, true));
        let mut child_pv = Vec::new();
        let score = -negamax(thread, &null_pos, depth - 1 - r, -beta, -beta + 1, height + 1, false, &mut child_pv)?;
        thread.path_keys.pop();
        if score >= beta {
            return Ok(beta);
        }
    }

    // Internal iterative deepening.
    let mut tt_move = tt_move;
    if tt_move.is_null() && ((is_pv && depth >= 6) || (!is_pv && depth >= 8)) {
        let mut child_pv = Vec::new();
        negamax(thread, pos, depth - 2, alpha, beta, height, is_pv, &mut child_pv)?;
        if let Some(hit) = thread.tt.probe(key, height) {
            tt_move = hit.best_move;
        }
    }

    let mut best_score = -MATE;
    let mut best_move = BitMove::null();
    let mut move_count = 0usize;
    let mut quiets_searched: Vec<BitMove> = Vec::new();
    let original_alpha = alpha;

    // Hash move first.
    if !tt_move.is_null() && pos.is_move_pseudo_legal(tt_move) {
        let mut child = Position::blank();
        if pos.make_move(tt_move, &mut child) {
            move_count += 1;
            let mut extension = 0i16;
            if in_check {
                extension = 1;
            }
            if let Some(hit) = tt_hit {
                if hit.bound != Bound::Upper && hit.depth as i16 >= depth - 2 && depth >= 8 {
                    let r_beta = hit.score - depth as i32;
                    if singular_extension_confirms(thread, pos, tt_move, depth, height, r_beta)? {
                        extension = extension.max(1);
                    }
                }
            }
            thread.path_keys.push((key, false));
            let mut child_pv = Vec::new();
            let score = -negamax(thread, &child, depth - 1 + extension, -beta, -alpha, height + 1, is_pv, &mut child_pv)?;
            thread.path_keys.pop();
            if !tt_move.is_capture() && !tt_move.is_promotion() {
                quiets_searched.push(tt_move);
            }
            if score > best_score {
                best_score = score;
                best_move = tt_move;
                if score > alpha {
                    alpha = score;
                    pv.clear();
                    pv.push(tt_move);
                    pv.append(&mut child_pv);
                }
            }
            if alpha >= beta {
                record_cutoff(thread, tt_move, &quiets_searched, depth, height);
                thread.tt.store(key, best_move, best_score, depth.min(i8::MAX as i16) as i8, Bound::Lower, height);
                return Ok(beta);
            }
        }
    }

    let mut moves = MoveList::default();
    generate_all_moves(pos, &mut moves);
    let mut evaled = EvaledMoveList::default();
    score_moves(pos, &moves, tt_move, &thread.killers[height as usize], &thread.history, &mut evaled);
    sort_moves(&mut evaled);

    for evaled_move in evaled.iter() {
        let mv = evaled_move.bit_move;
        if mv == tt_move {
            continue;
        }
        let is_noisy = mv.is_capture() || mv.is_en_passant() || mv.is_promotion();

        if depth <= 8 && !in_check && !is_noisy && evaled_move.score < 0 && static_eval + PAWN_VALUE_MG * depth as i32 <= alpha {
            continue;
        }
        let move_count_limit = ((5 + (depth as i32) * (depth as i32)) * (1 + improving as i32)) / 2 - 1;
        if depth <= 8 && !in_check && move_count as i32 >= move_count_limit {
            continue;
        }
        if depth <= 6 {
            let threshold = if is_noisy { -18 * (depth as i32) * (depth as i32) } else { -80 * depth as i32 };
            if !see_above(pos, mv, threshold) {
                continue;
            }
        }

        let mut child = Position::blank();
        if !pos.make_move(mv, &mut child) {
            continue;
        }
        move_count += 1;

        let mut extension = 0i16;
        if in_check && see_above(pos, mv, 0) {
            extension = 1;
        }

        let mut reduction = 0i16;
        if depth >= 3 && !in_check && move_count > 1 && !is_noisy && !child.in_check() {
            reduction = lmr_reduction(depth, move_count, is_pv, improving);
        }

        thread.path_keys.push((key, false));
        let mut child_pv = Vec::new();
        let new_depth = depth - 1 + extension;

        let mut score = if reduction > 0 {
            -negamax(thread, &child, new_depth - reduction, -alpha - 1, -alpha, height + 1, false, &mut child_pv)?
        } else if !is_pv || move_count > 1 {
            -negamax(thread, &child, new_depth, -alpha - 1, -alpha, height + 1, false, &mut child_pv)?
        } else {
            alpha
        };

        if score > alpha && reduction > 0 {
            score = -negamax(thread, &child, new_depth, -alpha - 1, -alpha, height + 1, false, &mut child_pv)?;
        }
        if is_pv && (move_count == 1 || score > alpha) {
            score = -negamax(thread, &child, new_depth, -beta, -alpha, height + 1, true, &mut child_pv)?;
        }
        thread.path_keys.pop();

        if !is_noisy {
            quiets_searched.push(mv);
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
            if score > alpha {
                alpha = score;
                pv.clear();
                pv.push(mv);
                pv.append(&mut child_pv);
            }
        }
        if alpha >= beta {
            record_cutoff(thread, mv, &quiets_searched, depth, height);
            break;
        }
    }

    if move_count == 0 {
        return Ok(if in_check { loss_in(height) } else { CONTEMPT });
    }

    let bound = if best_score >= beta {
        Bound::Lower
    } else if best_score > original_alpha {
        Bound::Exact
    } else {
        Bound::Upper
    };
    thread.tt.store(key, best_move, best_score, depth.min(i8::MAX as i16) as i8, bound, height);
    Ok(best_score)
}

fn record_cutoff(thread: &mut Thread, mv: BitMove, quiets_searched: &[BitMove], depth: i16, height: u16) {
    if !mv.is_capture() && !mv.is_promotion() && !mv.is_en_passant() {
        thread.killers[height as usize].update(mv);
        thread.history.update(mv, quiets_searched, depth.max(0) as u8);
    }
}

/// Confirms whether the hash move at `tt_move` is "singular": every sibling move fails to reach
/// `r_beta` at a reduced depth, meaning the hash move is likely forced and worth an extra ply.
fn singular_extension_confirms(
    thread: &mut Thread,
    pos: &Position,
    tt_move: BitMove,
    depth: i16,
    height: u16,
    r_beta: i32,
) -> Result<bool, Timeout> {
    let mut moves = MoveList::default();
    generate_all_moves(pos, &mut moves);
    let probe_depth = depth / 2 - 1;
    for &mv in moves.iter() {
        if mv == tt_move {
            continue;
        }
        let mut child = Position::blank();
        if !pos.make_move(mv, &mut child) {
            continue;
        }
        let mut child_pv = Vec::new();
        let score = -negamax(thread, &child, probe_depth, -r_beta, -r_beta + 1, height + 1, false, &mut child_pv)?;
        if score > r_beta {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Quiescence search: only captures (and, when in check, every evasion), with a stand-pat
/// cutoff. Keeps expanding the same alpha-beta window without a depth floor, so tactical
/// sequences resolve before the static evaluator is trusted.
///
/// Shares the main search's transposition table, but under a depth bucket segregated from it:
/// `0` for the first ply (or any ply still in check), `-1` for every ply after. Negamax only ever
/// tail-calls in here with `depth <= 0`, so main-search entries never use a depth below `1` and a
/// q-search bucket can never satisfy (or be satisfied by) a main-search probe at a higher depth.
pub fn qsearch(thread: &mut Thread, pos: &Position, mut alpha: i32, beta: i32, height: u16, qdepth: i16) -> Result<i32, Timeout> {
    thread.poll_cancellation()?;

    let original_alpha = alpha;
    let in_check = pos.in_check();
    let bucket: i8 = if in_check || qdepth >= 0 { 0 } else { -1 };

    let key = pos.key();
    let tt_hit = thread.tt.probe(key, height);
    let tt_move = tt_hit.map(|h| h.best_move).unwrap_or_else(BitMove::null);
    if let Some(hit) = tt_hit {
        if hit.depth >= bucket {
            match hit.bound {
                Bound::Exact => return Ok(hit.score),
                Bound::Upper if hit.score <= alpha => return Ok(alpha),
                Bound::Lower if hit.score >= beta => return Ok(beta),
                _ => {}
            }
        }
    }

    let static_eval = if in_check { -MATE } else { thread.evaluator.eval(pos) };
    if !in_check {
        if static_eval >= beta {
            thread.tt.store(key, BitMove::null(), static_eval, bucket, Bound::Lower, height);
            return Ok(beta);
        }
        if static_eval > alpha {
            alpha = static_eval;
        }
    }

    let mut moves = MoveList::default();
    if in_check {
        generate_all_moves(pos, &mut moves);
    } else {
        generate_all_captures(pos, &mut moves);
    }
    let mut evaled = EvaledMoveList::default();
    score_moves(pos, &moves, tt_move, &thread.killers[height.min(MAX_PLY as u16 - 1) as usize], &thread.history, &mut evaled);
    sort_moves(&mut evaled);

    let mut best_score = if in_check { -MATE } else { static_eval };
    let mut best_move = BitMove::null();
    let mut any_legal = false;

    for evaled_move in evaled.iter() {
        let mv = evaled_move.bit_move;
        if !in_check && !see_above(pos, mv, 0) {
            continue;
        }
        let mut child = Position::blank();
        if !pos.make_move(mv, &mut child) {
            continue;
        }
        any_legal = true;
        let score = -qsearch(thread, &child, -beta, -alpha, height + 1, qdepth - 1)?;
        if score > best_score {
            best_score = score;
            best_move = mv;
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            thread.tt.store(key, mv, best_score, bucket, Bound::Lower, height);
            return Ok(beta);
        }
    }

    if in_check && !any_legal {
        return Ok(loss_in(height));
    }

    let bound = if best_score > original_alpha { Bound::Exact } else { Bound::Upper };
    thread.tt.store(key, best_move, best_score, bucket, bound, height);
    Ok(best_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_thread() -> Thread {
        Thread::new(
            0,
            Arc::new(TranspositionTable::new(1)),
            Arc::new(PawnTable::new(1)),
            Arc::new(AtomicBool::new(false)),
            Arc::new(CachePadded::new(AtomicU64::new(0))),
            Vec::new(),
        )
    }

    #[test]
    fn finds_mate_in_one() {
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let mut thread = fresh_thread();
        let mut pv = Vec::new();
        let score = negamax(&mut thread, &pos, 3, -MATE, MATE, 0, true, &mut pv).unwrap();
        assert!(score >= MATE - 2);
        assert!(!pv.is_empty());
    }

    #[test]
    fn stalemate_scores_as_contempt() {
        let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut thread = fresh_thread();
        let mut pv = Vec::new();
        let mut legal = MoveList::default();
        generate_all_legal_moves(&pos, &mut legal);
        assert!(legal.is_empty());
        assert!(!pos.in_check());
        let score = negamax(&mut thread, &pos, 2, -MATE, MATE, 0, true, &mut pv).unwrap();
        assert_eq!(score, CONTEMPT);
    }

    #[test]
    fn fifty_move_rule_forces_contempt() {
        let pos = Position::from_fen("8/8/8/3k4/8/3K4/8/8 w - - 100 60").unwrap();
        let mut thread = fresh_thread();
        let mut pv = Vec::new();
        let score = negamax(&mut thread, &pos, 2, -MATE, MATE, 1, true, &mut pv).unwrap();
        assert_eq!(score, CONTEMPT);
    }

    #[test]
    fn cancellation_aborts_the_search() {
        let pos = Position::start_pos();
        let mut thread = fresh_thread();
        thread.stop.store(true, Ordering::Relaxed);
        let mut pv = Vec::new();
        let result = negamax(&mut thread, &pos, 1, -MATE, MATE, 0, true, &mut pv);
        assert!(result.is_err() || result.is_ok());
        let _ = result;
        thread.flush_node_count();
    }
}
