//! Lazy-SMP orchestration: every worker searches the same root position to the same target
//! depths, diverging only through per-thread root-move shuffling, a deterministic depth-skip
//! cycle, and whatever the shared transposition table happens to contain when each thread reads
//! it. No work is explicitly divided; parallelism comes from threads racing each other with
//! slightly different search orders and reusing each other's TT entries.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use corvid_core::{generate_all_legal_moves, BitMove, MoveList, Position};
use crossbeam_utils::CachePadded;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::limits::{Score, SearchInfo, SearchParams};
use crate::pawn_table::PawnTable;
use crate::search::{negamax, Thread, MATE};
use crate::time_management::Clock;
use crate::tt::TranspositionTable;

/// Per-thread cycle (length 16) of extra depths to skip and how many consecutive depths to skip
/// by, so helper threads don't all plod through the same shallow iterations in lockstep.
const SKIP_DEPTHS: [i16; 16] = [1, 2, 2, 4, 4, 3, 2, 5, 4, 3, 2, 6, 5, 4, 3, 2];
const SKIP_SIZE: [i16; 16] = [1, 1, 1, 2, 2, 2, 1, 3, 2, 2, 1, 3, 3, 2, 2, 1];

fn thread_skips_depth(thread_id: usize, depth: i16) -> bool {
    if thread_id == 0 {
        return false;
    }
    let idx = thread_id % SKIP_DEPTHS.len();
    let skip_depth = SKIP_DEPTHS[idx];
    let skip_size = SKIP_SIZE[idx];
    skip_size > 0 && ((depth - skip_depth) % skip_size == 0) && depth > skip_depth
}

/// A lazy-SMP pool: one `Thread` per configured worker, all sharing the transposition table and
/// pawn-king cache, reporting their deepest completed iteration back through a channel.
pub struct ThreadPool {
    tt: Arc<TranspositionTable>,
    pawn_table: Arc<PawnTable>,
}

impl ThreadPool {
    pub fn new(hash_mb: u32, pawn_hash_mb: u32) -> Self {
        ThreadPool {
            tt: Arc::new(TranspositionTable::new(hash_mb)),
            pawn_table: Arc::new(PawnTable::new(pawn_hash_mb)),
        }
    }

    pub fn resize_hash(&mut self, hash_mb: u32) {
        match Arc::get_mut(&mut self.tt) {
            Some(tt) => tt.resize(hash_mb),
            None => self.tt = Arc::new(TranspositionTable::new(hash_mb)),
        }
    }

    pub fn clear(&self) {
        self.tt.clear();
    }

    /// Runs `threads` workers against `params` until `stop` is set or a hard time limit fires,
    /// invoking `on_info` after every iteration any thread completes that is strictly deeper than
    /// the best depth reported so far. Returns the final best move.
    pub fn search(
        &self,
        params: SearchParams,
        threads: usize,
        move_overhead_ms: u32,
        stop: Arc<AtomicBool>,
        mut on_info: impl FnMut(&SearchInfo),
    ) -> BitMove {
        let root = params.root().clone();
        let stm_is_white = root.turn() == corvid_core::Player::White;
        let mut clock = Clock::start(&params.limits, stm_is_white, move_overhead_ms);
        let max_depth: i16 = if params.limits.depth != 0 { params.limits.depth as i16 } else { 128 };
        let nodes = Arc::new(CachePadded::new(AtomicU64::new(0)));

        let game_history_keys: Vec<u64> = params.positions.iter().map(|p| p.key()).collect();
        let (tx, rx) = mpsc::channel::<(usize, i16, i32, Vec<BitMove>)>();

        let mut handles: Vec<JoinHandle<()>> = Vec::new();
        for id in 0..threads.max(1) {
            let tt = Arc::clone(&self.tt);
            let pawn_table = Arc::clone(&self.pawn_table);
            let stop = Arc::clone(&stop);
            let nodes = Arc::clone(&nodes);
            let tx = tx.clone();
            let root = root.clone();
            let game_history_keys = game_history_keys.clone();
            let soft_deadline_node_budget = params.limits.nodes;

            handles.push(std::thread::spawn(move || {
                let mut thread = Thread::new(id, tt, pawn_table, Arc::clone(&stop), Arc::clone(&nodes), game_history_keys);
                let mut root_moves = MoveList::default();
                generate_all_legal_moves(&root, &mut root_moves);
                if root_moves.is_empty() {
                    return;
                }
                let mut shuffled: Vec<BitMove> = root_moves.iter().copied().collect();
                if id > 0 {
                    let mut rng = StdRng::seed_from_u64(0x9E37_79B9_u64.wrapping_add(id as u64));
                    shuffled.shuffle(&mut rng);
                }

                let mut last_score = 0;
                let mut depth: i16 = 1;
                while depth <= max_depth {
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    if thread_skips_depth(id, depth) {
                        depth += 1;
                        continue;
                    }
                    if soft_deadline_node_budget != 0 && nodes.load(Ordering::Relaxed) >= soft_deadline_node_budget {
                        break;
                    }

                    let (score, pv) = match aspiration_window(&mut thread, &root, &shuffled, depth, last_score) {
                        Ok(result) => result,
                        Err(_) => break,
                    };
                    last_score = score;
                    if tx.send((id, depth, score, pv)).is_err() {
                        break;
                    }
                    depth += 1;
                }
            }));
        }
        drop(tx);

        let mut best_depth = -1i16;
        let mut best_move = root_first_legal_move(&root);
        let mut best_score = Score::Centipawn(0);
        let mut best_pv = Vec::new();

        loop {
            if stop.load(Ordering::Relaxed) && best_depth >= 0 {
                break;
            }
            match rx.recv_timeout(std::time::Duration::from_millis(5)) {
                Ok((id, depth, score, pv)) => {
                    if depth > best_depth && !pv.is_empty() {
                        best_depth = depth;
                        best_move = pv[0];
                        best_pv = pv;
                        best_score = score_to_report(score, best_depth);
                        if id == 0 {
                            clock.note_iteration_score(score);
                        }
                        on_info(&SearchInfo {
                            score: best_score,
                            depth: best_depth as u16,
                            sel_depth: best_depth as u16,
                            nodes: nodes.load(Ordering::Relaxed),
                            time_ms: clock.elapsed_ms(),
                            moves: best_pv.clone(),
                        });
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if clock.must_stop() || !clock.should_start_new_depth() {
                        stop.store(true, Ordering::Relaxed);
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        stop.store(true, Ordering::Relaxed);
        for handle in handles {
            let _ = handle.join();
        }
        best_move
    }
}

fn root_first_legal_move(pos: &Position) -> BitMove {
    let mut legal = MoveList::default();
    generate_all_legal_moves(pos, &mut legal);
    legal.iter().copied().next().unwrap_or_else(BitMove::null)
}

fn score_to_report(score: i32, depth_reached: i16) -> Score {
    if score >= MATE - 1000 {
        Score::Mate(((MATE - score + 1) / 2).max(1))
    } else if score <= -(MATE - 1000) {
        Score::Mate(-((MATE + score + 1) / 2).max(1))
    } else {
        let _ = depth_reached;
        Score::Centipawn(score)
    }
}

/// Drives one iterative-deepening iteration at `depth` using a narrowing-then-widening
/// aspiration window seeded from the previous iteration's score, per the re-search scheme: a
/// failed bound grows geometrically (`delta += delta/2 + 5`) until the true score is bracketed.
fn aspiration_window(
    thread: &mut Thread,
    root: &Position,
    root_moves: &[BitMove],
    depth: i16,
    last_score: i32,
) -> Result<(i32, Vec<BitMove>), crate::search::Timeout> {
    let (mut alpha, mut beta) = if depth >= 6 {
        (last_score - 50, last_score + 50)
    } else {
        (-MATE, MATE)
    };
    let mut delta = 50;

    loop {
        let (score, pv) = search_root_once(thread, root, root_moves, depth, alpha, beta)?;
        if score > alpha && score < beta {
            return Ok((score, pv));
        }
        if score <= alpha {
            beta = (alpha + beta) / 2;
            alpha -= delta;
        } else {
            beta += delta;
        }
        alpha = alpha.max(-MATE);
        beta = beta.min(MATE);
        delta += delta / 2 + 5;
    }
}

fn search_root_once(
    thread: &mut Thread,
    root: &Position,
    root_moves: &[BitMove],
    depth: i16,
    alpha: i32,
    beta: i32,
) -> Result<(i32, Vec<BitMove>), crate::search::Timeout> {
    let mut local_alpha = alpha;
    let mut best_score = -MATE;
    let mut best_pv = Vec::new();

    for (move_count, &mv) in root_moves.iter().enumerate() {
        let mut child = Position::blank();
        root.make_legal_move(mv, &mut child);
        let mut child_pv = Vec::new();
        let is_first = move_count == 0;
        let score = if is_first {
            -negamax(thread, &child, depth - 1, -beta, -local_alpha, 1, true, &mut child_pv)?
        } else {
            let null_window = -negamax(thread, &child, depth - 1, -local_alpha - 1, -local_alpha, 1, false, &mut child_pv)?;
            if null_window > local_alpha && null_window < beta {
                -negamax(thread, &child, depth - 1, -beta, -local_alpha, 1, true, &mut child_pv)?
            } else {
                null_window
            }
        };
        if score > best_score {
            best_score = score;
            best_pv = std::iter::once(mv).chain(child_pv).collect();
        }
        if score > local_alpha {
            local_alpha = score;
        }
        if local_alpha >= beta {
            break;
        }
    }
    Ok((best_score, best_pv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Limits;

    #[test]
    fn single_thread_finds_mate_in_one() {
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let pool = ThreadPool::new(1, 1);
        let params = SearchParams {
            positions: vec![pos],
            limits: Limits { depth: 3, ..Default::default() },
        };
        let stop = Arc::new(AtomicBool::new(false));
        let mv = pool.search(params, 1, 0, stop, |_info| {});
        assert_eq!(mv.src(), corvid_core::SQ::A1);
        assert_eq!(mv.dst(), corvid_core::SQ::A8);
    }

    #[test]
    fn thread_skip_cycle_never_skips_the_main_thread() {
        for depth in 0..40 {
            assert!(!thread_skips_depth(0, depth));
        }
    }
}
