//! End-to-end search scenarios from spec.md §8: each exercises the full facade (`Engine::go`)
//! against a position whose best move or score is known, the way `pleco_engine`'s own
//! `tests/test_get_move.rs` drives `Searcher::best_move` rather than unit-testing `negamax` in
//! isolation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use corvid_core::{generate_all_legal_moves, generate_all_moves, MoveList, Position};
use corvid_engine::{Engine, Limits, Score, SearchParams, ThreadPool};

fn search_to_depth(fen: &str, depth: u16) -> (corvid_core::BitMove, Score) {
    let pos = Position::from_fen(fen).unwrap();
    let mut engine = Engine::new();
    let params = SearchParams {
        positions: vec![pos],
        limits: Limits { depth, ..Default::default() },
    };
    let mut last_score = Score::Centipawn(0);
    let mv = engine.go(params, |info| last_score = info.score);
    (mv, last_score)
}

#[test]
fn castling_is_available_and_never_generated_through_attacked_squares() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    let mut moves = MoveList::default();
    generate_all_moves(&pos, &mut moves);
    assert!(moves.iter().any(|m| m.is_castle()));

    let (mv, _) = search_to_depth("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1", 6);
    assert!(mv.is_castle(), "expected a castle at depth 6, got {}", mv);
}

#[test]
fn no_generated_castle_passes_through_an_attacked_square() {
    // Black's rook on e-file covers e1; White still "has" king-side rights on paper (flags only
    // track whether they've been *lost*) but castling through check must never be generated.
    let pos = Position::from_fen("4r3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    let mut moves = MoveList::default();
    generate_all_moves(&pos, &mut moves);
    assert!(!moves.iter().any(|m| m.is_castle()));
}

#[test]
fn finds_mate_in_two_with_the_queen() {
    let (mv, score) = search_to_depth("8/8/8/8/8/5K2/6Q1/7k w - - 0 1", 3);
    assert_eq!(score, Score::Mate(2));
    assert_eq!(mv.to_string(), "g2g7");
}

#[test]
fn kpk_endgame_is_winning_and_makes_progress() {
    let (mv, score) = search_to_depth("4k3/8/4K3/4P3/8/8/8/8 w - - 0 1", 20);
    match score {
        Score::Centipawn(cp) => assert!(cp > 500, "expected a decisive advantage, got {cp}"),
        Score::Mate(n) => assert!(n > 0, "expected White to be winning, got mate({n})"),
    }
    // The pawn or the king should be the piece making progress; the only other piece that
    // could move without losing the pawn is the king escorting it forward.
    assert!(mv.moved_piece() == corvid_core::PieceType::P || mv.moved_piece() == corvid_core::PieceType::K);
}

#[test]
fn fifty_move_rule_returns_contempt_without_exploring_further() {
    let (_, score) = search_to_depth("8/8/8/3k4/8/3K4/8/8 w - - 100 60", 4);
    assert_eq!(score, Score::Centipawn(0));
}

#[test]
fn stalemate_position_reports_contempt_not_a_mate_score() {
    let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    let mut legal = MoveList::default();
    generate_all_legal_moves(&pos, &mut legal);
    assert!(legal.is_empty());
    assert!(!pos.in_check());

    let (_, score) = search_to_depth("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 2);
    assert_eq!(score, Score::Centipawn(0));
}

#[test]
fn four_threads_agree_with_single_thread_within_one_centipawn() {
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    let pos = Position::from_fen(fen).unwrap();
    let depth = 5;

    let solo = ThreadPool::new(4, 1);
    let mut solo_score = Score::Centipawn(0);
    let stop = Arc::new(AtomicBool::new(false));
    solo.search(
        SearchParams { positions: vec![pos.clone()], limits: Limits { depth, ..Default::default() } },
        1,
        0,
        stop,
        |info| solo_score = info.score,
    );

    let parallel = ThreadPool::new(4, 1);
    let mut parallel_score = Score::Centipawn(0);
    let stop = Arc::new(AtomicBool::new(false));
    parallel.search(
        SearchParams { positions: vec![pos], limits: Limits { depth, ..Default::default() } },
        4,
        0,
        stop,
        |info| parallel_score = info.score,
    );

    let cp = |s: Score| match s {
        Score::Centipawn(v) => v,
        Score::Mate(n) => if n > 0 { 32_000 - n } else { -32_000 - n },
    };
    assert!((cp(solo_score) - cp(parallel_score)).abs() <= 1);
}

#[test]
fn cancelling_an_infinite_search_still_yields_a_legal_move() {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    let pos = Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3").unwrap();
    let mut legal = MoveList::default();
    generate_all_legal_moves(&pos, &mut legal);

    let (done_tx, done_rx) = mpsc::channel();
    let mut engine = Engine::new();
    let cancel = engine.cancel_handle();
    let params = SearchParams {
        positions: vec![pos.clone()],
        limits: Limits { infinite: true, ..Default::default() },
    };
    let handle = thread::spawn(move || {
        let mv = engine.go(params, |_| {});
        let _ = done_tx.send(mv);
    });

    // Give the pool a moment to actually start searching, then cancel it the way a UCI reader
    // thread would on receiving `stop`.
    thread::sleep(Duration::from_millis(20));
    cancel.store(true, Ordering::Relaxed);

    let mv = done_rx
        .recv_timeout(Duration::from_secs(5))
        .unwrap_or_else(|_| panic!("search did not honor cancellation within 5s"));
    handle.join().unwrap();

    assert!(legal.iter().any(|&m| m == mv));
}
