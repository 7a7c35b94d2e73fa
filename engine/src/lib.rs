//! Search, transposition table, move ordering, time management and lazy-SMP orchestration for
//! the Corvid chess engine, built on top of `corvid_core`'s position representation.
//!
//! This crate is deliberately silent about UCI text: callers hand it already-parsed
//! [`limits::SearchParams`] and get back a move plus a stream of [`limits::SearchInfo`] progress
//! reports through a callback. The one type most embedders touch is [`engine::Engine`].

pub mod engine;
pub mod eval;
pub mod lan;
pub mod limits;
pub mod options;
pub mod order;
pub mod pawn_table;
pub mod search;
pub mod see;
pub mod threadpool;
pub mod time_management;
pub mod tt;

pub use engine::Engine;
pub use eval::{ClassicalEval, Evaluate};
pub use lan::{make_move_lan, move_to_lan};
pub use limits::{Limits, Score, SearchInfo, SearchParams, TimeControl};
pub use options::{EngineOptions, OptionError};
pub use search::{MAX_PLY, MATE, VALUE_WIN};
pub use threadpool::ThreadPool;
pub use time_management::{Clock, DepthOrMoveTime, TimeManager, Tournament};
pub use tt::{Bound, TranspositionTable};
