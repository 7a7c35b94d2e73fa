//! Inputs and progress reports exchanged between the engine facade and its caller.
//!
//! `Limits` and `SearchParams` describe what a UCI collaborator asks for; this crate never
//! parses UCI text itself, it just accepts these already-structured values.

use corvid_core::{BitMove, Position};

/// Per-side time-control state, in UCI units (milliseconds).
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeControl {
    pub white_time: u32,
    pub black_time: u32,
    pub white_increment: u32,
    pub black_increment: u32,
    pub moves_to_go: u32,
}

/// Everything the caller can constrain a search by. Fields are independent knobs; the time
/// manager (`crate::time_management`) decides which ones are in play for a given `go`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Limits {
    pub ponder: bool,
    pub infinite: bool,
    pub time: TimeControl,
    /// Exact search time in milliseconds (`go movetime`). Zero means unset.
    pub move_time: u32,
    /// Hard depth cap in plies. Zero means unset.
    pub depth: u16,
    /// Node budget. Zero means unset.
    pub nodes: u64,
    /// Report a forced mate in at most this many moves, then stop. Zero means unset.
    pub mate: u16,
}

impl Limits {
    /// Whether any field requests a bounded search; an all-default `Limits` is the `infinite`
    /// case (search until told to stop).
    pub fn is_bounded(&self) -> bool {
        self.move_time != 0 || self.depth != 0 || self.nodes != 0 || self.mate != 0 || !self.infinite
    }

    pub fn use_time_management(&self) -> bool {
        !self.infinite
            && self.move_time == 0
            && self.depth == 0
            && self.nodes == 0
            && (self.time.white_time != 0 || self.time.black_time != 0)
    }
}

/// The game history culminating at the position to search, plus the constraints on the search.
/// `positions` is needed (not just the final position) so the search can detect repetitions that
/// span the actual game, not just the search tree.
#[derive(Clone)]
pub struct SearchParams {
    pub positions: Vec<Position>,
    pub limits: Limits,
}

impl SearchParams {
    pub fn root(&self) -> &Position {
        self.positions.last().expect("SearchParams always carries at least the position to search")
    }
}

/// A reported or final score: either a plain centipawn evaluation or a mate distance in moves
/// (not plies) as UCI expects. Positive mate values mean the side to move delivers mate;
/// negative values mean it is mated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Score {
    Centipawn(i32),
    Mate(i32),
}

/// An iterative-deepening progress report, delivered to the caller's callback after each
/// completed depth (or aspiration-window failure worth reporting).
#[derive(Clone, Debug)]
pub struct SearchInfo {
    pub score: Score,
    pub depth: u16,
    pub sel_depth: u16,
    pub nodes: u64,
    pub time_ms: u64,
    /// Principal variation, root move first.
    pub moves: Vec<BitMove>,
}

impl SearchInfo {
    pub fn nps(&self) -> u64 {
        if self.time_ms == 0 {
            0
        } else {
            self.nodes * 1000 / self.time_ms
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_with_only_infinite_set_is_not_time_managed() {
        let limits = Limits {
            infinite: true,
            ..Default::default()
        };
        assert!(!limits.use_time_management());
    }

    #[test]
    fn limits_with_clock_time_uses_time_management() {
        let limits = Limits {
            time: TimeControl {
                white_time: 60_000,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(limits.use_time_management());
    }

    #[test]
    fn depth_limit_disables_time_management() {
        let limits = Limits {
            depth: 10,
            time: TimeControl {
                white_time: 60_000,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!limits.use_time_management());
    }
}
