//! Process-wide, read-only lookup tables.
//!
//! Attack tables and Zobrist atoms are expensive to build (the former runs a magic-multiplier
//! search) but never change once built, so each is computed exactly once behind `lazy_static`
//! and shared by every thread without synchronization.

use crate::magic::AttackTables;
use crate::zobrist::Zobrist;

lazy_static::lazy_static! {
    pub static ref ATTACK_TABLES: AttackTables = AttackTables::new();
    pub static ref ZOBRIST: Zobrist = Zobrist::new();
}
