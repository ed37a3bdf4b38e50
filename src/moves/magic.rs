//! Sliding-piece attack lookup used by search, ordering, evaluation and
//! perft — the "magic" name and `loader::load_magic_tables` entry point
//! are kept for compatibility with every call site that already speaks of
//! a `MagicTables` handle, but the tables underneath are the same rotated
//! ray attack sets built in [`crate::moves::rays`] (spec-prescribed
//! blocker resolution, not a magic-multiplication perfect hash).
//!
//! Swapping this module's body for a real magic-bitboard implementation
//! later is a pure performance change: every caller only ever touches
//! `tables.bishop`, `tables.rook` and `tables.queen_attacks`.

use crate::moves::knight::KNIGHT_ATTACKS;
use crate::moves::rays::{self, AttackTables};

/// Handle to the shared sliding-piece attack tables.
pub type MagicTables = AttackTables;

/// Precomputed knight attacks, re-exported here so evaluation code that
/// already reaches through `crate::moves::magic` for attack data doesn't
/// also need to know about the `knight` module.
#[inline(always)]
pub fn get_knight_attacks(square: usize) -> u64 {
    KNIGHT_ATTACKS[square]
}

pub mod loader {
    use super::MagicTables;

    /// Builds the attack tables once at startup. Cheap: a closed-form scan
    /// over 64 squares in each of 8 directions, no precomputed blob to read.
    pub fn load_magic_tables() -> MagicTables {
        super::rays::build_attack_tables()
    }
}
