//! Sliding-piece attacks via precomputed per-square, per-direction ray masks
//! and blocker resolution, rather than a magic-multiplication hash.
//!
//! For each of the 8 compass directions a `[u64; 64]` table holds the full
//! ray from a square to the board edge (exclusive of the origin square).
//! Given an occupancy bitboard, the attack set along one ray is the ray
//! itself with everything beyond the nearest blocker removed: for the four
//! directions whose square index increases (N, NE, E, NW) the nearest
//! blocker is the least-significant set bit on the ray; for the four whose
//! index decreases (S, SW, W, SE) it's the most-significant one.

use crate::utils::square_index;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
enum Dir {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

const DIRS: [Dir; 8] = [
    Dir::North,
    Dir::NorthEast,
    Dir::East,
    Dir::SouthEast,
    Dir::South,
    Dir::SouthWest,
    Dir::West,
    Dir::NorthWest,
];

/// Directions whose square index increases as the ray extends (LSB-nearest blocker resolution).
const fn is_positive(dir: Dir) -> bool {
    matches!(dir, Dir::North | Dir::NorthEast | Dir::East | Dir::NorthWest)
}

fn step(dir: Dir, rank: isize, file: isize) -> (isize, isize) {
    match dir {
        Dir::North => (rank + 1, file),
        Dir::South => (rank - 1, file),
        Dir::East => (rank, file + 1),
        Dir::West => (rank, file - 1),
        Dir::NorthEast => (rank + 1, file + 1),
        Dir::NorthWest => (rank + 1, file - 1),
        Dir::SouthEast => (rank - 1, file + 1),
        Dir::SouthWest => (rank - 1, file - 1),
    }
}

fn build_ray_table(dir: Dir) -> [u64; 64] {
    let mut table = [0u64; 64];
    for sq in 0..64usize {
        let mut rank = (sq / 8) as isize;
        let mut file = (sq % 8) as isize;
        let mut ray = 0u64;
        loop {
            let (nr, nf) = step(dir, rank, file);
            if !(0..=7).contains(&nr) || !(0..=7).contains(&nf) {
                break;
            }
            ray |= 1u64 << square_index(nr as usize, nf as usize);
            rank = nr;
            file = nf;
        }
        table[sq] = ray;
    }
    table
}

fn build_all_rays() -> [[u64; 64]; 8] {
    let mut tables = [[0u64; 64]; 8];
    for (i, &dir) in DIRS.iter().enumerate() {
        tables[i] = build_ray_table(dir);
    }
    tables
}

#[inline(always)]
fn ray_attacks(rays: &[u64; 64], dir: Dir, square: usize, blockers: u64) -> u64 {
    let ray = rays[square];
    let blocked = ray & blockers;
    if blocked == 0 {
        return ray;
    }
    let blocker_sq = if is_positive(dir) {
        blocked.trailing_zeros() as usize
    } else {
        63 - blocked.leading_zeros() as usize
    };
    ray ^ rays[blocker_sq]
}

/// Precomputed rays for one sliding-piece family (bishop-like or rook-like).
pub struct SlidingAttacks {
    rays: [[u64; 64]; 8],
    dirs: [Dir; 4],
}

impl SlidingAttacks {
    fn rook() -> Self {
        let all = build_all_rays();
        SlidingAttacks {
            rays: all,
            dirs: [Dir::North, Dir::South, Dir::East, Dir::West],
        }
    }

    fn bishop() -> Self {
        let all = build_all_rays();
        SlidingAttacks {
            rays: all,
            dirs: [Dir::NorthEast, Dir::NorthWest, Dir::SouthEast, Dir::SouthWest],
        }
    }

    #[inline]
    pub fn get_attacks(&self, square: usize, blockers: u64) -> u64 {
        let mut attacks = 0u64;
        for &dir in &self.dirs {
            attacks |= ray_attacks(&self.rays, dir, square, blockers);
        }
        attacks
    }
}

/// Bundles rook- and bishop-family ray attacks; queen attacks are their union.
pub struct AttackTables {
    pub rook: SlidingAttacks,
    pub bishop: SlidingAttacks,
}

impl AttackTables {
    #[inline]
    pub fn queen_attacks(&self, square: usize, blockers: u64) -> u64 {
        self.rook.get_attacks(square, blockers) | self.bishop.get_attacks(square, blockers)
    }
}

/// Builds the ray tables once; cheap enough (8 * 64 = 512 bitboards from a
/// closed-form scan) that there is no need to persist them to disk.
pub fn build_attack_tables() -> AttackTables {
    AttackTables {
        rook: SlidingAttacks::rook(),
        bishop: SlidingAttacks::bishop(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bit(sq: usize) -> u64 {
        1u64 << sq
    }

    #[test]
    fn rook_attacks_from_d4_no_blockers() {
        let tables = build_attack_tables();
        let d4 = 27;
        let result = tables.rook.get_attacks(d4, 0);
        let expected = bit(3) | bit(11) | bit(19) | bit(35) | bit(43) | bit(51) | bit(59)
            | bit(24) | bit(25) | bit(26) | bit(28) | bit(29) | bit(30) | bit(31);
        assert_eq!(result, expected);
    }

    #[test]
    fn bishop_attacks_from_d4_no_blockers() {
        let tables = build_attack_tables();
        let d4 = 27;
        let result = tables.bishop.get_attacks(d4, 0);
        let expected = bit(36) | bit(45) | bit(54) | bit(63)
            | bit(34) | bit(41) | bit(48)
            | bit(20) | bit(13) | bit(6)
            | bit(18) | bit(9) | bit(0);
        assert_eq!(result, expected);
    }

    #[test]
    fn rook_attacks_blocked_east_stops_at_blocker() {
        let tables = build_attack_tables();
        let d4 = 27;
        let blockers = bit(28); // e4
        let result = tables.rook.get_attacks(d4, blockers);
        let expected = bit(3) | bit(11) | bit(19) | bit(35) | bit(43) | bit(51) | bit(59)
            | bit(24) | bit(25) | bit(26) | bit(28);
        assert_eq!(result, expected);
    }

    #[test]
    fn bishop_attacks_blocked_ne_stops_at_blocker() {
        let tables = build_attack_tables();
        let d4 = 27;
        let blockers = bit(36); // e5
        let result = tables.bishop.get_attacks(d4, blockers);
        let expected = bit(36) | bit(20) | bit(13) | bit(6) | bit(18) | bit(9) | bit(0)
            | bit(34) | bit(41) | bit(48);
        assert_eq!(result, expected);
    }

    #[test]
    fn queen_attacks_is_union_of_rook_and_bishop() {
        let tables = build_attack_tables();
        let e4 = 28;
        let blockers = bit(36) | bit(21);
        let expected = tables.rook.get_attacks(e4, blockers) | tables.bishop.get_attacks(e4, blockers);
        assert_eq!(tables.queen_attacks(e4, blockers), expected);
    }

    #[test]
    fn rook_attacks_from_corner_cover_full_rank_and_file() {
        let tables = build_attack_tables();
        let a1 = 0;
        let result = tables.rook.get_attacks(a1, 0);
        assert_eq!(result.count_ones(), 14);
    }
}
