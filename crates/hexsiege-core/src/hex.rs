//! Hex coordinate system for the board.
//!
//! Uses axial coordinates `(q, r)` with the implicit third cube axis
//! `s = -q - r`. Boards are hexagon shaped, so axial coordinates keep the
//! neighbour and distance math free of odd/even column special cases.

use serde::{Deserialize, Serialize};

/// Axial coordinates of a hex tile.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct HexCoord {
    /// Column axis
    pub q: i32,
    /// Row axis
    pub r: i32,
}

impl PartialOrd for HexCoord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HexCoord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major ordering for deterministic iteration
        (self.r, self.q).cmp(&(other.r, other.q))
    }
}

/// Axial direction offsets, clockwise starting from east.
const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

impl HexCoord {
    /// Create a new hex coordinate.
    #[inline]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third cube coordinate.
    #[inline]
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Get all 6 neighbouring hexes, clockwise starting from east.
    ///
    /// Returns neighbours in order: E, NE, NW, W, SW, SE
    pub fn neighbors(&self) -> [HexCoord; 6] {
        DIRECTIONS.map(|(dq, dr)| HexCoord::new(self.q + dq, self.r + dr))
    }

    /// Calculate the distance to another hex (in hex steps).
    pub fn distance(&self, other: &HexCoord) -> u32 {
        let (x1, y1, z1) = self.to_cube();
        let (x2, y2, z2) = other.to_cube();

        let dx = (x1 - x2).unsigned_abs();
        let dy = (y1 - y2).unsigned_abs();
        let dz = (z1 - z2).unsigned_abs();

        dx.max(dy).max(dz)
    }

    /// Convert to cube coordinates `(x, y, z)` with `x + y + z = 0`.
    pub fn to_cube(&self) -> (i32, i32, i32) {
        (self.q, self.s(), self.r)
    }

    /// Get all hexes within a given radius (inclusive), in row-major order.
    pub fn hexes_in_radius(&self, radius: u32) -> Vec<HexCoord> {
        let r = radius as i32;
        let mut result = Vec::new();

        for dr in -r..=r {
            let q_min = (-r).max(-dr - r);
            let q_max = r.min(-dr + r);
            for dq in q_min..=q_max {
                result.push(HexCoord::new(self.q + dq, self.r + dr));
            }
        }

        result
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}
