//! Board structure with tiles and spatial queries.
//!
//! The [`Board`] is the only owner of tile state. Tiles expose read-only
//! getters; every mutation goes through the board's setters so that the
//! cached owner statistics are invalidated and the tile is queued for a
//! visual refresh.

use crate::hex::HexCoord;
use crate::types::Owner;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::{BTreeSet, HashMap};

/// A single hex cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    coord: HexCoord,
    index: usize,
    owner: Owner,
    power: i32,
    shielded: bool,
    permanent_shield: bool,
    landmark: Option<String>,
}

impl Tile {
    fn new(coord: HexCoord, index: usize) -> Self {
        Self {
            coord,
            index,
            owner: Owner::Neutral,
            power: 0,
            shielded: false,
            permanent_shield: false,
            landmark: None,
        }
    }

    /// Position on the board.
    pub fn coord(&self) -> HexCoord {
        self.coord
    }

    /// Stable ordering index, assigned once when the board is built.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Stored power. Not clamped; display layers clamp to 1-5.
    pub fn power(&self) -> i32 {
        self.power
    }

    pub fn is_shielded(&self) -> bool {
        self.shielded
    }

    /// HQ shield that never expires through normal play.
    pub fn is_permanent_shield(&self) -> bool {
        self.permanent_shield
    }

    /// Is this tile a landmark?
    pub fn is_special(&self) -> bool {
        self.landmark.is_some()
    }

    /// Landmark name, if any.
    pub fn special_name(&self) -> Option<&str> {
        self.landmark.as_deref()
    }

    /// Capture the mutable fields of this tile.
    pub fn image(&self) -> TileImage {
        TileImage {
            coord: self.coord,
            owner: self.owner,
            power: self.power,
            shielded: self.shielded,
            permanent_shield: self.permanent_shield,
        }
    }
}

/// Pre-image of every field a game action can change on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileImage {
    pub coord: HexCoord,
    pub owner: Owner,
    pub power: i32,
    pub shielded: bool,
    pub permanent_shield: bool,
}

/// Aggregate per-owner counts, rebuilt lazily after any ownership change.
#[derive(Clone, Debug, Default)]
pub struct OwnerStats {
    tiles: HashMap<Owner, usize>,
    landmarks: HashMap<Owner, usize>,
}

impl OwnerStats {
    fn collect<'a>(tiles: impl Iterator<Item = &'a Tile>) -> Self {
        let mut stats = Self::default();
        for tile in tiles {
            *stats.tiles.entry(tile.owner).or_insert(0) += 1;
            if tile.is_special() {
                *stats.landmarks.entry(tile.owner).or_insert(0) += 1;
            }
        }
        stats
    }

    /// Number of tiles held by `owner`.
    pub fn tiles(&self, owner: Owner) -> usize {
        self.tiles.get(&owner).copied().unwrap_or(0)
    }

    /// Number of landmarks held by `owner`.
    pub fn landmarks(&self, owner: Owner) -> usize {
        self.landmarks.get(&owner).copied().unwrap_or(0)
    }
}

/// The game board containing all tiles.
#[derive(Clone, Debug, Default)]
pub struct Board {
    /// Tiles ordered by their stable index.
    tiles: Vec<Tile>,
    lookup: HashMap<HexCoord, usize>,
    stats: OnceCell<OwnerStats>,
    dirty: BTreeSet<HexCoord>,
}

impl Board {
    /// Build a board from coordinates. Indices follow iteration order;
    /// duplicate coordinates are ignored.
    pub fn from_coords(coords: impl IntoIterator<Item = HexCoord>) -> Self {
        let mut board = Self::default();
        for coord in coords {
            if board.lookup.contains_key(&coord) {
                continue;
            }
            let index = board.tiles.len();
            board.lookup.insert(coord, index);
            board.tiles.push(Tile::new(coord, index));
        }
        board
    }

    /// Every tile in ascending index order.
    pub fn all_tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Get the tile at the given coordinate.
    pub fn tile_at(&self, coord: &HexCoord) -> Option<&Tile> {
        self.lookup.get(coord).map(|&i| &self.tiles[i])
    }

    /// Does a tile exist at the coordinate?
    pub fn contains(&self, coord: &HexCoord) -> bool {
        self.lookup.contains_key(coord)
    }

    /// Existing neighbours of a coordinate, in direction order.
    pub fn neighbors(&self, coord: &HexCoord) -> Vec<&Tile> {
        coord
            .neighbors()
            .iter()
            .filter_map(|c| self.tile_at(c))
            .collect()
    }

    /// Hex distance between two coordinates.
    pub fn distance(&self, a: &HexCoord, b: &HexCoord) -> u32 {
        a.distance(b)
    }

    /// Count total tiles on the board.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Cached per-owner statistics.
    pub fn stats(&self) -> &OwnerStats {
        self.stats
            .get_or_init(|| OwnerStats::collect(self.tiles.iter()))
    }

    /// Does `owner` hold a tile adjacent to `coord`?
    pub fn has_adjacent(&self, coord: &HexCoord, owner: Owner) -> bool {
        self.neighbors(coord).iter().any(|n| n.owner == owner)
    }

    /// Coordinates of tiles held by `owner`, in index order.
    pub fn owned_by(&self, owner: Owner) -> Vec<HexCoord> {
        self.tiles
            .iter()
            .filter(|t| t.owner == owner)
            .map(|t| t.coord)
            .collect()
    }

    /// Coordinates changed since the last call, for view refreshes.
    pub fn take_dirty(&mut self) -> Vec<HexCoord> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    fn tile_mut(&mut self, coord: &HexCoord) -> Option<&mut Tile> {
        let index = *self.lookup.get(coord)?;
        self.tiles.get_mut(index)
    }

    fn touch(&mut self, coord: HexCoord, invalidates_stats: bool) {
        self.dirty.insert(coord);
        if invalidates_stats {
            self.stats = OnceCell::new();
        }
    }

    /// Change a tile's owner. Returns false if the tile does not exist.
    pub fn set_owner(&mut self, coord: &HexCoord, owner: Owner) -> bool {
        let Some(tile) = self.tile_mut(coord) else {
            return false;
        };
        if tile.owner != owner {
            tile.owner = owner;
            self.touch(*coord, true);
        }
        true
    }

    /// Change a tile's power. Returns false if the tile does not exist.
    pub fn set_power(&mut self, coord: &HexCoord, power: i32) -> bool {
        let Some(tile) = self.tile_mut(coord) else {
            return false;
        };
        if tile.power != power {
            tile.power = power;
            self.touch(*coord, false);
        }
        true
    }

    /// Set or clear a tile's shield. A permanent shield cannot be cleared
    /// here; use [`Board::set_permanent_shield`] first.
    pub fn set_shielded(&mut self, coord: &HexCoord, shielded: bool) -> bool {
        let Some(tile) = self.tile_mut(coord) else {
            return false;
        };
        let shielded = shielded || tile.permanent_shield;
        if tile.shielded != shielded {
            tile.shielded = shielded;
            self.touch(*coord, false);
        }
        true
    }

    /// Set or clear the permanent (HQ) shield. Setting it also raises the
    /// regular shield; clearing it leaves the regular shield as is.
    pub fn set_permanent_shield(&mut self, coord: &HexCoord, permanent: bool) -> bool {
        let Some(tile) = self.tile_mut(coord) else {
            return false;
        };
        let mut changed = tile.permanent_shield != permanent;
        tile.permanent_shield = permanent;
        if permanent && !tile.shielded {
            tile.shielded = true;
            changed = true;
        }
        if changed {
            self.touch(*coord, false);
        }
        true
    }

    /// Mark or unmark a tile as a landmark.
    pub fn set_special(&mut self, coord: &HexCoord, name: Option<String>) -> bool {
        let Some(tile) = self.tile_mut(coord) else {
            return false;
        };
        if tile.landmark != name {
            tile.landmark = name;
            self.touch(*coord, true);
        }
        true
    }

    /// Write a captured pre-image back through the setters.
    pub fn restore(&mut self, image: &TileImage) -> bool {
        let coord = image.coord;
        if !self.contains(&coord) {
            return false;
        }
        self.set_owner(&coord, image.owner);
        self.set_power(&coord, image.power);
        // Permanent flag first so the shield setter sees the restored value.
        self.set_permanent_shield(&coord, image.permanent_shield);
        self.set_shielded(&coord, image.shielded);
        true
    }
}
