//! Board construction from map presets.
//!
//! A preset fixes the tile set, the HQ position of every team slot and the
//! landmarks. Tile indices are assigned here, once, in row-major order, and
//! are never regenerated afterwards (loading a save reuses them).

use crate::hex::HexCoord;
use crate::map::Board;
use crate::settings::SettingsError;
use crate::types::{Owner, TeamId};
use serde::{Deserialize, Serialize};

/// Landmark names used by the hexagon preset, centre first.
const LANDMARK_NAMES: [&str; 7] = [
    "Citadel",
    "Observatory",
    "Granary",
    "Forge",
    "Library",
    "Harbor",
    "Shrine",
];

/// A named landmark position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmark {
    pub coord: HexCoord,
    pub name: String,
}

/// A hand-authored board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomLayout {
    /// Identifier written into snapshots.
    pub id: u32,
    pub tiles: Vec<HexCoord>,
    /// HQ position of team `i + 1`.
    pub hqs: Vec<HexCoord>,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

/// Board layout selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapPreset {
    /// Regular hexagon around the origin. HQs sit on the six corners,
    /// landmarks at the centre and half-way towards each corner.
    Hexagon { radius: u32 },
    Custom(CustomLayout),
}

impl Default for MapPreset {
    fn default() -> Self {
        MapPreset::Hexagon { radius: 6 }
    }
}

impl MapPreset {
    /// Identifier of the layout, stored in snapshots. The kind prefix keeps
    /// custom ids apart from hexagon radii.
    pub fn map_id(&self) -> String {
        match self {
            MapPreset::Hexagon { radius } => format!("hexagon:{}", radius),
            MapPreset::Custom(layout) => format!("custom:{}", layout.id),
        }
    }

    /// Every tile coordinate, in index order.
    pub fn coords(&self) -> Vec<HexCoord> {
        match self {
            MapPreset::Hexagon { radius } => HexCoord::new(0, 0).hexes_in_radius(*radius),
            MapPreset::Custom(layout) => {
                let mut tiles = layout.tiles.clone();
                tiles.sort();
                tiles.dedup();
                tiles
            }
        }
    }

    /// HQ positions, one per team slot in id order.
    pub fn hq_positions(&self) -> Vec<HexCoord> {
        match self {
            MapPreset::Hexagon { radius } => {
                let r = *radius as i32;
                vec![
                    HexCoord::new(0, -r),
                    HexCoord::new(r, -r),
                    HexCoord::new(r, 0),
                    HexCoord::new(0, r),
                    HexCoord::new(-r, r),
                    HexCoord::new(-r, 0),
                ]
            }
            MapPreset::Custom(layout) => layout.hqs.clone(),
        }
    }

    /// Landmark positions and names.
    pub fn landmarks(&self) -> Vec<Landmark> {
        match self {
            MapPreset::Hexagon { radius } => {
                let half = (*radius / 2) as i32;
                let points = [
                    (0, 0),
                    (0, -half),
                    (half, -half),
                    (half, 0),
                    (0, half),
                    (-half, half),
                    (-half, 0),
                ];
                points
                    .iter()
                    .zip(LANDMARK_NAMES)
                    .map(|(&(q, r), name)| Landmark {
                        coord: HexCoord::new(q, r),
                        name: name.to_string(),
                    })
                    .collect()
            }
            MapPreset::Custom(layout) => layout.landmarks.clone(),
        }
    }

    /// Check the preset can host `team_count` teams.
    pub fn validate(&self, team_count: u8) -> Result<(), SettingsError> {
        if let MapPreset::Hexagon { radius } = self {
            if *radius < 2 {
                return Err(SettingsError::InvalidRule("hexagon radius must be at least 2"));
            }
        }
        let coords = self.coords();
        if coords.is_empty() {
            return Err(SettingsError::EmptyBoard);
        }
        let board = Board::from_coords(coords);
        let hqs = self.hq_positions();
        for team in 1..=team_count {
            let coord = hqs
                .get(team as usize - 1)
                .ok_or(SettingsError::MissingHq(team))?;
            if !board.contains(coord) {
                return Err(SettingsError::OutsideBoard {
                    what: "HQ",
                    coord: *coord,
                });
            }
        }
        for landmark in self.landmarks() {
            if !board.contains(&landmark.coord) {
                return Err(SettingsError::OutsideBoard {
                    what: "landmark",
                    coord: landmark.coord,
                });
            }
        }
        Ok(())
    }
}

/// Builds boards from a preset.
pub struct MapGenerator {
    preset: MapPreset,
    team_count: u8,
}

impl MapGenerator {
    pub fn new(preset: MapPreset, team_count: u8) -> Self {
        Self { preset, team_count }
    }

    /// Build the board: tiles, landmarks, then one HQ per team.
    pub fn generate(&self) -> Result<Board, SettingsError> {
        self.preset.validate(self.team_count)?;

        let mut board = Board::from_coords(self.preset.coords());

        for landmark in self.preset.landmarks() {
            board.set_special(&landmark.coord, Some(landmark.name));
        }

        let hqs = self.preset.hq_positions();
        for (coord, team) in hqs.iter().zip(1..=self.team_count) {
            Self::place_hq(&mut board, coord, team);
        }

        // Construction is not a visible change.
        board.take_dirty();
        Ok(board)
    }

    fn place_hq(board: &mut Board, coord: &HexCoord, team: TeamId) {
        board.set_owner(coord, Owner::Team(team));
        board.set_power(coord, 1);
        board.set_permanent_shield(coord, true);
        tracing::debug!(team, %coord, "placed HQ");
    }
}
