//! Hexsiege Core Library
//!
//! This crate contains the game-state engine for Hexsiege, a turn-based hex
//! territory game for up to six teams. Teams spend action points to grow and
//! defend territory; from round 9 an AI faction seizes the landmarks and
//! spreads across the board on its own turn.
//!
//! # Design Principles
//!
//! - **No UI dependencies**: hosts drive a [`Session`] and drain its events
//! - **Deterministic**: the AI tie-break RNG is seeded from the settings
//! - **Undoable**: every action and turn transition records what it changed
//! - **Serializable**: state can be saved and loaded as JSON snapshots

// Board and identifiers
pub mod hex;
pub mod map;
pub mod mapgen;
pub mod types;

// Game state
pub mod game;
pub mod settings;
pub mod team;

// Actions and undo
pub mod action;
pub mod history;
pub mod resolver;

// Turn flow and the AI faction
pub mod ai;
pub mod scheduler;
mod turn;
pub mod victory;

// Host surface
pub mod events;
pub mod session;
pub mod snapshot;

// Re-exports for convenience
pub use action::{Action, ActionError, TurnChange};
pub use ai::AiPhase;
pub use events::SessionEvent;
pub use game::{Game, GameState};
pub use hex::HexCoord;
pub use map::{Board, Tile, TileImage};
pub use mapgen::{MapGenerator, MapPreset};
pub use session::{Session, SessionError};
pub use settings::{GameSettings, Rules, SettingsError};
pub use snapshot::{Snapshot, SnapshotError};
pub use team::{Team, TeamLedger};
pub use types::*;
pub use victory::Outcome;
