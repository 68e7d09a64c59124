//! Cosmo Station - an idle space-station banking game
//!
//! Core modules:
//! - `sim`: Simulation (fog of war, planets, station economy, flight minigame)
//! - `view`: Camera, hit testing and read-only snapshots for the renderer
//! - `game`: Owns the state and routes input/frames into `sim`
//! - `platform`: Browser/native clock abstraction
//! - `persistence`: Key-value save/load with default-merging
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;
pub mod view;

pub use error::GameError;
pub use game::{Game, InputEvent, Notice};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Camera offset limit per axis (world units)
    pub const WORLD_SIZE: f32 = 2000.0;

    /// Home area around the station at the world origin
    pub const HOME_AREA_RADIUS: f32 = 150.0;
    pub const HOME_RESOURCE_OFFSET: (f32, f32) = (30.0, -20.0);

    /// Planet marker radius on screen (hit testing)
    pub const PLANET_RADIUS: f32 = 40.0;
    /// "Explore" button under an idle planet
    pub const EXPLORE_BUTTON_GAP: f32 = 20.0;
    pub const EXPLORE_BUTTON_HALF_WIDTH: f32 = 40.0;
    pub const EXPLORE_BUTTON_HEIGHT: f32 = 25.0;

    /// Exploration advances one percent per this many milliseconds
    pub const EXPLORE_MS_PER_PERCENT: f64 = 100.0;

    /// Shuttle sits this far above the bottom of the flight playfield
    pub const SHUTTLE_BOTTOM_OFFSET: f32 = 140.0;
    /// Entities advance `speed` pixels per this many milliseconds
    pub const FALL_SPEED_UNIT_MS: f32 = 16.0;
    /// Spawn heights above the playfield
    pub const ASTEROID_SPAWN_Y: f32 = -30.0;
    pub const PICKUP_SPAWN_Y: f32 = -20.0;

    /// Starting energy of a fresh station
    pub const START_ENERGY: f64 = 20.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Clamp an energy amount into `[0, capacity]`
#[inline]
pub fn clamp_energy(energy: f64, capacity: f64) -> f64 {
    energy.clamp(0.0, capacity.max(0.0))
}
