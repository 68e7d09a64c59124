//! Simulation module
//!
//! All gameplay logic lives here. This module must stay platform-free:
//! - Time arrives as explicit millisecond deltas and timestamps
//! - Randomness is injected (`&mut impl Rng`)
//! - State is passed in explicitly, never held globally
//! - No rendering or DOM dependencies

pub mod catalog;
pub mod collision;
pub mod economy;
pub mod flight;
pub mod fog;
pub mod minigame;
pub mod planet;
pub mod state;
pub mod tick;

pub use catalog::{
    BoosterKind, MAX_STATION_LEVEL, ProductKind, STATION_LEVELS, StationLevel,
    next_station_level, station_level,
};
pub use economy::{accrue, activate_booster, prune_boosters, upgrade};
pub use flight::{FlightEvent, FlightScheduler, FlightTicket, RoutePreview};
pub use fog::{RevealOutcome, is_revealed, reveal};
pub use minigame::{
    Asteroid, AsteroidSize, FlightReport, MinigamePhase, MinigameRun, Pickup, PickupKind,
    SteerInput, apply_report,
};
pub use planet::{begin_exploration, spawn_planet, tick_explorations};
pub use state::{
    ActiveBooster, GameState, Planet, PlanetStatus, ResourceKind, RevealedArea,
};
pub use tick::{StationTick, tick};

/// Random draw in `[low, high)`, the form every spawner uses
#[inline]
pub(crate) fn roll_range<R: rand::Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + rng.random::<f64>() * (high - low)
}

/// Uniform pick from a non-empty table
#[inline]
pub(crate) fn pick<T: Copy, R: rand::Rng + ?Sized>(rng: &mut R, table: &[T]) -> T {
    let idx = (rng.random::<f64>() * table.len() as f64) as usize;
    table[idx.min(table.len() - 1)]
}
