//! Station tick
//!
//! Runs once per animation frame regardless of whether a flight is active.

use super::economy::accrue;
use super::planet::tick_explorations;
use super::state::GameState;

/// What happened during one station tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationTick {
    /// Planets whose exploration completed this tick
    pub explored: Vec<u64>,
}

/// Advance the station by `dt_ms` (frame delta, already capped by the caller)
///
/// `now` is wall-clock time and only drives booster expiry, so boosters
/// expire correctly even when frames were throttled in a background tab.
pub fn tick(state: &mut GameState, dt_ms: f64, now: f64) -> StationTick {
    accrue(state, dt_ms, now);
    let explored = tick_explorations(state, dt_ms);
    StationTick { explored }
}
