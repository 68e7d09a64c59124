//! Planet lifecycle: Idle -> Exploring -> Explored
//!
//! Exploration cost is deducted when exploration starts; the reward is paid
//! in the same tick that moves the planet to `Explored`.

use glam::Vec2;
use rand::Rng;

use super::catalog::ProductKind;
use super::pick;
use super::state::{GameState, Planet, PlanetStatus};
use crate::GameError;
use crate::consts::EXPLORE_MS_PER_PERCENT;

/// Spawn a planet with a uniformly random product at `position`
pub fn spawn_planet<R: Rng + ?Sized>(state: &mut GameState, position: Vec2, rng: &mut R) -> u64 {
    let product = pick(rng, &ProductKind::ALL);
    let id = state.next_planet_id();
    state.planets.push(Planet::new(id, position, product));
    log::info!("Discovered planet {} ({})", id, product.name());
    id
}

/// Start exploring a planet, paying its cost from station energy
pub fn begin_exploration(state: &mut GameState, planet_id: u64) -> Result<(), GameError> {
    let available = state.energy;
    let planet = state
        .planets
        .iter_mut()
        .find(|p| p.id == planet_id)
        .ok_or(GameError::PlanetNotFound(planet_id))?;

    match planet.status {
        PlanetStatus::Explored => return Err(GameError::AlreadyExplored),
        PlanetStatus::Exploring => return Err(GameError::AlreadyExploring),
        PlanetStatus::Idle => {}
    }

    let cost = planet.explore_cost();
    if available < cost {
        return Err(GameError::InsufficientEnergy {
            required: cost,
            available,
        });
    }

    planet.status = PlanetStatus::Exploring;
    planet.exploration_progress = 0.0;
    state.energy -= cost;
    log::info!("Exploring planet {} for {} energy", planet_id, cost);
    Ok(())
}

impl Planet {
    /// Advance exploration; returns the reward if this call completed it
    pub fn advance(&mut self, dt_ms: f64) -> Option<f64> {
        if self.status != PlanetStatus::Exploring || dt_ms <= 0.0 {
            return None;
        }
        self.exploration_progress += dt_ms / EXPLORE_MS_PER_PERCENT;
        if self.exploration_progress >= 100.0 {
            self.exploration_progress = 100.0;
            self.status = PlanetStatus::Explored;
            Some(self.explore_reward())
        } else {
            None
        }
    }
}

/// Advance every exploring planet, crediting rewards; returns completed ids
pub fn tick_explorations(state: &mut GameState, dt_ms: f64) -> Vec<u64> {
    let mut completed = Vec::new();
    let mut reward = 0.0;
    for planet in &mut state.planets {
        if let Some(r) = planet.advance(dt_ms) {
            reward += r;
            completed.push(planet.id);
            log::info!("Planet {} explored, +{} energy", planet.id, r);
        }
    }
    if !completed.is_empty() {
        state.credit_energy(reward);
    }
    completed
}
