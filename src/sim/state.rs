//! Persistent game state and core types
//!
//! Everything the player keeps between sessions lives in `GameState`. The
//! flight minigame keeps its own ephemeral state in `minigame::MinigameRun`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::catalog::{BoosterKind, ProductKind, STATION_LEVELS, StationLevel, station_level};
use crate::clamp_energy;
use crate::consts::*;

/// Resource marker shown inside a revealed area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResourceKind {
    #[default]
    Energy,
    Oxygen,
}

/// A circular region of the map with the fog removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealedArea {
    pub center: Vec2,
    pub radius: f32,
    pub has_resource: bool,
    pub resource_kind: ResourceKind,
    /// Marker position relative to `center`
    pub resource_offset: Vec2,
    /// The station's own area at the world origin
    #[serde(default)]
    pub home: bool,
}

impl RevealedArea {
    /// The area seeded around the station on first run
    pub fn home() -> Self {
        Self {
            center: Vec2::ZERO,
            radius: HOME_AREA_RADIUS,
            has_resource: true,
            resource_kind: ResourceKind::Energy,
            resource_offset: Vec2::new(HOME_RESOURCE_OFFSET.0, HOME_RESOURCE_OFFSET.1),
            home: true,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        crate::distance(point, self.center) <= self.radius
    }
}

/// Exploration status of a planet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlanetStatus {
    #[default]
    Idle,
    Exploring,
    Explored,
}

/// A financial-product node discovered on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub id: u64,
    pub position: Vec2,
    pub product: ProductKind,
    /// 0..=100
    pub exploration_progress: f64,
    pub status: PlanetStatus,
}

impl Planet {
    pub fn new(id: u64, position: Vec2, product: ProductKind) -> Self {
        Self {
            id,
            position,
            product,
            exploration_progress: 0.0,
            status: PlanetStatus::Idle,
        }
    }

    pub fn explore_cost(&self) -> f64 {
        self.product.explore_cost()
    }

    pub fn explore_reward(&self) -> f64 {
        self.product.explore_reward()
    }
}

/// A booster currently applied to the station
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveBooster {
    pub kind: BoosterKind,
    /// Wall-clock activation time (ms since epoch)
    pub start_time: f64,
    pub duration_ms: f64,
}

impl ActiveBooster {
    pub fn new(kind: BoosterKind, now: f64) -> Self {
        Self {
            kind,
            start_time: now,
            duration_ms: kind.duration_ms(),
        }
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now - self.start_time >= self.duration_ms
    }
}

/// Complete persisted game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    /// 1-based index into the station level table
    pub station_level: u32,
    pub energy: f64,
    pub boosters: Vec<ActiveBooster>,
    pub discovered_areas: Vec<RevealedArea>,
    pub planets: Vec<Planet>,
    /// Once-per-session cargo pickup already appeared
    pub session_cargo_spawned: bool,
    pub total_distance: f64,
    pub missions_completed: u32,
    /// Next planet id
    next_planet_id: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            station_level: 1,
            energy: START_ENERGY,
            boosters: Vec::new(),
            discovered_areas: Vec::new(),
            planets: Vec::new(),
            session_cargo_spawned: false,
            total_distance: 0.0,
            missions_completed: 0,
            next_planet_id: 1,
        }
    }
}

impl GameState {
    /// Fresh state with the home area already revealed
    pub fn new() -> Self {
        let mut state = Self::default();
        state.ensure_home_area();
        state
    }

    /// Current row of the level table
    pub fn level(&self) -> &'static StationLevel {
        station_level(self.station_level)
    }

    pub fn capacity(&self) -> f64 {
        self.level().capacity
    }

    /// Add (or remove, for negative amounts) energy within `[0, capacity]`
    pub fn credit_energy(&mut self, amount: f64) {
        self.energy = clamp_energy(self.energy + amount, self.capacity());
    }

    /// Allocate a new planet id
    pub fn next_planet_id(&mut self) -> u64 {
        let id = self.next_planet_id;
        self.next_planet_id += 1;
        id
    }

    pub fn planet(&self, id: u64) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }

    /// Seed the home area exactly once
    pub fn ensure_home_area(&mut self) {
        if !self.discovered_areas.iter().any(|a| a.home) {
            self.discovered_areas.insert(0, RevealedArea::home());
        }
    }

    /// Repair invariants after loading a possibly stale or edited save
    pub fn sanitize(&mut self) {
        let top = STATION_LEVELS[STATION_LEVELS.len() - 1].level;
        self.station_level = self.station_level.clamp(1, top);
        if !self.energy.is_finite() {
            self.energy = 0.0;
        }
        self.energy = clamp_energy(self.energy, self.capacity());

        self.discovered_areas
            .retain(|a| a.radius > 0.0 && a.center.is_finite());
        self.ensure_home_area();

        for planet in &mut self.planets {
            if !planet.exploration_progress.is_finite() {
                planet.exploration_progress = 0.0;
            }
            match planet.status {
                PlanetStatus::Explored => planet.exploration_progress = 100.0,
                PlanetStatus::Exploring if planet.exploration_progress >= 100.0 => {
                    // Completion is re-detected by the next tick so the reward is paid once
                    planet.exploration_progress = 99.0;
                }
                PlanetStatus::Exploring => {
                    planet.exploration_progress = planet.exploration_progress.max(0.0);
                }
                PlanetStatus::Idle => planet.exploration_progress = 0.0,
            }
        }

        let max_id = self.planets.iter().map(|p| p.id).max().unwrap_or(0);
        self.next_planet_id = self.next_planet_id.max(max_id + 1);
    }

    /// Product of multipliers of boosters still active at `now`
    pub fn booster_multiplier(&self, now: f64) -> f64 {
        self.boosters
            .iter()
            .filter(|b| !b.is_expired(now))
            .filter_map(|b| b.kind.multiplier())
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_single_home_area() {
        let mut state = GameState::new();
        state.ensure_home_area();
        assert_eq!(state.discovered_areas.len(), 1);
        let home = &state.discovered_areas[0];
        assert!(home.home);
        assert!(home.has_resource);
        assert_eq!(home.resource_kind, ResourceKind::Energy);
        assert_eq!(home.center, Vec2::ZERO);
    }

    #[test]
    fn test_credit_energy_clamps() {
        let mut state = GameState::new();
        state.credit_energy(1000.0);
        assert_eq!(state.energy, 100.0);
        state.credit_energy(-500.0);
        assert_eq!(state.energy, 0.0);
    }

    #[test]
    fn test_sanitize_repairs_invariants() {
        let mut state = GameState::default();
        state.station_level = 42;
        state.energy = 1e9;
        state.planets.push(Planet {
            id: 7,
            position: Vec2::ZERO,
            product: ProductKind::Card,
            exploration_progress: 12.0,
            status: PlanetStatus::Explored,
        });
        state.sanitize();

        assert_eq!(state.station_level, 5);
        assert_eq!(state.energy, 2000.0);
        assert_eq!(state.planets[0].exploration_progress, 100.0);
        assert!(state.discovered_areas.iter().any(|a| a.home));
        assert_eq!(state.next_planet_id(), 8);
    }

    #[test]
    fn test_booster_expiry_boundary() {
        let booster = ActiveBooster::new(BoosterKind::Deposit, 1000.0);
        assert!(!booster.is_expired(1000.0 + 299_999.0));
        assert!(booster.is_expired(1000.0 + 300_000.0));
    }
}
