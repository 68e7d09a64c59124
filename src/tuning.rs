//! Data-driven game balance
//!
//! Every field has a default, so an override payload only needs the values it
//! changes. Loaded from LocalStorage on the web build.

use serde::{Deserialize, Serialize};

/// Fog-of-war reveal parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogTuning {
    /// Radius of a player reveal (world units)
    pub reveal_radius: f32,
    /// Chance a reveal contains a resource marker
    pub resource_chance: f64,
    /// Share of resource markers that are energy (rest are oxygen)
    pub energy_share: f64,
    /// Chance a reveal also spawns a planet
    pub planet_chance: f64,
}

impl Default for FogTuning {
    fn default() -> Self {
        Self {
            reveal_radius: 80.0,
            resource_chance: 0.3,
            energy_share: 0.7,
            planet_chance: 0.15,
        }
    }
}

/// One asteroid size class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsteroidClass {
    pub radius: f32,
    /// Fall speed in pixels per 16 ms before variation
    pub base_speed: f32,
}

/// Flight minigame parameters (times in milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinigameTuning {
    /// Largest simulated step
    pub max_step_ms: f64,
    /// Hard cap on run length
    pub max_duration_ms: f64,

    pub spawn_interval_ms: f64,
    pub asteroid_chance: f64,
    /// Chance an asteroid is small; of the rest, `medium_share` are medium
    pub small_share: f64,
    pub medium_share: f64,
    pub small: AsteroidClass,
    pub medium: AsteroidClass,
    pub large: AsteroidClass,
    /// Fall speed variation multiplier range
    pub asteroid_speed_min: f32,
    pub asteroid_speed_max: f32,

    pub pickup_chance: f64,
    /// Share of resource pickups that are oxygen (rest are energy)
    pub oxygen_pickup_share: f64,
    pub pickup_speed_min: f32,
    pub pickup_speed_max: f32,

    pub cargo_chance: f64,
    pub cargo_speed: f32,

    pub booster_interval_ms: f64,
    pub max_boosters: usize,
    pub booster_speed_min: f32,
    pub booster_speed_max: f32,

    /// Horizontal shuttle speed in pixels per ms
    pub steer_speed: f32,
    /// Shuttle x is kept this far from either playfield edge
    pub shuttle_margin: f32,
    /// Added to an asteroid radius for the hit test
    pub shuttle_half_width: f32,
    pub pickup_radius: f32,

    pub oxygen_start: f64,
    pub oxygen_max: f64,
    pub oxygen_restore: f64,
    pub asteroid_penalty: f64,
    pub oxygen_drain_interval_ms: f64,
    pub oxygen_drain_amount: f64,

    pub energy_pickup_min: f64,
    pub energy_pickup_max: f64,
    pub cargo_energy: f64,

    /// Ascent speed in pixels per ms at zero distance
    pub ascent_base_speed: f64,
    /// Distance over which the speed grows by `ascent_ramp`
    pub ascent_ramp_distance: f64,
    pub ascent_ramp: f64,
}

impl Default for MinigameTuning {
    fn default() -> Self {
        Self {
            max_step_ms: 40.0,
            max_duration_ms: 120_000.0,

            spawn_interval_ms: 500.0,
            asteroid_chance: 0.9,
            small_share: 0.6,
            medium_share: 0.85,
            small: AsteroidClass {
                radius: 6.0,
                base_speed: 3.0,
            },
            medium: AsteroidClass {
                radius: 12.0,
                base_speed: 2.5,
            },
            large: AsteroidClass {
                radius: 20.0,
                base_speed: 2.0,
            },
            asteroid_speed_min: 0.3,
            asteroid_speed_max: 1.0,

            pickup_chance: 0.4,
            oxygen_pickup_share: 0.6,
            pickup_speed_min: 1.0,
            pickup_speed_max: 2.5,

            cargo_chance: 0.12,
            cargo_speed: 1.1,

            booster_interval_ms: 30_000.0,
            max_boosters: 3,
            booster_speed_min: 0.6,
            booster_speed_max: 1.0,

            steer_speed: 0.4,
            shuttle_margin: 18.0,
            shuttle_half_width: 12.0,
            pickup_radius: 18.0,

            oxygen_start: 100.0,
            oxygen_max: 200.0,
            oxygen_restore: 60.0,
            asteroid_penalty: 40.0,
            oxygen_drain_interval_ms: 300.0,
            oxygen_drain_amount: 1.0,

            energy_pickup_min: 15.0,
            energy_pickup_max: 35.0,
            cargo_energy: 80.0,

            ascent_base_speed: 0.15,
            ascent_ramp_distance: 300.0,
            ascent_ramp: 1.2,
        }
    }
}

/// Complete balance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub fog: FogTuning,
    pub minigame: MinigameTuning,
    /// Delay between a reveal and the route preview appearing
    pub route_preview_delay_ms: f64,
    /// Delay between the route preview and the flight starting
    pub launch_delay_ms: f64,
    /// Largest frame delta fed to the station tick
    pub max_station_dt_ms: f64,
    pub autosave_interval_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            fog: FogTuning::default(),
            minigame: MinigameTuning::default(),
            route_preview_delay_ms: 500.0,
            launch_delay_ms: 1000.0,
            max_station_dt_ms: 200.0,
            autosave_interval_ms: 5000.0,
        }
    }
}

impl Tuning {
    /// LocalStorage key for an override payload
    pub const STORAGE_KEY: &'static str = "cosmo_station_tuning";

    /// Parse a (possibly partial) JSON override; malformed input yields defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Self>(json) {
            Ok(mut tuning) => {
                tuning.sanitize();
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring malformed tuning override: {}", e);
                Self::default()
            }
        }
    }
}

impl Tuning {
    /// Reset values the simulation cannot run with to their defaults
    pub fn sanitize(&mut self) {
        let d = Tuning::default();
        let mut bad = Vec::new();

        let fog = &mut self.fog;
        check(
            &mut bad,
            "fog.reveal_radius",
            fog.reveal_radius > 0.0,
            &mut fog.reveal_radius,
            d.fog.reveal_radius,
        );

        let m = &mut self.minigame;
        let dm = &d.minigame;
        check(
            &mut bad,
            "minigame.max_step_ms",
            m.max_step_ms > 0.0,
            &mut m.max_step_ms,
            dm.max_step_ms,
        );
        check(
            &mut bad,
            "minigame.max_duration_ms",
            m.max_duration_ms > 0.0,
            &mut m.max_duration_ms,
            dm.max_duration_ms,
        );
        check(
            &mut bad,
            "minigame.spawn_interval_ms",
            m.spawn_interval_ms > 0.0,
            &mut m.spawn_interval_ms,
            dm.spawn_interval_ms,
        );
        check(
            &mut bad,
            "minigame.booster_interval_ms",
            m.booster_interval_ms > 0.0,
            &mut m.booster_interval_ms,
            dm.booster_interval_ms,
        );
        check(
            &mut bad,
            "minigame.oxygen_drain_interval_ms",
            m.oxygen_drain_interval_ms > 0.0,
            &mut m.oxygen_drain_interval_ms,
            dm.oxygen_drain_interval_ms,
        );
        check(
            &mut bad,
            "minigame.ascent_ramp_distance",
            m.ascent_ramp_distance > 0.0,
            &mut m.ascent_ramp_distance,
            dm.ascent_ramp_distance,
        );
        check(
            &mut bad,
            "minigame.shuttle_margin",
            m.shuttle_margin >= 0.0,
            &mut m.shuttle_margin,
            dm.shuttle_margin,
        );
        check_range(
            &mut bad,
            "minigame.asteroid_speed",
            &mut m.asteroid_speed_min,
            &mut m.asteroid_speed_max,
            (dm.asteroid_speed_min, dm.asteroid_speed_max),
        );
        check_range(
            &mut bad,
            "minigame.pickup_speed",
            &mut m.pickup_speed_min,
            &mut m.pickup_speed_max,
            (dm.pickup_speed_min, dm.pickup_speed_max),
        );
        check_range(
            &mut bad,
            "minigame.booster_speed",
            &mut m.booster_speed_min,
            &mut m.booster_speed_max,
            (dm.booster_speed_min, dm.booster_speed_max),
        );
        check_range(
            &mut bad,
            "minigame.energy_pickup",
            &mut m.energy_pickup_min,
            &mut m.energy_pickup_max,
            (dm.energy_pickup_min, dm.energy_pickup_max),
        );

        check(
            &mut bad,
            "route_preview_delay_ms",
            self.route_preview_delay_ms >= 0.0,
            &mut self.route_preview_delay_ms,
            d.route_preview_delay_ms,
        );
        check(
            &mut bad,
            "launch_delay_ms",
            self.launch_delay_ms >= 0.0,
            &mut self.launch_delay_ms,
            d.launch_delay_ms,
        );
        check(
            &mut bad,
            "max_station_dt_ms",
            self.max_station_dt_ms > 0.0,
            &mut self.max_station_dt_ms,
            d.max_station_dt_ms,
        );
        check(
            &mut bad,
            "autosave_interval_ms",
            self.autosave_interval_ms > 0.0,
            &mut self.autosave_interval_ms,
            d.autosave_interval_ms,
        );

        if !bad.is_empty() {
            log::warn!("Tuning values out of range, using defaults for: {}", bad.join(", "));
        }
    }
}

fn check<T>(
    bad: &mut Vec<&'static str>,
    name: &'static str,
    valid: bool,
    value: &mut T,
    default: T,
) {
    if !valid {
        *value = default;
        bad.push(name);
    }
}

/// `min..=max` must be a non-empty, non-negative range
fn check_range<T: Copy + PartialOrd + Default>(
    bad: &mut Vec<&'static str>,
    name: &'static str,
    min: &mut T,
    max: &mut T,
    default: (T, T),
) {
    if !(*min >= T::default() && *min <= *max) {
        *min = default.0;
        *max = default.1;
        bad.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{"minigame": {"asteroid_penalty": 25.0}}"#);
        assert_eq!(tuning.minigame.asteroid_penalty, 25.0);
        assert_eq!(tuning.minigame.oxygen_start, 100.0);
        assert_eq!(tuning.fog, FogTuning::default());
    }

    #[test]
    fn test_malformed_override_falls_back() {
        assert_eq!(Tuning::from_json("not json"), Tuning::default());
    }

    #[test]
    fn test_out_of_range_override_uses_defaults() {
        let tuning = Tuning::from_json(
            r#"{"minigame": {"max_step_ms": -1.0, "asteroid_speed_min": 2.0, "asteroid_speed_max": 1.0,
                "oxygen_restore": 10.0}, "autosave_interval_ms": 0.0}"#,
        );
        let defaults = Tuning::default();
        assert_eq!(tuning.minigame.max_step_ms, defaults.minigame.max_step_ms);
        assert_eq!(tuning.minigame.asteroid_speed_min, defaults.minigame.asteroid_speed_min);
        assert_eq!(tuning.minigame.asteroid_speed_max, defaults.minigame.asteroid_speed_max);
        assert_eq!(tuning.autosave_interval_ms, defaults.autosave_interval_ms);
        // Valid values survive
        assert_eq!(tuning.minigame.oxygen_restore, 10.0);
    }

    #[test]
    fn test_out_of_range_override_runs_flight() {
        use crate::sim::{MinigameRun, SteerInput};
        use crate::sim::test_rng::ScriptedRng;

        let tuning = Tuning::from_json(r#"{"minigame": {"max_step_ms": -1.0}}"#);
        let mut run = MinigameRun::new(glam::Vec2::new(400.0, 800.0), tuning.minigame, true);
        run.start();
        run.step(16.0, SteerInput::default(), &mut ScriptedRng::constant(0.99));
        assert_eq!(run.elapsed_ms, 16.0);
    }
}
