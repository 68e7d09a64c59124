//! Flight minigame
//!
//! A short real-time run: the shuttle steers left/right at the bottom of the
//! playfield while asteroids and pickups fall toward it. The run owns all of
//! its entities and never touches `GameState`; its only output is the
//! `FlightReport` produced when it ends.
//!
//! Playfield coordinates: x grows right, y grows down, origin top-left.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog::BoosterKind;
use super::collision::{shuttle_hits_asteroid, shuttle_reaches_pickup};
use super::state::{ActiveBooster, GameState};
use super::{pick, roll_range};
use crate::consts::*;
use crate::tuning::MinigameTuning;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinigamePhase {
    NotStarted,
    Running,
    /// Terminal
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsteroidSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub pos: Vec2,
    /// Pixels per 16 ms, downward
    pub fall_speed: f32,
    pub radius: f32,
    pub size: AsteroidSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Oxygen,
    Energy,
    Booster(BoosterKind),
    /// Once-per-session cargo: energy, a random booster and a mission
    Cargo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    /// Pixels per 16 ms, downward
    pub fall_speed: f32,
    pub kind: PickupKind,
}

/// Held steering direction for the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SteerInput {
    pub left: bool,
    pub right: bool,
}

/// Everything a finished run hands back to the station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightReport {
    /// Never negative
    pub collected_energy: f64,
    pub found_boosters: Vec<BoosterKind>,
    /// Shuttle x and ascent height at the end of the run
    pub final_position: Vec2,
    pub distance: f64,
    /// The session cargo appeared during this run
    pub cargo_spawned: bool,
    pub missions_completed: u32,
}

/// One flight
#[derive(Debug, Clone)]
pub struct MinigameRun {
    pub phase: MinigamePhase,
    /// Playfield width and height
    pub playfield: Vec2,
    pub shuttle: Vec2,
    pub oxygen: f64,
    pub collected_energy: f64,
    pub asteroids: Vec<Asteroid>,
    pub pickups: Vec<Pickup>,
    pub elapsed_ms: f64,
    pub distance: f64,
    pub found_boosters: Vec<BoosterKind>,
    pub missions_completed: u32,
    spawn_timer_ms: f64,
    booster_timer_ms: f64,
    oxygen_drain_acc_ms: f64,
    /// Boosters collected from booster pickups (cargo boosters excluded)
    booster_pickups: usize,
    cargo_available: bool,
    cargo_spawned: bool,
    tuning: MinigameTuning,
}

impl MinigameRun {
    /// Create a run; `cargo_available` is false once the session cargo appeared
    pub fn new(playfield: Vec2, tuning: MinigameTuning, cargo_available: bool) -> Self {
        Self {
            phase: MinigamePhase::NotStarted,
            playfield,
            shuttle: Vec2::new(playfield.x / 2.0, playfield.y - SHUTTLE_BOTTOM_OFFSET),
            oxygen: tuning.oxygen_start,
            collected_energy: 0.0,
            asteroids: Vec::new(),
            pickups: Vec::new(),
            elapsed_ms: 0.0,
            distance: 0.0,
            found_boosters: Vec::new(),
            missions_completed: 0,
            spawn_timer_ms: 0.0,
            booster_timer_ms: 0.0,
            oxygen_drain_acc_ms: 0.0,
            booster_pickups: 0,
            cargo_available,
            cargo_spawned: false,
            tuning,
        }
    }

    pub fn start(&mut self) {
        if self.phase == MinigamePhase::NotStarted {
            self.phase = MinigamePhase::Running;
            log::info!("Flight started");
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == MinigamePhase::Running
    }

    pub fn cargo_spawned(&self) -> bool {
        self.cargo_spawned
    }

    /// Advance one frame. Returns the report on the step that ends the run.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f64,
        input: SteerInput,
        rng: &mut R,
    ) -> Option<FlightReport> {
        if self.phase != MinigamePhase::Running {
            return None;
        }
        let dt = dt_ms.clamp(0.0, self.tuning.max_step_ms.max(0.0));

        // 1. Timers
        self.elapsed_ms += dt;
        self.spawn_timer_ms += dt;
        self.booster_timer_ms += dt;

        // 2. Ascent, faster the further we get
        let speed = self.tuning.ascent_base_speed
            * (1.0 + self.distance / self.tuning.ascent_ramp_distance * self.tuning.ascent_ramp);
        self.distance += dt * speed;

        // 3. Hazards and resources
        if self.spawn_timer_ms > self.tuning.spawn_interval_ms {
            self.spawn_timer_ms = 0.0;
            self.spawn_wave(rng);
        }

        // 4. Boosters
        if self.booster_timer_ms >= self.tuning.booster_interval_ms
            && self.booster_pickups < self.tuning.max_boosters
        {
            self.booster_timer_ms = 0.0;
            self.spawn_booster(rng);
        }

        // 5. Steering
        self.steer(input, dt as f32);

        // 6. Falling entities
        let fall = dt as f32 / FALL_SPEED_UNIT_MS;
        for asteroid in &mut self.asteroids {
            asteroid.pos.y += asteroid.fall_speed * fall;
        }
        for pickup in &mut self.pickups {
            pickup.pos.y += pickup.fall_speed * fall;
        }
        let floor = self.playfield.y + 40.0;
        self.asteroids.retain(|a| a.pos.y - a.radius <= floor);
        self.pickups.retain(|p| p.pos.y <= floor);

        // 7. Collisions
        self.resolve_collisions(rng);

        // 8. Oxygen drains per fixed interval, not per frame
        self.oxygen_drain_acc_ms += dt;
        if self.oxygen_drain_acc_ms >= self.tuning.oxygen_drain_interval_ms {
            let ticks = (self.oxygen_drain_acc_ms / self.tuning.oxygen_drain_interval_ms).floor();
            self.oxygen_drain_acc_ms %= self.tuning.oxygen_drain_interval_ms;
            self.oxygen -= self.tuning.oxygen_drain_amount * ticks;
        }

        // 9. Termination
        if self.oxygen <= 0.0 || self.elapsed_ms >= self.tuning.max_duration_ms {
            self.phase = MinigamePhase::Ended;
            let report = self.report();
            log::info!(
                "Flight ended after {:.1}s: {:.0} energy, {} booster(s), distance {:.0}",
                self.elapsed_ms / 1000.0,
                report.collected_energy,
                report.found_boosters.len(),
                report.distance
            );
            return Some(report);
        }
        None
    }

    /// Snapshot of the run's results so far
    pub fn report(&self) -> FlightReport {
        FlightReport {
            collected_energy: self.collected_energy.max(0.0),
            found_boosters: self.found_boosters.clone(),
            final_position: Vec2::new(
                self.shuttle.x,
                self.playfield.y - (self.distance / 2.0) as f32,
            ),
            distance: self.distance,
            cargo_spawned: self.cargo_spawned,
            missions_completed: self.missions_completed,
        }
    }

    fn spawn_wave<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if rng.random::<f64>() < self.tuning.asteroid_chance {
            self.spawn_asteroid(rng);
        }
        if rng.random::<f64>() < self.tuning.pickup_chance {
            let kind = if rng.random::<f64>() < self.tuning.oxygen_pickup_share {
                PickupKind::Oxygen
            } else {
                PickupKind::Energy
            };
            let speed = roll_range(
                rng,
                self.tuning.pickup_speed_min as f64,
                self.tuning.pickup_speed_max as f64,
            ) as f32;
            self.spawn_pickup(kind, speed, rng);
        }
        if self.cargo_available && !self.cargo_spawned && rng.random::<f64>() < self.tuning.cargo_chance
        {
            self.cargo_spawned = true;
            self.spawn_pickup(PickupKind::Cargo, self.tuning.cargo_speed, rng);
            log::info!("Cargo spotted");
        }
    }

    fn spawn_asteroid<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let t = &self.tuning;
        let (size, class) = if rng.random::<f64>() < t.small_share {
            (AsteroidSize::Small, t.small)
        } else if rng.random::<f64>() < t.medium_share {
            (AsteroidSize::Medium, t.medium)
        } else {
            (AsteroidSize::Large, t.large)
        };
        let variation = roll_range(rng, t.asteroid_speed_min as f64, t.asteroid_speed_max as f64);
        let x = roll_range(rng, 20.0, (self.playfield.x - 20.0).max(20.0) as f64) as f32;
        self.asteroids.push(Asteroid {
            pos: Vec2::new(x, ASTEROID_SPAWN_Y),
            fall_speed: class.base_speed * variation as f32,
            radius: class.radius,
            size,
        });
    }

    fn spawn_pickup<R: Rng + ?Sized>(&mut self, kind: PickupKind, fall_speed: f32, rng: &mut R) {
        let x = roll_range(rng, 16.0, (self.playfield.x - 16.0).max(16.0) as f64) as f32;
        log::debug!("Spawned {:?} pickup at x={:.0}", kind, x);
        self.pickups.push(Pickup {
            pos: Vec2::new(x, PICKUP_SPAWN_Y),
            fall_speed,
            kind,
        });
    }

    fn spawn_booster<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let kind = pick(rng, &BoosterKind::ALL);
        let speed = roll_range(
            rng,
            self.tuning.booster_speed_min as f64,
            self.tuning.booster_speed_max as f64,
        ) as f32;
        self.spawn_pickup(PickupKind::Booster(kind), speed, rng);
    }

    fn steer(&mut self, input: SteerInput, dt: f32) {
        if input.left {
            self.shuttle.x -= self.tuning.steer_speed * dt;
        }
        if input.right {
            self.shuttle.x += self.tuning.steer_speed * dt;
        }
        let margin = self.tuning.shuttle_margin;
        let max_x = (self.playfield.x - margin).max(margin);
        self.shuttle.x = self.shuttle.x.clamp(margin, max_x);
    }

    fn resolve_collisions<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let shuttle = self.shuttle;
        let half_width = self.tuning.shuttle_half_width;
        let before = self.asteroids.len();
        self.asteroids
            .retain(|a| !shuttle_hits_asteroid(shuttle, half_width, a.pos, a.radius));
        let hits = before - self.asteroids.len();
        self.oxygen -= self.tuning.asteroid_penalty * hits as f64;

        let reach = self.tuning.pickup_radius;
        let (collected, remaining): (Vec<Pickup>, Vec<Pickup>) = std::mem::take(&mut self.pickups)
            .into_iter()
            .partition(|p| shuttle_reaches_pickup(shuttle, p.pos, reach));
        self.pickups = remaining;
        for pickup in collected {
            self.collect(pickup.kind, rng);
        }
    }

    fn collect<R: Rng + ?Sized>(&mut self, kind: PickupKind, rng: &mut R) {
        let t = &self.tuning;
        match kind {
            PickupKind::Oxygen => {
                self.oxygen = (self.oxygen + t.oxygen_restore).min(t.oxygen_max);
            }
            PickupKind::Energy => {
                self.collected_energy += roll_range(rng, t.energy_pickup_min, t.energy_pickup_max);
            }
            PickupKind::Booster(booster) => {
                if self.booster_pickups < t.max_boosters {
                    self.booster_pickups += 1;
                    self.found_boosters.push(booster);
                }
            }
            PickupKind::Cargo => {
                self.collected_energy += t.cargo_energy;
                self.found_boosters.push(pick(rng, &BoosterKind::ALL));
                self.missions_completed += 1;
            }
        }
    }
}

/// Merge a finished run into the persistent state
pub fn apply_report(state: &mut GameState, report: &FlightReport, now: f64) {
    state.credit_energy(report.collected_energy.max(0.0));
    for &kind in &report.found_boosters {
        state.boosters.push(ActiveBooster::new(kind, now));
    }
    state.total_distance += report.distance.max(0.0);
    state.missions_completed += report.missions_completed;
    state.session_cargo_spawned |= report.cargo_spawned;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_rng::ScriptedRng;

    const FIELD: Vec2 = Vec2::new(400.0, 800.0);

    fn running(tuning: MinigameTuning) -> MinigameRun {
        let mut run = MinigameRun::new(FIELD, tuning, true);
        run.start();
        run
    }

    /// Draws above every spawn chance: nothing but scheduled boosters appear
    fn quiet_rng() -> ScriptedRng {
        ScriptedRng::constant(0.99)
    }

    fn run_to_end(run: &mut MinigameRun, rng: &mut ScriptedRng) -> (FlightReport, u32) {
        let mut steps = 0;
        loop {
            steps += 1;
            if let Some(report) = run.step(40.0, SteerInput::default(), rng) {
                return (report, steps);
            }
            assert!(steps < 10_000, "run never ended");
        }
    }

    #[test]
    fn test_not_started_does_nothing() {
        let mut run = MinigameRun::new(FIELD, MinigameTuning::default(), true);
        assert!(run.step(40.0, SteerInput::default(), &mut quiet_rng()).is_none());
        assert_eq!(run.elapsed_ms, 0.0);
        assert_eq!(run.phase, MinigamePhase::NotStarted);
    }

    #[test]
    fn test_oxygen_drains_without_pickups() {
        let mut run = running(MinigameTuning::default());
        let mut rng = quiet_rng();
        let mut last = run.oxygen;
        for _ in 0..10 {
            for _ in 0..10 {
                run.step(40.0, SteerInput::default(), &mut rng);
            }
            assert!(run.oxygen < last);
            last = run.oxygen;
        }
    }

    #[test]
    fn test_drain_rate_independent_of_frame_timing() {
        let mut coarse = running(MinigameTuning::default());
        let mut fine = running(MinigameTuning::default());
        let mut rng = quiet_rng();
        for _ in 0..150 {
            coarse.step(40.0, SteerInput::default(), &mut rng);
        }
        for _ in 0..375 {
            fine.step(16.0, SteerInput::default(), &mut rng);
        }
        // 6000 ms either way -> 20 drain ticks
        assert_eq!(coarse.oxygen, 80.0);
        assert_eq!(fine.oxygen, 80.0);
    }

    #[test]
    fn test_ends_when_oxygen_runs_out() {
        let mut run = running(MinigameTuning::default());
        let (report, _) = run_to_end(&mut run, &mut quiet_rng());
        assert_eq!(run.phase, MinigamePhase::Ended);
        assert!((run.elapsed_ms - 30_000.0).abs() < 1e-6);
        assert_eq!(report.collected_energy, 0.0);
        assert!(report.distance > 0.0);
        // Terminal: further steps are ignored
        assert!(run.step(40.0, SteerInput::default(), &mut quiet_rng()).is_none());
    }

    #[test]
    fn test_hard_cap_without_drain() {
        let tuning = MinigameTuning {
            oxygen_drain_amount: 0.0,
            ..Default::default()
        };
        let mut run = running(tuning);
        let (_, steps) = run_to_end(&mut run, &mut quiet_rng());
        assert_eq!(steps, 3000);
        assert_eq!(run.elapsed_ms, 120_000.0);
        assert_eq!(run.oxygen, 100.0);
    }

    #[test]
    fn test_large_frame_delta_is_capped() {
        let mut run = running(MinigameTuning::default());
        run.step(5000.0, SteerInput::default(), &mut quiet_rng());
        assert_eq!(run.elapsed_ms, 40.0);
    }

    #[test]
    fn test_asteroid_hit_then_suffocate() {
        let mut run = running(MinigameTuning::default());
        run.asteroids.push(Asteroid {
            pos: run.shuttle,
            fall_speed: 0.0,
            radius: 12.0,
            size: AsteroidSize::Medium,
        });
        let mut rng = quiet_rng();
        assert!(run.step(16.0, SteerInput::default(), &mut rng).is_none());
        assert!(run.asteroids.is_empty());
        assert_eq!(run.oxygen, 60.0);

        let (report, _) = run_to_end(&mut run, &mut rng);
        assert_eq!(report.collected_energy, 0.0);
        assert!(run.elapsed_ms < 20_000.0);
    }

    #[test]
    fn test_pickup_effects() {
        let mut run = running(MinigameTuning::default());
        let at = run.shuttle;
        for kind in [
            PickupKind::Oxygen,
            PickupKind::Energy,
            PickupKind::Booster(BoosterKind::Investment),
            PickupKind::Cargo,
        ] {
            run.pickups.push(Pickup {
                pos: at,
                fall_speed: 0.0,
                kind,
            });
        }
        run.step(16.0, SteerInput::default(), &mut ScriptedRng::new(&[0.5, 0.99, 0.0]));

        assert!(run.pickups.is_empty());
        assert_eq!(run.oxygen, 160.0);
        // 25 from the energy pickup, 80 from cargo
        assert!((run.collected_energy - 105.0).abs() < 1e-9);
        assert_eq!(run.found_boosters.len(), 2);
        assert_eq!(run.found_boosters[0], BoosterKind::Investment);
        assert_eq!(run.missions_completed, 1);
    }

    #[test]
    fn test_oxygen_restore_capped() {
        let mut run = running(MinigameTuning::default());
        run.oxygen = 180.0;
        run.pickups.push(Pickup {
            pos: run.shuttle,
            fall_speed: 0.0,
            kind: PickupKind::Oxygen,
        });
        run.step(16.0, SteerInput::default(), &mut quiet_rng());
        assert_eq!(run.oxygen, 200.0);
    }

    #[test]
    fn test_booster_pickups_capped_at_three() {
        let mut run = running(MinigameTuning::default());
        for _ in 0..4 {
            run.pickups.push(Pickup {
                pos: run.shuttle,
                fall_speed: 0.0,
                kind: PickupKind::Booster(BoosterKind::Deposit),
            });
        }
        run.step(16.0, SteerInput::default(), &mut quiet_rng());
        assert_eq!(run.found_boosters.len(), 3);
    }

    #[test]
    fn test_spawn_wave_and_single_cargo() {
        let mut run = running(MinigameTuning::default());
        let mut rng = ScriptedRng::constant(0.0);
        for _ in 0..13 {
            run.step(40.0, SteerInput::default(), &mut rng);
        }
        assert_eq!(run.asteroids.len(), 1);
        assert_eq!(run.asteroids[0].size, AsteroidSize::Small);
        assert_eq!(run.pickups.len(), 2);
        assert!(run.pickups.iter().any(|p| p.kind == PickupKind::Cargo));
        assert!(run.cargo_spawned());

        for _ in 0..13 {
            run.step(40.0, SteerInput::default(), &mut rng);
        }
        let cargo = run
            .pickups
            .iter()
            .filter(|p| p.kind == PickupKind::Cargo)
            .count();
        assert_eq!(cargo, 1);
        assert_eq!(run.asteroids.len(), 2);
    }

    #[test]
    fn test_asteroid_size_classes_and_speed() {
        let tuning = MinigameTuning::default();
        // Draws: small roll, medium roll, speed variation, x
        let cases = [
            (&[0.0, 0.0, 0.0, 0.5][..], AsteroidSize::Small, 6.0, 3.0, 0.3),
            (&[0.7, 0.5, 0.0, 0.5][..], AsteroidSize::Medium, 12.0, 2.5, 0.3),
            (&[0.7, 0.5, 1.0, 0.5][..], AsteroidSize::Medium, 12.0, 2.5, 1.0),
            (&[0.7, 0.9, 0.0, 0.5][..], AsteroidSize::Large, 20.0, 2.0, 0.3),
            (&[0.7, 0.9, 1.0, 0.5][..], AsteroidSize::Large, 20.0, 2.0, 1.0),
        ];
        for (draws, size, radius, base_speed, variation) in cases {
            let mut run = running(tuning.clone());
            run.spawn_asteroid(&mut ScriptedRng::new(draws));
            let asteroid = &run.asteroids[0];
            assert_eq!(asteroid.size, size);
            assert_eq!(asteroid.radius, radius);
            assert!(
                (asteroid.fall_speed - base_speed * variation).abs() < 1e-5,
                "{:?}: fall speed {}",
                size,
                asteroid.fall_speed
            );
            assert_eq!(asteroid.pos.y, ASTEROID_SPAWN_Y);
        }
    }

    #[test]
    fn test_cargo_unavailable_after_session_spawn() {
        let mut run = MinigameRun::new(FIELD, MinigameTuning::default(), false);
        run.start();
        let mut rng = ScriptedRng::constant(0.0);
        for _ in 0..50 {
            run.step(40.0, SteerInput::default(), &mut rng);
        }
        assert!(!run.cargo_spawned());
        assert!(run.pickups.iter().all(|p| p.kind != PickupKind::Cargo));
    }

    #[test]
    fn test_booster_spawns_every_thirty_seconds() {
        let mut run = running(MinigameTuning {
            oxygen_drain_amount: 0.0,
            ..Default::default()
        });
        let mut rng = quiet_rng();
        for _ in 0..750 {
            run.step(40.0, SteerInput::default(), &mut rng);
        }
        let boosters = run
            .pickups
            .iter()
            .filter(|p| matches!(p.kind, PickupKind::Booster(_)))
            .count();
        assert_eq!(boosters, 1);
    }

    #[test]
    fn test_steering_clamped_to_playfield() {
        let mut run = running(MinigameTuning::default());
        let mut rng = quiet_rng();
        let left = SteerInput {
            left: true,
            right: false,
        };
        run.step(40.0, left, &mut rng);
        assert!((run.shuttle.x - 184.0).abs() < 1e-4);
        for _ in 0..100 {
            run.step(40.0, left, &mut rng);
        }
        assert_eq!(run.shuttle.x, 18.0);
    }

    #[test]
    fn test_ascent_speeds_up() {
        let mut run = running(MinigameTuning {
            oxygen_drain_amount: 0.0,
            ..Default::default()
        });
        let mut rng = quiet_rng();
        for _ in 0..250 {
            run.step(40.0, SteerInput::default(), &mut rng);
        }
        let first = run.distance;
        for _ in 0..250 {
            run.step(40.0, SteerInput::default(), &mut rng);
        }
        let second = run.distance - first;
        assert!(first > 1500.0);
        assert!(second > first);
    }

    #[test]
    fn test_apply_report_transfers_rewards() {
        let mut state = GameState::new();
        state.energy = 50.0;
        let report = FlightReport {
            collected_energy: 80.0,
            found_boosters: vec![BoosterKind::Deposit, BoosterKind::Credit],
            final_position: Vec2::ZERO,
            distance: 420.0,
            cargo_spawned: true,
            missions_completed: 1,
        };
        apply_report(&mut state, &report, 1234.0);

        assert_eq!(state.energy, 100.0);
        assert_eq!(state.boosters.len(), 2);
        assert_eq!(state.boosters[1].start_time, 1234.0);
        assert_eq!(state.boosters[1].duration_ms, 600_000.0);
        assert_eq!(state.total_distance, 420.0);
        assert_eq!(state.missions_completed, 1);
        assert!(state.session_cargo_spawned);
    }
}
