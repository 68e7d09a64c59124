//! Game orchestrator
//!
//! `Game` is the single owner of the simulation state. Platform code feeds it
//! `InputEvent`s and calls `frame` once per animation frame; it reads back a
//! `FrameSnapshot` for drawing and `Notice`s for the HUD.

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::GameError;
use crate::persistence::{self, Storage};
use crate::platform::Clock;
use crate::sim::{
    BoosterKind, FlightEvent, FlightReport, FlightScheduler, FlightTicket, GameState,
    MinigameRun, ProductKind, SteerInput, activate_booster, apply_report, begin_exploration,
    reveal, tick, upgrade,
};
use crate::tuning::Tuning;
use crate::view::{Camera, FrameSnapshot, planet_at};

/// Steering direction held by a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerKey {
    Left,
    Right,
}

/// Input from the platform layer, already in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Click/tap on the map
    Tap(Vec2),
    /// Map drag by a screen-space delta
    Drag(Vec2),
    /// Arrow key pressed or released
    Key { key: SteerKey, held: bool },
    /// Pointer/touch pressed on the flight playfield
    PointerDown(Vec2),
    PointerUp,
    Resize(Vec2),
    UpgradeStation,
    BuyBooster(BoosterKind),
    /// Wipe the save and start a fresh station
    ResetProgress,
}

/// User-visible outcome of an action or frame
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    AreaRevealed { planet: Option<ProductKind> },
    ExplorationStarted { product: ProductKind, cost: f64 },
    ExplorationInProgress { product: ProductKind, progress: f64 },
    PlanetExplored { product: ProductKind, reward: f64 },
    StationUpgraded { level: u32, name: &'static str },
    BoosterActivated(BoosterKind),
    FlightLaunched,
    FlightEnded(FlightReport),
    ProgressReset,
    Rejected(GameError),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::AreaRevealed { planet: Some(product) } => {
                write!(f, "New planet found: {}", product.name())
            }
            Notice::AreaRevealed { planet: None } => write!(f, "Area revealed"),
            Notice::ExplorationStarted { product, cost } => {
                write!(f, "Exploring {} (-{:.0} energy)", product.name(), cost)
            }
            Notice::ExplorationInProgress { product, progress } => {
                write!(f, "{}: {:.0}% explored", product.name(), progress)
            }
            Notice::PlanetExplored { product, reward } => {
                write!(f, "{} explored! +{:.0} energy", product.name(), reward)
            }
            Notice::StationUpgraded { level, name } => {
                write!(f, "Station upgraded to level {} ({})", level, name)
            }
            Notice::BoosterActivated(kind) => write!(f, "{} booster active", kind.name()),
            Notice::FlightLaunched => write!(f, "Shuttle launched"),
            Notice::FlightEnded(report) => write!(
                f,
                "Flight over: +{:.0} energy, {} booster(s)",
                report.collected_energy,
                report.found_boosters.len()
            ),
            Notice::ProgressReset => write!(f, "Progress reset"),
            Notice::Rejected(err) => write!(f, "{}", err),
        }
    }
}

/// Game instance holding all state
pub struct Game<S: Storage> {
    state: GameState,
    camera: Camera,
    scheduler: FlightScheduler,
    flight: Option<(FlightTicket, MinigameRun)>,
    rng: Pcg32,
    tuning: Tuning,
    storage: S,
    keys: SteerInput,
    pointer: SteerInput,
    last_frame: Option<f64>,
    since_save_ms: f64,
    notices: Vec<Notice>,
}

impl<S: Storage> Game<S> {
    /// Load the saved state (or start fresh) and set up a camera over `viewport`
    pub fn new(storage: S, tuning: Tuning, viewport: Vec2, seed: u64) -> Self {
        let state = persistence::load_state(&storage);
        log::info!(
            "Station level {} with {:.1} energy, {} planet(s)",
            state.station_level,
            state.energy,
            state.planets.len()
        );
        Self {
            state,
            camera: Camera::new(viewport),
            scheduler: FlightScheduler::new(tuning.route_preview_delay_ms, tuning.launch_delay_ms),
            flight: None,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            storage,
            keys: SteerInput::default(),
            pointer: SteerInput::default(),
            last_frame: None,
            since_save_ms: 0.0,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn in_flight(&self) -> bool {
        self.flight.is_some()
    }

    /// Notices produced since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(
            &self.state,
            &self.camera,
            self.scheduler.route(),
            self.flight.as_ref().map(|(_, run)| run),
        )
    }

    /// Route one input event
    pub fn handle<C: Clock + ?Sized>(&mut self, event: InputEvent, clock: &C) {
        match event {
            InputEvent::Tap(screen) => {
                if self.in_flight() {
                    log::debug!("Map tap ignored during flight");
                    return;
                }
                self.tap(screen, clock);
            }
            InputEvent::Drag(delta) => {
                if !self.in_flight() {
                    self.camera.drag(delta);
                }
            }
            InputEvent::Key { key, held } => match key {
                SteerKey::Left => self.keys.left = held,
                SteerKey::Right => self.keys.right = held,
            },
            InputEvent::PointerDown(screen) => {
                if self.in_flight() {
                    let left = screen.x < self.camera.viewport.x / 2.0;
                    self.pointer = SteerInput { left, right: !left };
                }
            }
            InputEvent::PointerUp => self.pointer = SteerInput::default(),
            InputEvent::Resize(viewport) => self.camera.resize(viewport),
            InputEvent::UpgradeStation => {
                match upgrade(&mut self.state) {
                    Ok(()) => {
                        let level = self.state.level();
                        self.notices.push(Notice::StationUpgraded {
                            level: level.level,
                            name: level.name,
                        });
                        self.save();
                    }
                    Err(e) => self.reject(e),
                }
            }
            InputEvent::BuyBooster(kind) => {
                match activate_booster(&mut self.state, kind, clock.wall_ms()) {
                    Ok(()) => {
                        self.notices.push(Notice::BoosterActivated(kind));
                        self.save();
                    }
                    Err(e) => self.reject(e),
                }
            }
            InputEvent::ResetProgress => self.reset(),
        }
    }

    /// Abandon any pending or active flight and start over from a fresh state
    fn reset(&mut self) {
        self.scheduler.cancel();
        self.flight = None;
        self.keys = SteerInput::default();
        self.pointer = SteerInput::default();
        self.state = GameState::new();
        persistence::clear_state(&self.storage);
        self.since_save_ms = 0.0;
        self.notices.push(Notice::ProgressReset);
    }

    fn tap<C: Clock + ?Sized>(&mut self, screen: Vec2, clock: &C) {
        if let Some(id) = planet_at(&self.state.planets, &self.camera, screen) {
            self.explore(id);
            return;
        }

        let target = self.camera.screen_to_world(screen);
        let outcome = reveal(&mut self.state, target, &self.tuning.fog, &mut self.rng);
        let planet = outcome
            .planet
            .and_then(|id| self.state.planet(id))
            .map(|p| p.product);
        self.notices.push(Notice::AreaRevealed { planet });

        let origin = self.camera.screen_to_world(self.camera.station_screen());
        self.scheduler.schedule(origin, target, clock.frame_ms());
        self.save();
    }

    fn explore(&mut self, id: u64) {
        let Some(planet) = self.state.planet(id) else {
            self.reject(GameError::PlanetNotFound(id));
            return;
        };
        let (product, progress) = (planet.product, planet.exploration_progress);

        match begin_exploration(&mut self.state, id) {
            Ok(()) => {
                self.notices.push(Notice::ExplorationStarted {
                    product,
                    cost: product.explore_cost(),
                });
                self.save();
            }
            Err(GameError::AlreadyExploring) => {
                self.notices
                    .push(Notice::ExplorationInProgress { product, progress });
            }
            Err(e) => self.reject(e),
        }
    }

    fn reject(&mut self, err: GameError) {
        log::info!("Action rejected: {}", err);
        self.notices.push(Notice::Rejected(err));
    }

    /// Advance one animation frame
    pub fn frame<C: Clock + ?Sized>(&mut self, clock: &C) {
        let now = clock.frame_ms();
        let wall = clock.wall_ms();
        let frame_dt = self.last_frame.map_or(0.0, |last| (now - last).max(0.0));
        self.last_frame = Some(now);
        let station_dt = frame_dt.min(self.tuning.max_station_dt_ms);

        let ticked = tick(&mut self.state, station_dt, wall);
        for id in &ticked.explored {
            if let Some(planet) = self.state.planet(*id) {
                self.notices.push(Notice::PlanetExplored {
                    product: planet.product,
                    reward: planet.explore_reward(),
                });
            }
        }
        if !ticked.explored.is_empty() {
            self.save();
        }

        while let Some(event) = self.scheduler.poll(now) {
            match event {
                FlightEvent::PreviewShown(_) => log::debug!("Route preview shown"),
                FlightEvent::Launch(ticket) => self.launch(ticket),
            }
        }

        self.step_flight(frame_dt, wall);

        self.since_save_ms += station_dt;
        if self.since_save_ms >= self.tuning.autosave_interval_ms {
            self.save();
        }
    }

    fn launch(&mut self, ticket: FlightTicket) {
        let mut run = MinigameRun::new(
            self.camera.viewport,
            self.tuning.minigame.clone(),
            !self.state.session_cargo_spawned,
        );
        run.start();
        self.flight = Some((ticket, run));
        self.pointer = SteerInput::default();
        self.notices.push(Notice::FlightLaunched);
    }

    fn step_flight(&mut self, dt_ms: f64, wall: f64) {
        let input = SteerInput {
            left: self.keys.left || self.pointer.left,
            right: self.keys.right || self.pointer.right,
        };
        let Some((ticket, run)) = self.flight.as_mut() else {
            return;
        };
        let Some(report) = run.step(dt_ms, input, &mut self.rng) else {
            return;
        };
        let ticket = *ticket;
        self.flight = None;
        self.pointer = SteerInput::default();

        if self.scheduler.finish(ticket) {
            apply_report(&mut self.state, &report, wall);
            log::info!(
                "Flight report applied: +{:.1} energy, {} booster(s), {:.0} distance",
                report.collected_energy,
                report.found_boosters.len(),
                report.distance
            );
            self.notices.push(Notice::FlightEnded(report));
            self.save();
        }
    }

    fn save(&mut self) {
        persistence::save_state(&self.storage, &self.state);
        self.since_save_ms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStorage, SAVE_KEY};
    use crate::platform::ManualClock;
    use crate::sim::{Planet, PlanetStatus};

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn game_with(state: Option<GameState>) -> Game<MemoryStorage> {
        let storage = MemoryStorage::new();
        if let Some(state) = state {
            persistence::save_state(&storage, &state);
        }
        Game::new(storage, Tuning::default(), VIEWPORT, 7)
    }

    fn run_frames(game: &mut Game<MemoryStorage>, clock: &mut ManualClock, step: f64, count: usize) {
        for _ in 0..count {
            clock.advance(step);
            game.frame(clock);
        }
    }

    #[test]
    fn test_tap_reveals_and_launches_flight() {
        let mut game = game_with(None);
        let mut clock = ManualClock::new(1_000_000.0);
        game.frame(&clock);

        game.handle(InputEvent::Tap(Vec2::new(600.0, 300.0)), &clock);
        assert_eq!(game.state().discovered_areas.len(), 2);
        assert_eq!(game.state().discovered_areas[1].center, Vec2::new(200.0, 0.0));
        assert!(matches!(game.take_notices()[0], Notice::AreaRevealed { .. }));
        assert!(game.snapshot().route.is_none());

        run_frames(&mut game, &mut clock, 100.0, 5);
        assert!(game.snapshot().route.is_some());
        assert!(!game.in_flight());

        run_frames(&mut game, &mut clock, 100.0, 10);
        assert!(game.in_flight());
        assert!(game.take_notices().contains(&Notice::FlightLaunched));
        assert!(game.snapshot().flight.is_some());

        // Map taps are ignored while flying
        game.handle(InputEvent::Tap(Vec2::new(100.0, 100.0)), &clock);
        assert_eq!(game.state().discovered_areas.len(), 2);
    }

    #[test]
    fn test_flight_report_merged_into_state() {
        let mut game = game_with(None);
        let mut clock = ManualClock::new(1_000_000.0);
        game.frame(&clock);
        game.handle(InputEvent::Tap(Vec2::new(400.0, 100.0)), &clock);
        run_frames(&mut game, &mut clock, 100.0, 15);
        assert!(game.in_flight());

        let mut frames = 0;
        while game.in_flight() {
            run_frames(&mut game, &mut clock, 40.0, 1);
            frames += 1;
            assert!(frames < 5_000, "flight never ended");
        }

        assert!(game.state().total_distance > 0.0);
        assert!(game.snapshot().route.is_none());
        assert!(game
            .take_notices()
            .iter()
            .any(|n| matches!(n, Notice::FlightEnded(_))));

        let saved = persistence::load_state(game.storage());
        assert!((saved.total_distance - game.state().total_distance).abs() < 1e-6);
    }

    #[test]
    fn test_tap_on_planet_starts_exploration() {
        let mut state = GameState::new();
        let id = state.next_planet_id();
        state
            .planets
            .push(Planet::new(id, Vec2::new(100.0, 0.0), ProductKind::Deposit));
        let mut game = game_with(Some(state));
        let clock = ManualClock::new(0.0);

        // Planet at world (100, 0) sits at screen (500, 300)
        game.handle(InputEvent::Tap(Vec2::new(500.0, 300.0)), &clock);
        assert_eq!(game.state().energy, 10.0);
        assert_eq!(game.state().planets[0].status, PlanetStatus::Exploring);
        assert_eq!(
            game.take_notices(),
            vec![Notice::ExplorationStarted {
                product: ProductKind::Deposit,
                cost: 10.0
            }]
        );
        // No reveal happened
        assert_eq!(game.state().discovered_areas.len(), 1);

        game.handle(InputEvent::Tap(Vec2::new(500.0, 300.0)), &clock);
        assert_eq!(
            game.take_notices(),
            vec![Notice::ExplorationInProgress {
                product: ProductKind::Deposit,
                progress: 0.0
            }]
        );
    }

    #[test]
    fn test_exploration_completes_over_frames() {
        let mut state = GameState::new();
        let id = state.next_planet_id();
        state
            .planets
            .push(Planet::new(id, Vec2::new(100.0, 0.0), ProductKind::Deposit));
        let mut game = game_with(Some(state));
        let mut clock = ManualClock::new(0.0);
        game.frame(&clock);
        game.handle(InputEvent::Tap(Vec2::new(500.0, 300.0)), &clock);
        game.take_notices();

        run_frames(&mut game, &mut clock, 100.0, 100);
        assert_eq!(game.state().planets[0].status, PlanetStatus::Explored);
        assert!(game.take_notices().contains(&Notice::PlanetExplored {
            product: ProductKind::Deposit,
            reward: 50.0
        }));
        assert!(game.state().energy >= 60.0);
    }

    #[test]
    fn test_rejected_actions_become_notices() {
        let mut game = game_with(None);
        let clock = ManualClock::new(0.0);

        game.handle(InputEvent::UpgradeStation, &clock);
        game.handle(InputEvent::BuyBooster(BoosterKind::Investment), &clock);
        assert_eq!(
            game.take_notices(),
            vec![
                Notice::Rejected(GameError::InsufficientEnergy {
                    required: 100.0,
                    available: 20.0
                }),
                Notice::Rejected(GameError::InsufficientEnergy {
                    required: 200.0,
                    available: 20.0
                }),
            ]
        );
        assert_eq!(game.state().station_level, 1);
        assert_eq!(game.state().energy, 20.0);
    }

    #[test]
    fn test_credit_booster_purchase() {
        let mut game = game_with(None);
        let clock = ManualClock::new(5_000.0);
        game.handle(InputEvent::BuyBooster(BoosterKind::Credit), &clock);
        assert_eq!(game.state().energy, 100.0);
        assert_eq!(game.state().boosters.len(), 1);
        assert_eq!(game.state().boosters[0].start_time, 5_000.0);
    }

    #[test]
    fn test_station_dt_capped() {
        let mut game = game_with(None);
        let mut clock = ManualClock::new(0.0);
        game.frame(&clock);
        // A one-hour stall only accrues 200 ms of income
        clock.advance(3_600_000.0);
        game.frame(&clock);
        let expected = 20.0 + 10.0 / 3600.0 * 0.2;
        assert!((game.state().energy - expected).abs() < 1e-9);
    }

    #[test]
    fn test_autosave_interval() {
        let mut game = game_with(None);
        let mut clock = ManualClock::new(0.0);
        game.frame(&clock);
        run_frames(&mut game, &mut clock, 100.0, 49);
        assert!(game.storage().get(SAVE_KEY).unwrap().is_none());
        run_frames(&mut game, &mut clock, 100.0, 1);
        assert!(game.storage().get(SAVE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_drag_moves_camera() {
        let mut game = game_with(None);
        let clock = ManualClock::new(0.0);
        game.handle(InputEvent::Drag(Vec2::new(50.0, -20.0)), &clock);
        assert_eq!(game.camera().offset, Vec2::new(-450.0, -280.0));
    }

    #[test]
    fn test_pointer_halves_steer_only_in_flight() {
        let mut game = game_with(None);
        let mut clock = ManualClock::new(0.0);
        game.frame(&clock);
        game.handle(InputEvent::PointerDown(Vec2::new(10.0, 10.0)), &clock);
        assert_eq!(game.pointer, SteerInput::default());

        game.handle(InputEvent::Tap(Vec2::new(400.0, 100.0)), &clock);
        run_frames(&mut game, &mut clock, 100.0, 15);
        assert!(game.in_flight());
        game.handle(InputEvent::PointerDown(Vec2::new(10.0, 10.0)), &clock);
        assert!(game.pointer.left && !game.pointer.right);
        game.handle(InputEvent::PointerDown(Vec2::new(700.0, 10.0)), &clock);
        assert!(game.pointer.right && !game.pointer.left);
        game.handle(InputEvent::PointerUp, &clock);
        assert_eq!(game.pointer, SteerInput::default());
    }

    #[test]
    fn test_reset_cancels_flight_and_clears_save() {
        let mut game = game_with(None);
        let mut clock = ManualClock::new(0.0);
        game.frame(&clock);
        game.handle(InputEvent::BuyBooster(BoosterKind::Credit), &clock);
        game.handle(InputEvent::Tap(Vec2::new(400.0, 100.0)), &clock);
        assert!(game.storage().get(SAVE_KEY).unwrap().is_some());
        run_frames(&mut game, &mut clock, 100.0, 15);
        assert!(game.in_flight());

        game.handle(InputEvent::ResetProgress, &clock);
        assert!(!game.in_flight());
        assert!(game.snapshot().route.is_none());
        assert_eq!(game.state(), &GameState::new());
        assert!(game.storage().get(SAVE_KEY).unwrap().is_none());
        assert!(game.take_notices().contains(&Notice::ProgressReset));

        // The cancelled flight never relaunches
        run_frames(&mut game, &mut clock, 100.0, 30);
        assert!(!game.in_flight());
        assert_eq!(game.state().discovered_areas.len(), 1);
    }

    #[test]
    fn test_reset_while_preview_pending() {
        let mut game = game_with(None);
        let mut clock = ManualClock::new(0.0);
        game.frame(&clock);
        game.handle(InputEvent::Tap(Vec2::new(400.0, 100.0)), &clock);
        run_frames(&mut game, &mut clock, 100.0, 2);
        game.handle(InputEvent::ResetProgress, &clock);
        run_frames(&mut game, &mut clock, 100.0, 30);
        assert!(!game.in_flight());
        assert!(game.snapshot().route.is_none());
    }
}
