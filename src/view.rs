//! Camera, hit testing and render snapshots
//!
//! The renderer only ever sees a `FrameSnapshot`; it never reads or mutates
//! simulation state directly. The station and its home area are pinned to the
//! viewport centre and are never culled.

use glam::Vec2;
use serde::Serialize;

use crate::consts::*;
use crate::sim::minigame::{Asteroid, MinigameRun, Pickup};
use crate::sim::{
    BoosterKind, GameState, Planet, PlanetStatus, ProductKind, ResourceKind, RevealedArea,
    RoutePreview,
};

/// Screen-space camera over the unbounded world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World position of the screen's top-left corner
    pub offset: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    /// Camera with the world origin at the viewport centre
    pub fn new(viewport: Vec2) -> Self {
        Self {
            offset: -viewport / 2.0,
            viewport,
        }
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Drag the map by a screen-space delta
    pub fn drag(&mut self, delta: Vec2) {
        self.offset = (self.offset - delta).clamp(Vec2::splat(-WORLD_SIZE), Vec2::splat(WORLD_SIZE));
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.offset
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }

    /// Where the station is drawn
    pub fn station_screen(&self) -> Vec2 {
        self.viewport / 2.0
    }

    /// Whether a circle at a screen position overlaps the viewport
    pub fn circle_on_screen(&self, screen: Vec2, radius: f32) -> bool {
        screen.x + radius >= 0.0
            && screen.x - radius <= self.viewport.x
            && screen.y + radius >= 0.0
            && screen.y - radius <= self.viewport.y
    }

    fn area_screen(&self, area: &RevealedArea) -> Vec2 {
        if area.home {
            self.station_screen()
        } else {
            self.world_to_screen(area.center)
        }
    }
}

/// Screen rectangle of an idle planet's explore button (centre, half extents)
fn explore_button(planet_screen: Vec2) -> (Vec2, Vec2) {
    let center = Vec2::new(
        planet_screen.x,
        planet_screen.y + PLANET_RADIUS + EXPLORE_BUTTON_GAP + EXPLORE_BUTTON_HEIGHT / 2.0,
    );
    (
        center,
        Vec2::new(EXPLORE_BUTTON_HALF_WIDTH, EXPLORE_BUTTON_HEIGHT / 2.0),
    )
}

/// The planet under a tap, if any
pub fn planet_at(planets: &[Planet], camera: &Camera, tap: Vec2) -> Option<u64> {
    planets.iter().find_map(|planet| {
        let screen = camera.world_to_screen(planet.position);
        if crate::distance(tap, screen) <= PLANET_RADIUS {
            return Some(planet.id);
        }
        if planet.status == PlanetStatus::Idle {
            let (center, half) = explore_button(screen);
            let d = (tap - center).abs();
            if d.x <= half.x && d.y <= half.y {
                return Some(planet.id);
            }
        }
        None
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaView {
    pub screen: Vec2,
    pub radius: f32,
    /// Screen position and kind of the resource marker
    pub resource: Option<(Vec2, ResourceKind)>,
    pub home: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanetView {
    pub id: u64,
    pub screen: Vec2,
    pub product: ProductKind,
    pub name: &'static str,
    pub status: PlanetStatus,
    pub progress: f64,
    pub explore_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteView {
    pub from: Vec2,
    pub to: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudView {
    pub energy: f64,
    pub capacity: f64,
    pub energy_per_hour: f64,
    pub level: u32,
    pub level_name: &'static str,
    pub active_boosters: Vec<BoosterKind>,
    pub missions_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightView {
    pub playfield: Vec2,
    pub shuttle: Vec2,
    pub oxygen: f64,
    pub collected_energy: f64,
    pub asteroids: Vec<Asteroid>,
    pub pickups: Vec<Pickup>,
    pub found_boosters: Vec<BoosterKind>,
    pub elapsed_ms: f64,
}

impl From<&MinigameRun> for FlightView {
    fn from(run: &MinigameRun) -> Self {
        Self {
            playfield: run.playfield,
            shuttle: run.shuttle,
            oxygen: run.oxygen,
            collected_energy: run.collected_energy,
            asteroids: run.asteroids.clone(),
            pickups: run.pickups.clone(),
            found_boosters: run.found_boosters.clone(),
            elapsed_ms: run.elapsed_ms,
        }
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub camera: Vec2,
    pub station: Vec2,
    pub hud: HudView,
    pub areas: Vec<AreaView>,
    pub planets: Vec<PlanetView>,
    pub route: Option<RouteView>,
    pub flight: Option<FlightView>,
}

impl FrameSnapshot {
    pub fn capture(
        state: &GameState,
        camera: &Camera,
        route: Option<&RoutePreview>,
        flight: Option<&MinigameRun>,
    ) -> Self {
        let level = state.level();
        let hud = HudView {
            energy: state.energy,
            capacity: level.capacity,
            energy_per_hour: level.energy_per_hour,
            level: level.level,
            level_name: level.name,
            active_boosters: state.boosters.iter().map(|b| b.kind).collect(),
            missions_completed: state.missions_completed,
        };

        let areas = state
            .discovered_areas
            .iter()
            .filter_map(|area| {
                let screen = camera.area_screen(area);
                if !area.home && !camera.circle_on_screen(screen, area.radius) {
                    return None;
                }
                Some(AreaView {
                    screen,
                    radius: area.radius,
                    resource: area
                        .has_resource
                        .then(|| (screen + area.resource_offset, area.resource_kind)),
                    home: area.home,
                })
            })
            .collect();

        let planets = state
            .planets
            .iter()
            .filter_map(|planet| {
                let screen = camera.world_to_screen(planet.position);
                camera
                    .circle_on_screen(screen, PLANET_RADIUS)
                    .then(|| PlanetView {
                        id: planet.id,
                        screen,
                        product: planet.product,
                        name: planet.product.name(),
                        status: planet.status,
                        progress: planet.exploration_progress,
                        explore_cost: planet.explore_cost(),
                    })
            })
            .collect();

        let route = route.filter(|r| r.visible).map(|r| RouteView {
            from: camera.station_screen(),
            to: camera.world_to_screen(r.target),
        });

        Self {
            camera: camera.offset,
            station: camera.station_screen(),
            hud,
            areas,
            planets,
            route,
            flight: flight.map(FlightView::from),
        }
    }
}
