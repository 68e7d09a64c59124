//! Fog-of-war map
//!
//! The world is unbounded; visibility is the union of stored circles.
//! Areas are never removed or merged, so overlapping reveals simply stack.

use glam::Vec2;
use rand::Rng;

use super::planet::spawn_planet;
use super::state::{GameState, ResourceKind, RevealedArea};
use crate::tuning::FogTuning;

/// Result of a reveal action
#[derive(Debug, Clone, PartialEq)]
pub struct RevealOutcome {
    pub area: RevealedArea,
    /// Id of the planet spawned by this reveal, if any
    pub planet: Option<u64>,
}

/// True iff `point` lies within any revealed area
pub fn is_revealed(areas: &[RevealedArea], point: Vec2) -> bool {
    areas.iter().any(|area| area.contains(point))
}

/// Reveal a circle at `point`, possibly with a resource marker and a planet
pub fn reveal<R: Rng + ?Sized>(
    state: &mut GameState,
    point: Vec2,
    tuning: &FogTuning,
    rng: &mut R,
) -> RevealOutcome {
    let radius = tuning.reveal_radius;
    let has_resource = rng.random::<f64>() < tuning.resource_chance;
    let resource_kind = if rng.random::<f64>() < tuning.energy_share {
        ResourceKind::Energy
    } else {
        ResourceKind::Oxygen
    };

    // Each axis lands within ±(radius - 20) / 2 of the centre
    let resource_offset = if has_resource {
        let spread = (radius - 20.0).max(0.0);
        Vec2::new(
            (rng.random::<f32>() - 0.5) * spread,
            (rng.random::<f32>() - 0.5) * spread,
        )
    } else {
        Vec2::ZERO
    };

    let area = RevealedArea {
        center: point,
        radius,
        has_resource,
        resource_kind,
        resource_offset,
        home: false,
    };
    state.discovered_areas.push(area.clone());

    let planet = if rng.random::<f64>() < tuning.planet_chance {
        Some(spawn_planet(state, point, rng))
    } else {
        None
    };

    log::debug!(
        "Revealed area at ({:.0}, {:.0}), resource: {}, planet: {:?}",
        point.x,
        point.y,
        has_resource,
        planet
    );

    RevealOutcome { area, planet }
}
