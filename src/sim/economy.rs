//! Station economy: passive income, boosters and upgrades

use super::catalog::{BoosterKind, next_station_level};
use super::state::{ActiveBooster, GameState};
use crate::GameError;

/// Drop boosters whose duration has elapsed at wall-clock `now`
pub fn prune_boosters(state: &mut GameState, now: f64) {
    let before = state.boosters.len();
    state.boosters.retain(|b| !b.is_expired(now));
    let expired = before - state.boosters.len();
    if expired > 0 {
        log::info!("{} booster(s) expired", expired);
    }
}

/// Accrue passive income for `dt_ms`, keeping energy within `[0, capacity]`
pub fn accrue(state: &mut GameState, dt_ms: f64, now: f64) {
    prune_boosters(state, now);

    let per_second = state.level().energy_per_hour / 3600.0 * state.booster_multiplier(now);
    let gained = per_second * dt_ms.max(0.0) / 1000.0;
    state.credit_energy(gained);
}

/// Buy the next station level
pub fn upgrade(state: &mut GameState) -> Result<(), GameError> {
    let next = next_station_level(state.station_level).ok_or(GameError::MaxLevelReached)?;
    if state.energy < next.upgrade_cost {
        return Err(GameError::InsufficientEnergy {
            required: next.upgrade_cost,
            available: state.energy,
        });
    }

    state.energy -= next.upgrade_cost;
    state.station_level = next.level;
    log::info!("Station upgraded to level {} ({})", next.level, next.name);
    Ok(())
}

/// Buy a booster at the station panel
pub fn activate_booster(state: &mut GameState, kind: BoosterKind, now: f64) -> Result<(), GameError> {
    let cost = kind.cost();
    if state.energy < cost {
        return Err(GameError::InsufficientEnergy {
            required: cost,
            available: state.energy,
        });
    }

    state.energy -= cost;
    if let Some(bonus) = kind.activation_bonus() {
        state.credit_energy(bonus);
    }
    state.boosters.push(ActiveBooster::new(kind, now));
    log::info!("Booster {} activated", kind.name());
    Ok(())
}
