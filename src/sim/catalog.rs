//! Static product, booster and station tables

use serde::{Deserialize, Serialize};

/// Financial product a planet represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductKind {
    Deposit,
    Credit,
    Investment,
    Insurance,
    Card,
    Mortgage,
    Business,
    Pension,
}

impl ProductKind {
    pub const ALL: [ProductKind; 8] = [
        ProductKind::Deposit,
        ProductKind::Credit,
        ProductKind::Investment,
        ProductKind::Insurance,
        ProductKind::Card,
        ProductKind::Mortgage,
        ProductKind::Business,
        ProductKind::Pension,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProductKind::Deposit => "Cosmic Deposit",
            ProductKind::Credit => "Stellar Credit",
            ProductKind::Investment => "Galaxy Investments",
            ProductKind::Insurance => "Orbit Insurance",
            ProductKind::Card => "Cosmos Card",
            ProductKind::Mortgage => "Satellite Mortgage",
            ProductKind::Business => "Asteroid Business",
            ProductKind::Pension => "Celestial Pension",
        }
    }

    /// Energy deducted when exploration starts
    pub fn explore_cost(&self) -> f64 {
        match self {
            ProductKind::Deposit => 10.0,
            ProductKind::Credit => 15.0,
            ProductKind::Investment => 20.0,
            ProductKind::Insurance => 25.0,
            ProductKind::Card => 12.0,
            ProductKind::Mortgage => 30.0,
            ProductKind::Business => 35.0,
            ProductKind::Pension => 18.0,
        }
    }

    /// Energy credited when exploration completes
    pub fn explore_reward(&self) -> f64 {
        self.explore_cost() * 5.0
    }
}

/// Time-limited station booster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoosterKind {
    Deposit,
    Credit,
    Investment,
}

impl BoosterKind {
    pub const ALL: [BoosterKind; 3] = [
        BoosterKind::Deposit,
        BoosterKind::Credit,
        BoosterKind::Investment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BoosterKind::Deposit => "Deposit",
            BoosterKind::Credit => "Credit",
            BoosterKind::Investment => "Investments",
        }
    }

    /// Purchase price at the station panel
    pub fn cost(&self) -> f64 {
        match self {
            BoosterKind::Deposit => 50.0,
            BoosterKind::Credit => 0.0,
            BoosterKind::Investment => 200.0,
        }
    }

    /// Income multiplier while active (flat-bonus boosters have none)
    pub fn multiplier(&self) -> Option<f64> {
        match self {
            BoosterKind::Deposit => Some(1.5),
            BoosterKind::Credit => None,
            BoosterKind::Investment => Some(2.0),
        }
    }

    /// One-time energy granted on purchase
    pub fn activation_bonus(&self) -> Option<f64> {
        match self {
            BoosterKind::Credit => Some(100.0),
            _ => None,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        match self {
            BoosterKind::Deposit => 300_000.0,
            BoosterKind::Credit => 600_000.0,
            BoosterKind::Investment => 1_800_000.0,
        }
    }
}

/// One row of the station level table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationLevel {
    pub level: u32,
    pub name: &'static str,
    pub energy_per_hour: f64,
    pub capacity: f64,
    /// Price to reach this level from the previous one
    pub upgrade_cost: f64,
}

pub const STATION_LEVELS: [StationLevel; 5] = [
    StationLevel {
        level: 1,
        name: "Base Station",
        energy_per_hour: 10.0,
        capacity: 100.0,
        upgrade_cost: 0.0,
    },
    StationLevel {
        level: 2,
        name: "Improved Station",
        energy_per_hour: 25.0,
        capacity: 250.0,
        upgrade_cost: 100.0,
    },
    StationLevel {
        level: 3,
        name: "Advanced Station",
        energy_per_hour: 50.0,
        capacity: 500.0,
        upgrade_cost: 300.0,
    },
    StationLevel {
        level: 4,
        name: "Elite Station",
        energy_per_hour: 100.0,
        capacity: 1000.0,
        upgrade_cost: 800.0,
    },
    StationLevel {
        level: 5,
        name: "Space Fortress",
        energy_per_hour: 200.0,
        capacity: 2000.0,
        upgrade_cost: 2000.0,
    },
];

pub const MAX_STATION_LEVEL: u32 = STATION_LEVELS.len() as u32;

/// Table row for a level; out-of-range levels fall back to the first row
pub fn station_level(level: u32) -> &'static StationLevel {
    STATION_LEVELS
        .iter()
        .find(|l| l.level == level)
        .unwrap_or(&STATION_LEVELS[0])
}

/// Row for the level after `level`, if any
pub fn next_station_level(level: u32) -> Option<&'static StationLevel> {
    STATION_LEVELS.iter().find(|l| l.level == level + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_table_ascending() {
        for pair in STATION_LEVELS.windows(2) {
            assert_eq!(pair[1].level, pair[0].level + 1);
            assert!(pair[1].capacity > pair[0].capacity);
            assert!(pair[1].energy_per_hour > pair[0].energy_per_hour);
        }
    }

    #[test]
    fn test_product_rewards() {
        assert_eq!(ProductKind::Deposit.explore_reward(), 50.0);
        assert_eq!(ProductKind::Business.explore_reward(), 175.0);
        assert_eq!(ProductKind::Pension.explore_reward(), 90.0);
    }

    #[test]
    fn test_unknown_level_falls_back() {
        assert_eq!(station_level(0).level, 1);
        assert_eq!(station_level(99).level, 1);
        assert!(next_station_level(MAX_STATION_LEVEL).is_none());
    }
}
