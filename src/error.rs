//! Recoverable game errors
//!
//! Every variant blocks the requested transition and is surfaced to the
//! player as a notice. None of them are fatal.

/// Errors returned by station, planet and persistence operations
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// Not enough station energy for the action
    InsufficientEnergy { required: f64, available: f64 },
    /// Planet is already being explored
    AlreadyExploring,
    /// Planet exploration already finished
    AlreadyExplored,
    /// Station is at the top of the level table
    MaxLevelReached,
    /// No planet with this id
    PlanetNotFound(u64),
    /// Storage backend missing or rejected the operation
    PersistenceUnavailable(String),
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::InsufficientEnergy {
                required,
                available,
            } => write!(
                f,
                "Not enough energy: need {}, have {}",
                required.ceil(),
                available.floor()
            ),
            GameError::AlreadyExploring => write!(f, "Planet is already being explored"),
            GameError::AlreadyExplored => write!(f, "Planet is already explored"),
            GameError::MaxLevelReached => write!(f, "Station is at maximum level"),
            GameError::PlanetNotFound(id) => write!(f, "No planet with id {}", id),
            GameError::PersistenceUnavailable(reason) => {
                write!(f, "Storage unavailable: {}", reason)
            }
        }
    }
}

impl std::error::Error for GameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_energy_message() {
        let err = GameError::InsufficientEnergy {
            required: 10.0,
            available: 5.7,
        };
        assert_eq!(err.to_string(), "Not enough energy: need 10, have 5");
    }
}
