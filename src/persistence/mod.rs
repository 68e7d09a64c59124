//! Save/load through an opaque key-value store
//!
//! Features:
//! - JSON payload of `GameState`
//! - Field-by-field default merging: a field that fails to parse keeps its
//!   default while every other field survives
//! - Fire-and-forget saves: failures are logged, never propagated to gameplay

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::GameError;
use crate::sim::GameState;

/// LocalStorage key of the save
pub const SAVE_KEY: &str = "cosmo_station_state";

/// Key-value storage collaborator
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, GameError>;
    fn set(&self, key: &str, value: &str) -> Result<(), GameError>;
    fn remove(&self, key: &str) -> Result<(), GameError>;
}

/// In-process storage for native runs and tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, GameError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GameError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), GameError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, GameError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| GameError::PersistenceUnavailable("no LocalStorage".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, GameError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| GameError::PersistenceUnavailable(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GameError> {
        // Quota errors surface here
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| GameError::PersistenceUnavailable(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), GameError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| GameError::PersistenceUnavailable(format!("{:?}", e)))
    }
}

/// Decode a saved payload, merging it field by field over the defaults
pub fn decode_state(json: &str) -> GameState {
    let parsed = match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            log::warn!("Save payload is not an object, using defaults");
            return GameState::new();
        }
        Err(e) => {
            log::warn!("Corrupt save payload ({}), using defaults", e);
            return GameState::new();
        }
    };

    let mut merged = match serde_json::to_value(GameState::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for (key, value) in parsed {
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value);
        if serde_json::from_value::<GameState>(Value::Object(candidate.clone())).is_ok() {
            merged = candidate;
        } else {
            log::warn!("Dropping unreadable save field '{}'", key);
        }
    }

    let mut state = serde_json::from_value::<GameState>(Value::Object(merged)).unwrap_or_default();
    state.sanitize();
    state
}

/// Load the saved state, falling back to a fresh one on any failure
pub fn load_state(storage: &dyn Storage) -> GameState {
    let mut state = match storage.get(SAVE_KEY) {
        Ok(Some(json)) => {
            log::info!("Loaded save from storage");
            decode_state(&json)
        }
        Ok(None) => {
            log::info!("No save found, starting fresh");
            GameState::new()
        }
        Err(e) => {
            log::warn!("{}; starting fresh", e);
            GameState::new()
        }
    };
    // The cargo flag only lasts one session
    state.session_cargo_spawned = false;
    state
}

/// Save the state; failures are logged and otherwise ignored
pub fn save_state(storage: &dyn Storage, state: &GameState) {
    let result = serde_json::to_string(state)
        .map_err(|e| GameError::PersistenceUnavailable(e.to_string()))
        .and_then(|json| storage.set(SAVE_KEY, &json));
    if let Err(e) = result {
        log::warn!("Save skipped: {}", e);
    }
}

/// Remove the save
pub fn clear_state(storage: &dyn Storage) {
    if let Err(e) = storage.remove(SAVE_KEY) {
        log::warn!("Could not clear save: {}", e);
    } else {
        log::info!("Saved game cleared");
    }
}
