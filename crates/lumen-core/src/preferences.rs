//! Durable viewer preferences: volume and last playback position.

use crate::Result;
use std::collections::HashMap;
use tracing::warn;

/// String-keyed durable storage (browser `localStorage`, a file, memory)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed access to the two stored scalars
pub struct PreferenceStore {
    store: Box<dyn KeyValueStore>,
    volume_key: String,
    position_key: String,
}

impl PreferenceStore {
    pub fn new(
        store: Box<dyn KeyValueStore>,
        volume_key: impl Into<String>,
        position_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            volume_key: volume_key.into(),
            position_key: position_key.into(),
        }
    }

    /// Stored volume fraction, if one was saved
    pub fn volume(&self) -> Option<f64> {
        self.read_number(&self.volume_key)
    }

    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.store.set(&self.volume_key, &volume.to_string())
    }

    /// Stored last playback position in seconds, if one was saved
    pub fn last_position(&self) -> Option<f64> {
        self.read_number(&self.position_key)
    }

    pub fn set_last_position(&mut self, seconds: f64) -> Result<()> {
        self.store.set(&self.position_key, &seconds.to_string())
    }

    fn read_number(&self, key: &str) -> Option<f64> {
        let raw = self.store.get(key)?;
        if raw.is_empty() {
            return None;
        }
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                warn!(key, value = %raw, "Ignoring unreadable stored preference");
                None
            }
        }
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("volume_key", &self.volume_key)
            .field("position_key", &self.position_key)
            .finish()
    }
}
