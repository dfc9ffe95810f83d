//! Mapping of [`ProgressState`] onto the persistent key space
//!
//! Every key decodes on its own; a malformed value only loses that key.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::kv::KeyValueStore;
use super::state::{Encouragement, ProgressState};
use crate::core::error::Result;

pub const CAUGHT_KEY: &str = "caught_pets";
pub const NEW_CATCHES_KEY: &str = "new_catches";
pub const TOTAL_STEPS_KEY: &str = "total_steps";
pub const TOTAL_DISTANCE_KEY: &str = "total_distance";
pub const LAST_CHECK_KEY: &str = "last_pet_check";
pub const HISTORY_KEY: &str = "step_history";
pub const ENCOURAGEMENT_KEY: &str = "encouragement";
pub const ENCOURAGEMENT_TIME_KEY: &str = "encouragement_time";

/// Typed access to progress stored in a [`KeyValueStore`]
#[derive(Debug)]
pub struct ProgressStore<K> {
    kv: K,
}

impl<K: KeyValueStore> ProgressStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut K {
        &mut self.kv
    }

    pub fn load(&self) -> ProgressState {
        let encouragement = self.kv.get(ENCOURAGEMENT_KEY).map(|message| Encouragement {
            message,
            set_at: self.parsed(ENCOURAGEMENT_TIME_KEY).unwrap_or(0),
        });

        ProgressState {
            total_steps: self.parsed(TOTAL_STEPS_KEY).unwrap_or(0),
            total_distance_m: self.parsed(TOTAL_DISTANCE_KEY).unwrap_or(0.0),
            history: self.json_list(HISTORY_KEY),
            last_check: self.parsed(LAST_CHECK_KEY),
            caught: self.json_list(CAUGHT_KEY),
            new_catches: self.json_list(NEW_CATCHES_KEY),
            encouragement,
        }
    }

    /// Write every key, then commit them together
    pub fn save(&mut self, state: &ProgressState) -> Result<()> {
        self.put_json(CAUGHT_KEY, &state.caught)?;
        self.put_json(NEW_CATCHES_KEY, &state.new_catches)?;
        self.put_json(HISTORY_KEY, &state.history)?;
        self.kv.set(TOTAL_STEPS_KEY, state.total_steps.to_string());
        self.kv
            .set(TOTAL_DISTANCE_KEY, state.total_distance_m.to_string());

        match state.last_check {
            Some(at) => self.kv.set(LAST_CHECK_KEY, at.to_string()),
            None => self.kv.remove(LAST_CHECK_KEY),
        }

        match &state.encouragement {
            Some(e) => {
                self.kv.set(ENCOURAGEMENT_KEY, e.message.clone());
                self.kv.set(ENCOURAGEMENT_TIME_KEY, e.set_at.to_string());
            }
            None => {
                self.kv.remove(ENCOURAGEMENT_KEY);
                self.kv.remove(ENCOURAGEMENT_TIME_KEY);
            }
        }

        self.kv.commit()
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.kv.get(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring malformed value for {}: {:?}", key, raw);
                None
            }
        }
    }

    fn json_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(raw) = self.kv.get(key) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed list for {}: {}", key, e);
            Vec::new()
        })
    }

    fn put_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        self.kv.set(key, serde_json::to_string(value)?);
        Ok(())
    }
}
