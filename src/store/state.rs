//! Mutable walk progress owned by the tracker

use serde::{Deserialize, Serialize};

use crate::core::types::{CreatureId, Millis};

/// One sensor delta in the sliding step history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEntry {
    pub timestamp: Millis,
    pub steps: u32,
}

/// Message shown to the walker, with the time it went up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encouragement {
    pub message: String,
    pub set_at: Millis,
}

/// Everything the engine mutates between sensor events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    pub total_steps: u32,
    pub total_distance_m: f64,
    /// Chronological step deltas, oldest first
    pub history: Vec<StepEntry>,
    /// When the last catch cycle ran
    pub last_check: Option<Millis>,
    /// Caught creature ids in catch order, without duplicates
    pub caught: Vec<CreatureId>,
    /// Catches the walker has not looked at yet
    pub new_catches: Vec<CreatureId>,
    pub encouragement: Option<Encouragement>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_caught(&self, id: CreatureId) -> bool {
        self.caught.contains(&id)
    }

    /// Record a catch; returns false if it was already caught
    pub fn mark_caught(&mut self, id: CreatureId) -> bool {
        if self.is_caught(id) {
            return false;
        }
        self.caught.push(id);
        true
    }

    pub fn enqueue_new(&mut self, id: CreatureId) {
        if !self.new_catches.contains(&id) {
            self.new_catches.push(id);
        }
    }

    /// Drop `id` from the unseen queue; returns whether it was queued
    pub fn acknowledge(&mut self, id: CreatureId) -> bool {
        let before = self.new_catches.len();
        self.new_catches.retain(|queued| *queued != id);
        self.new_catches.len() != before
    }

    /// Grant the first-run companion if it has never been caught
    pub fn seed_starter(&mut self, id: CreatureId) -> bool {
        if self.mark_caught(id) {
            self.enqueue_new(id);
            true
        } else {
            false
        }
    }

    pub fn add_steps(&mut self, steps: u32, distance_m: f64) {
        self.total_steps = self.total_steps.saturating_add(steps);
        self.total_distance_m += distance_m.max(0.0);
    }

    /// Start accumulating from zero again
    pub fn reset_progress(&mut self) {
        self.total_steps = 0;
        self.total_distance_m = 0.0;
        self.last_check = None;
    }

    /// Replace the message unless the current one went up less than `hold_ms` ago
    pub fn set_encouragement(&mut self, message: &str, now: Millis, hold_ms: Millis) -> bool {
        if let Some(current) = &self.encouragement {
            if now - current.set_at < hold_ms {
                return false;
            }
        }
        self.force_encouragement(message, now);
        true
    }

    pub fn force_encouragement(&mut self, message: &str, now: Millis) {
        self.encouragement = Some(Encouragement {
            message: message.to_string(),
            set_at: now,
        });
    }

    pub fn encouragement_text(&self) -> Option<&str> {
        self.encouragement.as_ref().map(|e| e.message.as_str())
    }
}
