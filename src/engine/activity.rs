//! Sliding-window inactivity detection
//!
//! Every sensor delta is appended to the step history. Once the oldest entry
//! is older than the window, the history is pruned to the window and the
//! steps left in it decide the state: enough steps keeps the walk `Active`,
//! too few makes it `Idle`, which resets the accumulated progress on the
//! spot. `Idle` is not sticky; the next delta starts a fresh walk.

use crate::core::config::EngineConfig;
use crate::core::types::Millis;
use crate::store::{ProgressState, StepEntry};

/// What happened when a walk went idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactiveSignal {
    /// Accumulated steps wiped by the reset
    pub steps_before_reset: u32,
    /// Steps found inside the window
    pub steps_in_window: u32,
    /// Whether the walk was long enough to deserve an "inactive" message
    pub notify: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Active,
    Idle(InactiveSignal),
}

#[derive(Debug, Clone)]
pub struct ActivityWindow {
    window_ms: Millis,
    min_steps_in_window: u32,
    walk_threshold_steps: u32,
    max_entries: usize,
}

impl ActivityWindow {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            window_ms: config.window_ms,
            min_steps_in_window: config.min_steps_in_window,
            walk_threshold_steps: config.walk_threshold_steps,
            max_entries: config.max_history_entries,
        }
    }

    /// Record a sensor delta and re-check activity
    pub fn ingest(
        &self,
        state: &mut ProgressState,
        steps: u32,
        distance_m: f64,
        now: Millis,
    ) -> ActivityState {
        state.add_steps(steps, distance_m);
        state.history.push(StepEntry {
            timestamp: now,
            steps,
        });

        if state.history.len() > self.max_entries {
            let excess = state.history.len() - self.max_entries;
            state.history.drain(..excess);
        }

        self.check_inactivity(state, now)
    }

    /// Prune the history and reset progress if the window is too quiet
    ///
    /// Does nothing until the history spans at least one full window.
    pub fn check_inactivity(&self, state: &mut ProgressState, now: Millis) -> ActivityState {
        let cutoff = now - self.window_ms;

        match state.history.first() {
            Some(oldest) if oldest.timestamp <= cutoff => {}
            _ => return ActivityState::Active,
        }

        state.history.retain(|entry| entry.timestamp >= cutoff);
        let in_window: u64 = state.history.iter().map(|e| u64::from(e.steps)).sum();

        if in_window >= u64::from(self.min_steps_in_window) {
            return ActivityState::Active;
        }

        let signal = InactiveSignal {
            steps_before_reset: state.total_steps,
            steps_in_window: u32::try_from(in_window).unwrap_or(u32::MAX),
            notify: state.total_steps >= self.walk_threshold_steps,
        };
        state.reset_progress();

        tracing::info!(
            "Walk went idle: {} steps in window, {} accumulated steps reset",
            signal.steps_in_window,
            signal.steps_before_reset
        );
        ActivityState::Idle(signal)
    }
}
