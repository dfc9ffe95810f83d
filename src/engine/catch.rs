//! Catch cycles: which creature, if any, is discovered next
//!
//! A cycle runs only once enough steps have accumulated and the cooldown
//! since the previous cycle has passed. Within a cycle uncaught creatures are
//! tried in catalog order, weather-dependent ones last, and at most one of
//! them is caught.

use std::sync::Arc;

use rand::Rng;

use super::activity::{ActivityState, ActivityWindow};
use super::evaluator::{meets_calendar, meets_progress, meets_weather, EvaluationContext};
use super::messages::{pick, CAUGHT_LABELS, INACTIVE_LABELS, MISSED_LABELS};
use crate::core::calendar::CachedCalendar;
use crate::core::config::EngineConfig;
use crate::core::types::{Millis, Moment};
use crate::creature::{Catalog, Creature};
use crate::store::ProgressState;
use crate::weather::{WeatherCache, WeatherSnapshot, WeatherSource};

/// Result of feeding one sensor delta through the engine
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub activity: ActivityState,
    /// Whether a catch cycle ran for this delta
    pub checked: bool,
    pub caught: Option<Creature>,
}

pub struct CatchEngine<S> {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    window: ActivityWindow,
    calendar: CachedCalendar,
    weather: Arc<WeatherCache<S>>,
}

impl<S: WeatherSource> CatchEngine<S> {
    pub fn new(catalog: Arc<Catalog>, config: EngineConfig, weather: Arc<WeatherCache<S>>) -> Self {
        Self {
            window: ActivityWindow::new(&config),
            calendar: CachedCalendar::new(),
            catalog,
            config,
            weather,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ingest a sensor delta, then run a catch cycle if one is due
    ///
    /// `distance_m` is the measured distance for the delta; without one it
    /// is derived from the configured stride.
    pub async fn handle_steps<R: Rng + Send>(
        &mut self,
        state: &mut ProgressState,
        steps: u32,
        distance_m: Option<f64>,
        now: Moment,
        rng: &mut R,
    ) -> StepOutcome {
        let at = now.millis();
        let distance = distance_m.unwrap_or(f64::from(steps) * self.config.stride_m);

        let activity = self.window.ingest(state, steps, distance, at);
        if let ActivityState::Idle(signal) = activity {
            if signal.notify {
                let message = pick(INACTIVE_LABELS, rng);
                state.set_encouragement(message, at, self.config.encouragement_hold_ms);
            }
        }

        let mut outcome = StepOutcome {
            activity,
            checked: false,
            caught: None,
        };

        if self.check_due(state, at) {
            state.last_check = Some(at);
            outcome.checked = true;
            outcome.caught = self.evaluate_cycle(state, now, rng).await;
        }

        outcome
    }

    /// Step threshold reached and cooldown elapsed
    pub fn check_due(&self, state: &ProgressState, now: Millis) -> bool {
        state.total_steps >= self.config.check_threshold_steps
            && state
                .last_check
                .map_or(true, |last| now - last > self.config.check_cooldown_ms)
    }

    /// Run one catch cycle against `state` as of `now`
    ///
    /// Returns the creature caught, if any. A catch marks it caught, queues
    /// it as new and resets accumulated progress; misses leave progress alone.
    pub async fn evaluate_cycle<R: Rng + Send>(
        &mut self,
        state: &mut ProgressState,
        now: Moment,
        rng: &mut R,
    ) -> Option<Creature> {
        let at = now.millis();
        let local = now.local();
        let hold = self.config.encouragement_hold_ms;

        let ctx = EvaluationContext {
            total_steps: state.total_steps,
            total_distance_m: state.total_distance_m,
            now: local,
            holidays: self.calendar.for_date(local.date()),
        };

        let mut candidates: Vec<&Creature> = self.catalog.uncaught(&state.caught).collect();
        candidates.sort_by_key(|c| c.needs_weather());

        tracing::debug!(
            "Catch cycle at {} with {} steps, {} candidates",
            local,
            ctx.total_steps,
            candidates.len()
        );

        // Looked up at most once per cycle, and only if a candidate gets that far
        let mut weather: Option<Option<WeatherSnapshot>> = None;

        for creature in candidates {
            let requirements = &creature.requirements;
            if !meets_progress(requirements, &ctx) || !meets_calendar(requirements, &ctx) {
                continue;
            }

            if creature.needs_weather() {
                if weather.is_none() {
                    weather = Some(self.weather.current(at).await);
                }
                let snapshot = weather.as_ref().and_then(Option::as_ref);
                if !meets_weather(requirements, snapshot) {
                    continue;
                }
            }

            let roll: f64 = rng.gen();
            if roll <= creature.probability {
                state.mark_caught(creature.id);
                state.enqueue_new(creature.id);
                state.set_encouragement(pick(CAUGHT_LABELS, rng), at, hold);
                state.reset_progress();

                tracing::info!(
                    "Caught {} ({}) with roll {:.3} <= {:.2}",
                    creature.name,
                    creature.id,
                    roll,
                    creature.probability
                );
                return Some(creature.clone());
            }

            tracing::debug!(
                "Near miss on {} ({}): roll {:.3} > {:.2}",
                creature.name,
                creature.id,
                roll,
                creature.probability
            );
            state.set_encouragement(pick(MISSED_LABELS, rng), at, hold);
        }

        None
    }
}
