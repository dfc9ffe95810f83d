//! Catch engine integration tests
//!
//! Rolls are made deterministic with `StepRng`: `StepRng::new(0, 0)` always
//! rolls 0.0, so every creature whose clauses hold is caught, and
//! [`high_roll`] rolls just under 1.0, so only certain catches succeed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{FixedOffset, TimeZone};
use rand::rngs::mock::StepRng;

use charmings::core::config::EngineConfig;
use charmings::core::error::{CharmError, Result};
use charmings::core::types::{CreatureId, Millis, Moment};
use charmings::creature::{Catalog, Creature, HourRange, Requirement};
use charmings::engine::messages::{CAUGHT_LABELS, MISSED_LABELS};
use charmings::engine::{ActivityState, CatchEngine};
use charmings::store::ProgressState;
use charmings::weather::{Location, WeatherCache, WeatherSnapshot, WeatherSource};

// ============================================================================
// Fixtures
// ============================================================================

const MINUTE: i64 = 60 * 1000;

struct StubWeather {
    snapshot: Option<WeatherSnapshot>,
    calls: AtomicUsize,
}

impl StubWeather {
    fn sunny() -> Self {
        Self {
            snapshot: Some(WeatherSnapshot {
                temperature_c: 21.0,
                wind_kph: 8.0,
                wind_direction: "SW".into(),
                condition: "Sunny".into(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    fn broken() -> Self {
        Self {
            snapshot: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl WeatherSource for StubWeather {
    async fn current(&self, _location: Location) -> Result<WeatherSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.snapshot
            .clone()
            .ok_or_else(|| CharmError::Weather("service down".into()))
    }
}

/// Rolls 1 - 2^-32; the low word stays zero so label picks never reject
fn high_roll() -> StepRng {
    StepRng::new(0xFFFF_FFFF_0000_0000, 0)
}

fn creature(id: u32, probability: f64, requirements: Vec<Requirement>) -> Creature {
    Creature {
        id: CreatureId(id),
        name: format!("creature-{}", id),
        description: String::new(),
        story: String::new(),
        image: format!("image_{}", id),
        requirements_text: String::new(),
        probability,
        requirements,
    }
}

fn sunny_only() -> Vec<Requirement> {
    vec![Requirement {
        weather: Some(vec!["sunny".into()]),
        ..Default::default()
    }]
}

fn engine_with(
    creatures: Vec<Creature>,
    source: StubWeather,
) -> (CatchEngine<StubWeather>, Arc<WeatherCache<StubWeather>>) {
    let catalog = Arc::new(Catalog::from_creatures(creatures).unwrap());
    let cache = Arc::new(WeatherCache::new(
        source,
        Location::new(50.4501, 30.5234),
        60 * MINUTE,
    ));
    let engine = CatchEngine::new(catalog, EngineConfig::default(), Arc::clone(&cache));
    (engine, cache)
}

fn kyiv(y: i32, m: u32, d: u32, h: u32, min: u32) -> Moment {
    let offset = FixedOffset::east_opt(2 * 3600).unwrap();
    Moment::new(offset.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
}

fn later(start: Moment, ms: Millis) -> Moment {
    Moment::new(start.instant() + chrono::Duration::milliseconds(ms))
}

fn walked(steps: u32) -> ProgressState {
    let mut state = ProgressState::new();
    state.total_steps = steps;
    state.total_distance_m = f64::from(steps) * 0.75;
    state
}

// ============================================================================
// Catch cycles
// ============================================================================

/// Several certain catches in one cycle still yield a single discovery
#[tokio::test]
async fn test_at_most_one_catch_per_cycle() {
    let (mut engine, _) = engine_with(
        vec![
            creature(1, 1.0, vec![]),
            creature(2, 1.0, vec![]),
            creature(3, 1.0, vec![]),
        ],
        StubWeather::sunny(),
    );
    let mut state = walked(500);
    let mut rng = StepRng::new(0, 0);

    let caught = engine
        .evaluate_cycle(&mut state, kyiv(2025, 6, 2, 12, 0), &mut rng)
        .await
        .unwrap();

    assert_eq!(caught.id, CreatureId(1));
    assert_eq!(state.caught, vec![CreatureId(1)]);
    assert_eq!(state.new_catches, vec![CreatureId(1)]);
    assert_eq!(state.total_steps, 0);
    assert_eq!(state.total_distance_m, 0.0);
    assert!(CAUGHT_LABELS.contains(&state.encouragement_text().unwrap()));
}

#[tokio::test]
async fn test_caught_creatures_are_skipped() {
    let (mut engine, _) = engine_with(
        vec![creature(1, 1.0, vec![]), creature(2, 1.0, vec![])],
        StubWeather::sunny(),
    );
    let mut state = walked(500);
    state.mark_caught(CreatureId(1));

    let caught = engine
        .evaluate_cycle(&mut state, kyiv(2025, 6, 2, 12, 0), &mut StepRng::new(0, 0))
        .await;

    assert_eq!(caught.map(|c| c.id), Some(CreatureId(2)));
    assert_eq!(state.caught, vec![CreatureId(1), CreatureId(2)]);
}

/// Weather-bound creatures go last, so an earlier catch never hits the network
#[tokio::test]
async fn test_weather_dependent_creatures_evaluated_last() {
    let (mut engine, cache) = engine_with(
        vec![creature(1, 1.0, sunny_only()), creature(2, 1.0, vec![])],
        StubWeather::sunny(),
    );
    let mut state = walked(500);

    let caught = engine
        .evaluate_cycle(&mut state, kyiv(2025, 6, 2, 12, 0), &mut StepRng::new(0, 0))
        .await;

    assert_eq!(caught.map(|c| c.id), Some(CreatureId(2)));
    assert_eq!(cache.source().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_weather_looked_up_once_per_cycle() {
    let (mut engine, cache) = engine_with(
        vec![
            creature(1, 0.5, sunny_only()),
            creature(2, 0.5, sunny_only()),
            creature(3, 0.5, sunny_only()),
        ],
        StubWeather::sunny(),
    );
    let mut state = walked(500);

    let caught = engine
        .evaluate_cycle(
            &mut state,
            kyiv(2025, 6, 2, 12, 0),
            &mut high_roll(),
        )
        .await;

    assert!(caught.is_none());
    assert_eq!(cache.source().calls.load(Ordering::SeqCst), 1);
}

/// Misses leave progress alone and move on to the next candidate
#[tokio::test]
async fn test_near_miss_continues_to_next_candidate() {
    let (mut engine, _) = engine_with(
        vec![creature(1, 0.5, vec![]), creature(2, 1.0, vec![])],
        StubWeather::sunny(),
    );
    let mut state = walked(500);

    let caught = engine
        .evaluate_cycle(
            &mut state,
            kyiv(2025, 6, 2, 12, 0),
            &mut high_roll(),
        )
        .await;

    assert_eq!(caught.map(|c| c.id), Some(CreatureId(2)));
    // The miss message went up first and is still inside its hold time
    assert!(MISSED_LABELS.contains(&state.encouragement_text().unwrap()));
}

#[tokio::test]
async fn test_miss_keeps_progress() {
    let (mut engine, _) = engine_with(vec![creature(1, 0.5, vec![])], StubWeather::sunny());
    let mut state = walked(500);

    let caught = engine
        .evaluate_cycle(
            &mut state,
            kyiv(2025, 6, 2, 12, 0),
            &mut high_roll(),
        )
        .await;

    assert!(caught.is_none());
    assert_eq!(state.total_steps, 500);
    assert!(state.caught.is_empty());
    assert!(MISSED_LABELS.contains(&state.encouragement_text().unwrap()));
}

/// Without weather, weather-bound creatures are never caught
#[tokio::test]
async fn test_unavailable_weather_fails_closed() {
    let (mut engine, cache) = engine_with(
        vec![
            creature(1, 1.0, sunny_only()),
            creature(
                2,
                1.0,
                vec![Requirement {
                    steps: Some(10_000),
                    ..Default::default()
                }],
            ),
        ],
        StubWeather::broken(),
    );
    let mut state = walked(500);

    let caught = engine
        .evaluate_cycle(&mut state, kyiv(2025, 6, 2, 12, 0), &mut StepRng::new(0, 0))
        .await;

    assert!(caught.is_none());
    assert_eq!(cache.source().calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.total_steps, 500);
}

#[tokio::test]
async fn test_night_creature_only_at_night() {
    let night = vec![Requirement {
        steps: Some(400),
        time: Some(HourRange::new(23, 5)),
        ..Default::default()
    }];
    let (mut engine, _) = engine_with(vec![creature(22, 1.0, night)], StubWeather::sunny());

    let mut state = walked(500);
    let noon = engine
        .evaluate_cycle(&mut state, kyiv(2025, 6, 2, 12, 0), &mut StepRng::new(0, 0))
        .await;
    assert!(noon.is_none());

    let night = engine
        .evaluate_cycle(&mut state, kyiv(2025, 6, 3, 2, 15), &mut StepRng::new(0, 0))
        .await;
    assert_eq!(night.map(|c| c.id), Some(CreatureId(22)));
}

#[tokio::test]
async fn test_holiday_creature_only_on_the_day() {
    let christmas = vec![Requirement {
        holiday: Some("Різдво".into()),
        ..Default::default()
    }];
    let (mut engine, _) = engine_with(vec![creature(60, 1.0, christmas)], StubWeather::sunny());

    let mut state = walked(500);
    let eve = engine
        .evaluate_cycle(&mut state, kyiv(2025, 12, 24, 18, 0), &mut StepRng::new(0, 0))
        .await;
    assert!(eve.is_none());

    let day = engine
        .evaluate_cycle(&mut state, kyiv(2025, 12, 25, 9, 0), &mut StepRng::new(0, 0))
        .await;
    assert_eq!(day.map(|c| c.id), Some(CreatureId(60)));
}

// ============================================================================
// Cadence
// ============================================================================

fn unreachable_catalog() -> Vec<Creature> {
    vec![creature(
        1,
        1.0,
        vec![Requirement {
            steps: Some(100_000),
            ..Default::default()
        }],
    )]
}

#[tokio::test]
async fn test_no_cycle_below_threshold() {
    let (mut engine, _) = engine_with(unreachable_catalog(), StubWeather::sunny());
    let mut state = ProgressState::new();
    let start = kyiv(2025, 6, 2, 12, 0);
    let mut rng = StepRng::new(0, 0);

    let outcome = engine
        .handle_steps(&mut state, 399, None, start, &mut rng)
        .await;
    assert!(!outcome.checked);
    assert_eq!(state.last_check, None);

    let outcome = engine
        .handle_steps(&mut state, 1, None, later(start, MINUTE), &mut rng)
        .await;
    assert!(outcome.checked);
    assert_eq!(outcome.activity, ActivityState::Active);
    assert_eq!(state.last_check, Some(later(start, MINUTE).millis()));
}

#[tokio::test]
async fn test_cooldown_is_strictly_three_minutes() {
    let (mut engine, _) = engine_with(unreachable_catalog(), StubWeather::sunny());
    let mut state = ProgressState::new();
    let start = kyiv(2025, 6, 2, 12, 0);
    let mut rng = StepRng::new(0, 0);

    assert!(
        engine
            .handle_steps(&mut state, 400, None, start, &mut rng)
            .await
            .checked
    );

    let at_two = engine
        .handle_steps(&mut state, 50, None, later(start, 2 * MINUTE), &mut rng)
        .await;
    assert!(!at_two.checked);

    let at_three = engine
        .handle_steps(&mut state, 50, None, later(start, 3 * MINUTE), &mut rng)
        .await;
    assert!(!at_three.checked);

    let after_three = engine
        .handle_steps(&mut state, 50, None, later(start, 3 * MINUTE + 1), &mut rng)
        .await;
    assert!(after_three.checked);
    assert_eq!(state.last_check, Some(later(start, 3 * MINUTE + 1).millis()));
}

#[tokio::test]
async fn test_catch_restarts_accumulation() {
    let (mut engine, _) = engine_with(
        vec![creature(1, 1.0, vec![]), creature(2, 1.0, vec![])],
        StubWeather::sunny(),
    );
    let mut state = ProgressState::new();
    let start = kyiv(2025, 6, 2, 12, 0);
    let mut rng = StepRng::new(0, 0);

    let first = engine
        .handle_steps(&mut state, 400, None, start, &mut rng)
        .await;
    assert_eq!(first.caught.map(|c| c.id), Some(CreatureId(1)));
    assert_eq!(state.total_steps, 0);
    assert_eq!(state.last_check, None);

    // Threshold has to be reached again, cooldown is irrelevant after a reset
    let short = engine
        .handle_steps(&mut state, 399, None, later(start, MINUTE), &mut rng)
        .await;
    assert!(!short.checked);

    let second = engine
        .handle_steps(&mut state, 1, None, later(start, 2 * MINUTE), &mut rng)
        .await;
    assert_eq!(second.caught.map(|c| c.id), Some(CreatureId(2)));
}

#[tokio::test]
async fn test_distance_defaults_to_stride() {
    let (mut engine, _) = engine_with(unreachable_catalog(), StubWeather::sunny());
    let mut state = ProgressState::new();
    let start = kyiv(2025, 6, 2, 12, 0);
    let mut rng = StepRng::new(0, 0);

    engine
        .handle_steps(&mut state, 100, None, start, &mut rng)
        .await;
    assert_eq!(state.total_distance_m, 75.0);

    engine
        .handle_steps(&mut state, 100, Some(90.0), later(start, MINUTE), &mut rng)
        .await;
    assert_eq!(state.total_distance_m, 165.0);
}

#[tokio::test]
async fn test_idle_walk_resets_before_cycle() {
    let (mut engine, _) = engine_with(vec![creature(1, 1.0, vec![])], StubWeather::sunny());
    let mut state = ProgressState::new();
    let start = kyiv(2025, 6, 2, 12, 0);
    let mut rng = StepRng::new(0, 0);

    engine
        .handle_steps(&mut state, 390, None, start, &mut rng)
        .await;

    // Only 15 steps in the last ten minutes: progress is wiped, so the
    // 405 accumulated steps never reach a cycle
    let outcome = engine
        .handle_steps(&mut state, 15, None, later(start, 11 * MINUTE), &mut rng)
        .await;

    let ActivityState::Idle(signal) = outcome.activity else {
        panic!("expected idle, got {:?}", outcome.activity);
    };
    assert_eq!(signal.steps_before_reset, 405);
    assert!(signal.notify);
    assert!(!outcome.checked);
    assert!(state.caught.is_empty());
    assert_eq!(state.total_steps, 0);
}

// ============================================================================
// Built-in catalog
// ============================================================================

#[tokio::test]
async fn test_builtin_catalog_offline_yields_only_fair_weather_creatures() {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let cache = Arc::new(WeatherCache::new(
        StubWeather::broken(),
        Location::new(50.4501, 30.5234),
        60 * MINUTE,
    ));
    let mut engine = CatchEngine::new(Arc::clone(&catalog), EngineConfig::default(), cache);
    let mut state = ProgressState::new();
    state.mark_caught(CreatureId(0));
    let now = kyiv(2025, 12, 25, 23, 30);

    for _ in 0..catalog.len() {
        state.total_steps = 100_000;
        state.total_distance_m = 75_000.0;
        if let Some(creature) = engine
            .evaluate_cycle(&mut state, now, &mut StepRng::new(0, 0))
            .await
        {
            assert!(!creature.needs_weather(), "{} needs weather", creature.name);
        }
    }

    assert!(state.caught.len() > 1);
    assert!(state.caught.contains(&CreatureId(21)));
    for id in &state.caught {
        assert!(!catalog.get(*id).unwrap().needs_weather());
    }
}
