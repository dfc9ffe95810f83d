//! Charmings - Walk Simulator
//!
//! Drives the step tracker from the terminal. Time is simulated: `walk` and
//! `wait` move a manual clock forward, so catch cadence and inactivity can be
//! tried out without actually waiting.

use charmings::core::calendar::{holidays_for_year, CachedCalendar};
use charmings::core::clock::{Clock, ManualClock};
use charmings::core::config::AppConfig;
use charmings::core::error::Result;
use charmings::core::types::CreatureId;
use charmings::creature::Catalog;
use charmings::engine::CatchEngine;
use charmings::store::{JsonFileStore, ProgressStore};
use charmings::tracker::{StepTracker, TrackerEvent, TrackerHandle};
use charmings::weather::client::WeatherApiClient;
use charmings::weather::WeatherCache;

use chrono::{Datelike, Duration, Local};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "charmings")]
#[command(about = "Walk around and discover creatures")]
struct Args {
    /// Configuration file (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Progress file, overrides the configured storage path
    #[arg(long)]
    store: Option<PathBuf>,

    /// Seed for catch rolls (random if not provided)
    #[arg(long)]
    seed: Option<u64>,

    /// Never ask the weather service; weather-bound creatures stay hidden
    #[arg(long)]
    offline: bool,
}

struct Session {
    handle: TrackerHandle,
    events: UnboundedReceiver<TrackerEvent>,
    clock: ManualClock,
    catalog: Arc<Catalog>,
    calendar: CachedCalendar,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("charmings=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    config.validate()?;

    let catalog = Arc::new(Catalog::builtin()?);
    tracing::info!("Loaded {} creatures", catalog.len());

    let source = if args.offline {
        None
    } else {
        match WeatherApiClient::from_config(&config.weather) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Running without weather: {}", e);
                None
            }
        }
    };

    let rt = Runtime::new()?;

    let weather = Arc::new(WeatherCache::from_config(source, &config.weather));
    let engine = CatchEngine::new(Arc::clone(&catalog), config.engine.clone(), weather);

    let store_path = args.store.unwrap_or(config.storage.path.clone());
    let progress = ProgressStore::new(JsonFileStore::open(&store_path)?);

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::debug!("Catch roll seed: {}", seed);
    let rng = ChaCha8Rng::seed_from_u64(seed);

    let clock = ManualClock::new(Local::now().fixed_offset());

    let (handle, events) = {
        let _guard = rt.enter();
        StepTracker::spawn(engine, progress, Arc::new(clock.clone()), rng)
    };

    let mut session = Session {
        handle,
        events,
        clock,
        catalog,
        calendar: CachedCalendar::new(),
    };

    println!("\n=== CHARMINGS ===");
    println!("Progress file: {}", store_path.display());
    println!();
    println!("Commands:");
    println!("  walk <steps> [minutes] - Walk, spreading steps over minutes (default 1)");
    println!("  wait <minutes>         - Let time pass without walking");
    println!("  status / s             - Show walk progress");
    println!("  caught                 - List caught creatures");
    println!("  new                    - List catches not yet looked at");
    println!("  ack <id>               - Mark a new catch as seen");
    println!("  holidays [year]        - Show the holiday table");
    println!("  quit / q               - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }

        if let Err(e) = rt.block_on(run_command(&mut session, input)) {
            println!("Error: {}", e);
        }
    }

    rt.block_on(async {
        session.handle.shutdown().await?;
        session.handle.stopped().await;
        Ok::<_, charmings::core::error::CharmError>(())
    })?;

    println!("Progress saved. Goodbye!");
    Ok(())
}

async fn run_command(session: &mut Session, input: &str) -> Result<()> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    match parts.as_slice() {
        ["walk", steps, rest @ ..] => {
            let Ok(steps) = steps.parse::<u32>() else {
                println!("Usage: walk <steps> [minutes]");
                return Ok(());
            };
            let minutes = match rest.first() {
                Some(m) => m.parse::<u32>().unwrap_or(1).max(1),
                None => 1,
            };
            walk(session, steps, minutes).await?;
        }
        ["wait", minutes] => match minutes.parse::<i64>() {
            Ok(minutes) => {
                session.clock.advance(Duration::minutes(minutes));
                println!("{} minutes pass...", minutes);
            }
            Err(_) => println!("Usage: wait <minutes>"),
        },
        ["status"] | ["s"] => show_status(session).await?,
        ["caught"] => {
            let state = session.handle.snapshot().await?;
            for creature in session.catalog.caught(&state.caught) {
                println!("  {} {} - {}", creature.id, creature.name, creature.description);
            }
            println!(
                "{} of {} creatures caught",
                state.caught.len(),
                session.catalog.len()
            );
        }
        ["new"] => {
            let state = session.handle.snapshot().await?;
            if state.new_catches.is_empty() {
                println!("No new catches");
            }
            for id in &state.new_catches {
                if let Some(creature) = session.catalog.get(*id) {
                    println!("  {} {}: \"{}\"", creature.id, creature.name, creature.story);
                }
            }
        }
        ["ack", id] => match id.trim_start_matches('#').parse::<u32>() {
            Ok(id) => {
                if session.handle.acknowledge(CreatureId(id)).await? {
                    println!("Marked #{} as seen", id);
                } else {
                    println!("#{} is not a new catch", id);
                }
            }
            Err(_) => println!("Usage: ack <id>"),
        },
        ["holidays"] | ["holidays", _] => {
            let year = match parts.get(1) {
                Some(y) => match y.parse::<i32>() {
                    Ok(year) => year,
                    Err(_) => {
                        println!("Usage: holidays [year]");
                        return Ok(());
                    }
                },
                None => session.clock.now().local().year(),
            };
            let table = holidays_for_year(year);
            let mut dates: Vec<_> = table.iter().collect();
            dates.sort_by_key(|(_, date)| *date);
            for (holiday, date) in dates {
                println!("  {}  {}", date, holiday.name());
            }
        }
        _ => println!("Unknown command: {}", input),
    }

    Ok(())
}

/// Feed `steps` to the tracker one simulated minute at a time
async fn walk(session: &mut Session, steps: u32, minutes: u32) -> Result<()> {
    let per_minute = steps / minutes;
    let remainder = steps % minutes;

    for minute in 0..minutes {
        session.clock.advance(Duration::minutes(1));
        let batch = if minute == 0 {
            per_minute + remainder
        } else {
            per_minute
        };
        session.handle.send_steps(batch, None).await?;
    }

    // Snapshot returns once every batch above has been processed
    let state = session.handle.snapshot().await?;
    while let Ok(event) = session.events.try_recv() {
        match event {
            TrackerEvent::Caught(creature) => {
                println!("*** You found {}! ***", creature.name);
                println!("    \"{}\"", creature.story);
            }
            TrackerEvent::Inactive(signal) => {
                println!(
                    "You rested too long: {} steps of progress reset",
                    signal.steps_before_reset
                );
            }
            TrackerEvent::Progress { .. } => {}
        }
    }

    if let Some(text) = state.encouragement_text() {
        println!("{}", text);
    }
    println!(
        "Steps: {}  Distance: {:.0} m",
        state.total_steps, state.total_distance_m
    );
    Ok(())
}

async fn show_status(session: &mut Session) -> Result<()> {
    let state = session.handle.snapshot().await?;
    let now = session.clock.now().local();

    println!("Time: {}", now.format("%Y-%m-%d %H:%M (%A)"));
    if let Some(holiday) = session.calendar.today(now.date()) {
        println!("Today is {}", holiday.name());
    }
    println!("Steps: {}", state.total_steps);
    println!("Distance: {:.0} m", state.total_distance_m);
    println!(
        "Caught: {} of {} ({} new)",
        state.caught.len(),
        session.catalog.len(),
        state.new_catches.len()
    );
    let hiding = session.catalog.uncaught(&state.caught).count();
    println!("Still hiding: {}", hiding);
    if let Some(text) = state.encouragement_text() {
        println!("\"{}\"", text);
    }
    println!(
        "Tracker: {}",
        if session.handle.is_running() {
            "running"
        } else {
            "stopped"
        }
    );
    Ok(())
}
