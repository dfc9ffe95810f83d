//! Background step tracker
//!
//! One actor task owns the progress state. Sensor deltas, acknowledgements
//! and snapshot requests arrive as commands on a channel and are processed
//! one at a time, catch cycle and persistence included, so no two cycles
//! ever overlap and no update is lost between a sensor event and a reset.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::{mpsc, oneshot, watch};

use super::sensor::{SensorEvent, StepSensor};
use crate::core::clock::Clock;
use crate::core::error::{CharmError, Result};
use crate::core::types::{CreatureId, Moment};
use crate::creature::Creature;
use crate::engine::messages::{pick, START_LABELS};
use crate::engine::{ActivityState, CatchEngine, InactiveSignal};
use crate::store::{KeyValueStore, ProgressState, ProgressStore};
use crate::weather::WeatherSource;

const COMMAND_BUFFER: usize = 64;

/// Work for the actor; sensor deltas carry the time they were observed
#[derive(Debug)]
pub enum TrackerCommand {
    Steps {
        steps: u32,
        distance_m: Option<f64>,
        at: Moment,
    },
    Reading {
        event: SensorEvent,
        at: Moment,
    },
    Acknowledge {
        id: CreatureId,
        reply: oneshot::Sender<bool>,
    },
    Snapshot(oneshot::Sender<ProgressState>),
    Shutdown,
}

/// Notifications for whoever presents them to the walker
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    Caught(Creature),
    Inactive(InactiveSignal),
    Progress {
        total_steps: u32,
        total_distance_m: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerStatus {
    Running,
    Stopped,
}

/// Cloneable handle to a running [`StepTracker`]
///
/// Deltas are stamped with the tracker's clock when they are sent, so a
/// backlog in the command queue never shifts them in time.
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<TrackerCommand>,
    status: watch::Receiver<TrackerStatus>,
    clock: Arc<dyn Clock>,
}

impl TrackerHandle {
    /// Steps counted elsewhere, with an optional measured distance
    pub async fn send_steps(&self, steps: u32, distance_m: Option<f64>) -> Result<()> {
        self.send_steps_at(steps, distance_m, self.clock.now()).await
    }

    /// Steps observed at a known time
    pub async fn send_steps_at(
        &self,
        steps: u32,
        distance_m: Option<f64>,
        at: Moment,
    ) -> Result<()> {
        self.send(TrackerCommand::Steps {
            steps,
            distance_m,
            at,
        })
        .await
    }

    pub async fn send_reading(&self, event: SensorEvent) -> Result<()> {
        let at = self.clock.now();
        self.send(TrackerCommand::Reading { event, at }).await
    }

    /// Mark a new catch as seen; false if it was not queued
    pub async fn acknowledge(&self, id: CreatureId) -> Result<bool> {
        let (reply, response) = oneshot::channel();
        self.send(TrackerCommand::Acknowledge { id, reply }).await?;
        response.await.map_err(|_| CharmError::TrackerStopped)
    }

    /// Copy of the state after every command sent before this one
    pub async fn snapshot(&self) -> Result<ProgressState> {
        let (reply, response) = oneshot::channel();
        self.send(TrackerCommand::Snapshot(reply)).await?;
        response.await.map_err(|_| CharmError::TrackerStopped)
    }

    pub fn status(&self) -> TrackerStatus {
        *self.status.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.status() == TrackerStatus::Running
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(TrackerCommand::Shutdown).await
    }

    /// Wait until the actor has saved its final state and stopped
    pub async fn stopped(&mut self) {
        let _ = self
            .status
            .wait_for(|status| *status == TrackerStatus::Stopped)
            .await;
    }

    async fn send(&self, command: TrackerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CharmError::TrackerStopped)
    }
}

pub struct StepTracker<S, K, R> {
    engine: CatchEngine<S>,
    store: ProgressStore<K>,
    state: ProgressState,
    sensor: StepSensor,
    clock: Arc<dyn Clock>,
    rng: R,
    events: mpsc::UnboundedSender<TrackerEvent>,
    status: watch::Sender<TrackerStatus>,
}

impl<S, K, R> StepTracker<S, K, R>
where
    S: WeatherSource + 'static,
    K: KeyValueStore + 'static,
    R: Rng + Send + 'static,
{
    /// Load persisted progress, seed the starter and start the actor task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        engine: CatchEngine<S>,
        store: ProgressStore<K>,
        clock: Arc<dyn Clock>,
        rng: R,
    ) -> (TrackerHandle, mpsc::UnboundedReceiver<TrackerEvent>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(TrackerStatus::Running);

        let state = store.load();
        let handle_clock = Arc::clone(&clock);
        let mut tracker = Self {
            engine,
            store,
            state,
            sensor: StepSensor::new(),
            clock,
            rng,
            events: event_tx,
            status: status_tx,
        };
        tracker.initialize();

        tokio::spawn(tracker.run(command_rx));

        let handle = TrackerHandle {
            commands: command_tx,
            status: status_rx,
            clock: handle_clock,
        };
        (handle, event_rx)
    }

    fn initialize(&mut self) {
        if let Some(starter) = self.engine.config().starter_creature {
            if self.state.seed_starter(CreatureId(starter)) {
                tracing::info!("Seeded starter creature {}", CreatureId(starter));
            }
        }

        if self.state.encouragement.is_none() {
            let now = self.clock.now().millis();
            let label = pick(START_LABELS, &mut self.rng);
            self.state.force_encouragement(label, now);
        }

        self.persist();
    }

    async fn run(mut self, mut commands: mpsc::Receiver<TrackerCommand>) {
        tracing::info!(
            "Step tracker running with {} caught of {}",
            self.state.caught.len(),
            self.engine.catalog().len()
        );

        while let Some(command) = commands.recv().await {
            if !self.handle(command).await {
                break;
            }
        }
        drop(commands);

        self.persist();
        let _ = self.status.send(TrackerStatus::Stopped);
        tracing::info!("Step tracker stopped");
    }

    /// Process one command; false once the actor should stop
    async fn handle(&mut self, command: TrackerCommand) -> bool {
        match command {
            TrackerCommand::Steps {
                steps,
                distance_m,
                at,
            } => {
                self.ingest(steps, distance_m, at).await;
            }
            TrackerCommand::Reading { event, at } => {
                if let Some(steps) = self.sensor.on_event(event) {
                    self.ingest(steps, None, at).await;
                }
            }
            TrackerCommand::Acknowledge { id, reply } => {
                let removed = self.state.acknowledge(id);
                if removed {
                    self.persist();
                }
                let _ = reply.send(removed);
            }
            TrackerCommand::Snapshot(reply) => {
                let _ = reply.send(self.state.clone());
            }
            TrackerCommand::Shutdown => return false,
        }
        true
    }

    async fn ingest(&mut self, steps: u32, distance_m: Option<f64>, at: Moment) {
        if steps == 0 {
            return;
        }

        let outcome = self
            .engine
            .handle_steps(&mut self.state, steps, distance_m, at, &mut self.rng)
            .await;
        self.persist();

        if let ActivityState::Idle(signal) = outcome.activity {
            self.emit(TrackerEvent::Inactive(signal));
        }
        if let Some(creature) = outcome.caught {
            self.emit(TrackerEvent::Caught(creature));
        }
        self.emit(TrackerEvent::Progress {
            total_steps: self.state.total_steps,
            total_distance_m: self.state.total_distance_m,
        });
    }

    fn emit(&self, event: TrackerEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.state) {
            tracing::warn!("Failed to persist progress: {}", e);
        }
    }
}
