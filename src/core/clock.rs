//! Injectable time sources

use chrono::{DateTime, Duration, FixedOffset, Local};
use std::sync::{Arc, Mutex};

use super::types::Moment;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> Moment;
}

/// Wall clock in the host's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Moment {
        Moment::new(Local::now().fixed_offset())
    }
}

/// Clock that only moves when told to
///
/// Cloned handles share the same time, so a test (or the walk simulator) can
/// advance the clock the tracker actor reads from.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<FixedOffset>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }

    pub fn set(&self, to: DateTime<FixedOffset>) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Moment {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        Moment::new(*current)
    }
}
