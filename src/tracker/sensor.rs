//! Hardware step sensor adapter

/// Raw event from the host's motion sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorEvent {
    /// Cumulative step count since the device booted
    Counter(u64),
    /// One detected step
    Detector,
}

/// Turns sensor events into step deltas
///
/// The first counter reading only sets the baseline. A counter that goes
/// backwards (device reboot) is re-baselined instead of producing a delta.
#[derive(Debug, Clone, Default)]
pub struct StepSensor {
    last_reading: Option<u64>,
}

impl StepSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps to ingest for `event`, if any
    pub fn on_event(&mut self, event: SensorEvent) -> Option<u32> {
        match event {
            SensorEvent::Counter(total) => self.on_counter(total),
            SensorEvent::Detector => Some(1),
        }
    }

    fn on_counter(&mut self, total: u64) -> Option<u32> {
        let Some(last) = self.last_reading else {
            tracing::debug!("Step counter baseline: {}", total);
            self.last_reading = Some(total);
            return None;
        };

        if total < last {
            tracing::debug!("Step counter went back from {} to {}, re-baselining", last, total);
            self.last_reading = Some(total);
            return None;
        }

        let delta = total - last;
        if delta == 0 {
            return None;
        }
        self.last_reading = Some(total);
        Some(u32::try_from(delta).unwrap_or(u32::MAX))
    }

    pub fn baseline(&self) -> Option<u64> {
        self.last_reading
    }
}
