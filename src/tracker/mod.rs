//! Background tracker fed by the step sensor

pub mod sensor;
pub mod service;

pub use sensor::{SensorEvent, StepSensor};
pub use service::{StepTracker, TrackerCommand, TrackerEvent, TrackerHandle, TrackerStatus};
