//! Progress state and its persistence

pub mod kv;
pub mod progress;
pub mod state;

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use progress::ProgressStore;
pub use state::{Encouragement, ProgressState, StepEntry};
