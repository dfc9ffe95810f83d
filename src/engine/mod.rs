//! Requirement evaluation, activity tracking and catch cycles

pub mod activity;
pub mod catch;
pub mod evaluator;
pub mod messages;

pub use activity::{ActivityState, ActivityWindow, InactiveSignal};
pub use catch::{CatchEngine, StepOutcome};
pub use evaluator::{evaluate, EvaluationContext};
