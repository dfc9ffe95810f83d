//! Charmings - step-driven creature discovery
//!
//! Walking accumulates steps; once enough have been walked, a catch cycle
//! checks every uncaught creature's requirements (progress, calendar, time of
//! day, weather) and rolls for at most one discovery.

pub mod core;
pub mod creature;
pub mod engine;
pub mod store;
pub mod tracker;
pub mod weather;
