//! Current-weather lookups consumed by weather-dependent requirements
//!
//! The engine only ever sees an `Option<WeatherSnapshot>`: a missing
//! snapshot makes weather clauses fail, it never aborts a catch cycle.

pub mod cache;
pub mod client;

pub use cache::WeatherCache;
pub use client::WeatherApiClient;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::core::error::{CharmError, Result};

/// Conditions at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub wind_kph: f64,
    /// Compass direction such as "NNW"
    pub wind_direction: String,
    /// Condition text such as "Partly cloudy"
    pub condition: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Anything that can report the current weather at a location
pub trait WeatherSource: Send + Sync {
    fn current(&self, location: Location) -> impl Future<Output = Result<WeatherSnapshot>> + Send;
}

/// `None` is a source that is never available (offline mode)
impl<W: WeatherSource> WeatherSource for Option<W> {
    async fn current(&self, location: Location) -> Result<WeatherSnapshot> {
        match self {
            Some(source) => source.current(location).await,
            None => Err(CharmError::Weather("no weather source configured".into())),
        }
    }
}
