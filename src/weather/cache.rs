//! Time-to-live cache in front of a [`WeatherSource`]
//!
//! The slot lock is held across the fetch, so concurrent callers on a cold
//! or expired cache wait for the one in-flight request instead of issuing
//! their own.

use tokio::sync::Mutex;

use super::{Location, WeatherSnapshot, WeatherSource};
use crate::core::config::WeatherConfig;
use crate::core::types::Millis;

#[derive(Debug, Clone)]
struct CachedSnapshot {
    snapshot: WeatherSnapshot,
    fetched_at: Millis,
}

pub struct WeatherCache<S> {
    source: S,
    location: Location,
    ttl_ms: Millis,
    slot: Mutex<Option<CachedSnapshot>>,
}

impl<S: WeatherSource> WeatherCache<S> {
    pub fn new(source: S, location: Location, ttl_ms: Millis) -> Self {
        Self {
            source,
            location,
            ttl_ms,
            slot: Mutex::new(None),
        }
    }

    pub fn from_config(source: S, config: &WeatherConfig) -> Self {
        Self::new(
            source,
            Location::new(config.latitude, config.longitude),
            config.cache_ttl_ms,
        )
    }

    /// Current snapshot as of `now`
    ///
    /// Fresh cache hits return immediately. Otherwise the source is asked;
    /// if that fails the stale snapshot (if any) is returned instead.
    pub async fn current(&self, now: Millis) -> Option<WeatherSnapshot> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if now - cached.fetched_at < self.ttl_ms {
                return Some(cached.snapshot.clone());
            }
        }

        match self.source.current(self.location).await {
            Ok(snapshot) => {
                tracing::debug!(
                    "Weather refreshed: {} at {:.1}°C, wind {} {:.1} km/h",
                    snapshot.condition,
                    snapshot.temperature_c,
                    snapshot.wind_direction,
                    snapshot.wind_kph
                );
                *slot = Some(CachedSnapshot {
                    snapshot: snapshot.clone(),
                    fetched_at: now,
                });
                Some(snapshot)
            }
            Err(e) => {
                let stale = slot.as_ref().map(|cached| cached.snapshot.clone());
                if stale.is_some() {
                    tracing::warn!("Weather fetch failed, using stale snapshot: {}", e);
                } else {
                    tracing::warn!("Weather fetch failed, no snapshot available: {}", e);
                }
                stale
            }
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
