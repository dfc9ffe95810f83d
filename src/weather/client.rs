//! HTTP client for the weatherapi.com `current.json` endpoint

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{Location, WeatherSnapshot, WeatherSource};
use crate::core::config::WeatherConfig;
use crate::core::error::{CharmError, Result};

/// Async client fetching current conditions
pub struct WeatherApiClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl WeatherApiClient {
    /// Create a client with explicit settings
    ///
    /// `timeout` applies to both connecting and reading the response.
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| CharmError::Weather(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            api_url,
        })
    }

    /// Create a client from config, reading the key from the configured env var
    pub fn from_config(config: &WeatherConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| CharmError::Config(format!("{} not set", config.api_key_env)))?;

        Self::new(
            api_key,
            config.api_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn fetch(&self, location: Location) -> Result<WeatherSnapshot> {
        let query = format!("{},{}", location.latitude, location.longitude);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[("key", self.api_key.as_str()), ("q", query.as_str())])
            .send()
            .await
            .map_err(|e| CharmError::Weather(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CharmError::Weather(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        let body: WeatherResponse = response
            .json()
            .await
            .map_err(|e| CharmError::Weather(e.to_string()))?;

        Ok(body.current.into())
    }
}

impl WeatherSource for WeatherApiClient {
    async fn current(&self, location: Location) -> Result<WeatherSnapshot> {
        self.fetch(location).await
    }
}

#[derive(Deserialize)]
struct WeatherResponse {
    current: CurrentConditions,
}

#[derive(Deserialize)]
struct CurrentConditions {
    temp_c: f64,
    wind_kph: f64,
    wind_dir: String,
    condition: ConditionText,
}

#[derive(Deserialize)]
struct ConditionText {
    text: String,
}

impl From<CurrentConditions> for WeatherSnapshot {
    fn from(current: CurrentConditions) -> Self {
        WeatherSnapshot {
            temperature_c: current.temp_c,
            wind_kph: current.wind_kph,
            wind_direction: current.wind_dir,
            condition: current.condition.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = WeatherApiClient::new(
            "test-key".into(),
            "https://api.example.com/current.json".into(),
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.api_url, "https://api.example.com/current.json");
    }

    #[test]
    fn test_from_config_missing_key() {
        let config = WeatherConfig {
            api_key_env: "CHARMINGS_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..Default::default()
        };
        assert!(matches!(
            WeatherApiClient::from_config(&config),
            Err(CharmError::Config(_))
        ));
    }

    #[test]
    fn test_response_decoding() {
        let body = r#"{
            "location": {"name": "Kyiv"},
            "current": {
                "temp_c": -3.5,
                "wind_kph": 18.4,
                "wind_dir": "NNW",
                "humidity": 80,
                "condition": {"text": "Light snow", "code": 1213}
            }
        }"#;
        let response: WeatherResponse = serde_json::from_str(body).unwrap();
        let snapshot: WeatherSnapshot = response.current.into();

        assert_eq!(snapshot.temperature_c, -3.5);
        assert_eq!(snapshot.wind_kph, 18.4);
        assert_eq!(snapshot.wind_direction, "NNW");
        assert_eq!(snapshot.condition, "Light snow");
    }
}
