use thiserror::Error;

#[derive(Error, Debug)]
pub enum CharmError {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Weather unavailable: {0}")]
    Weather(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Step tracker is not running")]
    TrackerStopped,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CharmError>;
