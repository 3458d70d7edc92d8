use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicySimError {
    #[error("Schema error: expected fields {expected:?}, found {found:?}")]
    Schema {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("Unknown policy: {0}")]
    UnknownPolicy(String),

    #[error("Invalid zone id: {0:?}")]
    InvalidZoneId(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PolicySimError>;
