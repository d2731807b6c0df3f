use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkSrvError>;

#[derive(Error, Debug)]
pub enum LinkSrvError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Routing error: {0}")]
    RoutingError(String),

    #[error("Charter error: {0}")]
    CharterError(String),

    #[error("Health check error: {0}")]
    HealthCheckError(String),
}

impl From<reqwest::Error> for LinkSrvError {
    fn from(err: reqwest::Error) -> Self {
        LinkSrvError::ConnectionError(err.to_string())
    }
}
