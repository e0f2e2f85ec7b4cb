use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClickerError {
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Input device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClickerError>;
