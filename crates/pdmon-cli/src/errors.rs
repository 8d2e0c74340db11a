use pdmon_core::ConfigError;
use pdmon_engine::EngineError;
use thiserror::Error;

/// Errors that can occur while replaying a recorded session
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IMU file not found: {0}")]
    ImuFileNotFound(String),

    #[error("IMU file format error at line {line}: {message}")]
    ImuFormat { line: usize, message: String },

    #[error("Register dump ends with a partial block of {len} bytes at offset {offset}")]
    TruncatedBlock { offset: usize, len: usize },

    #[error("Session contains no IMU samples")]
    EmptySession,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ReplayError>;
