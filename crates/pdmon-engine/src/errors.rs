use pdmon_core::ConfigError;
use thiserror::Error;

/// Errors raised by the engine outside the (total) detector core.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid detector configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to spawn analysis worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Analysis worker disconnected")]
    WorkerDisconnected,

    #[error("Analysis worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, EngineError>;
