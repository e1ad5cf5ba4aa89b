use thiserror::Error;

/// Top-level error type for Foresight.
#[derive(Debug, Error)]
pub enum ForesightError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// The foresight pool could not be read.
    #[error("foresight pool error: {0}")]
    Pool(String),

    /// The foresight pool resolved to zero usable entries.
    #[error("foresight pool is empty")]
    EmptyPool,

    /// Durable state could not be written or read.
    #[error("storage error: {0}")]
    Storage(String),

    /// Persisted state is readable but violates an invariant.
    #[error("corrupt state: {0}")]
    CorruptState(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
