use thiserror::Error;

/// Core error type shared across promptmix crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration violates internal invariants.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// A rule or template references a library that does not exist.
    #[error("unknown library: {0}")]
    UnknownLibrary(String),
    /// Serialization failure for persisted artifacts.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Filesystem failure while reading or writing artifacts.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results returned by promptmix crates.
pub type Result<T> = std::result::Result<T, Error>;
