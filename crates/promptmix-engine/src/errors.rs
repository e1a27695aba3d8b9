use thiserror::Error;

/// Errors emitted by the combination engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("image description failed: {0}")]
    Describe(String),
    #[error(transparent)]
    Core(#[from] promptmix_core::Error),
}
