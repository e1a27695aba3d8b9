use async_trait::async_trait;

use crate::errors::EngineError;

/// Caller-injected resolver turning an image URL into descriptive text.
///
/// The engine's only contract with the implementation is "returns text or
/// fails"; retry and backoff policy belong to the implementor. Results are
/// cached per URL inside the [`Session`](crate::Session), so an
/// implementation is called at most once per distinct URL per session.
#[async_trait]
pub trait ImageDescriber: Send + Sync {
    async fn describe(&self, url: &str, prompt: &str) -> Result<String, EngineError>;
}
