mod canned;
mod simulated;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::types::{GenerateResult, SafetySettings};

pub use canned::{DEFAULT_RESPONSE, select_response};
pub use simulated::{Pacing, SimulatedModel};

/// Source of streamed assistant replies.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Prepares the generation capability. Until this succeeds every
    /// `generate` call yields a single `Error` event.
    async fn initialize(&self) -> anyhow::Result<()>;

    /// Streams the reply to `prompt`. The stream ends after the first
    /// terminal event (`Complete`, `Filtered` or `Error`). Must be called
    /// from within a tokio runtime.
    fn generate(
        &self,
        prompt: &str,
        settings: &SafetySettings,
    ) -> BoxStream<'static, GenerateResult>;

    /// Drops any per-conversation state.
    async fn reset(&self);
}
