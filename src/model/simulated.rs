use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{StreamExt, stream::BoxStream};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::{
    safety::SafetyPolicy,
    types::{GenerateResult, SafetySettings},
};

use super::{ResponseGenerator, select_response};

const EVENT_BUFFER: usize = 16;

/// Artificial delays that imitate token-by-token generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub init_delay: Duration,
    pub processing_delay: Duration,
    pub chunk_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            init_delay: Duration::from_millis(300),
            processing_delay: Duration::from_millis(500),
            chunk_delay: Duration::from_millis(50),
        }
    }
}

impl Pacing {
    pub fn instant() -> Self {
        Self {
            init_delay: Duration::ZERO,
            processing_delay: Duration::ZERO,
            chunk_delay: Duration::ZERO,
        }
    }
}

/// Stand-in for an on-device model: filters the prompt, then streams a
/// canned reply word by word.
#[derive(Debug)]
pub struct SimulatedModel {
    safety: SafetyPolicy,
    pacing: Pacing,
    fail_init: bool,
    ready: Arc<AtomicBool>,
}

impl SimulatedModel {
    pub fn new(safety: SafetyPolicy, pacing: Pacing) -> Self {
        Self {
            safety,
            pacing,
            fail_init: false,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Makes `initialize` fail, leaving the model unavailable.
    pub fn with_init_failure(mut self, fail_init: bool) -> Self {
        self.fail_init = fail_init;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

#[async_trait]
impl ResponseGenerator for SimulatedModel {
    async fn initialize(&self) -> anyhow::Result<()> {
        tokio::time::sleep(self.pacing.init_delay).await;
        if self.fail_init {
            self.ready.store(false, Ordering::Release);
            anyhow::bail!("on-device model is not available");
        }
        self.ready.store(true, Ordering::Release);
        info!("simulated on-device model ready");
        Ok(())
    }

    fn generate(
        &self,
        prompt: &str,
        settings: &SafetySettings,
    ) -> BoxStream<'static, GenerateResult> {
        if !self.is_ready() {
            warn!("generate called before the model was initialized");
            return single(GenerateResult::Error(
                "Model not initialized. Please restart the app.".to_owned(),
            ));
        }

        let decision = self.safety.evaluate(prompt, settings);
        if decision.blocked {
            let reason = decision.reason.unwrap_or_default();
            info!(reason = %reason, "prompt blocked by safety filter");
            return single(GenerateResult::Filtered(reason));
        }

        let response = select_response(prompt);
        let pacing = self.pacing;
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        tokio::spawn(produce(tx, response, pacing));

        ReceiverStream::new(rx).boxed()
    }

    async fn reset(&self) {
        debug!("simulated model holds no conversation state");
    }
}

/// Pushes `Processing`, one growing-prefix `Chunk` per word and the final
/// `Complete` into `tx`. Returns early once the receiver is gone.
async fn produce(tx: mpsc::Sender<GenerateResult>, response: &'static str, pacing: Pacing) {
    if tx.send(GenerateResult::Processing).await.is_err() {
        return;
    }
    tokio::time::sleep(pacing.processing_delay).await;

    let mut accumulated = String::with_capacity(response.len());
    for word in response.split_whitespace() {
        if !accumulated.is_empty() {
            accumulated.push(' ');
        }
        accumulated.push_str(word);

        if tx
            .send(GenerateResult::Chunk(accumulated.clone()))
            .await
            .is_err()
        {
            debug!(
                emitted_chars = accumulated.len(),
                "generation consumer went away; stopping"
            );
            return;
        }
        tokio::time::sleep(pacing.chunk_delay).await;
    }

    let _ = tx.send(GenerateResult::Complete(accumulated)).await;
}

fn single(event: GenerateResult) -> BoxStream<'static, GenerateResult> {
    futures::stream::once(async move { event }).boxed()
}
