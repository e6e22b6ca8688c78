use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    history::MessageStore,
    model::ResponseGenerator,
    types::{GenerateResult, Message, SafetySettings, new_message_id},
};

pub const WELCOME_NOTICE: &str =
    "Welcome! I'm an on-device AI assistant. Everything stays on your phone. Ask me anything!";
pub const CLEARED_NOTICE: &str = "Chat cleared. Start a new conversation!";
pub const INIT_FAILED_NOTICE: &str =
    "Failed to initialize the on-device model. Please make sure your device supports it.";
pub const INTERRUPTED_ERROR: &str = "Generation stopped before the reply was complete.";

const UPDATE_BUFFER: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SendOutcome {
    Completed(Message),
    Filtered(Message),
    Failed(Message),
    /// A newer message or a clear superseded this generation.
    Cancelled,
}

struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// State holder behind the chat screen. Owns the display list and the
/// active safety settings, and drives one generation at a time.
pub struct ChatSession {
    generator: Arc<dyn ResponseGenerator>,
    history: Arc<dyn MessageStore>,
    settings: RwLock<SafetySettings>,
    // Held while applying a generation event so a concurrent clear or send
    // cannot interleave with a list write.
    in_flight: Mutex<Option<InFlight>>,
    generation_seq: AtomicU64,
    updates: broadcast::Sender<Message>,
}

impl ChatSession {
    pub fn new(
        generator: Arc<dyn ResponseGenerator>,
        history: Arc<dyn MessageStore>,
        settings: SafetySettings,
    ) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);
        Self {
            generator,
            history,
            settings: RwLock::new(settings),
            in_flight: Mutex::new(None),
            generation_seq: AtomicU64::new(1),
            updates,
        }
    }

    /// Initializes the generator and posts the matching notice. Returns
    /// `false` when the generator is unavailable; the session stays usable
    /// and later sends surface an error message.
    pub async fn initialize(&self) -> anyhow::Result<bool> {
        let started_at = Instant::now();
        match self.generator.initialize().await {
            Ok(()) => {
                info!(
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    "assistant initialized"
                );
                self.append(Message::assistant(new_message_id(), WELCOME_NOTICE))
                    .await?;
                Ok(true)
            }
            Err(error) => {
                warn!(?error, "assistant initialization failed");
                self.append(Message::assistant(new_message_id(), INIT_FAILED_NOTICE))
                    .await?;
                Ok(false)
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.updates.subscribe()
    }

    pub async fn safety_settings(&self) -> SafetySettings {
        *self.settings.read().await
    }

    /// Takes effect on the next generation.
    pub async fn update_safety_settings(&self, settings: SafetySettings) {
        info!(
            level = settings.level.as_str(),
            harassment = settings.block_harassment,
            hate_speech = settings.block_hate_speech,
            sexual = settings.block_sexual_content,
            dangerous = settings.block_dangerous_content,
            "safety settings updated"
        );
        *self.settings.write().await = settings;
    }

    pub async fn messages(&self, limit: usize) -> anyhow::Result<Vec<Message>> {
        self.history.list(limit).await
    }

    /// Settings snapshot plus a raw event stream, bypassing the display list.
    pub async fn generate(
        &self,
        prompt: &str,
    ) -> futures::stream::BoxStream<'static, GenerateResult> {
        let settings = self.safety_settings().await;
        self.generator.generate(prompt, &settings)
    }

    pub async fn send_message(&self, text: &str) -> anyhow::Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("message text must not be empty");
        }

        let (generation, token) = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(previous) = in_flight.take() {
                debug!(
                    generation = previous.generation,
                    "cancelling superseded generation"
                );
                previous.token.cancel();
            }
            let generation = self.generation_seq.fetch_add(1, Ordering::Relaxed);
            let token = CancellationToken::new();
            *in_flight = Some(InFlight {
                generation,
                token: token.clone(),
            });
            self.append(Message::user(text)).await?;
            (generation, token)
        };

        let settings = self.safety_settings().await;
        info!(generation, chars = text.len(), "generating reply");
        let mut events = self.generator.generate(text, &settings);
        let response_id = new_message_id();
        let mut reply: Option<Message> = None;

        loop {
            let event = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                event = events.next() => Some(event),
            };
            let Some(event) = event else {
                warn!(generation, "generation cancelled");
                return Ok(SendOutcome::Cancelled);
            };

            let in_flight = self.in_flight.lock().await;
            if token.is_cancelled() {
                warn!(generation, "generation cancelled");
                return Ok(SendOutcome::Cancelled);
            }

            let outcome = match event {
                Some(GenerateResult::Processing) => {
                    debug!(generation, "model processing");
                    None
                }
                Some(GenerateResult::Chunk(text)) => {
                    let message = grow_reply(reply.as_ref(), &response_id, text);
                    self.upsert(message.clone()).await?;
                    reply = Some(message);
                    None
                }
                Some(GenerateResult::Complete(text)) => {
                    let message = grow_reply(reply.as_ref(), &response_id, text);
                    self.upsert(message.clone()).await?;
                    info!(generation, chars = message.text.len(), "reply complete");
                    Some(SendOutcome::Completed(message))
                }
                Some(GenerateResult::Filtered(reason)) => {
                    info!(generation, reason = %reason, "message filtered");
                    let message = Message::filtered(reason);
                    self.append(message.clone()).await?;
                    Some(SendOutcome::Filtered(message))
                }
                Some(GenerateResult::Error(error)) => {
                    warn!(generation, error = %error, "generation failed");
                    let message = self.append_error(&error).await?;
                    Some(SendOutcome::Failed(message))
                }
                None => {
                    warn!(generation, "generation stream ended without a terminal event");
                    let message = self.append_error(INTERRUPTED_ERROR).await?;
                    Some(SendOutcome::Failed(message))
                }
            };

            if let Some(outcome) = outcome {
                release(in_flight, generation);
                return Ok(outcome);
            }
        }
    }

    /// Cancels any in-flight generation and resets the list to a single
    /// notice.
    pub async fn clear_chat(&self) -> anyhow::Result<()> {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(previous) = in_flight.take() {
            previous.token.cancel();
        }

        let notice = Message::assistant(new_message_id(), CLEARED_NOTICE);
        let removed = self.history.reset(vec![notice.clone()]).await?;
        self.generator.reset().await;
        let _ = self.updates.send(notice);
        info!(removed, "chat cleared");
        Ok(())
    }

    async fn append_error(&self, error: &str) -> anyhow::Result<Message> {
        let message = Message::assistant(new_message_id(), format!("Error: {error}"));
        self.append(message.clone()).await?;
        Ok(message)
    }

    async fn append(&self, message: Message) -> anyhow::Result<()> {
        self.history.append(message.clone()).await?;
        let _ = self.updates.send(message);
        Ok(())
    }

    async fn upsert(&self, message: Message) -> anyhow::Result<()> {
        self.history.upsert(message.clone()).await?;
        let _ = self.updates.send(message);
        Ok(())
    }
}

fn grow_reply(current: Option<&Message>, response_id: &str, text: String) -> Message {
    match current {
        Some(message) => message.with_text(text),
        None => Message::assistant(response_id, text),
    }
}

fn release(mut in_flight: tokio::sync::MutexGuard<'_, Option<InFlight>>, generation: u64) {
    if in_flight
        .as_ref()
        .is_some_and(|current| current.generation == generation)
    {
        *in_flight = None;
    }
}
