mod in_memory;

use async_trait::async_trait;

use crate::types::Message;

pub use in_memory::InMemoryMessageStore;

/// Ordered display list of a chat session.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, message: Message) -> anyhow::Result<()>;

    /// Replaces the entry with the same id, or appends when there is none.
    async fn upsert(&self, message: Message) -> anyhow::Result<()>;

    /// Returns the newest `limit` messages in display order.
    async fn list(&self, limit: usize) -> anyhow::Result<Vec<Message>>;

    /// Replaces the whole list, returning how many entries were dropped.
    async fn reset(&self, messages: Vec<Message>) -> anyhow::Result<u64>;
}
