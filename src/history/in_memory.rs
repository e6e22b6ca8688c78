use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::Message;

use super::MessageStore;

#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: Arc<RwLock<Vec<Message>>>,
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: Message) -> anyhow::Result<()> {
        self.messages.write().await.push(message);
        Ok(())
    }

    async fn upsert(&self, message: Message) -> anyhow::Result<()> {
        let mut messages = self.messages.write().await;
        if let Some(existing) = messages.iter_mut().find(|item| item.id == message.id) {
            *existing = message;
        } else {
            messages.push(message);
        }
        Ok(())
    }

    async fn list(&self, limit: usize) -> anyhow::Result<Vec<Message>> {
        let mut messages = self.messages.read().await.clone();
        if messages.len() > limit {
            let start = messages.len().saturating_sub(limit);
            messages = messages.split_off(start);
        }
        Ok(messages)
    }

    async fn reset(&self, messages: Vec<Message>) -> anyhow::Result<u64> {
        let mut current = self.messages.write().await;
        let removed = current.len() as u64;
        *current = messages;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use crate::{history::MessageStore, types::Message};

    use super::InMemoryMessageStore;

    #[tokio::test]
    async fn upsert_replaces_in_place() {
        let store = InMemoryMessageStore::default();
        let user = Message::user("hi");
        let reply = Message::assistant("resp-1", "Hello!");
        store.append(user.clone()).await.expect("append should succeed");
        store.upsert(reply.clone()).await.expect("upsert should succeed");
        store
            .append(Message::user("later"))
            .await
            .expect("append should succeed");

        store
            .upsert(reply.with_text("Hello! I'm"))
            .await
            .expect("upsert should succeed");

        let messages = store.list(10).await.expect("list should succeed");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].id, user.id);
        assert_eq!(messages[1].id, "resp-1");
        assert_eq!(messages[1].text, "Hello! I'm");
    }

    #[tokio::test]
    async fn list_keeps_newest_entries() {
        let store = InMemoryMessageStore::default();
        for text in ["one", "two", "three"] {
            store
                .append(Message::user(text))
                .await
                .expect("append should succeed");
        }

        let messages = store.list(2).await.expect("list should succeed");
        let texts = messages
            .iter()
            .map(|message| message.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["two", "three"]);
    }

    #[tokio::test]
    async fn reset_replaces_everything() {
        let store = InMemoryMessageStore::default();
        store
            .append(Message::user("one"))
            .await
            .expect("append should succeed");
        store
            .append(Message::user("two"))
            .await
            .expect("append should succeed");

        let notice = Message::assistant("notice", "Chat cleared.");
        let removed = store
            .reset(vec![notice.clone()])
            .await
            .expect("reset should succeed");
        assert_eq!(removed, 2);
        assert_eq!(
            store.list(10).await.expect("list should succeed"),
            vec![notice]
        );
    }
}
