use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::MessageResult;
use crate::models::{ContactMessage, NewMessage};

/// Repository trait for contact messages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: NewMessage) -> MessageResult<ContactMessage>;

    /// All messages, newest first
    async fn list(&self) -> MessageResult<Vec<ContactMessage>>;

    async fn get_by_id(&self, id: Uuid) -> MessageResult<Option<ContactMessage>>;

    /// Delete and return the message, if it existed
    async fn delete(&self, id: Uuid) -> MessageResult<Option<ContactMessage>>;
}

/// In-memory implementation of MessageRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryMessageRepository {
    messages: Arc<RwLock<HashMap<Uuid, ContactMessage>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, input: NewMessage) -> MessageResult<ContactMessage> {
        let message = ContactMessage {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            subject: input.subject,
            message: input.message,
            privacy: true,
            created_at: Utc::now(),
        };
        self.messages
            .write()
            .await
            .insert(message.id, message.clone());

        tracing::info!(message_id = %message.id, "Stored contact message");
        Ok(message)
    }

    async fn list(&self) -> MessageResult<Vec<ContactMessage>> {
        let mut messages: Vec<ContactMessage> =
            self.messages.read().await.values().cloned().collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(messages)
    }

    async fn get_by_id(&self, id: Uuid) -> MessageResult<Option<ContactMessage>> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> MessageResult<Option<ContactMessage>> {
        Ok(self.messages.write().await.remove(&id))
    }
}
