use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{MessageError, MessageResult};
use crate::models::{ContactMessage, CreateMessage, NewMessage};
use crate::repository::MessageRepository;

#[derive(Clone)]
pub struct MessageService<R: MessageRepository> {
    repository: Arc<R>,
}

fn required(value: Option<String>, missing: MessageError) -> MessageResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(missing)
}

impl<R: MessageRepository> MessageService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Store a contact form submission. Missing fields are reported one at
    /// a time, in form order, before length and format checks.
    pub async fn create_message(&self, input: CreateMessage) -> MessageResult<ContactMessage> {
        let name = required(input.name.clone(), MessageError::NameRequired)?;
        let email = required(input.email.clone(), MessageError::EmailRequired)?;
        let subject = required(input.subject.clone(), MessageError::SubjectRequired)?;
        let message = required(input.message.clone(), MessageError::MessageRequired)?;
        if input.privacy != Some(true) {
            return Err(MessageError::PrivacyRequired);
        }
        input.validate()?;

        self.repository
            .create(NewMessage {
                name,
                email,
                subject,
                message,
            })
            .await
    }

    pub async fn list_messages(&self) -> MessageResult<Vec<ContactMessage>> {
        self.repository.list().await
    }

    pub async fn get_message(&self, id: Uuid) -> MessageResult<ContactMessage> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(MessageError::NotFound)
    }

    pub async fn delete_message(&self, id: Uuid) -> MessageResult<ContactMessage> {
        let message = self
            .repository
            .delete(id)
            .await?
            .ok_or(MessageError::NotFound)?;

        tracing::info!(message_id = %id, "Deleted contact message");
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockMessageRepository;
    use chrono::Utc;

    fn form() -> CreateMessage {
        CreateMessage {
            name: Some("Anna".to_string()),
            email: Some("anna@example.com".to_string()),
            subject: Some("Lieferung".to_string()),
            message: Some("Wann kommt mein Tee?".to_string()),
            privacy: Some(true),
        }
    }

    #[tokio::test]
    async fn test_required_fields_in_form_order() {
        let service = MessageService::new(MockMessageRepository::new());

        let cases = [
            (
                CreateMessage {
                    name: Some("  ".to_string()),
                    email: None,
                    ..form()
                },
                "Name is required.",
            ),
            (
                CreateMessage {
                    email: None,
                    ..form()
                },
                "Email is required.",
            ),
            (
                CreateMessage {
                    subject: None,
                    ..form()
                },
                "Subject is required.",
            ),
            (
                CreateMessage {
                    message: Some(String::new()),
                    ..form()
                },
                "Message is required.",
            ),
            (
                CreateMessage {
                    privacy: Some(false),
                    ..form()
                },
                "Privacy agreement is required.",
            ),
        ];

        for (input, expected) in cases {
            let err = service.create_message(input).await.unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[tokio::test]
    async fn test_invalid_email_is_a_validation_error() {
        let service = MessageService::new(MockMessageRepository::new());
        let input = CreateMessage {
            email: Some("not-an-email".to_string()),
            ..form()
        };

        let err = service.create_message(input).await.unwrap_err();
        assert!(matches!(err, MessageError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_trims_fields() {
        let mut mock = MockMessageRepository::new();
        mock.expect_create()
            .withf(|m| m.name == "Anna" && m.subject == "Lieferung")
            .times(1)
            .returning(|m| {
                Ok(ContactMessage {
                    id: Uuid::now_v7(),
                    name: m.name,
                    email: m.email,
                    subject: m.subject,
                    message: m.message,
                    privacy: true,
                    created_at: Utc::now(),
                })
            });

        let input = CreateMessage {
            name: Some(" Anna ".to_string()),
            ..form()
        };
        let message = MessageService::new(mock)
            .create_message(input)
            .await
            .unwrap();
        assert!(message.privacy);
    }

    #[tokio::test]
    async fn test_missing_message_is_not_found() {
        let mut mock = MockMessageRepository::new();
        mock.expect_get_by_id().returning(|_| Ok(None));
        mock.expect_delete().returning(|_| Ok(None));
        let service = MessageService::new(mock);

        assert!(matches!(
            service.get_message(Uuid::now_v7()).await,
            Err(MessageError::NotFound)
        ));
        assert!(matches!(
            service.delete_message(Uuid::now_v7()).await,
            Err(MessageError::NotFound)
        ));
    }
}
