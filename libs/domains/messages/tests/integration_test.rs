//! PostgreSQL integration tests for the contact message repository

use domain_messages::*;
use test_utils::{TestDataBuilder, TestDatabase};

#[tokio::test]
#[ignore = "requires docker"]
async fn test_message_roundtrip() {
    let db = TestDatabase::new().await;
    let service = MessageService::new(PgMessageRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("message_roundtrip");
    let subject = builder.name("subject", "delivery");

    let message = service
        .create_message(CreateMessage {
            name: Some("Anna".to_string()),
            email: Some(builder.email("Anna")),
            subject: Some(subject.clone()),
            message: Some("Wann kommt mein Tee?".to_string()),
            privacy: Some(true),
        })
        .await
        .unwrap();
    assert!(message.privacy);

    let listed = service.list_messages().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(service.get_message(message.id).await.unwrap().subject, subject);

    let deleted = service.delete_message(message.id).await.unwrap();
    assert_eq!(deleted.id, message.id);
    assert!(matches!(
        service.get_message(message.id).await,
        Err(MessageError::NotFound)
    ));
}
