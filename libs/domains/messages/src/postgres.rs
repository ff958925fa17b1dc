use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::{
    DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, QueryOrder, Statement,
};
use uuid::Uuid;

use crate::{
    entity::contact_message,
    error::MessageResult,
    models::{ContactMessage, NewMessage},
    repository::MessageRepository,
};

pub struct PgMessageRepository {
    base: BaseRepository<contact_message::Entity>,
}

impl PgMessageRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, input: NewMessage) -> MessageResult<ContactMessage> {
        let model = self
            .base
            .insert(contact_message::ActiveModel::from(input))
            .await?;

        tracing::info!(message_id = %model.id, "Stored contact message");
        Ok(model.into())
    }

    async fn list(&self) -> MessageResult<Vec<ContactMessage>> {
        let models = contact_message::Entity::find()
            .order_by_desc(contact_message::Column::CreatedAt)
            .order_by_desc(contact_message::Column::Id)
            .all(self.base.db())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> MessageResult<Option<ContactMessage>> {
        Ok(self
            .base
            .find_by_id(id)
            .await?
            .map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> MessageResult<Option<ContactMessage>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM contact_messages WHERE id = $1 RETURNING *",
            [id.into()],
        );

        let model = contact_message::Model::find_by_statement(stmt)
            .one(self.base.db())
            .await?;

        Ok(model.map(Into::into))
    }
}
