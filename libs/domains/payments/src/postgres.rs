use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::{
    entity::payment,
    error::{PaymentError, PaymentResult},
    models::{NewPayment, Payment, PaymentDetails},
    repository::PaymentRepository,
};

pub struct PgPaymentRepository {
    base: BaseRepository<payment::Entity>,
}

impl PgPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn find_stored(&self, id: Uuid) -> PaymentResult<Option<payment::Model>> {
        payment::Entity::find_by_id(id)
            .filter(payment::Column::IsForOrder.eq(false))
            .one(self.base.db())
            .await
            .map_err(PaymentError::from)
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn create(&self, input: NewPayment) -> PaymentResult<Payment> {
        let model = self
            .base
            .insert(payment::ActiveModel::from(input))
            .await?;

        tracing::info!(payment_id = %model.id, user_id = %model.user_id, "Created payment");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> PaymentResult<Option<Payment>> {
        Ok(self.find_stored(id).await?.map(Into::into))
    }

    async fn list_by_user(&self, user_id: Uuid) -> PaymentResult<Vec<Payment>> {
        let models = payment::Entity::find()
            .filter(payment::Column::UserId.eq(user_id))
            .filter(payment::Column::IsForOrder.eq(false))
            .order_by_asc(payment::Column::CreatedAt)
            .order_by_asc(payment::Column::Id)
            .all(self.base.db())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, details: PaymentDetails) -> PaymentResult<Payment> {
        let existing = self.find_stored(id).await?.ok_or(PaymentError::NotFound)?;

        let mut active = existing.into_active_model();
        active.apply_details(details);
        let model = self.base.update(active).await?;

        tracing::info!(payment_id = %id, "Updated payment");
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> PaymentResult<bool> {
        let result = payment::Entity::delete_many()
            .filter(payment::Column::Id.eq(id))
            .filter(payment::Column::IsForOrder.eq(false))
            .exec(self.base.db())
            .await?;

        Ok(result.rows_affected > 0)
    }
}
