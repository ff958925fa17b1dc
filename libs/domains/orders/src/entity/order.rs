use crate::models::{Order, OrderStatus};
use domain_catalog::cents_to_price;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount_cents: i64,
    pub order_date: DateTimeWithTimeZone,
    pub order_status: OrderStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_product::Entity")]
    OrderProduct,
    #[sea_orm(has_one = "super::shipping::Entity")]
    Shipping,
}

impl Related<super::order_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderProduct.def()
    }
}

impl Related<super::shipping::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipping.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            total_amount: cents_to_price(model.total_amount_cents),
            order_date: model.order_date.into(),
            order_status: model.order_status,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl ActiveModel {
    /// A freshly placed, open order
    pub fn placed(user_id: Uuid, total_amount_cents: i64) -> Self {
        let now = chrono::Utc::now();
        ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            total_amount_cents: Set(total_amount_cents),
            order_date: Set(now.into()),
            order_status: Set(OrderStatus::Open),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}
