use crate::models::{DeliveryStatus, Shipping, UpdateShipping};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// Carrier assigned to every new order
pub const DEFAULT_CARRIER: &str = "Default Carrier";

/// Days between ordering and the estimated delivery
pub const ESTIMATED_DELIVERY_DAYS: i64 = 7;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shippings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub carrier: String,
    pub delivery_status: DeliveryStatus,
    pub estimated_delivery_date: DateTimeWithTimeZone,
    pub shipping_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(unique)]
    pub order_id: Uuid,
    pub address_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Shipping {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            address_id: model.address_id,
            carrier: model.carrier,
            delivery_status: model.delivery_status,
            estimated_delivery_date: model.estimated_delivery_date.into(),
            shipping_date: model.shipping_date.map(Into::into),
        }
    }
}

impl ActiveModel {
    /// Shipping of a new order, not shipped yet
    pub fn for_new_order(order_id: Uuid, address_id: Uuid) -> Self {
        let now = chrono::Utc::now();
        ActiveModel {
            id: Set(Uuid::now_v7()),
            carrier: Set(DEFAULT_CARRIER.to_string()),
            delivery_status: Set(DeliveryStatus::NotShipped),
            estimated_delivery_date: Set(
                (now + chrono::Duration::days(ESTIMATED_DELIVERY_DAYS)).into()
            ),
            shipping_date: Set(Some(now.into())),
            order_id: Set(order_id),
            address_id: Set(address_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }

    /// Set the given fields, keep the rest
    pub fn apply_update(&mut self, update: UpdateShipping) {
        if let Some(carrier) = update.carrier {
            self.carrier = Set(carrier);
        }
        if let Some(delivery_status) = update.delivery_status {
            self.delivery_status = Set(delivery_status);
        }
        if let Some(estimated) = update.estimated_delivery_date {
            self.estimated_delivery_date = Set(estimated.into());
        }
        if let Some(shipping_date) = update.shipping_date {
            self.shipping_date = Set(Some(shipping_date.into()));
        }
        self.updated_at = Set(chrono::Utc::now().into());
    }
}
