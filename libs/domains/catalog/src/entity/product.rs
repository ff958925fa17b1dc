use crate::models::{NewProduct, Product, ProductChanges, cents_to_price};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub image: Option<String>,
    pub quantity: i32,
    pub is_deleted: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_category::Entity")]
    ProductCategory,
    #[sea_orm(has_many = "super::product_rating::Entity")]
    ProductRating,
}

impl Related<super::product_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductCategory.def()
    }
}

impl Related<super::product_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductRating.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: cents_to_price(model.price_cents),
            image: model.image,
            quantity: model.quantity,
            is_deleted: model.is_deleted,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<NewProduct> for ActiveModel {
    fn from(input: NewProduct) -> Self {
        let now = chrono::Utc::now();
        ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            description: Set(input.description),
            price_cents: Set(input.price_cents),
            image: Set(input.image),
            quantity: Set(input.quantity),
            is_deleted: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}

impl ActiveModel {
    pub fn apply_changes(&mut self, changes: ProductChanges) {
        if let Some(name) = changes.name {
            self.name = Set(name);
        }
        if let Some(description) = changes.description {
            self.description = Set(description);
        }
        if let Some(price_cents) = changes.price_cents {
            self.price_cents = Set(price_cents);
        }
        if let Some(image) = changes.image {
            self.image = Set(Some(image));
        }
        if let Some(quantity) = changes.quantity {
            self.quantity = Set(quantity);
        }
        self.updated_at = Set(chrono::Utc::now().into());
    }
}
