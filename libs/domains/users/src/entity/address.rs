use crate::models::{Address, AddressInput};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub country: String,
    pub state: String,
    pub city: String,
    pub postal_code: String,
    pub street: String,
    pub house_number: String,
    pub address_addition: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Address {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            country: model.country,
            state: model.state,
            city: model.city,
            postal_code: model.postal_code,
            street: model.street,
            house_number: model.house_number,
            address_addition: model.address_addition,
        }
    }
}

impl ActiveModel {
    /// Insert model for a new address row
    pub fn from_input(input: AddressInput) -> Self {
        let now = chrono::Utc::now();
        ActiveModel {
            id: Set(Uuid::now_v7()),
            country: Set(input.country),
            state: Set(input.state),
            city: Set(input.city),
            postal_code: Set(input.postal_code),
            street: Set(input.street),
            house_number: Set(input.house_number),
            address_addition: Set(input.address_addition),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }

    /// Overwrite every address field of an existing row
    pub fn apply_input(&mut self, input: AddressInput) {
        self.country = Set(input.country);
        self.state = Set(input.state);
        self.city = Set(input.city);
        self.postal_code = Set(input.postal_code);
        self.street = Set(input.street);
        self.house_number = Set(input.house_number);
        self.address_addition = Set(input.address_addition);
        self.updated_at = Set(chrono::Utc::now().into());
    }
}
