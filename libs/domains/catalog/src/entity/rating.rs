use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ratings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub stars: i16,
    pub user_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_rating::Entity")]
    ProductRating,
}

impl Related<super::product_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductRating.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new_rating(stars: i16, user_id: Uuid) -> Self {
        ActiveModel {
            id: Set(Uuid::now_v7()),
            stars: Set(stars),
            user_id: Set(Some(user_id)),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}
