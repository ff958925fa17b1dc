use crate::m20250601_000000_bootstrap::{drop_touch_trigger, touch_trigger};
use crate::m20250601_000001_create_users::Users;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_uuid(Categories::Id))
                    .col(string_len_uniq(Categories::Name, 20))
                    .col(string_len(Categories::Type, 20))
                    .col(
                        timestamp_with_time_zone(Categories::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Categories::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_uuid(Products::Id))
                    .col(string_len(Products::Name, 80))
                    .col(string_len(Products::Description, 1024).default(""))
                    .col(big_integer(Products::PriceCents))
                    .col(string_len_null(Products::Image, 255))
                    .col(integer(Products::Quantity).default(0))
                    .col(boolean(Products::IsDeleted).default(false))
                    .col(
                        timestamp_with_time_zone(Products::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Products::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_name")
                    .table(Products::Table)
                    .col(Products::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductCategories::Table)
                    .if_not_exists()
                    .col(uuid(ProductCategories::ProductId))
                    .col(uuid(ProductCategories::CategoryId))
                    .primary_key(
                        Index::create()
                            .col(ProductCategories::ProductId)
                            .col(ProductCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_categories_product")
                            .from(ProductCategories::Table, ProductCategories::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_categories_category")
                            .from(ProductCategories::Table, ProductCategories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(pk_uuid(Ratings::Id))
                    .col(
                        small_integer(Ratings::Stars)
                            .check(Expr::col(Ratings::Stars).between(1, 5)),
                    )
                    .col(uuid_null(Ratings::UserId))
                    .col(
                        timestamp_with_time_zone(Ratings::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ratings_user")
                            .from(Ratings::Table, Ratings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductRatings::Table)
                    .if_not_exists()
                    .col(uuid(ProductRatings::ProductId))
                    .col(uuid(ProductRatings::RatingId))
                    .primary_key(
                        Index::create()
                            .col(ProductRatings::ProductId)
                            .col(ProductRatings::RatingId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_ratings_product")
                            .from(ProductRatings::Table, ProductRatings::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_ratings_rating")
                            .from(ProductRatings::Table, ProductRatings::RatingId)
                            .to(Ratings::Table, Ratings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(&touch_trigger("categories")).await?;
        db.execute_unprepared(&touch_trigger("products")).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(&drop_touch_trigger("products")).await?;
        db.execute_unprepared(&drop_touch_trigger("categories")).await?;

        manager
            .drop_table(Table::drop().table(ProductRatings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ratings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Type,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Products {
    Table,
    Id,
    Name,
    Description,
    PriceCents,
    Image,
    Quantity,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProductCategories {
    Table,
    ProductId,
    CategoryId,
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    Id,
    Stars,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProductRatings {
    Table,
    ProductId,
    RatingId,
}
