use crate::m20250601_000000_bootstrap::{drop_touch_trigger, touch_trigger};
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(pk_uuid(Addresses::Id))
                    .col(string_len(Addresses::Country, 200))
                    .col(string_len(Addresses::State, 50).default(""))
                    .col(string_len(Addresses::City, 50))
                    .col(string_len(Addresses::PostalCode, 20))
                    .col(string_len(Addresses::Street, 50))
                    .col(string_len(Addresses::HouseNumber, 10))
                    .col(string_len(Addresses::AddressAddition, 200).default(""))
                    .col(
                        timestamp_with_time_zone(Addresses::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Addresses::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string_len_uniq(Users::EmailAddress, 200))
                    .col(string(Users::Password))
                    .col(string_len(Users::FirstName, 100))
                    .col(string_len(Users::LastName, 100))
                    .col(boolean(Users::IsAdmin).default(false))
                    .col(uuid_null(Users::AddressId))
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_address")
                            .from(Users::Table, Users::AddressId)
                            .to(Addresses::Table, Addresses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_created_at")
                    .table(Users::Table)
                    .col(Users::CreatedAt)
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(&touch_trigger("addresses")).await?;
        db.execute_unprepared(&touch_trigger("users")).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(&drop_touch_trigger("users")).await?;
        db.execute_unprepared(&drop_touch_trigger("addresses")).await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Addresses {
    Table,
    Id,
    Country,
    State,
    City,
    PostalCode,
    Street,
    HouseNumber,
    AddressAddition,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    EmailAddress,
    Password,
    FirstName,
    LastName,
    IsAdmin,
    AddressId,
    CreatedAt,
    UpdatedAt,
}
