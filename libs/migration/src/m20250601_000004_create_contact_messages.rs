use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContactMessages::Table)
                    .if_not_exists()
                    .col(pk_uuid(ContactMessages::Id))
                    .col(string_len(ContactMessages::Name, 60))
                    .col(string_len(ContactMessages::Email, 100))
                    .col(string_len(ContactMessages::Subject, 50))
                    .col(string_len(ContactMessages::Message, 500))
                    .col(boolean(ContactMessages::Privacy))
                    .col(
                        timestamp_with_time_zone(ContactMessages::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContactMessages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ContactMessages {
    Table,
    Id,
    Name,
    Email,
    Subject,
    Message,
    Privacy,
    CreatedAt,
}
