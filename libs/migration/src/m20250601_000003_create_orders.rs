use crate::m20250601_000000_bootstrap::{drop_touch_trigger, touch_trigger};
use crate::m20250601_000001_create_users::{Addresses, Users};
use crate::m20250601_000002_create_catalog::Products;
use sea_orm_migration::{prelude::*, schema::*};
use sea_orm_migration::sea_query::extension::postgres::Type;

#[derive(DeriveMigrationName)]
pub struct Migration;

const ORDER_STATUSES: [OrderStatus; 6] = [
    OrderStatus::Open,
    OrderStatus::Processing,
    OrderStatus::Failed,
    OrderStatus::Successful,
    OrderStatus::Refunded,
    OrderStatus::Canceled,
];

const PAYMENT_OPTIONS: [PaymentOption; 3] = [
    PaymentOption::CreditCard,
    PaymentOption::BankTransfer,
    PaymentOption::Paypal,
];

const DELIVERY_STATUSES: [DeliveryStatus; 3] = [
    DeliveryStatus::NotShipped,
    DeliveryStatus::Shipped,
    DeliveryStatus::Delivered,
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(OrderStatus::Enum)
                    .values(ORDER_STATUSES)
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(PaymentOption::Enum)
                    .values(PAYMENT_OPTIONS)
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(DeliveryStatus::Enum)
                    .values(DELIVERY_STATUSES)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(pk_uuid(Orders::Id))
                    .col(uuid(Orders::UserId))
                    .col(big_integer(Orders::TotalAmountCents))
                    .col(
                        timestamp_with_time_zone(Orders::OrderDate)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Orders::OrderStatus)
                            .enumeration(OrderStatus::Enum, ORDER_STATUSES)
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        timestamp_with_time_zone(Orders::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Orders::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user")
                            .from(Orders::Table, Orders::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_user_id")
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_created_at")
                    .table(Orders::Table)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderProducts::Table)
                    .if_not_exists()
                    .col(pk_uuid(OrderProducts::Id))
                    .col(uuid(OrderProducts::OrderId))
                    .col(uuid(OrderProducts::ProductId))
                    .col(integer(OrderProducts::Quantity))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_products_order")
                            .from(OrderProducts::Table, OrderProducts::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_products_product")
                            .from(OrderProducts::Table, OrderProducts::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_products_order_id")
                    .table(OrderProducts::Table)
                    .col(OrderProducts::OrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_uuid(Payments::Id))
                    .col(
                        ColumnDef::new(Payments::PaymentOption)
                            .enumeration(PaymentOption::Enum, PAYMENT_OPTIONS)
                            .not_null(),
                    )
                    .col(string_len_null(Payments::Iban, 34))
                    .col(string_len_null(Payments::CreditCardNumber, 19))
                    .col(date_null(Payments::ExpiryDate))
                    .col(string_len_null(Payments::Cvc, 4))
                    .col(string_len_null(Payments::PaypalEmail, 100))
                    .col(boolean(Payments::IsForOrder).default(false))
                    .col(uuid(Payments::UserId))
                    .col(uuid_null(Payments::OrderId).unique_key())
                    .col(
                        timestamp_with_time_zone(Payments::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Payments::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_user")
                            .from(Payments::Table, Payments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_order")
                            .from(Payments::Table, Payments::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_user_id")
                    .table(Payments::Table)
                    .col(Payments::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Shippings::Table)
                    .if_not_exists()
                    .col(pk_uuid(Shippings::Id))
                    .col(string_len(Shippings::Carrier, 200))
                    .col(
                        ColumnDef::new(Shippings::DeliveryStatus)
                            .enumeration(DeliveryStatus::Enum, DELIVERY_STATUSES)
                            .not_null()
                            .default("not shipped"),
                    )
                    .col(timestamp_with_time_zone(Shippings::EstimatedDeliveryDate))
                    .col(timestamp_with_time_zone_null(Shippings::ShippingDate))
                    .col(uuid_uniq(Shippings::OrderId))
                    .col(uuid(Shippings::AddressId))
                    .col(
                        timestamp_with_time_zone(Shippings::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Shippings::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shippings_order")
                            .from(Shippings::Table, Shippings::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shippings_address")
                            .from(Shippings::Table, Shippings::AddressId)
                            .to(Addresses::Table, Addresses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(&touch_trigger("orders")).await?;
        db.execute_unprepared(&touch_trigger("payments")).await?;
        db.execute_unprepared(&touch_trigger("shippings")).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(&drop_touch_trigger("shippings")).await?;
        db.execute_unprepared(&drop_touch_trigger("payments")).await?;
        db.execute_unprepared(&drop_touch_trigger("orders")).await?;

        manager
            .drop_table(Table::drop().table(Shippings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderProducts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(DeliveryStatus::Enum).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(PaymentOption::Enum).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(OrderStatus::Enum).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    UserId,
    TotalAmountCents,
    OrderDate,
    OrderStatus,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderProducts {
    Table,
    Id,
    OrderId,
    ProductId,
    Quantity,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    PaymentOption,
    Iban,
    CreditCardNumber,
    ExpiryDate,
    Cvc,
    PaypalEmail,
    IsForOrder,
    UserId,
    OrderId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Shippings {
    Table,
    Id,
    Carrier,
    DeliveryStatus,
    EstimatedDeliveryDate,
    ShippingDate,
    OrderId,
    AddressId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum OrderStatus {
    #[sea_orm(iden = "order_status")]
    Enum,
    #[sea_orm(iden = "open")]
    Open,
    #[sea_orm(iden = "processing")]
    Processing,
    #[sea_orm(iden = "failed")]
    Failed,
    #[sea_orm(iden = "successful")]
    Successful,
    #[sea_orm(iden = "refunded")]
    Refunded,
    #[sea_orm(iden = "canceled")]
    Canceled,
}

#[derive(DeriveIden, Clone, Copy)]
enum PaymentOption {
    #[sea_orm(iden = "payment_option")]
    Enum,
    #[sea_orm(iden = "credit card")]
    CreditCard,
    #[sea_orm(iden = "bank transfer")]
    BankTransfer,
    #[sea_orm(iden = "paypal")]
    Paypal,
}

#[derive(DeriveIden, Clone, Copy)]
enum DeliveryStatus {
    #[sea_orm(iden = "delivery_status")]
    Enum,
    #[sea_orm(iden = "not shipped")]
    NotShipped,
    #[sea_orm(iden = "shipped")]
    Shipped,
    #[sea_orm(iden = "delivered")]
    Delivered,
}
