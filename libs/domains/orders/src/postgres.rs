use async_trait::async_trait;
use database::BaseRepository;
use domain_payments::{Payment, PaymentDetails};
use domain_users::Address;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend,
    EntityTrait, FromQueryResult, IntoActiveModel, QueryFilter, QueryOrder, Statement,
    TransactionTrait,
};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    entity::{address, order, order_product, payment, product, shipping, user},
    error::{OrderError, OrderResult},
    models::{
        Customer, NewOrder, Order, OrderCustomer, OrderDetail, OrderLine, OrderPayment,
        OrderStatus, OrderSummary, Shipping, ShippingDetail, UpdateDeliveryAddress,
        UpdateShipping,
    },
    query::OrderQuery,
    repository::OrderRepository,
};

pub struct PgOrderRepository {
    base: BaseRepository<order::Entity>,
}

impl PgOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

fn parse_status(value: &str) -> OrderResult<OrderStatus> {
    OrderStatus::from_str(value)
        .map_err(|_| OrderError::Internal(format!("Unknown order status: {}", value)))
}

/// Row shape produced by [`OrderQuery::select`]
#[derive(Debug, FromQueryResult)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    total_amount_cents: i64,
    order_date: chrono::DateTime<chrono::Utc>,
    order_status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl TryFrom<OrderRow> for OrderSummary {
    type Error = OrderError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let user = match (row.first_name, row.last_name) {
            (Some(first_name), Some(last_name)) => Some(OrderCustomer {
                id: row.user_id,
                first_name,
                last_name,
                email_address: None,
            }),
            _ => None,
        };

        Ok(Self {
            order: Order {
                id: row.id,
                user_id: row.user_id,
                total_amount: domain_catalog::cents_to_price(row.total_amount_cents),
                order_date: row.order_date,
                order_status: parse_status(&row.order_status)?,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            user,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct StatusCountRow {
    order_status: String,
    total: i64,
}

/// Load everything an [`OrderDetail`] shows for `orders`, one query per table
async fn load_details<C: ConnectionTrait>(
    db: &C,
    orders: Vec<order::Model>,
    with_customer: bool,
) -> OrderResult<Vec<OrderDetail>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let shippings: HashMap<Uuid, shipping::Model> = shipping::Entity::find()
        .filter(shipping::Column::OrderId.is_in(order_ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.order_id, s))
        .collect();

    let address_ids: Vec<Uuid> = shippings.values().map(|s| s.address_id).collect();
    let addresses: HashMap<Uuid, Address> = address::Entity::find()
        .filter(address::Column::Id.is_in(address_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a.into()))
        .collect();

    let mut payments: HashMap<Uuid, OrderPayment> = HashMap::new();
    for model in payment::Entity::find()
        .filter(payment::Column::OrderId.is_in(order_ids.clone()))
        .filter(payment::Column::IsForOrder.eq(true))
        .all(db)
        .await?
    {
        if let Some(order_id) = model.order_id {
            payments.insert(order_id, Payment::from(model).into());
        }
    }

    let lines = order_product::Entity::find()
        .filter(order_product::Column::OrderId.is_in(order_ids))
        .order_by_asc(order_product::Column::Id)
        .all(db)
        .await?;

    let product_ids: Vec<Uuid> = crate::repository::distinct(lines.iter().map(|l| l.product_id));
    let products: HashMap<Uuid, domain_catalog::Product> = product::Entity::find()
        .filter(product::Column::Id.is_in(product_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.into()))
        .collect();

    let mut customers: HashMap<Uuid, OrderCustomer> = HashMap::new();
    if with_customer {
        let user_ids = crate::repository::distinct(orders.iter().map(|o| o.user_id));
        for model in user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
        {
            let user = domain_users::User::from(model);
            customers.insert(user.id, OrderCustomer::with_email(&user));
        }
    }

    let mut lines_by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for line in lines {
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push(OrderLine {
                id: line.id,
                product_id: line.product_id,
                quantity: line.quantity,
                product: products.get(&line.product_id).cloned(),
            });
    }

    Ok(orders
        .into_iter()
        .map(|model| {
            let shipping = shippings.get(&model.id).map(|s| {
                ShippingDetail::new(s.clone().into(), addresses.get(&s.address_id).cloned())
            });
            OrderDetail {
                user: customers.get(&model.user_id).cloned(),
                shipping,
                payment: payments.remove(&model.id),
                order_products: lines_by_order.remove(&model.id).unwrap_or_default(),
                order: model.into(),
            }
        })
        .collect())
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn live_product_prices(&self, ids: Vec<Uuid>) -> OrderResult<HashMap<Uuid, i64>> {
        let models = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .filter(product::Column::IsDeleted.eq(false))
            .all(self.base.db())
            .await?;

        Ok(models.into_iter().map(|p| (p.id, p.price_cents)).collect())
    }

    async fn find_customer(&self, user_id: Uuid) -> OrderResult<Option<Customer>> {
        let db = self.base.db();
        let Some(model) = user::Entity::find_by_id(user_id)
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let address = match model.address_id {
            Some(id) => address::Entity::find_by_id(id)
                .one(db)
                .await?
                .map(Into::into),
            None => None,
        };

        Ok(Some(Customer {
            user: model.into(),
            address,
        }))
    }

    async fn find_stored_payment(
        &self,
        payment_id: Uuid,
        user_id: Uuid,
    ) -> OrderResult<Option<PaymentDetails>> {
        let model = payment::Entity::find_by_id(payment_id)
            .filter(payment::Column::UserId.eq(user_id))
            .filter(payment::Column::IsForOrder.eq(false))
            .one(self.base.db())
            .await?;

        Ok(model.map(|m| Payment::from(m).details()))
    }

    async fn place_order(&self, input: NewOrder) -> OrderResult<Order> {
        let txn = self.base.db().begin().await?;

        let address = address::ActiveModel::from_input(input.shipping_address)
            .insert(&txn)
            .await?;
        let order = order::ActiveModel::placed(input.user_id, input.total_amount_cents)
            .insert(&txn)
            .await?;
        shipping::ActiveModel::for_new_order(order.id, address.id)
            .insert(&txn)
            .await?;
        payment::ActiveModel::order_snapshot(input.payment, input.user_id, order.id)
            .insert(&txn)
            .await?;

        if !input.lines.is_empty() {
            let lines = input
                .lines
                .into_iter()
                .map(|(product_id, quantity)| {
                    order_product::ActiveModel::line(order.id, product_id, quantity)
                });
            order_product::Entity::insert_many(lines)
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        tracing::info!(order_id = %order.id, user_id = %order.user_id, "Placed order");
        Ok(order.into())
    }

    async fn list(&self, query: OrderQuery) -> OrderResult<(Vec<OrderSummary>, u64)> {
        let db = self.base.db();

        let (sql, values) = query.select();
        let rows = OrderRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            values,
        ))
        .all(db)
        .await?;

        let (sql, values) = query.count();
        let total = CountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            values,
        ))
        .one(db)
        .await?
        .map(|r| r.total as u64)
        .unwrap_or(0);

        let orders = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<OrderResult<Vec<_>>>()?;
        Ok((orders, total))
    }

    async fn get(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self
            .base
            .find_by_id(id)
            .await?
            .map(Into::into))
    }

    async fn get_detail(&self, id: Uuid) -> OrderResult<Option<OrderDetail>> {
        let db = self.base.db();
        let Some(model) = self.base.find_by_id(id).await? else {
            return Ok(None);
        };

        Ok(load_details(db, vec![model], true).await?.into_iter().next())
    }

    async fn list_by_user(&self, user_id: Uuid) -> OrderResult<Vec<OrderDetail>> {
        let db = self.base.db();
        let models = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(db)
            .await?;

        load_details(db, models, false).await
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<Option<Order>> {
        let Some(model) = self.base.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active = model.into_active_model();
        active.order_status = Set(status);
        active.updated_at = Set(chrono::Utc::now().into());
        let model = self.base.update(active).await?;

        tracing::info!(order_id = %id, status = %status, "Updated order status");
        Ok(Some(model.into()))
    }

    async fn status_counts(&self) -> OrderResult<Vec<(OrderStatus, u64)>> {
        let rows = StatusCountRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            "SELECT order_status::text AS order_status, COUNT(*) AS total \
             FROM orders GROUP BY order_status",
        ))
        .all(self.base.db())
        .await?;

        rows.into_iter()
            .map(|row| Ok((parse_status(&row.order_status)?, row.total as u64)))
            .collect()
    }

    async fn update_shipping(
        &self,
        order_id: Uuid,
        update: UpdateShipping,
    ) -> OrderResult<Option<Shipping>> {
        let db = self.base.db();
        let Some(model) = shipping::Entity::find()
            .filter(shipping::Column::OrderId.eq(order_id))
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let mut active = model.into_active_model();
        active.apply_update(update);
        let model = active.update(db).await?;

        tracing::info!(order_id = %order_id, "Updated shipping");
        Ok(Some(model.into()))
    }

    async fn update_delivery_address(
        &self,
        order_id: Uuid,
        update: UpdateDeliveryAddress,
    ) -> OrderResult<Option<Address>> {
        let db = self.base.db();
        let Some(shipping) = shipping::Entity::find()
            .filter(shipping::Column::OrderId.eq(order_id))
            .one(db)
            .await?
        else {
            return Ok(None);
        };
        let Some(model) = address::Entity::find_by_id(shipping.address_id)
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let input = update.apply(&Address::from(model.clone()));
        let mut active = model.into_active_model();
        active.apply_input(input);
        let model = active.update(db).await?;

        tracing::info!(order_id = %order_id, "Updated delivery address");
        Ok(Some(model.into()))
    }

    async fn update_payment(
        &self,
        order_id: Uuid,
        details: PaymentDetails,
    ) -> OrderResult<Option<Payment>> {
        let db = self.base.db();
        let Some(model) = payment::Entity::find()
            .filter(payment::Column::OrderId.eq(order_id))
            .filter(payment::Column::IsForOrder.eq(true))
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let mut active = model.into_active_model();
        active.apply_details(details);
        let model = active.update(db).await?;

        tracing::info!(order_id = %order_id, "Updated order payment");
        Ok(Some(model.into()))
    }
}
