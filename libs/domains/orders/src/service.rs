use domain_catalog::cents_to_price;
use domain_payments::{Payment, PaymentDetails, PaymentOption};
use domain_users::Address;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{
    CreateOrder, CreatedOrder, NewOrder, Order, OrderCounts, OrderDetail, OrderFilter,
    OrderListResponse, OrderStatus, Shipping, UpdateDeliveryAddress, UpdateOrderPayment,
    UpdateOrderStatus, UpdateShipping,
};
use crate::query::OrderQuery;
use crate::repository::{OrderRepository, distinct};

/// Largest accepted difference between the client's and the computed total
pub const TOTAL_TOLERANCE: f64 = 0.01;

/// Service layer for order placement and order administration
#[derive(Clone)]
pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Check the cart against live prices and place the order for `user_id`.
    ///
    /// The stored total is the computed one; the client's total only has to
    /// agree with it within [`TOTAL_TOLERANCE`].
    pub async fn create_order(
        &self,
        user_id: Option<Uuid>,
        input: CreateOrder,
    ) -> OrderResult<CreatedOrder> {
        let user_id = user_id.ok_or(OrderError::NoSessionUser)?;

        let (Some(total_amount), Some(payment_id)) = (input.total_amount, input.payment) else {
            return Err(OrderError::InvalidRequest);
        };
        if input.order_products.is_empty() {
            return Err(OrderError::InvalidRequest);
        }

        let lines = input
            .order_products
            .iter()
            .map(|line| match (line.product, line.quantity) {
                (Some(product), Some(quantity)) if quantity > 0 => Ok((product, quantity)),
                _ => Err(OrderError::InvalidProducts),
            })
            .collect::<OrderResult<Vec<(Uuid, i32)>>>()?;

        let product_ids = distinct(lines.iter().map(|(id, _)| *id));
        let prices = self
            .repository
            .live_product_prices(product_ids.clone())
            .await?;
        if prices.len() != product_ids.len() {
            return Err(OrderError::UnavailableProducts);
        }

        let total_amount_cents: i64 = lines
            .iter()
            .map(|(id, quantity)| prices.get(id).copied().unwrap_or_default() * i64::from(*quantity))
            .sum();
        if (cents_to_price(total_amount_cents) - total_amount).abs() > TOTAL_TOLERANCE {
            return Err(OrderError::TotalMismatch);
        }

        let customer = self
            .repository
            .find_customer(user_id)
            .await?
            .ok_or(OrderError::UserNotFound)?;
        let payment = self
            .repository
            .find_stored_payment(payment_id, user_id)
            .await?
            .ok_or(OrderError::PaymentNotOwned)?;

        let shipping_address = input
            .new_shipping_address
            .or_else(|| customer.address.as_ref().map(Address::to_input))
            .ok_or(OrderError::NoShippingAddress)?;

        let order = self
            .repository
            .place_order(NewOrder {
                user_id,
                total_amount_cents,
                shipping_address,
                payment,
                lines,
            })
            .await?;

        Ok(CreatedOrder { id: order.id })
    }

    pub async fn find_orders(&self, filter: OrderFilter) -> OrderResult<OrderListResponse> {
        let (orders, total) = self
            .repository
            .list(OrderQuery::from_filter(&filter))
            .await?;
        Ok(OrderListResponse { total, orders })
    }

    pub async fn find_order(&self, id: Uuid) -> OrderResult<OrderDetail> {
        self.repository
            .get_detail(id)
            .await?
            .ok_or(OrderError::NotFound)
    }

    pub async fn find_orders_by_user(&self, user_id: Uuid) -> OrderResult<Vec<OrderDetail>> {
        self.repository.list_by_user(user_id).await
    }

    /// Cancel an open or processing order of `user_id`
    pub async fn cancel_order(&self, id: Uuid, user_id: Uuid) -> OrderResult<Order> {
        let order = self
            .repository
            .get(id)
            .await?
            .ok_or(OrderError::NotFound)?;
        if order.user_id != user_id {
            return Err(OrderError::NotOwner);
        }
        if !order.order_status.is_active() {
            return Err(OrderError::NotCancelable);
        }

        let order = self
            .repository
            .set_status(id, OrderStatus::Canceled)
            .await?
            .ok_or(OrderError::NotFound)?;

        tracing::info!(order_id = %id, "Order canceled by customer");
        Ok(order)
    }

    pub async fn count_orders(&self) -> OrderResult<OrderCounts> {
        let counts = self.repository.status_counts().await?;
        Ok(OrderCounts::from_statuses(&counts))
    }

    pub async fn update_order_status(
        &self,
        id: Uuid,
        input: UpdateOrderStatus,
    ) -> OrderResult<Order> {
        let status = input.order_status.ok_or(OrderError::StatusRequired)?;
        self.repository
            .set_status(id, status)
            .await?
            .ok_or(OrderError::NotFound)
    }

    pub async fn update_order_shipping(
        &self,
        id: Uuid,
        input: UpdateShipping,
    ) -> OrderResult<Shipping> {
        self.repository
            .update_shipping(id, input)
            .await?
            .ok_or(OrderError::ShippingNotFound)
    }

    pub async fn update_order_delivery_address(
        &self,
        id: Uuid,
        input: UpdateDeliveryAddress,
    ) -> OrderResult<Address> {
        self.repository
            .update_delivery_address(id, input)
            .await?
            .ok_or(OrderError::AddressNotFound)
    }

    /// Replace the payment an order was paid with. Fields that do not
    /// belong to the new option are cleared.
    pub async fn update_order_payment(
        &self,
        id: Uuid,
        input: UpdateOrderPayment,
    ) -> OrderResult<Payment> {
        if self.repository.get(id).await?.is_none() {
            return Err(OrderError::PaymentNotFound);
        }
        let option = input
            .payment_option
            .as_deref()
            .and_then(|value| PaymentOption::from_str(value).ok())
            .ok_or(OrderError::InvalidPaymentOption)?;

        let details = PaymentDetails::only(option, input.fields);
        let payment = self
            .repository
            .update_payment(id, details)
            .await?
            .ok_or(OrderError::PaymentUpdateFailed)?;

        tracing::info!(order_id = %id, payment_option = %option, "Replaced order payment");
        Ok(payment)
    }
}
