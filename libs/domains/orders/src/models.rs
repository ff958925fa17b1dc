use chrono::{DateTime, NaiveDate, Utc};
use domain_catalog::Product;
use domain_payments::{Payment, PaymentOption};
use domain_users::{Address, AddressInput, User};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle of an order
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "successful")]
    Successful,
    #[sea_orm(string_value = "refunded")]
    Refunded,
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

impl OrderStatus {
    /// Still in progress; the customer may cancel
    pub fn is_active(self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::Processing)
    }

    /// Reached an end state
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            OrderStatus::Successful | OrderStatus::Refunded | OrderStatus::Canceled
        )
    }
}

/// Delivery progress of a shipping
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "delivery_status")]
pub enum DeliveryStatus {
    #[default]
    #[sea_orm(string_value = "not shipped")]
    #[serde(rename = "not shipped")]
    #[strum(serialize = "not shipped")]
    NotShipped,
    #[sea_orm(string_value = "shipped")]
    #[serde(rename = "shipped")]
    #[strum(serialize = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    #[serde(rename = "delivered")]
    #[strum(serialize = "delivered")]
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Sum of the lines at order time
    pub total_amount: f64,
    pub order_date: DateTime<Utc>,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shipping {
    pub id: Uuid,
    pub order_id: Uuid,
    pub address_id: Uuid,
    pub carrier: String,
    pub delivery_status: DeliveryStatus,
    pub estimated_delivery_date: DateTime<Utc>,
    pub shipping_date: Option<DateTime<Utc>>,
}

/// Customer fields shown with an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

impl OrderCustomer {
    /// Name only, as shown in order lists
    pub fn name_of(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email_address: None,
        }
    }

    pub fn with_email(user: &User) -> Self {
        Self {
            email_address: Some(user.email_address.clone()),
            ..Self::name_of(user)
        }
    }
}

/// A user with the address on file, as needed at checkout
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub user: User,
    pub address: Option<Address>,
}

/// Shipping with its delivery address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetail {
    pub id: Uuid,
    pub carrier: String,
    pub delivery_status: DeliveryStatus,
    pub estimated_delivery_date: DateTime<Utc>,
    pub shipping_date: Option<DateTime<Utc>>,
    pub address: Option<Address>,
}

impl ShippingDetail {
    pub fn new(shipping: Shipping, address: Option<Address>) -> Self {
        Self {
            id: shipping.id,
            carrier: shipping.carrier,
            delivery_status: shipping.delivery_status,
            estimated_delivery_date: shipping.estimated_delivery_date,
            shipping_date: shipping.shipping_date,
            address,
        }
    }
}

/// Payment method the order was paid with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayment {
    pub payment_option: PaymentOption,
    pub iban: Option<String>,
    pub credit_card_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub cvc: Option<String>,
    pub paypal_email: Option<String>,
}

impl From<Payment> for OrderPayment {
    fn from(payment: Payment) -> Self {
        Self {
            payment_option: payment.payment_option,
            iban: payment.iban,
            credit_card_number: payment.credit_card_number,
            expiry_date: payment.expiry_date,
            cvc: payment.cvc,
            paypal_email: payment.paypal_email,
        }
    }
}

/// Order line with the ordered product, also when it was deleted since
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub product: Option<Product>,
}

/// Order as listed for admins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub user: Option<OrderCustomer>,
}

/// Order with customer, shipping, payment and lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OrderCustomer>,
    pub shipping: Option<ShippingDetail>,
    pub payment: Option<OrderPayment>,
    pub order_products: Vec<OrderLine>,
}

/// One line of a new order
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    pub product: Option<Uuid>,
    pub quantity: Option<i32>,
}

/// Checkout payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    /// Total as computed by the client; must match the server side sum
    pub total_amount: Option<f64>,
    /// Id of a stored payment method of the customer
    pub payment: Option<Uuid>,
    #[serde(default)]
    pub order_products: Vec<OrderLineInput>,
    /// Ship here instead of the customer's address
    #[validate(nested)]
    pub new_shipping_address: Option<AddressInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedOrder {
    pub id: Uuid,
}

/// Everything written when an order is placed
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub total_amount_cents: i64,
    pub shipping_address: AddressInput,
    pub payment: domain_payments::PaymentDetails,
    /// (product id, quantity)
    pub lines: Vec<(Uuid, i32)>,
}

/// Admin order search
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    /// Defaults to 1
    pub page: Option<u64>,
    /// Defaults to 10
    pub size: Option<u64>,
    /// Order status, order id, or part of the customer's first or last name
    pub search: Option<String>,
    /// Orders containing this product
    pub product_id: Option<Uuid>,
    /// Part of the customer's full name
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub total: u64,
    pub orders: Vec<OrderSummary>,
}

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderCounts {
    pub total: u64,
    /// successful, refunded or canceled
    pub finished: u64,
    /// open or processing
    pub active: u64,
}

impl OrderCounts {
    pub fn from_statuses(counts: &[(OrderStatus, u64)]) -> Self {
        counts
            .iter()
            .fold(OrderCounts::default(), |mut acc, (status, count)| {
                acc.total += count;
                if status.is_finished() {
                    acc.finished += count;
                } else if status.is_active() {
                    acc.active += count;
                }
                acc
            })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatus {
    pub order_status: Option<OrderStatus>,
}

/// Partial shipping update
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShipping {
    #[validate(length(min = 1, max = 200))]
    pub carrier: Option<String>,
    pub delivery_status: Option<DeliveryStatus>,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub shipping_date: Option<DateTime<Utc>>,
}

/// Partial delivery address update
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeliveryAddress {
    #[validate(length(min = 1, max = 200))]
    pub country: Option<String>,
    #[validate(length(max = 50))]
    pub state: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub street: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub house_number: Option<String>,
    #[validate(length(max = 200))]
    pub address_addition: Option<String>,
}

impl UpdateDeliveryAddress {
    /// `current` with the given fields replaced
    pub fn apply(self, current: &Address) -> AddressInput {
        let mut input = current.to_input();
        if let Some(country) = self.country {
            input.country = country;
        }
        if let Some(state) = self.state {
            input.state = state;
        }
        if let Some(city) = self.city {
            input.city = city;
        }
        if let Some(postal_code) = self.postal_code {
            input.postal_code = postal_code;
        }
        if let Some(street) = self.street {
            input.street = street;
        }
        if let Some(house_number) = self.house_number {
            input.house_number = house_number;
        }
        if let Some(address_addition) = self.address_addition {
            input.address_addition = address_addition;
        }
        input
    }
}

/// Replace the payment of an order. The option is taken as text so that
/// unknown options get a dedicated error.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderPayment {
    pub payment_option: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: domain_payments::PaymentFields,
}
