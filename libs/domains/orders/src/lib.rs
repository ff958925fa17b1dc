//! Orders Domain
//!
//! Checkout and order administration. Placing an order checks the cart
//! against live product prices, then writes the delivery address, the order,
//! its shipping, a snapshot of the chosen payment method and the order lines
//! in one transaction.
//!
//! Customers list and cancel their own orders; admins search all orders and
//! edit status, shipping, delivery address and payment.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_orders::{handlers, InMemoryOrderRepository, OrderService};
//!
//! let service = OrderService::new(InMemoryOrderRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod query;
pub mod repository;
pub mod service;

pub use error::{OrderError, OrderResult};
pub use models::{
    CreateOrder, CreatedOrder, Customer, DeliveryStatus, NewOrder, Order, OrderCounts,
    OrderDetail, OrderFilter, OrderLine, OrderLineInput, OrderListResponse, OrderStatus,
    OrderSummary, Shipping, UpdateDeliveryAddress, UpdateOrderPayment, UpdateOrderStatus,
    UpdateShipping,
};
pub use postgres::PgOrderRepository;
pub use query::OrderQuery;
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::OrderService;
