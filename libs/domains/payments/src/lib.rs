//! Payments Domain
//!
//! Stored payment methods of a customer: credit card, bank transfer or
//! PayPal. Orders keep their own copy of the method they were paid with
//! (`isForOrder = true`); those snapshots are owned by the orders domain
//! and never show up here.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_payments::{handlers, PaymentService, InMemoryPaymentRepository};
//!
//! let service = PaymentService::new(InMemoryPaymentRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{PaymentError, PaymentResult};
pub use models::{
    CreatePayment, NewPayment, Payment, PaymentDetails, PaymentFields, PaymentOption, UpdatePayment,
};
pub use postgres::PgPaymentRepository;
pub use repository::{InMemoryPaymentRepository, PaymentRepository};
pub use service::PaymentService;
