//! Catalog Domain
//!
//! Products, categories and star ratings, plus the storefront product
//! search.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /product and /category endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Required fields, price conversion, defaults
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, search query builder
//! └─────────────┘
//! ```
//!
//! Prices are stored as integer cents and exposed as decimal numbers.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{handlers, repository::InMemoryCatalogRepository, service::CatalogService};
//!
//! let service = CatalogService::new(InMemoryCatalogRepository::new());
//!
//! let products = handlers::product_router(service.clone());
//! let categories = handlers::category_router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod search;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use models::{
    Category, CreateCategory, CreateProduct, NewProduct, Product, ProductChanges, ProductFilter,
    ProductListResponse, ProductWithDetails, RateProduct, RatingSummary, UpdateCategory,
    UpdateProduct, cents_to_price, price_to_cents,
};
pub use postgres::PgCatalogRepository;
pub use repository::{CatalogRepository, InMemoryCatalogRepository};
pub use search::ProductQuery;
pub use service::CatalogService;
