//! PostgreSQL plumbing shared by the teashop services.
//!
//! # Features
//!
//! - `postgres` (default) - SeaORM connector, health checks, migrations runner
//!   and [`BaseRepository`]
//! - `config` - `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! # Example
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config_with_retry(PostgresConfig::from_env()?, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "teashop_api").await?;
//! ```

pub mod common;
pub mod sql;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub mod repository;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
pub use sql::like_pattern;

#[cfg(feature = "postgres")]
pub use repository::BaseRepository;
