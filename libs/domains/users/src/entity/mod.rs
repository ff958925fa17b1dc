//! SeaORM entities of the users domain.
//!
//! `address` is shared with the orders domain, which copies customer
//! addresses onto shipments.

pub mod address;
pub mod user;
