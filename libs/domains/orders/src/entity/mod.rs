pub mod order;
pub mod order_product;
pub mod shipping;

pub use domain_catalog::entity::product;
pub use domain_payments::entity::payment;
pub use domain_users::entity::{address, user};
