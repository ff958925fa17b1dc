pub mod category;
pub mod product;
pub mod product_category;
pub mod product_rating;
pub mod rating;
