use axum_helpers::{PageMeta, PageParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Price in whole cents, rounded half away from zero
pub fn price_to_cents(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

pub fn cents_to_price(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Product category (tea, coffee, herbal, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 20))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 20))]
    pub category_type: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 20))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 20))]
    pub category_type: Option<String>,
}

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Unit price with two decimal places
    pub price: f64,
    pub image: Option<String>,
    /// Units in stock
    pub quantity: i32,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with its average rating and categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithDetails {
    #[serde(flatten)]
    pub product: Product,
    /// Average star rating, 0 without ratings
    pub average_rating: f64,
    pub product_categories: Vec<Category>,
}

/// Product creation payload
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(max = 80))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 1024))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(length(max = 255))]
    pub image: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub quantity: i32,
    /// Category ids to link
    #[serde(default)]
    pub categories: Vec<Uuid>,
}

/// Partial product update; `productCategories` replaces all links when given
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    #[validate(length(max = 1024))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(length(max = 255))]
    pub image: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    pub product_categories: Option<Vec<Uuid>>,
}

/// Validated product row to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub image: Option<String>,
    pub quantity: i32,
}

/// Column changes of a product update; `None` keeps the value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub image: Option<String>,
    pub quantity: Option<i32>,
}

/// Storefront search parameters
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Case-insensitive match on the product name
    pub search: Option<String>,
    /// Comma separated category ids
    pub categories: Option<String>,
    /// Maximum price
    pub price: Option<f64>,
    /// Minimum average rating
    pub rating: Option<f64>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

impl ProductFilter {
    pub fn paging(&self) -> PageParams {
        PageParams {
            page: self.page,
            size: self.size,
        }
    }

    /// Category ids of the filter; entries that are not UUIDs are skipped
    pub fn category_ids(&self) -> Vec<Uuid> {
        self.categories
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect()
    }
}

/// Search result, with page metadata when paging was requested
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<ProductWithDetails>,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

impl ProductListResponse {
    pub fn new(products: Vec<ProductWithDetails>, total: u64, meta: Option<PageMeta>) -> Self {
        Self {
            products,
            total,
            total_pages: meta.map(|m| m.total_pages),
            current_page: meta.map(|m| m.current_page),
            has_more: meta.map(|m| m.has_more),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RateProduct {
    #[validate(range(min = 1, max = 5))]
    pub stars: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
}

/// Mean of `stars`, 0 for no ratings
pub fn average_rating(stars: &[i16]) -> f64 {
    if stars.is_empty() {
        return 0.0;
    }
    stars.iter().map(|s| f64::from(*s)).sum::<f64>() / stars.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_cents_conversion() {
        assert_eq!(price_to_cents(12.99), 1299);
        assert_eq!(price_to_cents(0.1 + 0.2), 30);
        assert_eq!(cents_to_price(1299), 12.99);
    }

    #[test]
    fn test_category_ids_skip_invalid_entries() {
        let id = Uuid::now_v7();
        let filter = ProductFilter {
            categories: Some(format!("{}, nope,,", id)),
            ..Default::default()
        };
        assert_eq!(filter.category_ids(), vec![id]);
        assert!(ProductFilter::default().category_ids().is_empty());
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[4, 5]), 4.5);
    }

    #[test]
    fn test_category_type_is_serialized_as_type() {
        let category = Category {
            id: Uuid::nil(),
            name: "Tee".to_string(),
            category_type: "tea".to_string(),
        };
        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["type"], "tea");
    }
}
