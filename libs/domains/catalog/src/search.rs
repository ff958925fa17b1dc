//! Dynamic SQL for the storefront product search.
//!
//! Filters on product columns go into `WHERE`, the minimum average rating
//! into `HAVING`. The name search is matched literally. Parameters are
//! numbered in the order they are pushed, so the list and count statements
//! share the same builder.

use database::like_pattern;
use sea_orm::Value;
use uuid::Uuid;

use crate::models::{Product, ProductFilter, price_to_cents};

const SELECT_PRODUCTS: &str = "SELECT p.id, p.name, p.description, p.price_cents, p.image, \
     p.quantity, p.is_deleted, p.created_at, p.updated_at, \
     COALESCE(AVG(r.stars), 0)::float8 AS average_rating, \
     COALESCE((SELECT json_agg(json_build_object('id', c.id, 'name', c.name, 'type', c.type) \
     ORDER BY c.name) FROM product_categories pc JOIN categories c ON c.id = pc.category_id \
     WHERE pc.product_id = p.id), '[]'::json) AS product_categories";

const FROM_PRODUCTS: &str = " FROM products p \
     LEFT JOIN product_ratings pr ON pr.product_id = p.id \
     LEFT JOIN ratings r ON r.id = pr.rating_id";

/// Product search criteria
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub id: Option<Uuid>,
    /// Substring of the name, matched case-insensitively
    pub search: Option<String>,
    /// Products linked to any of these categories
    pub categories: Vec<Uuid>,
    pub max_price_cents: Option<i64>,
    pub min_rating: Option<f64>,
    pub include_deleted: bool,
    /// `(limit, offset)`
    pub window: Option<(u64, u64)>,
}

struct Clauses {
    sql: String,
    values: Vec<Value>,
}

impl Clauses {
    fn placeholder(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }
}

impl ProductQuery {
    /// Lookup of a single product, deleted or not
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            include_deleted: true,
            ..Default::default()
        }
    }

    pub fn from_filter(filter: &ProductFilter) -> Self {
        Self {
            id: None,
            search: filter
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            categories: filter.category_ids(),
            max_price_cents: filter.price.map(price_to_cents),
            min_rating: filter.rating,
            include_deleted: false,
            window: filter.paging().window(),
        }
    }

    /// Whether a product with the given category links and average rating
    /// satisfies the criteria
    pub fn matches(&self, product: &Product, category_ids: &[Uuid], average_rating: f64) -> bool {
        if self.id.is_some_and(|id| id != product.id) {
            return false;
        }
        if !self.include_deleted && product.is_deleted {
            return false;
        }
        if let Some(search) = &self.search
            && !product.name.to_lowercase().contains(&search.to_lowercase())
        {
            return false;
        }
        if !self.categories.is_empty() && !category_ids.iter().any(|id| self.categories.contains(id))
        {
            return false;
        }
        if self
            .max_price_cents
            .is_some_and(|max| price_to_cents(product.price) > max)
        {
            return false;
        }
        self.min_rating.is_none_or(|min| average_rating >= min)
    }

    fn filtered(&self) -> Clauses {
        let mut clauses = Clauses {
            sql: String::from(FROM_PRODUCTS),
            values: Vec::new(),
        };
        let mut conditions = Vec::new();

        if let Some(id) = self.id {
            conditions.push(format!("p.id = {}", clauses.placeholder(id)));
        }
        if !self.include_deleted {
            conditions.push("p.is_deleted = FALSE".to_string());
        }
        if let Some(search) = &self.search {
            conditions.push(format!(
                "p.name ILIKE {}",
                clauses.placeholder(like_pattern(search))
            ));
        }
        if !self.categories.is_empty() {
            let placeholders: Vec<String> = self
                .categories
                .iter()
                .map(|id| clauses.placeholder(*id))
                .collect();
            conditions.push(format!(
                "p.id IN (SELECT product_id FROM product_categories WHERE category_id IN ({}))",
                placeholders.join(", ")
            ));
        }
        if let Some(max) = self.max_price_cents {
            conditions.push(format!("p.price_cents <= {}", clauses.placeholder(max)));
        }

        if !conditions.is_empty() {
            clauses.sql.push_str(" WHERE ");
            clauses.sql.push_str(&conditions.join(" AND "));
        }

        clauses.sql.push_str(" GROUP BY p.id");

        if let Some(min) = self.min_rating {
            let placeholder = clauses.placeholder(min);
            clauses.sql.push_str(&format!(
                " HAVING COALESCE(AVG(r.stars), 0) >= {}",
                placeholder
            ));
        }

        clauses
    }

    /// Statement selecting the matching products, newest first
    pub fn select(&self) -> (String, Vec<Value>) {
        let mut clauses = self.filtered();
        let mut sql = format!("{}{}", SELECT_PRODUCTS, clauses.sql);
        sql.push_str(" ORDER BY p.created_at DESC, p.id DESC");

        if let Some((limit, offset)) = self.window {
            let limit = clauses.placeholder(i64::try_from(limit).unwrap_or(i64::MAX));
            let offset = clauses.placeholder(i64::try_from(offset).unwrap_or(i64::MAX));
            sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
        }

        (sql, clauses.values)
    }

    /// Statement counting all matches, ignoring the window
    pub fn count(&self) -> (String, Vec<Value>) {
        let clauses = self.filtered();
        let sql = format!(
            "SELECT COUNT(*) AS total FROM (SELECT p.id{}) AS matches",
            clauses.sql
        );
        (sql, clauses.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, price: f64) -> Product {
        Product {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: String::new(),
            price,
            image: None,
            quantity: 10,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_query_only_hides_deleted_products() {
        let (sql, values) = ProductQuery::default().select();
        assert!(sql.contains("WHERE p.is_deleted = FALSE GROUP BY p.id"));
        assert!(!sql.contains("HAVING"));
        assert!(!sql.contains("LIMIT"));
        assert!(values.is_empty());
    }

    #[test]
    fn test_parameters_are_numbered_in_order() {
        let categories = vec![Uuid::now_v7(), Uuid::now_v7()];
        let query = ProductQuery {
            search: Some("green".to_string()),
            categories: categories.clone(),
            max_price_cents: Some(1500),
            min_rating: Some(3.5),
            window: Some((10, 20)),
            ..Default::default()
        };

        let (sql, values) = query.select();
        assert!(sql.contains("p.name ILIKE $1"));
        assert!(sql.contains("category_id IN ($2, $3)"));
        assert!(sql.contains("p.price_cents <= $4"));
        assert!(sql.contains("HAVING COALESCE(AVG(r.stars), 0) >= $5"));
        assert!(sql.ends_with("LIMIT $6 OFFSET $7"));
        assert_eq!(values.len(), 7);
        assert_eq!(values[0], Value::from("%green%".to_string()));
        assert_eq!(values[5], Value::from(10i64));
        assert_eq!(values[6], Value::from(20i64));
    }

    #[test]
    fn test_name_search_wildcards_are_literal() {
        let query = ProductQuery::from_filter(&ProductFilter {
            search: Some(" 100%_bio ".to_string()),
            ..Default::default()
        });

        let (_, values) = query.select();
        assert_eq!(values[0], Value::from("%100\\%\\_bio%".to_string()));
        assert!(!query.matches(&product("1000 bio", 5.0), &[], 0.0));
        assert!(query.matches(&product("Sencha 100%_bio", 5.0), &[], 0.0));
    }

    #[test]
    fn test_count_ignores_window() {
        let query = ProductQuery {
            min_rating: Some(4.0),
            window: Some((5, 0)),
            ..Default::default()
        };

        let (sql, values) = query.count();
        assert!(sql.starts_with("SELECT COUNT(*) AS total FROM (SELECT p.id FROM products p"));
        assert!(sql.ends_with("HAVING COALESCE(AVG(r.stars), 0) >= $1) AS matches"));
        assert!(!sql.contains("LIMIT"));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_by_id_includes_deleted() {
        let id = Uuid::now_v7();
        let (sql, values) = ProductQuery::by_id(id).select();
        assert!(sql.contains("WHERE p.id = $1 GROUP BY"));
        assert!(!sql.contains("is_deleted = FALSE"));
        assert_eq!(values, vec![Value::from(id)]);
    }

    #[test]
    fn test_from_filter() {
        let category = Uuid::now_v7();
        let filter = ProductFilter {
            search: Some("  ".to_string()),
            categories: Some(category.to_string()),
            price: Some(9.99),
            rating: None,
            page: Some(2),
            size: Some(5),
        };

        let query = ProductQuery::from_filter(&filter);
        assert_eq!(query.search, None);
        assert_eq!(query.categories, vec![category]);
        assert_eq!(query.max_price_cents, Some(999));
        assert_eq!(query.window, Some((5, 5)));
    }

    #[test]
    fn test_matches() {
        let sencha = product("Sencha Green", 8.5);
        let category = Uuid::now_v7();

        let query = ProductQuery {
            search: Some("green".to_string()),
            max_price_cents: Some(900),
            ..Default::default()
        };
        assert!(query.matches(&sencha, &[], 0.0));
        assert!(!query.matches(&product("Earl Grey", 5.0), &[], 0.0));

        let query = ProductQuery {
            categories: vec![category],
            min_rating: Some(4.0),
            ..Default::default()
        };
        assert!(query.matches(&sencha, &[category], 4.5));
        assert!(!query.matches(&sencha, &[], 4.5));
        assert!(!query.matches(&sencha, &[category], 3.0));

        let deleted = Product {
            is_deleted: true,
            ..sencha.clone()
        };
        assert!(!ProductQuery::default().matches(&deleted, &[], 0.0));
        assert!(ProductQuery::by_id(deleted.id).matches(&deleted, &[], 0.0));
    }
}
