//! SQL for the admin order search.
//!
//! Orders are joined to their customer so that the name filters and the
//! list share one statement. Text filters are matched literally: `%` and
//! `_` typed by the admin are escaped.

use axum_helpers::page_window;
use database::like_pattern;
use sea_orm::Value;
use uuid::Uuid;

use crate::models::{Order, OrderCustomer, OrderFilter};

/// Page size when none is requested
pub const DEFAULT_PAGE_SIZE: u64 = 10;

const SELECT_ORDERS: &str = "SELECT o.id, o.user_id, o.total_amount_cents, o.order_date, \
     o.order_status::text AS order_status, o.created_at, o.updated_at, \
     u.first_name, u.last_name";

const FROM_ORDERS: &str = " FROM orders o LEFT JOIN users u ON u.id = o.user_id";

/// Admin order search criteria
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    /// Status or id equal to, or customer first/last name containing this.
    /// Trimmed and lowercase.
    pub search: Option<String>,
    /// Orders with a line for this product
    pub product_id: Option<Uuid>,
    /// Substring of `"first last"`, trimmed and lowercase
    pub user_name: Option<String>,
    pub limit: u64,
    pub offset: u64,
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

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

impl OrderQuery {
    pub fn from_filter(filter: &OrderFilter) -> Self {
        let (limit, offset) = page_window(
            filter.page.unwrap_or(1),
            filter.size.unwrap_or(DEFAULT_PAGE_SIZE),
        );

        Self {
            search: normalized(filter.search.as_deref()),
            product_id: filter.product_id,
            user_name: normalized(filter.user_name.as_deref()),
            limit,
            offset,
        }
    }

    /// Whether `order`, placed by `customer` with lines for `product_ids`,
    /// matches. Mirrors the SQL filters.
    pub fn matches(
        &self,
        order: &Order,
        customer: Option<&OrderCustomer>,
        product_ids: &[Uuid],
    ) -> bool {
        let first = customer
            .map(|c| c.first_name.to_lowercase())
            .unwrap_or_default();
        let last = customer
            .map(|c| c.last_name.to_lowercase())
            .unwrap_or_default();

        if let Some(search) = &self.search {
            let hit = order.order_status.to_string() == *search
                || order.id.to_string() == *search
                || first.contains(search.as_str())
                || last.contains(search.as_str());
            if !hit {
                return false;
            }
        }
        if let Some(product_id) = self.product_id
            && !product_ids.contains(&product_id)
        {
            return false;
        }
        if let Some(user_name) = &self.user_name
            && (customer.is_none() || !format!("{} {}", first, last).contains(user_name.as_str()))
        {
            return false;
        }
        true
    }

    fn filtered(&self) -> Clauses {
        let mut clauses = Clauses {
            sql: String::from(FROM_ORDERS),
            values: Vec::new(),
        };
        let mut conditions = Vec::new();

        if let Some(search) = &self.search {
            let exact = clauses.placeholder(search.clone());
            let pattern = clauses.placeholder(like_pattern(search));
            conditions.push(format!(
                "(o.order_status::text = {exact} OR o.id::text = {exact} \
                 OR LOWER(u.first_name) LIKE {pattern} OR LOWER(u.last_name) LIKE {pattern})"
            ));
        }
        if let Some(product_id) = self.product_id {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM order_products op WHERE op.order_id = o.id AND op.product_id = {})",
                clauses.placeholder(product_id)
            ));
        }
        if let Some(user_name) = &self.user_name {
            conditions.push(format!(
                "LOWER(u.first_name || ' ' || u.last_name) LIKE {}",
                clauses.placeholder(like_pattern(user_name))
            ));
        }

        if !conditions.is_empty() {
            clauses.sql.push_str(" WHERE ");
            clauses.sql.push_str(&conditions.join(" AND "));
        }

        clauses
    }

    /// Statement selecting one page of matching orders, newest first
    pub fn select(&self) -> (String, Vec<Value>) {
        let mut clauses = self.filtered();
        let mut sql = format!("{}{}", SELECT_ORDERS, clauses.sql);
        sql.push_str(" ORDER BY o.created_at DESC, o.id DESC");

        let limit = clauses.placeholder(i64::try_from(self.limit).unwrap_or(i64::MAX));
        let offset = clauses.placeholder(i64::try_from(self.offset).unwrap_or(i64::MAX));
        sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        (sql, clauses.values)
    }

    /// Statement counting all matches
    pub fn count(&self) -> (String, Vec<Value>) {
        let clauses = self.filtered();
        (format!("SELECT COUNT(*) AS total{}", clauses.sql), clauses.values)
    }
}
