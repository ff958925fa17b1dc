use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, CreateCategory, NewProduct, Product, ProductChanges, ProductWithDetails,
    UpdateCategory, average_rating, cents_to_price,
};
use crate::search::ProductQuery;

/// Repository trait for products, categories and ratings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Matching products (newest first) and the total number of matches
    async fn search_products(
        &self,
        query: ProductQuery,
    ) -> CatalogResult<(Vec<ProductWithDetails>, u64)>;

    /// Product by id, including soft-deleted ones
    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<ProductWithDetails>>;

    /// Number of products that are not deleted
    async fn count_products(&self) -> CatalogResult<u64>;

    /// Insert a product linked to `categories`
    async fn create_product(
        &self,
        product: NewProduct,
        categories: Vec<Uuid>,
    ) -> CatalogResult<ProductWithDetails>;

    /// Apply `changes`; `categories` replaces every category link when given
    async fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
        categories: Option<Vec<Uuid>>,
    ) -> CatalogResult<ProductWithDetails>;

    /// Unlink categories and ratings and mark the product deleted.
    /// Returns false when there is no live product with this id.
    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool>;

    /// Store a rating and return the product's new average
    async fn rate_product(&self, id: Uuid, user_id: Uuid, stars: i16) -> CatalogResult<f64>;

    /// All categories ordered by name
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>>;

    async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category>;

    async fn update_category(&self, id: Uuid, input: UpdateCategory) -> CatalogResult<Category>;

    async fn delete_category(&self, id: Uuid) -> CatalogResult<bool>;

    async fn count_categories(&self) -> CatalogResult<u64>;
}

#[derive(Debug, Default)]
struct CatalogStore {
    products: HashMap<Uuid, Product>,
    categories: HashMap<Uuid, Category>,
    /// product id -> linked category ids
    links: HashMap<Uuid, Vec<Uuid>>,
    /// product id -> stars
    ratings: HashMap<Uuid, Vec<i16>>,
}

impl CatalogStore {
    fn details(&self, product: &Product) -> ProductWithDetails {
        let mut product_categories: Vec<Category> = self
            .links
            .get(&product.id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.categories.get(id).cloned())
            .collect();
        product_categories.sort_by(|a, b| a.name.cmp(&b.name));

        ProductWithDetails {
            product: product.clone(),
            average_rating: self.average(product.id),
            product_categories,
        }
    }

    fn average(&self, product_id: Uuid) -> f64 {
        self.ratings
            .get(&product_id)
            .map(|stars| average_rating(stars))
            .unwrap_or(0.0)
    }

    fn check_categories(&self, ids: &[Uuid]) -> CatalogResult<()> {
        if ids.iter().all(|id| self.categories.contains_key(id)) {
            Ok(())
        } else {
            Err(CatalogError::UnknownCategory)
        }
    }

    fn name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except)
    }
}

fn dedup(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort();
    ids.dedup();
    ids
}

/// In-memory implementation of CatalogRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogRepository {
    store: Arc<RwLock<CatalogStore>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn search_products(
        &self,
        query: ProductQuery,
    ) -> CatalogResult<(Vec<ProductWithDetails>, u64)> {
        let store = self.store.read().await;

        let mut products: Vec<ProductWithDetails> = store
            .products
            .values()
            .filter(|p| {
                let links = store.links.get(&p.id).map(Vec::as_slice).unwrap_or_default();
                query.matches(p, links, store.average(p.id))
            })
            .map(|p| store.details(p))
            .collect();
        products.sort_by(|a, b| {
            b.product
                .created_at
                .cmp(&a.product.created_at)
                .then(b.product.id.cmp(&a.product.id))
        });

        let total = products.len() as u64;
        let products = match query.window {
            Some((limit, offset)) => products
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
            None => products,
        };

        Ok((products, total))
    }

    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<ProductWithDetails>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).map(|p| store.details(p)))
    }

    async fn count_products(&self) -> CatalogResult<u64> {
        let store = self.store.read().await;
        Ok(store.products.values().filter(|p| !p.is_deleted).count() as u64)
    }

    async fn create_product(
        &self,
        input: NewProduct,
        categories: Vec<Uuid>,
    ) -> CatalogResult<ProductWithDetails> {
        let mut store = self.store.write().await;
        let categories = dedup(categories);
        store.check_categories(&categories)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            price: cents_to_price(input.price_cents),
            image: input.image,
            quantity: input.quantity,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        store.links.insert(product.id, categories);
        store.products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(store.details(&product))
    }

    async fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
        categories: Option<Vec<Uuid>>,
    ) -> CatalogResult<ProductWithDetails> {
        let mut store = self.store.write().await;
        if !store.products.contains_key(&id) {
            return Err(CatalogError::ProductMissing(id));
        }

        if let Some(categories) = categories {
            let categories = dedup(categories);
            store.check_categories(&categories)?;
            store.links.insert(id, categories);
        }

        let product = store
            .products
            .get_mut(&id)
            .ok_or(CatalogError::ProductMissing(id))?;
        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(description) = changes.description {
            product.description = description;
        }
        if let Some(price_cents) = changes.price_cents {
            product.price = cents_to_price(price_cents);
        }
        if let Some(image) = changes.image {
            product.image = Some(image);
        }
        if let Some(quantity) = changes.quantity {
            product.quantity = quantity;
        }
        product.updated_at = Utc::now();
        let product = product.clone();

        tracing::info!(product_id = %id, "Updated product");
        Ok(store.details(&product))
    }

    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool> {
        let mut store = self.store.write().await;
        let Some(product) = store.products.get_mut(&id).filter(|p| !p.is_deleted) else {
            return Ok(false);
        };
        product.is_deleted = true;
        product.updated_at = Utc::now();
        store.links.remove(&id);
        store.ratings.remove(&id);

        tracing::info!(product_id = %id, "Deleted product");
        Ok(true)
    }

    async fn rate_product(&self, id: Uuid, _user_id: Uuid, stars: i16) -> CatalogResult<f64> {
        let mut store = self.store.write().await;
        if !store.products.get(&id).is_some_and(|p| !p.is_deleted) {
            return Err(CatalogError::ProductNotFound);
        }
        store.ratings.entry(id).or_default().push(stars);
        Ok(store.average(id))
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let store = self.store.read().await;
        let mut categories: Vec<Category> = store.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        let store = self.store.read().await;
        Ok(store.categories.get(&id).cloned())
    }

    async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        let mut store = self.store.write().await;
        if store.name_taken(&input.name, None) {
            return Err(CatalogError::DuplicateCategory(input.name));
        }

        let category = Category {
            id: Uuid::now_v7(),
            name: input.name,
            category_type: input.category_type,
        };
        store.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: Uuid, input: UpdateCategory) -> CatalogResult<Category> {
        let mut store = self.store.write().await;
        if let Some(name) = &input.name
            && store.name_taken(name, Some(id))
        {
            return Err(CatalogError::DuplicateCategory(name.clone()));
        }

        let category = store
            .categories
            .get_mut(&id)
            .ok_or(CatalogError::CategoryNotFound)?;
        if let Some(name) = input.name {
            category.name = name;
        }
        if let Some(category_type) = input.category_type {
            category.category_type = category_type;
        }
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> CatalogResult<bool> {
        let mut store = self.store.write().await;
        if store.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for links in store.links.values_mut() {
            links.retain(|category| *category != id);
        }
        Ok(true)
    }

    async fn count_categories(&self) -> CatalogResult<u64> {
        let store = self.store.read().await;
        Ok(store.categories.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, price_cents: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            price_cents,
            image: None,
            quantity: 10,
        }
    }

    fn category(name: &str) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
            category_type: name.to_lowercase(),
        }
    }

    #[tokio::test]
    async fn test_create_product_with_categories() {
        let repo = InMemoryCatalogRepository::new();
        let tea = repo.create_category(category("Tee")).await.unwrap();

        let created = repo
            .create_product(new_product("Sencha", 850), vec![tea.id, tea.id])
            .await
            .unwrap();

        assert_eq!(created.product.price, 8.5);
        assert_eq!(created.average_rating, 0.0);
        assert_eq!(created.product_categories, vec![tea]);
    }

    #[tokio::test]
    async fn test_create_product_rejects_unknown_category() {
        let repo = InMemoryCatalogRepository::new();
        let result = repo
            .create_product(new_product("Sencha", 850), vec![Uuid::now_v7()])
            .await;

        assert!(matches!(result, Err(CatalogError::UnknownCategory)));
        assert_eq!(repo.count_products().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_orders_newest_first_and_pages() {
        let repo = InMemoryCatalogRepository::new();
        for name in ["Assam", "Darjeeling", "Oolong"] {
            repo.create_product(new_product(name, 500), vec![])
                .await
                .unwrap();
        }

        let query = ProductQuery {
            window: Some((2, 0)),
            ..Default::default()
        };
        let (products, total) = repo.search_products(query).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].product.name, "Oolong");
    }

    #[tokio::test]
    async fn test_delete_product_is_soft() {
        let repo = InMemoryCatalogRepository::new();
        let tea = repo.create_category(category("Tee")).await.unwrap();
        let product = repo
            .create_product(new_product("Sencha", 850), vec![tea.id])
            .await
            .unwrap();
        let id = product.product.id;
        repo.rate_product(id, Uuid::now_v7(), 5).await.unwrap();

        assert!(repo.delete_product(id).await.unwrap());
        assert!(!repo.delete_product(id).await.unwrap());

        let deleted = repo.get_product(id).await.unwrap().unwrap();
        assert!(deleted.product.is_deleted);
        assert!(deleted.product_categories.is_empty());
        assert_eq!(deleted.average_rating, 0.0);
        assert_eq!(repo.count_products().await.unwrap(), 0);

        let (products, _) = repo
            .search_products(ProductQuery::default())
            .await
            .unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_rate_product_returns_average() {
        let repo = InMemoryCatalogRepository::new();
        let product = repo
            .create_product(new_product("Sencha", 850), vec![])
            .await
            .unwrap();
        let id = product.product.id;

        assert_eq!(repo.rate_product(id, Uuid::now_v7(), 4).await.unwrap(), 4.0);
        assert_eq!(repo.rate_product(id, Uuid::now_v7(), 5).await.unwrap(), 4.5);

        let missing = repo.rate_product(Uuid::now_v7(), Uuid::now_v7(), 5).await;
        assert!(matches!(missing, Err(CatalogError::ProductNotFound)));
    }

    #[tokio::test]
    async fn test_update_product_replaces_links() {
        let repo = InMemoryCatalogRepository::new();
        let tea = repo.create_category(category("Tee")).await.unwrap();
        let herbal = repo.create_category(category("Kräuter")).await.unwrap();
        let product = repo
            .create_product(new_product("Mint", 400), vec![tea.id])
            .await
            .unwrap();

        let changes = ProductChanges {
            price_cents: Some(450),
            ..Default::default()
        };
        let updated = repo
            .update_product(product.product.id, changes, Some(vec![herbal.id]))
            .await
            .unwrap();

        assert_eq!(updated.product.name, "Mint");
        assert_eq!(updated.product.price, 4.5);
        assert_eq!(updated.product_categories, vec![herbal]);
    }

    #[tokio::test]
    async fn test_category_names_are_unique() {
        let repo = InMemoryCatalogRepository::new();
        let tea = repo.create_category(category("Tee")).await.unwrap();
        let coffee = repo.create_category(category("Kaffee")).await.unwrap();

        let duplicate = repo.create_category(category("Tee")).await;
        assert!(matches!(duplicate, Err(CatalogError::DuplicateCategory(_))));

        let rename = UpdateCategory {
            name: Some("Tee".to_string()),
            category_type: None,
        };
        let result = repo.update_category(coffee.id, rename).await;
        assert!(matches!(result, Err(CatalogError::DuplicateCategory(_))));

        let names: Vec<String> = repo
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Kaffee", "Tee"]);

        assert!(repo.delete_category(tea.id).await.unwrap());
        assert_eq!(repo.count_categories().await.unwrap(), 1);
    }
}
