use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, CreateCategory, CreateProduct, NewProduct, ProductChanges, ProductFilter,
    ProductListResponse, ProductWithDetails, RatingSummary, UpdateCategory, UpdateProduct,
    price_to_cents,
};
use crate::repository::CatalogRepository;
use crate::search::ProductQuery;

/// Categories created on an empty catalog: (name, type)
pub const DEFAULT_CATEGORIES: [(&str, &str); 3] =
    [("Tee", "tea"), ("Kaffee", "coffee"), ("Kräuter", "herbal")];

/// Service layer for catalog business logic
#[derive(Clone)]
pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn create_product(&self, input: CreateProduct) -> CatalogResult<ProductWithDetails> {
        let name = input
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let (Some(name), Some(price)) = (name, input.price) else {
            return Err(CatalogError::MissingNameOrPrice);
        };
        if price < 0.0 {
            return Err(CatalogError::Validation(
                "Price must not be negative.".to_string(),
            ));
        }

        let product = NewProduct {
            name,
            description: input.description,
            price_cents: price_to_cents(price),
            image: input.image,
            quantity: input.quantity,
        };

        self.repository
            .create_product(product, input.categories)
            .await
    }

    pub async fn find_products(&self, filter: ProductFilter) -> CatalogResult<ProductListResponse> {
        let paging = filter.paging();
        let (products, total) = self
            .repository
            .search_products(ProductQuery::from_filter(&filter))
            .await?;

        Ok(ProductListResponse::new(products, total, paging.meta(total)))
    }

    pub async fn get_product(&self, id: Uuid) -> CatalogResult<ProductWithDetails> {
        self.repository
            .get_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)
    }

    pub async fn count_products(&self) -> CatalogResult<u64> {
        self.repository.count_products().await
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProduct,
    ) -> CatalogResult<ProductWithDetails> {
        let changes = ProductChanges {
            name: input.name.map(|name| name.trim().to_string()),
            description: input.description,
            price_cents: input.price.map(price_to_cents),
            image: input.image,
            quantity: input.quantity,
        };

        self.repository
            .update_product(id, changes, input.product_categories)
            .await
    }

    pub async fn delete_product(&self, id: Uuid) -> CatalogResult<()> {
        if !self.repository.delete_product(id).await? {
            return Err(CatalogError::ProductNotFound);
        }
        Ok(())
    }

    pub async fn rate_product(
        &self,
        id: Uuid,
        user_id: Uuid,
        stars: i16,
    ) -> CatalogResult<RatingSummary> {
        if !(1..=5).contains(&stars) {
            return Err(CatalogError::Validation(
                "Stars must be between 1 and 5.".to_string(),
            ));
        }

        let average_rating = self.repository.rate_product(id, user_id, stars).await?;
        Ok(RatingSummary { average_rating })
    }

    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.repository.list_categories().await
    }

    pub async fn get_category(&self, id: Uuid) -> CatalogResult<Category> {
        self.repository
            .get_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound)
    }

    pub async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        self.repository.create_category(input).await
    }

    pub async fn update_category(&self, id: Uuid, input: UpdateCategory) -> CatalogResult<Category> {
        self.repository.update_category(id, input).await
    }

    pub async fn delete_category(&self, id: Uuid) -> CatalogResult<()> {
        if !self.repository.delete_category(id).await? {
            return Err(CatalogError::CategoryNotFound);
        }
        Ok(())
    }

    /// Create [`DEFAULT_CATEGORIES`] when no category exists yet.
    /// Returns the number of categories created.
    pub async fn seed_default_categories(&self) -> CatalogResult<usize> {
        if self.repository.count_categories().await? > 0 {
            return Ok(0);
        }

        for (name, category_type) in DEFAULT_CATEGORIES {
            self.repository
                .create_category(CreateCategory {
                    name: name.to_string(),
                    category_type: category_type.to_string(),
                })
                .await?;
        }

        tracing::info!(count = DEFAULT_CATEGORIES.len(), "Seeded default categories");
        Ok(DEFAULT_CATEGORIES.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use crate::repository::MockCatalogRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn details(name: &str, price: f64) -> ProductWithDetails {
        ProductWithDetails {
            product: Product {
                id: Uuid::now_v7(),
                name: name.to_string(),
                description: String::new(),
                price,
                image: None,
                quantity: 5,
                is_deleted: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            average_rating: 0.0,
            product_categories: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_product_requires_name_and_price() {
        let service = CatalogService::new(MockCatalogRepository::new());

        let missing_price = CreateProduct {
            name: Some("Sencha".to_string()),
            ..Default::default()
        };
        let result = service.create_product(missing_price).await;
        assert!(matches!(result, Err(CatalogError::MissingNameOrPrice)));

        let blank_name = CreateProduct {
            name: Some("  ".to_string()),
            price: Some(4.0),
            ..Default::default()
        };
        let result = service.create_product(blank_name).await;
        assert!(matches!(result, Err(CatalogError::MissingNameOrPrice)));
    }

    #[tokio::test]
    async fn test_create_product_converts_price_to_cents() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_create_product()
            .withf(|product, categories| product.price_cents == 1299 && categories.is_empty())
            .returning(|product, _| Ok(details(&product.name, 12.99)));

        let service = CatalogService::new(mock_repo);
        let created = service
            .create_product(CreateProduct {
                name: Some("Matcha".to_string()),
                price: Some(12.99),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.product.name, "Matcha");
    }

    #[tokio::test]
    async fn test_find_products_adds_page_meta() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_search_products()
            .withf(|query| query.window == Some((2, 2)))
            .returning(|_| Ok((vec![details("Assam", 4.0)], 5)));

        let service = CatalogService::new(mock_repo);
        let response = service
            .find_products(ProductFilter {
                page: Some(2),
                size: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.total, 5);
        assert_eq!(response.total_pages, Some(3));
        assert_eq!(response.current_page, Some(2));
        assert_eq!(response.has_more, Some(true));
    }

    #[tokio::test]
    async fn test_find_products_without_paging_has_no_meta() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_search_products()
            .returning(|_| Ok((vec![], 0)));

        let service = CatalogService::new(mock_repo);
        let response = service
            .find_products(ProductFilter::default())
            .await
            .unwrap();

        assert_eq!(response.total, 0);
        assert!(response.total_pages.is_none());
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_get_product().returning(|_| Ok(None));

        let service = CatalogService::new(mock_repo);
        let result = service.get_product(Uuid::now_v7()).await;
        assert!(matches!(result, Err(CatalogError::ProductNotFound)));
    }

    #[tokio::test]
    async fn test_delete_missing_product() {
        let id = Uuid::now_v7();
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo
            .expect_delete_product()
            .with(eq(id))
            .returning(|_| Ok(false));

        let service = CatalogService::new(mock_repo);
        assert!(matches!(
            service.delete_product(id).await,
            Err(CatalogError::ProductNotFound)
        ));
    }

    #[tokio::test]
    async fn test_rate_product_checks_range() {
        let service = CatalogService::new(MockCatalogRepository::new());
        let result = service.rate_product(Uuid::now_v7(), Uuid::now_v7(), 6).await;
        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_seed_default_categories_only_when_empty() {
        let mut mock_repo = MockCatalogRepository::new();
        mock_repo.expect_count_categories().returning(|| Ok(0));
        mock_repo
            .expect_create_category()
            .times(3)
            .returning(|input| {
                Ok(Category {
                    id: Uuid::now_v7(),
                    name: input.name,
                    category_type: input.category_type,
                })
            });

        let service = CatalogService::new(mock_repo);
        assert_eq!(service.seed_default_categories().await.unwrap(), 3);

        let mut seeded = MockCatalogRepository::new();
        seeded.expect_count_categories().returning(|| Ok(3));
        let service = CatalogService::new(seeded);
        assert_eq!(service.seed_default_categories().await.unwrap(), 0);
    }
}
