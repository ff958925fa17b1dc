use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, FromQueryResult, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, SqlErr, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{category, product, product_category, product_rating, rating},
    error::{CatalogError, CatalogResult},
    models::{
        Category, CreateCategory, NewProduct, ProductChanges, ProductWithDetails, UpdateCategory,
        cents_to_price,
    },
    repository::CatalogRepository,
    search::ProductQuery,
};

pub struct PgCatalogRepository {
    base: BaseRepository<product::Entity>,
}

impl PgCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

fn category_error(e: DbErr, name: &str) -> CatalogError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            CatalogError::DuplicateCategory(name.to_string())
        }
        _ => CatalogError::Database(e),
    }
}

/// Row shape produced by [`ProductQuery::select`]
#[derive(Debug, FromQueryResult)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price_cents: i64,
    image: Option<String>,
    quantity: i32,
    is_deleted: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    average_rating: f64,
    product_categories: serde_json::Value,
}

impl TryFrom<ProductRow> for ProductWithDetails {
    type Error = CatalogError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let product_categories: Vec<Category> = serde_json::from_value(row.product_categories)
            .map_err(|e| CatalogError::Internal(format!("Invalid category list: {}", e)))?;

        Ok(Self {
            product: crate::models::Product {
                id: row.id,
                name: row.name,
                description: row.description,
                price: cents_to_price(row.price_cents),
                image: row.image,
                quantity: row.quantity,
                is_deleted: row.is_deleted,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            average_rating: row.average_rating,
            product_categories,
        })
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

impl PgCatalogRepository {
    async fn fetch<C: ConnectionTrait>(
        &self,
        db: &C,
        query: &ProductQuery,
    ) -> CatalogResult<Vec<ProductWithDetails>> {
        let (sql, values) = query.select();
        let rows = ProductRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            values,
        ))
        .all(db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn fetch_one<C: ConnectionTrait>(
        &self,
        db: &C,
        id: Uuid,
    ) -> CatalogResult<Option<ProductWithDetails>> {
        Ok(self
            .fetch(db, &ProductQuery::by_id(id))
            .await?
            .into_iter()
            .next())
    }

    /// Insert category links, failing when any category id is unknown
    async fn link_categories(
        &self,
        txn: &DatabaseTransaction,
        product_id: Uuid,
        mut categories: Vec<Uuid>,
    ) -> CatalogResult<()> {
        categories.sort();
        categories.dedup();
        if categories.is_empty() {
            return Ok(());
        }

        let known = category::Entity::find()
            .filter(category::Column::Id.is_in(categories.clone()))
            .count(txn)
            .await?;
        if known != categories.len() as u64 {
            return Err(CatalogError::UnknownCategory);
        }

        let links = categories
            .into_iter()
            .map(|category_id| product_category::ActiveModel {
                product_id: Set(product_id),
                category_id: Set(category_id),
            });
        product_category::Entity::insert_many(links)
            .exec(txn)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn search_products(
        &self,
        query: ProductQuery,
    ) -> CatalogResult<(Vec<ProductWithDetails>, u64)> {
        let db = self.base.db();

        let (count_sql, count_values) = query.count();
        let total = CountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &count_sql,
            count_values,
        ))
        .one(db)
        .await?
        .map(|row| row.total as u64)
        .unwrap_or(0);

        let products = self.fetch(db, &query).await?;
        Ok((products, total))
    }

    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<ProductWithDetails>> {
        self.fetch_one(self.base.db(), id).await
    }

    async fn count_products(&self) -> CatalogResult<u64> {
        product::Entity::find()
            .filter(product::Column::IsDeleted.eq(false))
            .count(self.base.db())
            .await
            .map_err(CatalogError::from)
    }

    async fn create_product(
        &self,
        input: NewProduct,
        categories: Vec<Uuid>,
    ) -> CatalogResult<ProductWithDetails> {
        let txn = self.base.db().begin().await?;

        let model = product::ActiveModel::from(input)
            .insert(&txn)
            .await?;
        self.link_categories(&txn, model.id, categories).await?;

        let created = self
            .fetch_one(&txn, model.id)
            .await?
            .ok_or_else(|| CatalogError::Internal("Created product vanished".to_string()))?;
        txn.commit().await?;

        tracing::info!(product_id = %model.id, "Created product");
        Ok(created)
    }

    async fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
        categories: Option<Vec<Uuid>>,
    ) -> CatalogResult<ProductWithDetails> {
        let txn = self.base.db().begin().await?;

        let existing = product::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(CatalogError::ProductMissing(id))?;

        let mut active = existing.into_active_model();
        active.apply_changes(changes);
        active.update(&txn).await?;

        if let Some(categories) = categories {
            product_category::Entity::delete_many()
                .filter(product_category::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;
            self.link_categories(&txn, id, categories).await?;
        }

        let updated = self
            .fetch_one(&txn, id)
            .await?
            .ok_or(CatalogError::ProductMissing(id))?;
        txn.commit().await?;

        tracing::info!(product_id = %id, "Updated product");
        Ok(updated)
    }

    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool> {
        let txn = self.base.db().begin().await?;

        let Some(existing) = product::Entity::find_by_id(id)
            .filter(product::Column::IsDeleted.eq(false))
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        product_category::Entity::delete_many()
            .filter(product_category::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;

        // Ratings are only reachable through the product; drop both sides.
        txn.execute_raw(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM ratings WHERE id IN \
             (SELECT rating_id FROM product_ratings WHERE product_id = $1)",
            [id.into()],
        ))
        .await?;

        let mut active = existing.into_active_model();
        active.is_deleted = Set(true);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(product_id = %id, "Deleted product");
        Ok(true)
    }

    async fn rate_product(&self, id: Uuid, user_id: Uuid, stars: i16) -> CatalogResult<f64> {
        let txn = self.base.db().begin().await?;

        let exists = product::Entity::find_by_id(id)
            .filter(product::Column::IsDeleted.eq(false))
            .count(&txn)
            .await?;
        if exists == 0 {
            return Err(CatalogError::ProductNotFound);
        }

        let rating = rating::ActiveModel::new_rating(stars, user_id)
            .insert(&txn)
            .await?;
        product_rating::ActiveModel {
            product_id: Set(id),
            rating_id: Set(rating.id),
        }
        .insert(&txn)
        .await?;

        #[derive(FromQueryResult)]
        struct AverageRow {
            average: f64,
        }

        let average = AverageRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT COALESCE(AVG(r.stars), 0)::float8 AS average FROM product_ratings pr \
             JOIN ratings r ON r.id = pr.rating_id WHERE pr.product_id = $1",
            [id.into()],
        ))
        .one(&txn)
        .await?
        .map(|row| row.average)
        .unwrap_or(0.0);

        txn.commit().await?;

        tracing::info!(product_id = %id, stars, "Rated product");
        Ok(average)
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(self.base.db())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        let model = category::Entity::find_by_id(id)
            .one(self.base.db())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        let name = input.name.clone();
        let model = category::ActiveModel::from(input)
            .insert(self.base.db())
            .await
            .map_err(|e| category_error(e, &name))?;

        tracing::info!(category_id = %model.id, name = %model.name, "Created category");
        Ok(model.into())
    }

    async fn update_category(&self, id: Uuid, input: UpdateCategory) -> CatalogResult<Category> {
        let existing = category::Entity::find_by_id(id)
            .one(self.base.db())
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;

        let name = input.name.clone().unwrap_or_else(|| existing.name.clone());
        let mut active = existing.into_active_model();
        if let Some(new_name) = input.name {
            active.name = Set(new_name);
        }
        if let Some(category_type) = input.category_type {
            active.category_type = Set(category_type);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let model = active
            .update(self.base.db())
            .await
            .map_err(|e| category_error(e, &name))?;

        Ok(model.into())
    }

    async fn delete_category(&self, id: Uuid) -> CatalogResult<bool> {
        // Links go with the category through ON DELETE CASCADE.
        let result = category::Entity::delete_by_id(id)
            .exec(self.base.db())
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn count_categories(&self) -> CatalogResult<u64> {
        category::Entity::find()
            .count(self.base.db())
            .await
            .map_err(CatalogError::from)
    }
}
