use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, FromQueryResult, IntoActiveModel, QueryFilter, SqlErr, Statement,
    TransactionTrait, Value,
};
use uuid::Uuid;

use crate::{
    entity::{address, user},
    error::{UserError, UserResult},
    models::{Address, AddressInput, NewUser, User, UserChanges},
    repository::UserRepository,
};

pub struct PgUserRepository {
    base: BaseRepository<user::Entity>,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, input: NewUser, address: Option<AddressInput>) -> UserResult<User> {
        let txn = self.base.db().begin().await?;

        let address_id = match address {
            Some(input) => Some(
                address::ActiveModel::from_input(input)
                    .insert(&txn)
                    .await?
                    .id,
            ),
            None => None,
        };

        let model = user::ActiveModel::from_new(input, address_id)
            .insert(&txn)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    UserError::EmailRegistered
                } else {
                    UserError::Database(e)
                }
            })?;

        txn.commit().await?;

        tracing::info!(user_id = %model.id, "Created user");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = self.base.find_by_id(id).await?;
        Ok(model.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::EmailAddress.eq(email))
            .one(self.base.db())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn get_address(&self, id: Uuid) -> UserResult<Option<Address>> {
        let model = address::Entity::find_by_id(id)
            .one(self.base.db())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn list(
        &self,
        search: Option<String>,
        window: Option<(u64, u64)>,
    ) -> UserResult<(Vec<User>, u64)> {
        let mut values: Vec<Value> = Vec::new();
        let mut where_clause = String::new();

        if let Some(search) = search {
            values.push(format!("%{}%", search).into());
            where_clause =
                " WHERE (LOWER(first_name) LIKE $1 OR LOWER(last_name) LIKE $1)".to_string();
        }

        let count_sql = format!("SELECT COUNT(*) AS total FROM users{}", where_clause);
        let total = CountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &count_sql,
            values.clone(),
        ))
        .one(self.base.db())
        .await?
        .map(|row| row.total as u64)
        .unwrap_or(0);

        let mut sql = format!(
            "SELECT * FROM users{} ORDER BY created_at ASC, id ASC",
            where_clause
        );
        if let Some((limit, offset)) = window {
            sql.push_str(&format!(
                " LIMIT ${} OFFSET ${}",
                values.len() + 1,
                values.len() + 2
            ));
            values.push(i64::try_from(limit).unwrap_or(i64::MAX).into());
            values.push(i64::try_from(offset).unwrap_or(i64::MAX).into());
        }

        let models = user::Model::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            values,
        ))
        .all(self.base.db())
        .await?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
        address: Option<AddressInput>,
    ) -> UserResult<User> {
        let txn = self.base.db().begin().await?;

        let existing = user::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut address_id = existing.address_id;
        if let Some(input) = address {
            let current = match existing.address_id {
                Some(address_id) => address::Entity::find_by_id(address_id)
                    .one(&txn)
                    .await?,
                None => None,
            };

            address_id = Some(match current {
                Some(model) => {
                    let mut active = model.into_active_model();
                    active.apply_input(input);
                    active.update(&txn).await?.id
                }
                None => {
                    address::ActiveModel::from_input(input)
                        .insert(&txn)
                        .await?
                        .id
                }
            });
        }

        let mut active = existing.into_active_model();
        active.email_address = Set(changes.email_address);
        active.password = Set(changes.password_hash);
        active.first_name = Set(changes.first_name);
        active.last_name = Set(changes.last_name);
        active.is_admin = Set(changes.is_admin);
        active.address_id = Set(address_id);
        active.updated_at = Set(chrono::Utc::now().into());

        let model = active.update(&txn).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserError::DuplicateEmail
            } else {
                UserError::Database(e)
            }
        })?;

        txn.commit().await?;

        tracing::info!(user_id = %id, "Updated user");
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let txn = self.base.db().begin().await?;

        let Some(existing) = user::Entity::find_by_id(id)
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        // Shipping addresses are copies owned by the orders; remember them
        // before the orders (and with them shippings, lines and payment
        // snapshots) cascade away.
        let shipping_addresses = txn
            .query_all_raw(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT s.address_id FROM shippings s JOIN orders o ON o.id = s.order_id \
                 WHERE o.user_id = $1",
                [id.into()],
            ))
            .await?
            .into_iter()
            .map(|row| row.try_get::<Uuid>("", "address_id"))
            .collect::<Result<Vec<_>, _>>()?;

        let orders = txn
            .execute_raw(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "DELETE FROM orders WHERE user_id = $1",
                [id.into()],
            ))
            .await?;

        user::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;

        let mut address_ids = shipping_addresses;
        address_ids.extend(existing.address_id);
        if !address_ids.is_empty() {
            address::Entity::delete_many()
                .filter(address::Column::Id.is_in(address_ids))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        tracing::info!(
            user_id = %id,
            orders_deleted = orders.rows_affected(),
            "Deleted user"
        );
        Ok(true)
    }

    async fn count(&self) -> UserResult<u64> {
        self.base.count().await.map_err(UserError::from)
    }
}
