use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Address, AddressInput, NewUser, User, UserChanges};

/// Repository trait for user persistence
///
/// Writes that touch both the user and their address are atomic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, and their address when given
    async fn create(&self, user: NewUser, address: Option<AddressInput>) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Lookup by normalized email address
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn get_address(&self, id: Uuid) -> UserResult<Option<Address>>;

    /// Users ordered by creation (oldest first) and the unpaged total.
    /// `search` is lowercase and matched against first and last name.
    async fn list(
        &self,
        search: Option<String>,
        window: Option<(u64, u64)>,
    ) -> UserResult<(Vec<User>, u64)>;

    /// Write all user columns; the address is updated in place or created
    /// and linked
    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
        address: Option<AddressInput>,
    ) -> UserResult<User>;

    /// Delete the user with their orders and address
    async fn delete(&self, id: Uuid) -> UserResult<bool>;

    async fn count(&self) -> UserResult<u64>;
}

#[derive(Debug, Default)]
struct UserStore {
    users: HashMap<Uuid, User>,
    addresses: HashMap<Uuid, Address>,
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<UserStore>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_matches(user: &User, search: &str) -> bool {
    user.first_name.to_lowercase().contains(search)
        || user.last_name.to_lowercase().contains(search)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: NewUser, address: Option<AddressInput>) -> UserResult<User> {
        let mut store = self.store.write().await;

        if store
            .users
            .values()
            .any(|u| u.email_address == input.email_address)
        {
            return Err(UserError::EmailRegistered);
        }

        let address_id = address.map(|input| {
            let address = Address::from_input(Uuid::now_v7(), input);
            let id = address.id;
            store.addresses.insert(id, address);
            id
        });

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email_address: input.email_address,
            password_hash: input.password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            is_admin: input.is_admin,
            address_id,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store
            .users
            .values()
            .find(|u| u.email_address == email)
            .cloned())
    }

    async fn get_address(&self, id: Uuid) -> UserResult<Option<Address>> {
        let store = self.store.read().await;
        Ok(store.addresses.get(&id).cloned())
    }

    async fn list(
        &self,
        search: Option<String>,
        window: Option<(u64, u64)>,
    ) -> UserResult<(Vec<User>, u64)> {
        let store = self.store.read().await;

        let mut users: Vec<User> = store
            .users
            .values()
            .filter(|u| search.as_deref().is_none_or(|s| name_matches(u, s)))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = users.len() as u64;
        let users = match window {
            Some((limit, offset)) => users
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
            None => users,
        };

        Ok((users, total))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
        address: Option<AddressInput>,
    ) -> UserResult<User> {
        let mut store = self.store.write().await;

        if store
            .users
            .values()
            .any(|u| u.id != id && u.email_address == changes.email_address)
        {
            return Err(UserError::DuplicateEmail);
        }

        let current_address = store
            .users
            .get(&id)
            .ok_or(UserError::NotFound(id))?
            .address_id;

        let address_id = match (address, current_address) {
            (Some(input), Some(address_id)) => {
                store
                    .addresses
                    .insert(address_id, Address::from_input(address_id, input));
                Some(address_id)
            }
            (Some(input), None) => {
                let address = Address::from_input(Uuid::now_v7(), input);
                let address_id = address.id;
                store.addresses.insert(address_id, address);
                Some(address_id)
            }
            (None, current) => current,
        };

        let user = store.users.get_mut(&id).ok_or(UserError::NotFound(id))?;
        user.email_address = changes.email_address;
        user.password_hash = changes.password_hash;
        user.first_name = changes.first_name;
        user.last_name = changes.last_name;
        user.is_admin = changes.is_admin;
        user.address_id = address_id;
        user.updated_at = Utc::now();
        let updated = user.clone();

        tracing::info!(user_id = %id, "Updated user");
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut store = self.store.write().await;

        match store.users.remove(&id) {
            Some(user) => {
                if let Some(address_id) = user.address_id {
                    store.addresses.remove(&address_id);
                }
                tracing::info!(user_id = %id, "Deleted user");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> UserResult<u64> {
        let store = self.store.read().await;
        Ok(store.users.len() as u64)
    }
}
