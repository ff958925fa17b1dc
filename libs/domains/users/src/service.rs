use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::PageParams;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{
    NewUser, RegisterUser, UpdateUser, User, UserChanges, UserDetail, UserFilter,
    UserListResponse, UserResponse, normalize_email,
};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a customer together with their address
    pub async fn register(&self, input: RegisterUser) -> UserResult<User> {
        let address = input.address.ok_or(UserError::MissingAddress)?;
        let email_address = normalize_email(&input.email_address);

        if self.repository.get_by_email(&email_address).await?.is_some() {
            return Err(UserError::EmailRegistered);
        }

        let user = NewUser {
            email_address,
            password_hash: hash_password(&input.password)?,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            is_admin: false,
        };

        self.repository.create(user, Some(address)).await
    }

    /// Check email and password (for login)
    pub async fn verify_credentials(&self, email: &str, password: &str) -> UserResult<User> {
        let user = self
            .repository
            .get_by_email(&normalize_email(email))
            .await?
            .ok_or(UserError::UnknownEmail)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    /// The user, if it still exists
    pub async fn find_user(&self, id: Uuid) -> UserResult<Option<User>> {
        self.repository.get_by_id(id).await
    }

    pub async fn get_user(&self, id: Uuid) -> UserResult<UserDetail> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let address = match user.address_id {
            Some(address_id) => self.repository.get_address(address_id).await?,
            None => None,
        };

        Ok(UserDetail {
            user: user.into(),
            address,
        })
    }

    pub async fn list_users(&self, filter: UserFilter) -> UserResult<UserListResponse> {
        let paging: PageParams = filter.paging();
        let (users, total) = self
            .repository
            .list(filter.search_term(), paging.window())
            .await?;

        Ok(UserListResponse::new(
            users.into_iter().map(UserResponse::from).collect(),
            total,
            paging.meta(total),
        ))
    }

    /// Update a user. `is_admin` is only applied when `caller_is_admin`.
    pub async fn update_user(
        &self,
        id: Uuid,
        input: UpdateUser,
        caller_is_admin: bool,
    ) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let email_address = match input.email_address {
            Some(email) => {
                let email = normalize_email(&email);
                if email != user.email_address {
                    if let Some(other) = self.repository.get_by_email(&email).await? {
                        if other.id != id {
                            return Err(UserError::DuplicateEmail);
                        }
                    }
                }
                email
            }
            None => user.email_address,
        };

        let password_hash = match input.password {
            Some(password) => hash_password(&password)?,
            None => user.password_hash,
        };

        let is_admin = match input.is_admin {
            Some(is_admin) if caller_is_admin => is_admin,
            _ => user.is_admin,
        };

        let changes = UserChanges {
            email_address,
            password_hash,
            first_name: input.first_name.unwrap_or(user.first_name),
            last_name: input.last_name.unwrap_or(user.last_name),
            is_admin,
        };

        let updated = self.repository.update(id, changes, input.address).await?;
        Ok(updated.into())
    }

    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    pub async fn count_users(&self) -> UserResult<u64> {
        self.repository.count().await
    }

    /// Create an administrator account unless the email is already registered.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> UserResult<bool> {
        let email_address = normalize_email(email);
        if self.repository.get_by_email(&email_address).await?.is_some() {
            return Ok(false);
        }

        let admin = NewUser {
            email_address,
            password_hash: hash_password(password)?,
            first_name: "Admin".to_string(),
            last_name: "Teashop".to_string(),
            is_admin: true,
        };
        let created = self.repository.create(admin, None).await?;

        tracing::info!(user_id = %created.id, "Created administrator account");
        Ok(true)
    }
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AddressInput;
    use crate::repository::MockUserRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn stored_user(email: &str, password: &str) -> User {
        User {
            id: Uuid::now_v7(),
            email_address: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            first_name: "Anna".to_string(),
            last_name: "Schmidt".to_string(),
            is_admin: false,
            address_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn register_input(address: Option<AddressInput>) -> RegisterUser {
        RegisterUser {
            email_address: " Anna@Example.com ".to_string(),
            password: "correct-horse".to_string(),
            first_name: "Anna".to_string(),
            last_name: "Schmidt".to_string(),
            address,
        }
    }

    fn address() -> AddressInput {
        AddressInput {
            country: "Germany".to_string(),
            state: String::new(),
            city: "Berlin".to_string(),
            postal_code: "10115".to_string(),
            street: "Chausseestraße".to_string(),
            house_number: "12".to_string(),
            address_addition: String::new(),
        }
    }

    #[tokio::test]
    async fn test_register_requires_address() {
        let service = UserService::new(MockUserRepository::new());

        let result = service.register(register_input(None)).await;
        assert!(matches!(result, Err(UserError::MissingAddress)));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_email()
            .with(eq("anna@example.com"))
            .returning(|email| Ok(Some(stored_user(email, "whatever-pw"))));

        let service = UserService::new(mock_repo);
        let result = service.register(register_input(Some(address()))).await;

        assert!(matches!(result, Err(UserError::EmailRegistered)));
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_lowercases_email() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_by_email().returning(|_| Ok(None));
        mock_repo
            .expect_create()
            .withf(|user, address| {
                user.email_address == "anna@example.com"
                    && user.password_hash.starts_with("$argon2")
                    && !user.is_admin
                    && address.is_some()
            })
            .returning(|user, _| {
                let mut stored = stored_user(&user.email_address, "correct-horse");
                stored.password_hash = user.password_hash;
                Ok(stored)
            });

        let service = UserService::new(mock_repo);
        let user = service
            .register(register_input(Some(address())))
            .await
            .unwrap();

        assert!(verify_password("correct-horse", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_email()
            .returning(|email| match email {
                "anna@example.com" => Ok(Some(stored_user(email, "correct-horse"))),
                _ => Ok(None),
            });

        let service = UserService::new(mock_repo);

        assert!(
            service
                .verify_credentials("ANNA@example.com", "correct-horse")
                .await
                .is_ok()
        );
        assert!(matches!(
            service
                .verify_credentials("anna@example.com", "wrong-password")
                .await,
            Err(UserError::InvalidCredentials)
        ));
        assert!(matches!(
            service
                .verify_credentials("nobody@example.com", "correct-horse")
                .await,
            Err(UserError::UnknownEmail)
        ));
    }

    #[tokio::test]
    async fn test_update_ignores_admin_flag_from_non_admin() {
        let existing = stored_user("anna@example.com", "correct-horse");
        let id = existing.id;

        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo
            .expect_update()
            .withf(|_, changes, _| !changes.is_admin && changes.first_name == "Annika")
            .returning(|id, changes, _| {
                let mut user = stored_user(&changes.email_address, "correct-horse");
                user.id = id;
                user.first_name = changes.first_name;
                Ok(user)
            });

        let service = UserService::new(mock_repo);
        let input = UpdateUser {
            first_name: Some("Annika".to_string()),
            is_admin: Some(true),
            ..Default::default()
        };

        let updated = service.update_user(id, input, false).await.unwrap();
        assert!(!updated.is_admin);
        assert_eq!(updated.first_name, "Annika");
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_other_user() {
        let existing = stored_user("anna@example.com", "correct-horse");
        let id = existing.id;

        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo
            .expect_get_by_email()
            .with(eq("bernd@example.com"))
            .returning(|email| Ok(Some(stored_user(email, "other-password"))));

        let service = UserService::new(mock_repo);
        let input = UpdateUser {
            email_address: Some("Bernd@example.com".to_string()),
            ..Default::default()
        };

        let result = service.update_user(id, input, true).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));

        let service = UserService::new(mock_repo);
        let id = Uuid::now_v7();

        assert!(matches!(
            service.get_user(id).await,
            Err(UserError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get_by_email()
            .returning(|email| Ok(Some(stored_user(email, "admin-password"))));
        mock_repo.expect_create().never();

        let service = UserService::new(mock_repo);
        let created = service
            .ensure_admin("admin@example.com", "admin-password")
            .await
            .unwrap();

        assert!(!created);
    }
}
