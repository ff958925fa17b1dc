use axum_helpers::{PageMeta, PageParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Postal address of a customer or of an order's shipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub country: String,
    pub state: String,
    pub city: String,
    pub postal_code: String,
    pub street: String,
    pub house_number: String,
    pub address_addition: String,
}

/// Address fields as submitted by the storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[validate(length(min = 1, max = 200))]
    pub country: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub state: String,
    #[validate(length(min = 1, max = 50))]
    pub city: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 50))]
    pub street: String,
    #[validate(length(min = 1, max = 10))]
    pub house_number: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub address_addition: String,
}

impl Address {
    pub fn from_input(id: Uuid, input: AddressInput) -> Self {
        Self {
            id,
            country: input.country,
            state: input.state,
            city: input.city,
            postal_code: input.postal_code,
            street: input.street,
            house_number: input.house_number,
            address_addition: input.address_addition,
        }
    }

    /// Field copy without the id, used to duplicate an address
    pub fn to_input(&self) -> AddressInput {
        AddressInput {
            country: self.country.clone(),
            state: self.state.clone(),
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            street: self.street.clone(),
            house_number: self.house_number.clone(),
            address_addition: self.address_addition.clone(),
        }
    }
}

/// User entity with credentials. Never serialized; see [`UserResponse`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email_address: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub address_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Data for inserting a user, password already hashed
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email_address: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

/// Complete column values written by an update
#[derive(Debug, Clone, PartialEq)]
pub struct UserChanges {
    pub email_address: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub address_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email_address: user.email_address,
            first_name: user.first_name,
            last_name: user.last_name,
            is_admin: user.is_admin,
            address_id: user.address_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// User together with their address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: UserResponse,
    pub address: Option<Address>,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[validate(email, length(max = 200))]
    pub email_address: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(nested)]
    pub address: Option<AddressInput>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email_address: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Partial update; omitted fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(email, length(max = 200))]
    pub email_address: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    /// Only honoured for administrators
    pub is_admin: Option<bool>,
    #[validate(nested)]
    pub address: Option<AddressInput>,
}

/// Query parameters of the user list
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    /// Case-insensitive match on first or last name
    pub search: Option<String>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

impl UserFilter {
    pub fn paging(&self) -> PageParams {
        PageParams {
            page: self.page,
            size: self.size,
        }
    }

    /// Trimmed search term, `None` when blank
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// User list, with page metadata when paging was requested
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

impl UserListResponse {
    pub fn new(users: Vec<UserResponse>, total: u64, meta: Option<PageMeta>) -> Self {
        Self {
            users,
            total,
            total_pages: meta.map(|m| m.total_pages),
            current_page: meta.map(|m| m.current_page),
            has_more: meta.map(|m| m.has_more),
        }
    }
}

/// Normalized form of an email address used for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
