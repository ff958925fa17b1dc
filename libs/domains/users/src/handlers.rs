use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AdminUser, AppError, AppQuery, AuditEvent, AuditOutcome, CurrentUser, UuidPath,
    ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{Address, UpdateUser, UserDetail, UserFilter, UserListResponse, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

/// OpenAPI documentation for the user administration API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, count_users, get_user, update_user, delete_user),
    components(
        schemas(UserResponse, UserDetail, Address, UpdateUser, UserFilter, UserListResponse),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            ForbiddenResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "User management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the user router
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users))
        .route("/count", get(count_users))
        .route(
            "/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .with_state(shared_service)
}

/// List users (admin)
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(UserFilter),
    responses(
        (status = 200, description = "Users, with page metadata when paged", body = UserListResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    _admin: AdminUser,
    AppQuery(filter): AppQuery<UserFilter>,
) -> Result<Json<UserListResponse>, AppError> {
    let users = service.list_users(filter).await?;
    Ok(Json(users))
}

/// Number of registered users (admin)
#[utoipa::path(
    get,
    path = "/count",
    tag = TAG,
    responses(
        (status = 200, description = "Number of users", body = u64),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    _admin: AdminUser,
) -> Result<Json<u64>, AppError> {
    Ok(Json(service.count_users().await?))
}

/// Get a user with their address (owner or admin)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserDetail),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<UserDetail>, AppError> {
    caller.require_owner_or_admin(id)?;
    let user = service.get_user(id).await?;
    Ok(Json(user))
}

/// Update a user (owner or admin)
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    caller: CurrentUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> Result<Json<UserResponse>, AppError> {
    caller.require_owner_or_admin(id)?;

    let admin_change = input.is_admin.filter(|_| caller.is_admin());
    let user = service.update_user(id, input, caller.is_admin()).await?;

    if let Some(is_admin) = admin_change {
        AuditEvent::new(
            Some(caller.id()),
            "user.set_admin",
            Some(format!("user:{}", id)),
            AuditOutcome::Success,
        )
        .with_headers(&headers)
        .with_details(json!({ "is_admin": is_admin }))
        .log();
    }

    Ok(Json(user))
}

/// Delete a user with their orders and address (admin)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    admin: AdminUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> Result<impl IntoResponse, AppError> {
    service.delete_user(id).await?;

    AuditEvent::new(
        Some(admin.id()),
        "user.delete",
        Some(format!("user:{}", id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .log();

    Ok(StatusCode::NO_CONTENT)
}
