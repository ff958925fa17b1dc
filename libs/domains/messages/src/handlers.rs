use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AdminUser, AppError, AppJson, AuditEvent, AuditOutcome, UuidPath,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{ContactMessage, CreateMessage, MessageListResponse, MessageResponse};
use crate::repository::MessageRepository;
use crate::service::MessageService;

pub const TAG: &str = "messages";

/// OpenAPI documentation for the contact message endpoints
#[derive(OpenApi)]
#[openapi(
    paths(create_message, list_messages, get_message, delete_message),
    components(
        schemas(ContactMessage, CreateMessage, MessageResponse, MessageListResponse),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Contact form messages")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<MessageService<R>>;

/// Create the contact message router
pub fn router<R: MessageRepository + 'static>(service: MessageService<R>) -> Router {
    Router::new()
        .route("/", get(list_messages).post(create_message))
        .route("/{id}", get(get_message).delete(delete_message))
        .with_state(Arc::new(service))
}

/// Send a message through the contact form
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateMessage,
    responses(
        (status = 201, description = "Message stored", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_message<R: MessageRepository>(
    State(service): State<SharedService<R>>,
    headers: HeaderMap,
    AppJson(input): AppJson<CreateMessage>,
) -> Result<impl IntoResponse, AppError> {
    let message = service.create_message(input).await?;

    AuditEvent::new(
        None,
        "message.create",
        Some(format!("message:{}", message.id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .log();

    Ok((StatusCode::CREATED, Json(MessageResponse { data: message })))
}

/// All messages, newest first
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "Messages", body = MessageListResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_messages<R: MessageRepository>(
    State(service): State<SharedService<R>>,
    _admin: AdminUser,
) -> Result<Json<MessageListResponse>, AppError> {
    let data = service.list_messages().await?;
    Ok(Json(MessageListResponse { data }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Message found", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_message<R: MessageRepository>(
    State(service): State<SharedService<R>>,
    _admin: AdminUser,
    UuidPath(id): UuidPath,
) -> Result<Json<MessageResponse>, AppError> {
    let data = service.get_message(id).await?;
    Ok(Json(MessageResponse { data }))
}

/// Delete a message and return it
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "Message deleted", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_message<R: MessageRepository>(
    State(service): State<SharedService<R>>,
    admin: AdminUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> Result<Json<MessageResponse>, AppError> {
    let data = service.delete_message(id).await?;

    AuditEvent::new(
        Some(admin.id()),
        "message.delete",
        Some(format!("message:{}", id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .log();

    Ok(Json(MessageResponse { data }))
}
