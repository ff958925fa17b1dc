use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, CurrentUser, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{CreatePayment, Payment, PaymentFields, PaymentOption, UpdatePayment};
use crate::repository::PaymentRepository;
use crate::service::PaymentService;

pub const TAG: &str = "payments";

/// OpenAPI documentation for the payment method endpoints
#[derive(OpenApi)]
#[openapi(
    paths(create_payment, list_payments, update_payment, delete_payment),
    components(
        schemas(Payment, PaymentOption, PaymentFields, CreatePayment, UpdatePayment),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ForbiddenResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Stored payment methods")
    )
)]
pub struct ApiDoc;

/// Create the payment router.
///
/// `GET /{id}` takes a user id, `PATCH` and `DELETE` a payment id.
pub fn router<R: PaymentRepository + 'static>(service: PaymentService<R>) -> Router {
    Router::new()
        .route("/create", post(create_payment))
        .route(
            "/{id}",
            get(list_payments)
                .patch(update_payment)
                .delete(delete_payment),
        )
        .with_state(Arc::new(service))
}

/// Store a payment method (own account, or any account as admin)
#[utoipa::path(
    post,
    path = "/create",
    tag = TAG,
    request_body = CreatePayment,
    responses(
        (status = 201, description = "Payment method stored", body = Payment),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_payment<R: PaymentRepository>(
    State(service): State<Arc<PaymentService<R>>>,
    caller: CurrentUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreatePayment>,
) -> Result<impl IntoResponse, AppError> {
    let payment = service
        .create_payment(input, caller.id(), caller.is_admin())
        .await?;

    AuditEvent::new(
        Some(caller.id()),
        "payment.create",
        Some(format!("payment:{}", payment.id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .with_details(json!({ "option": payment.payment_option, "user_id": payment.user_id }))
    .log();

    Ok((StatusCode::CREATED, Json(payment)))
}

/// Payment methods of a user
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Stored payment methods", body = Vec<Payment>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_payments<R: PaymentRepository>(
    State(service): State<Arc<PaymentService<R>>>,
    caller: CurrentUser,
    UuidPath(user_id): UuidPath,
) -> Result<Json<Vec<Payment>>, AppError> {
    let payments = service
        .find_by_user(user_id, caller.id(), caller.is_admin())
        .await?;
    Ok(Json(payments))
}

/// Change a payment method
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Payment ID")
    ),
    request_body = UpdatePayment,
    responses(
        (status = 200, description = "Payment method updated", body = Payment),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_payment<R: PaymentRepository>(
    State(service): State<Arc<PaymentService<R>>>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdatePayment>,
) -> Result<Json<Payment>, AppError> {
    let payment = service
        .update_payment(id, input, caller.id(), caller.is_admin())
        .await?;
    Ok(Json(payment))
}

/// Delete a payment method
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Payment ID")
    ),
    responses(
        (status = 204, description = "Payment method deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_payment<R: PaymentRepository>(
    State(service): State<Arc<PaymentService<R>>>,
    caller: CurrentUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> Result<impl IntoResponse, AppError> {
    service
        .delete_payment(id, caller.id(), caller.is_admin())
        .await?;

    AuditEvent::new(
        Some(caller.id()),
        "payment.delete",
        Some(format!("payment:{}", id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .log();

    Ok(StatusCode::NO_CONTENT)
}
