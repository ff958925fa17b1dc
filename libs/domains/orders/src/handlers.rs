use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
};
use axum_helpers::{
    AdminUser, AppError, AppJson, AppQuery, AuditEvent, AuditOutcome, CurrentUser, UuidPath,
    ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
};
use domain_payments::Payment;
use domain_users::Address;
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{
    CreateOrder, CreatedOrder, DeliveryStatus, Order, OrderCounts, OrderDetail, OrderFilter,
    OrderListResponse, OrderStatus, Shipping, UpdateDeliveryAddress, UpdateOrderPayment,
    UpdateOrderStatus, UpdateShipping,
};
use crate::repository::OrderRepository;
use crate::service::OrderService;

pub const TAG: &str = "orders";

/// OpenAPI documentation for the order endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        create_order,
        list_orders,
        my_orders,
        count_orders,
        get_order,
        cancel_order,
        update_status,
        update_shipping,
        update_address,
        update_payment
    ),
    components(
        schemas(
            CreateOrder,
            CreatedOrder,
            Order,
            OrderDetail,
            OrderListResponse,
            OrderCounts,
            OrderStatus,
            DeliveryStatus,
            Shipping,
            UpdateOrderStatus,
            UpdateShipping,
            UpdateDeliveryAddress,
            UpdateOrderPayment
        ),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            ForbiddenResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Checkout and order administration")
    )
)]
pub struct ApiDoc;

type SharedService<R> = Arc<OrderService<R>>;

/// Create the order router
pub fn router<R: OrderRepository + 'static>(service: OrderService<R>) -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/detail", get(my_orders))
        .route("/count", get(count_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/cancel", patch(cancel_order))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/shipping", patch(update_shipping))
        .route("/{id}/address", patch(update_address))
        .route("/{id}/payment", patch(update_payment))
        .with_state(Arc::new(service))
}

/// Place an order for the session user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Order placed", body = CreatedOrder),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_order<R: OrderRepository>(
    State(service): State<SharedService<R>>,
    caller: CurrentUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateOrder>,
) -> Result<impl IntoResponse, AppError> {
    let lines = input.order_products.len();
    let created = service.create_order(Some(caller.id()), input).await?;

    AuditEvent::new(
        Some(caller.id()),
        "order.create",
        Some(format!("order:{}", created.id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .with_details(json!({ "lines": lines }))
    .log();

    Ok((StatusCode::CREATED, Json(created)))
}

/// Search all orders
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(OrderFilter),
    responses(
        (status = 200, description = "One page of orders, newest first", body = OrderListResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_orders<R: OrderRepository>(
    State(service): State<SharedService<R>>,
    _admin: AdminUser,
    AppQuery(filter): AppQuery<OrderFilter>,
) -> Result<Json<OrderListResponse>, AppError> {
    Ok(Json(service.find_orders(filter).await?))
}

/// Orders of the session user
#[utoipa::path(
    get,
    path = "/detail",
    tag = TAG,
    responses(
        (status = 200, description = "Own orders with shipping, payment and lines", body = Vec<OrderDetail>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn my_orders<R: OrderRepository>(
    State(service): State<SharedService<R>>,
    caller: CurrentUser,
) -> Result<Json<Vec<OrderDetail>>, AppError> {
    Ok(Json(service.find_orders_by_user(caller.id()).await?))
}

/// Order counters for the dashboard
#[utoipa::path(
    get,
    path = "/count",
    tag = TAG,
    responses(
        (status = 200, description = "Total, finished and active orders", body = OrderCounts),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_orders<R: OrderRepository>(
    State(service): State<SharedService<R>>,
    _admin: AdminUser,
) -> Result<Json<OrderCounts>, AppError> {
    Ok(Json(service.count_orders().await?))
}

/// One order with customer, shipping, payment and lines
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order found", body = OrderDetail),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_order<R: OrderRepository>(
    State(service): State<SharedService<R>>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<OrderDetail>, AppError> {
    let order = service.find_order(id).await?;
    caller.require_owner_or_admin(order.order.user_id)?;
    Ok(Json(order))
}

/// Cancel an own open or processing order
#[utoipa::path(
    patch,
    path = "/{id}/cancel",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order canceled", body = Order),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn cancel_order<R: OrderRepository>(
    State(service): State<SharedService<R>>,
    caller: CurrentUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> Result<Json<Order>, AppError> {
    let order = service.cancel_order(id, caller.id()).await?;

    AuditEvent::new(
        Some(caller.id()),
        "order.cancel",
        Some(format!("order:{}", id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .log();

    Ok(Json(order))
}

/// Set the status of an order
#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatus,
    responses(
        (status = 200, description = "Status updated", body = Order),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_status<R: OrderRepository>(
    State(service): State<SharedService<R>>,
    admin: AdminUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    AppJson(input): AppJson<UpdateOrderStatus>,
) -> Result<Json<Order>, AppError> {
    let order = service.update_order_status(id, input).await?;

    AuditEvent::new(
        Some(admin.id()),
        "order.status",
        Some(format!("order:{}", id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .with_details(json!({ "status": order.order_status }))
    .log();

    Ok(Json(order))
}

/// Change carrier, delivery status or dates of an order's shipping
#[utoipa::path(
    patch,
    path = "/{id}/shipping",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateShipping,
    responses(
        (status = 200, description = "Shipping updated", body = Shipping),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_shipping<R: OrderRepository>(
    State(service): State<SharedService<R>>,
    _admin: AdminUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateShipping>,
) -> Result<Json<Shipping>, AppError> {
    Ok(Json(service.update_order_shipping(id, input).await?))
}

/// Change the delivery address of an order
#[utoipa::path(
    patch,
    path = "/{id}/address",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateDeliveryAddress,
    responses(
        (status = 200, description = "Delivery address updated", body = Address),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_address<R: OrderRepository>(
    State(service): State<SharedService<R>>,
    _admin: AdminUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateDeliveryAddress>,
) -> Result<Json<Address>, AppError> {
    Ok(Json(service.update_order_delivery_address(id, input).await?))
}

/// Replace the payment an order was paid with
#[utoipa::path(
    patch,
    path = "/{id}/payment",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderPayment,
    responses(
        (status = 200, description = "Payment replaced", body = Payment),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_payment<R: OrderRepository>(
    State(service): State<SharedService<R>>,
    admin: AdminUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateOrderPayment>,
) -> Result<Json<Payment>, AppError> {
    let payment = service.update_order_payment(id, input).await?;

    AuditEvent::new(
        Some(admin.id()),
        "order.payment",
        Some(format!("order:{}", id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .with_details(json!({ "option": payment.payment_option }))
    .log();

    Ok(Json(payment))
}
