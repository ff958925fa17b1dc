use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AdminUser, AppError, AppQuery, AuditEvent, AuditOutcome, CurrentUser, UuidPath,
    ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{
    Category, CreateCategory, CreateProduct, ProductFilter, ProductListResponse,
    ProductWithDetails, RateProduct, RatingSummary, UpdateCategory, UpdateProduct,
};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;

pub const PRODUCT_TAG: &str = "products";
pub const CATEGORY_TAG: &str = "categories";

/// OpenAPI documentation for the product endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        count_products,
        get_product,
        create_product,
        update_product,
        delete_product,
        rate_product
    ),
    components(
        schemas(
            ProductWithDetails,
            ProductListResponse,
            ProductFilter,
            CreateProduct,
            UpdateProduct,
            RateProduct,
            RatingSummary,
            Category
        ),
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
        (name = PRODUCT_TAG, description = "Product catalog and search")
    )
)]
pub struct ProductApiDoc;

/// OpenAPI documentation for the category endpoints
#[derive(OpenApi)]
#[openapi(
    paths(list_categories, get_category, create_category, update_category, delete_category),
    components(
        schemas(Category, CreateCategory, UpdateCategory),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = CATEGORY_TAG, description = "Product categories")
    )
)]
pub struct CategoryApiDoc;

type SharedService<R> = Arc<CatalogService<R>>;

/// Create the product router
pub fn product_router<R: CatalogRepository + 'static>(service: CatalogService<R>) -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/count", get(count_products))
        .route(
            "/{id}",
            get(get_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .route("/{id}/rating", post(rate_product))
        .with_state(Arc::new(service))
}

/// Create the category router
pub fn category_router<R: CatalogRepository + 'static>(service: CatalogService<R>) -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .with_state(Arc::new(service))
}

/// Search products
#[utoipa::path(
    get,
    path = "",
    tag = PRODUCT_TAG,
    params(ProductFilter),
    responses(
        (status = 200, description = "Matching products, with page metadata when paged", body = ProductListResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    AppQuery(filter): AppQuery<ProductFilter>,
) -> Result<Json<ProductListResponse>, AppError> {
    Ok(Json(service.find_products(filter).await?))
}

/// Number of products in the catalog
#[utoipa::path(
    get,
    path = "/count",
    tag = PRODUCT_TAG,
    responses(
        (status = 200, description = "Number of products", body = u64),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_products<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
) -> Result<Json<u64>, AppError> {
    Ok(Json(service.count_products().await?))
}

/// Get a product with rating and categories
#[utoipa::path(
    get,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductWithDetails),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> Result<Json<ProductWithDetails>, AppError> {
    Ok(Json(service.get_product(id).await?))
}

/// Create a product (admin)
#[utoipa::path(
    post,
    path = "",
    tag = PRODUCT_TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = ProductWithDetails),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    admin: AdminUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> Result<impl IntoResponse, AppError> {
    let product = service.create_product(input).await?;

    AuditEvent::new(
        Some(admin.id()),
        "product.create",
        Some(format!("product:{}", product.product.id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .with_details(json!({ "name": product.product.name, "price": product.product.price }))
    .log();

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (admin)
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = ProductWithDetails),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    _admin: AdminUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> Result<Json<ProductWithDetails>, AppError> {
    Ok(Json(service.update_product(id, input).await?))
}

/// Remove a product from the catalog (admin)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    admin: AdminUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> Result<impl IntoResponse, AppError> {
    service.delete_product(id).await?;

    AuditEvent::new(
        Some(admin.id()),
        "product.delete",
        Some(format!("product:{}", id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Rate a product with 1 to 5 stars
#[utoipa::path(
    post,
    path = "/{id}/rating",
    tag = PRODUCT_TAG,
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = RateProduct,
    responses(
        (status = 201, description = "Rating stored", body = RatingSummary),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn rate_product<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    caller: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<RateProduct>,
) -> Result<impl IntoResponse, AppError> {
    let summary = service.rate_product(id, caller.id(), input.stars).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// List categories ordered by name
#[utoipa::path(
    get,
    path = "",
    tag = CATEGORY_TAG,
    responses(
        (status = 200, description = "All categories", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(service.list_categories().await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = CATEGORY_TAG,
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    UuidPath(id): UuidPath,
) -> Result<Json<Category>, AppError> {
    Ok(Json(service.get_category(id).await?))
}

/// Create a category (admin)
#[utoipa::path(
    post,
    path = "",
    tag = CATEGORY_TAG,
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    _admin: AdminUser,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> Result<impl IntoResponse, AppError> {
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category (admin)
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = CATEGORY_TAG,
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_category<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    _admin: AdminUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(service.update_category(id, input).await?))
}

/// Delete a category and its product links (admin)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = CATEGORY_TAG,
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<R: CatalogRepository>(
    State(service): State<SharedService<R>>,
    _admin: AdminUser,
    UuidPath(id): UuidPath,
) -> Result<impl IntoResponse, AppError> {
    service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
