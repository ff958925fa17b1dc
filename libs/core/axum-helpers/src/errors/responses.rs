//! OpenAPI response components shared by every domain's `ApiDoc`.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "error": "An unexpected error occurred.",
        "code": "INTERNAL_ERROR"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - business rule or missing field",
    content_type = "application/json",
    example = json!({
        "error": "Invalid request data. Please provide all required fields.",
        "code": "BAD_REQUEST"
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "error": "Request validation failed.",
        "code": "VALIDATION_ERROR",
        "details": {
            "name": [{
                "code": "length",
                "message": null,
                "params": {"max": 80, "value": "..."}
            }]
        }
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Invalid UUID",
    content_type = "application/json",
    example = json!({
        "error": "Invalid UUID: 42",
        "code": "INVALID_UUID"
    })
)]
pub struct BadRequestUuidResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "error": "Product not found.",
        "code": "NOT_FOUND"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Unauthorized - no session or insufficient role",
    content_type = "application/json",
    example = json!({
        "error": "You are not permitted to perform this action.",
        "code": "UNAUTHORIZED"
    })
)]
pub struct UnauthorizedResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Forbidden - not the owner",
    content_type = "application/json",
    example = json!({
        "error": "Forbidden",
        "code": "FORBIDDEN"
    })
)]
pub struct ForbiddenResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Conflict - Resource already exists",
    content_type = "application/json",
    example = json!({
        "error": "Email already in use",
        "code": "CONFLICT"
    })
)]
pub struct ConflictResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Service Unavailable",
    content_type = "application/json",
    example = json!({
        "error": "The service is temporarily unavailable.",
        "code": "SERVICE_UNAVAILABLE"
    })
)]
pub struct ServiceUnavailableResponse(pub ErrorResponse);
