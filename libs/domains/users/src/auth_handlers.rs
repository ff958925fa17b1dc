//! Session endpoints: login, register, current session, logout.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, OptionalUser, SessionAuth, SessionSubject, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::UserError;
use crate::models::{LoginRequest, RegisterUser, User, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "auth";

/// State shared by the session endpoints
pub struct AuthState<R: UserRepository> {
    pub service: UserService<R>,
    pub auth: SessionAuth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(login, register, session_user, logout),
    components(
        schemas(LoginRequest, RegisterUser, UserResponse, LogoutResponse),
        responses(
            BadRequestResponse,
            BadRequestValidationResponse,
            NotFoundResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Session endpoints")
    )
)]
pub struct ApiDoc;

/// Create the router for `/login`, `/register`, `/sessionUser` and `/logout`
pub fn router<R: UserRepository + 'static>(service: UserService<R>, auth: SessionAuth) -> Router {
    let state = Arc::new(AuthState { service, auth });

    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/sessionUser", get(session_user))
        .route("/logout", get(logout))
        .with_state(state)
}

/// Sign a session for `user` and build its `Set-Cookie` header
fn session_cookie(auth: &SessionAuth, user: &User) -> Result<HeaderValue, AppError> {
    let name = user.full_name();
    let (token, _claims) = auth.issue(SessionSubject {
        user_id: user.id,
        email: &user.email_address,
        name: &name,
        is_admin: user.is_admin,
    })?;

    HeaderValue::from_str(&auth.session_cookie(&token))
        .map_err(|e| AppError::InternalServerError(format!("Failed to create cookie: {}", e)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Result<Response, AppError> {
    let user = match state
        .service
        .verify_credentials(&input.email_address, &input.password)
        .await
    {
        Ok(user) => user,
        Err(err @ (UserError::UnknownEmail | UserError::InvalidCredentials)) => {
            AuditEvent::new(None, "auth.login", None, AuditOutcome::Failure)
                .with_headers(&headers)
                .with_details(serde_json::json!({ "reason": err.to_string() }))
                .log();
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    let cookie = session_cookie(&state.auth, &user)?;

    AuditEvent::new(
        Some(user.id),
        "auth.login",
        Some(format!("user:{}", user.id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .log();

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(UserResponse::from(user)),
    )
        .into_response())
}

/// Register a customer account and log it in
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Registered; session cookie set", body = UserResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<RegisterUser>,
) -> Result<Response, AppError> {
    let user = state.service.register(input).await?;
    let cookie = session_cookie(&state.auth, &user)?;

    AuditEvent::new(
        Some(user.id),
        "auth.register",
        Some(format!("user:{}", user.id)),
        AuditOutcome::Success,
    )
    .with_headers(&headers)
    .log();

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(UserResponse::from(user)),
    )
        .into_response())
}

/// The logged in user, or `false` without a session
#[utoipa::path(
    get,
    path = "/sessionUser",
    tag = TAG,
    responses(
        (status = 200, description = "Current user or `false`", body = UserResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn session_user<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    OptionalUser(claims): OptionalUser,
) -> Result<Response, AppError> {
    let user = match claims {
        Some(claims) => state.service.find_user(claims.user_id()).await?,
        None => None,
    };

    Ok(match user {
        Some(user) => Json(UserResponse::from(user)).into_response(),
        None => Json(false).into_response(),
    })
}

/// End the session
#[utoipa::path(
    get,
    path = "/logout",
    tag = TAG,
    responses(
        (status = 200, description = "Session ended; cookie cleared", body = LogoutResponse)
    )
)]
async fn logout<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    OptionalUser(claims): OptionalUser,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(claims) = claims {
        state.auth.revoke(&claims).await;

        AuditEvent::new(
            Some(claims.user_id()),
            "auth.logout",
            Some(format!("user:{}", claims.user_id())),
            AuditOutcome::Success,
        )
        .with_headers(&headers)
        .log();
    }

    let cookie = HeaderValue::from_str(&state.auth.clear_cookie())
        .map_err(|e| AppError::InternalServerError(format!("Failed to create cookie: {}", e)))?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    )
        .into_response())
}
