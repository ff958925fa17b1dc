//! # Axum Helpers
//!
//! Building blocks shared by the teashop HTTP services.
//!
//! - **[`auth`]**: session cookies, revocation, policy extractors
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: the JSON error envelope and error codes
//! - **[`extractors`]**: UUID paths, validated JSON, envelope-aware JSON/query
//! - **[`pagination`]**: optional `page`/`size` paging
//! - **[`audit`]**: audit events on the `audit` tracing target
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//!
//! let router = create_router::<ApiDoc>(api_routes, &config.cors)?
//!     .merge(health_router(config.app.clone()));
//! create_production_app(router, &config.server, Duration::from_secs(30), async {}).await?;
//! ```

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod pagination;
pub mod server;

pub use auth::{
    AdminUser, CurrentUser, OptionalUser, SessionAuth, SessionClaims, SessionConfig,
    SessionSubject, session_middleware,
};

pub use server::{
    HealthCheckFuture, ShutdownCoordinator, create_production_app, create_router, health_router,
    run_health_checks, shutdown_signal,
};

pub use http::{create_cors_layer, security_headers};

pub use errors::{
    AppError, ErrorCode, ErrorResponse,
    responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        ServiceUnavailableResponse, UnauthorizedResponse,
    },
};

pub use extractors::{AppJson, AppQuery, UuidPath, ValidatedJson};

pub use pagination::{MAX_PAGE_SIZE, PageMeta, PageParams, page_window};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
