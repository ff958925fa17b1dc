//! Cookie based sessions and route policies.
//!
//! ```ignore
//! use axum_helpers::auth::{SessionAuth, SessionConfig, session_middleware};
//! use core_config::FromEnv;
//!
//! let auth = SessionAuth::new(&SessionConfig::from_env()?);
//! let api = routes.layer(axum::middleware::from_fn_with_state(auth.clone(), session_middleware));
//!
//! async fn my_orders(user: CurrentUser) { /* 401 without a session */ }
//! async fn all_orders(_: AdminUser) { /* 401 unless admin */ }
//! ```

pub mod config;
pub mod middleware;
pub mod policy;
pub mod session;
pub mod store;

pub use config::SessionConfig;
pub use middleware::{extract_token, session_middleware};
pub use policy::{AdminUser, CurrentUser, NOT_PERMITTED, OptionalUser};
pub use session::{ADMIN_ROLE, SESSION_COOKIE, SessionAuth, SessionClaims, SessionSubject};
pub use store::RevocationList;
