use axum_helpers::SessionConfig;
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, cors::CorsConfig, env_optional,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Credentials of the administrator created at startup
#[derive(Clone)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl AdminAccount {
    /// `ADMIN_EMAIL` and `ADMIN_PASSWORD`; both or neither.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        match (env_optional("ADMIN_EMAIL"), env_optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Ok(Some(Self { email, password })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar("ADMIN_PASSWORD".to_string())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("ADMIN_EMAIL".to_string())),
        }
    }
}

/// Application configuration, composed from the shared config pieces
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub session: SessionConfig,
    pub admin: Option<AdminAccount>,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let cors = CorsConfig::from_env()?;
        let session = SessionConfig::from_env()?;
        let admin = AdminAccount::from_env()?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            cors,
            session,
            admin,
            environment,
        })
    }
}
