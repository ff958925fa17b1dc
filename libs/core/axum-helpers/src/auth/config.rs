use core_config::{ConfigError, Environment, FromEnv, env_parse_or, env_required};

const MIN_SECRET_LEN: usize = 32;

/// Session token settings.
///
/// Environment variables:
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `SESSION_TTL_SECS` (default 86400)
/// - `APP_ENV=production` marks the cookie `Secure`
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_secs: i64,
    pub secure_cookie: bool,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self {
            secret,
            ttl_secs: 86_400,
            secure_cookie: false,
        })
    }

    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                MIN_SECRET_LEN,
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret(&secret)?;

        let ttl_secs = env_parse_or("SESSION_TTL_SECS", 86_400i64)?;
        if ttl_secs <= 0 {
            return Err(ConfigError::ParseError {
                key: "SESSION_TTL_SECS".to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self {
            secret,
            ttl_secs,
            secure_cookie: Environment::from_env().use_https(),
        })
    }
}
