use crate::{env_required, ConfigError, FromEnv};

/// Origins allowed to call the API with credentials.
#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_origins: origins.into_iter().map(Into::into).collect(),
        }
    }
}

impl FromEnv for CorsConfig {
    /// CORS_ALLOWED_ORIGIN is a comma separated list and must not be empty.
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_required("CORS_ALLOWED_ORIGIN")?;
        let allowed_origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if allowed_origins.is_empty() {
            return Err(ConfigError::ParseError {
                key: "CORS_ALLOWED_ORIGIN".to_string(),
                details: "no origins given".to_string(),
            });
        }

        Ok(Self { allowed_origins })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_config_splits_origins() {
        temp_env::with_var(
            "CORS_ALLOWED_ORIGIN",
            Some("http://localhost:5173, https://shop.example.com"),
            || {
                let config = CorsConfig::from_env().unwrap();
                assert_eq!(
                    config.allowed_origins,
                    vec!["http://localhost:5173", "https://shop.example.com"]
                );
            },
        );
    }

    #[test]
    fn test_cors_config_missing() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            assert!(matches!(
                CorsConfig::from_env(),
                Err(ConfigError::MissingEnvVar(_))
            ));
        });
    }

    #[test]
    fn test_cors_config_blank_list() {
        temp_env::with_var("CORS_ALLOWED_ORIGIN", Some(" , "), || {
            assert!(matches!(
                CorsConfig::from_env(),
                Err(ConfigError::ParseError { .. })
            ));
        });
    }
}
