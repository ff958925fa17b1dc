use super::config::SessionConfig;
use super::store::RevocationList;
use crate::errors::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "access_token";

/// Role granted to shop administrators.
pub const ADMIN_ROLE: &str = "admin";

/// Claims of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    /// Token id, used for revocation
    pub jti: String,
}

impl SessionClaims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ADMIN_ROLE)
    }
}

/// Who a session is issued for.
#[derive(Debug, Clone, Copy)]
pub struct SessionSubject<'a> {
    pub user_id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub is_admin: bool,
}

/// Issues, verifies and revokes session tokens (HS256 JWTs).
#[derive(Clone)]
pub struct SessionAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
    secure_cookie: bool,
    revoked: RevocationList,
}

impl SessionAuth {
    pub fn new(config: &SessionConfig) -> Self {
        tracing::info!(ttl_secs = config.ttl_secs, "Session auth initialized");
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_secs: config.ttl_secs,
            secure_cookie: config.secure_cookie,
            revoked: RevocationList::new(),
        }
    }

    /// Sign a new token for `subject`.
    pub fn issue(&self, subject: SessionSubject<'_>) -> Result<(String, SessionClaims), AppError> {
        let now = Utc::now();
        let roles = if subject.is_admin {
            vec![ADMIN_ROLE.to_string()]
        } else {
            Vec::new()
        };

        let claims = SessionClaims {
            sub: subject.user_id,
            email: subject.email.to_string(),
            name: subject.name.to_string(),
            roles,
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to sign session: {}", e)))?;

        Ok((token, claims))
    }

    /// Signature and expiry check only.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }

    /// Claims of a valid, unrevoked token.
    pub async fn authenticate(&self, token: &str) -> Option<SessionClaims> {
        let claims = match self.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                return None;
            }
        };

        if self.revoked.is_revoked(&claims.jti).await {
            tracing::debug!(jti = %claims.jti, "Session token was revoked");
            return None;
        }

        Some(claims)
    }

    pub async fn revoke(&self, claims: &SessionClaims) {
        self.revoked
            .revoke(&claims.jti, claims.exp, Utc::now().timestamp())
            .await;
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly;{} SameSite=Strict; Path=/; Max-Age={}",
            SESSION_COOKIE,
            token,
            if self.secure_cookie { " Secure;" } else { "" },
            self.ttl_secs
        )
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly;{} SameSite=Strict; Path=/; Max-Age=0",
            SESSION_COOKIE,
            if self.secure_cookie { " Secure;" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> SessionAuth {
        SessionAuth::new(&SessionConfig::new("this-is-a-valid-secret-with-32-chars!").unwrap())
    }

    fn subject(is_admin: bool) -> SessionSubject<'static> {
        SessionSubject {
            user_id: Uuid::nil(),
            email: "anna@example.com",
            name: "Anna Schmidt",
            is_admin,
        }
    }

    #[tokio::test]
    async fn test_issue_and_authenticate() {
        let auth = auth();
        let (token, claims) = auth.issue(subject(false)).unwrap();

        let verified = auth.authenticate(&token).await.unwrap();
        assert_eq!(verified, claims);
        assert_eq!(verified.user_id(), Uuid::nil());
        assert!(!verified.is_admin());
    }

    #[tokio::test]
    async fn test_admin_role() {
        let (_, claims) = auth().issue(subject(true)).unwrap();
        assert!(claims.is_admin());
    }

    #[tokio::test]
    async fn test_revoked_token_is_rejected() {
        let auth = auth();
        let (token, claims) = auth.issue(subject(false)).unwrap();

        auth.revoke(&claims).await;
        assert!(auth.authenticate(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_token_from_other_secret_is_rejected() {
        let other = SessionAuth::new(
            &SessionConfig::new("another-secret-that-is-long-enough-too").unwrap(),
        );
        let (token, _) = other.issue(subject(false)).unwrap();
        assert!(auth().authenticate(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let config = SessionConfig::new("this-is-a-valid-secret-with-32-chars!")
            .unwrap()
            .with_ttl(-3600);
        let auth = SessionAuth::new(&config);
        let (token, _) = auth.issue(subject(false)).unwrap();
        assert!(auth.authenticate(&token).await.is_none());
    }

    #[test]
    fn test_cookie_format() {
        let cookie = auth().session_cookie("abc");
        assert!(cookie.starts_with("access_token=abc; HttpOnly;"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.ends_with("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        let secure = SessionAuth::new(
            &SessionConfig::new("this-is-a-valid-secret-with-32-chars!")
                .unwrap()
                .with_secure_cookie(true),
        );
        assert!(secure.clear_cookie().contains("Secure;"));
        assert!(secure.clear_cookie().ends_with("Max-Age=0"));
    }
}
