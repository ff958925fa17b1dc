use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Token ids revoked by logout, kept until the token would have expired.
#[derive(Clone, Default)]
pub struct RevocationList {
    entries: Arc<RwLock<HashMap<String, i64>>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke `jti` until the unix timestamp `expires_at`.
    pub async fn revoke(&self, jti: &str, expires_at: i64, now: i64) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, exp| *exp > now);
        entries.insert(jti.to_string(), expires_at);
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.entries.read().await.contains_key(jti)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
