use std::sync::Arc;

use otpgate_core::{
    ExpiryPolicy, Lifetime, SessionKey, SessionSnapshot, SessionStore, SessionStoreError,
};
use redis::{Commands, Connection};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct RedisSessionStore {
    conn: Arc<RwLock<Connection>>,
    ttl_seconds: Option<u64>,
}

impl RedisSessionStore {
    /// Entries live as long as [`ExpiryPolicy::retention`] allows; eternal
    /// passes are stored without a TTL.
    pub fn new(conn: Arc<RwLock<Connection>>, lifetime: Lifetime) -> Self {
        let ttl_seconds = ExpiryPolicy::retention(lifetime).map(|ttl| ttl.as_secs());
        Self { conn, ttl_seconds }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &SessionKey) -> Result<SessionSnapshot, SessionStoreError> {
        let key = get_key(key);
        let mut conn = self.conn.write().await;
        let raw: Option<String> = conn
            .get(&key)
            .map_err(|e| SessionStoreError::UnexpectedError(e.to_string()))?;

        match raw {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| SessionStoreError::CorruptedEntry(e.to_string())),
            None => Ok(SessionSnapshot::default()),
        }
    }

    async fn put(
        &self,
        key: &SessionKey,
        snapshot: SessionSnapshot,
    ) -> Result<(), SessionStoreError> {
        let key = get_key(key);
        let json = serde_json::to_string(&snapshot)
            .map_err(|e| SessionStoreError::UnexpectedError(e.to_string()))?;

        let mut conn = self.conn.write().await;
        let result: redis::RedisResult<()> = match self.ttl_seconds {
            Some(ttl) => conn.set_ex(key, json, ttl),
            None => conn.set(key, json),
        };
        result.map_err(|e| SessionStoreError::UnexpectedError(e.to_string()))
    }

    async fn clear(&self, key: &SessionKey) -> Result<(), SessionStoreError> {
        let key = get_key(key);
        let mut conn = self.conn.write().await;
        conn.del(key)
            .map_err(|e| SessionStoreError::UnexpectedError(e.to_string()))
    }
}

const SESSION_KEY_PREFIX: &str = "otp_session:";

fn get_key(key: &SessionKey) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, key)
}
