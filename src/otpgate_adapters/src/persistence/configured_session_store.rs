use std::sync::Arc;

use otpgate_core::{Lifetime, SessionKey, SessionSnapshot, SessionStore, SessionStoreError};
use secrecy::ExposeSecret;
use tokio::sync::RwLock;

use super::{HashMapSessionStore, RedisSessionStore};
use crate::config::{SessionSettings, SettingsError};

/// The session store picked by configuration.
#[derive(Clone)]
pub enum ConfiguredSessionStore {
    Memory(HashMapSessionStore),
    Redis(RedisSessionStore),
}

impl ConfiguredSessionStore {
    /// Redis when `session.redis_url` is set, in-memory otherwise.
    pub fn connect(settings: &SessionSettings, lifetime: Lifetime) -> Result<Self, SettingsError> {
        let Some(url) = &settings.redis_url else {
            tracing::info!("Using in-memory session store");
            return Ok(Self::Memory(HashMapSessionStore::new()));
        };

        let conn = redis::Client::open(url.expose_secret().as_str())
            .and_then(|client| client.get_connection())
            .map_err(|e| SettingsError::Redis(e.to_string()))?;
        tracing::info!("Using Redis session store");
        Ok(Self::Redis(RedisSessionStore::new(
            Arc::new(RwLock::new(conn)),
            lifetime,
        )))
    }
}

#[async_trait::async_trait]
impl SessionStore for ConfiguredSessionStore {
    async fn get(&self, key: &SessionKey) -> Result<SessionSnapshot, SessionStoreError> {
        match self {
            Self::Memory(store) => store.get(key).await,
            Self::Redis(store) => store.get(key).await,
        }
    }

    async fn put(
        &self,
        key: &SessionKey,
        snapshot: SessionSnapshot,
    ) -> Result<(), SessionStoreError> {
        match self {
            Self::Memory(store) => store.put(key, snapshot).await,
            Self::Redis(store) => store.put(key, snapshot).await,
        }
    }

    async fn clear(&self, key: &SessionKey) -> Result<(), SessionStoreError> {
        match self {
            Self::Memory(store) => store.clear(key).await,
            Self::Redis(store) => store.clear(key).await,
        }
    }
}
