use std::sync::Arc;

use dashmap::DashMap;
use otpgate_core::{SessionKey, SessionSnapshot, SessionStore, SessionStoreError};

/// Process-local session store. Entries live until cleared.
#[derive(Default, Clone)]
pub struct HashMapSessionStore {
    entries: Arc<DashMap<SessionKey, SessionSnapshot>>,
}

impl HashMapSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl SessionStore for HashMapSessionStore {
    async fn get(&self, key: &SessionKey) -> Result<SessionSnapshot, SessionStoreError> {
        Ok(self
            .entries
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn put(
        &self,
        key: &SessionKey,
        snapshot: SessionSnapshot,
    ) -> Result<(), SessionStoreError> {
        if snapshot.is_empty() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.clone(), snapshot);
        }
        Ok(())
    }

    async fn clear(&self, key: &SessionKey) -> Result<(), SessionStoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
