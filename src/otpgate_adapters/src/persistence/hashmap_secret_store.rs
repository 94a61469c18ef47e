use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use otpgate_core::{OtpSecret, Principal, SecretStore, SecretStoreError};

/// Enrolled secrets kept in memory, mostly for tests and demos.
#[derive(Default, Clone)]
pub struct HashMapSecretStore {
    secrets: Arc<RwLock<HashMap<Principal, OtpSecret>>>,
}

impl HashMapSecretStore {
    pub fn new() -> Self {
        Self {
            secrets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn enroll(&self, principal: Principal, secret: OtpSecret) {
        self.secrets.write().await.insert(principal, secret);
    }

    pub async fn revoke(&self, principal: &Principal) {
        self.secrets.write().await.remove(principal);
    }
}

#[async_trait::async_trait]
impl SecretStore for HashMapSecretStore {
    async fn secret_for(
        &self,
        principal: &Principal,
    ) -> Result<Option<OtpSecret>, SecretStoreError> {
        Ok(self.secrets.read().await.get(principal).cloned())
    }
}
