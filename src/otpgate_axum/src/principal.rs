use axum::http::request::Parts;
use otpgate_core::{
    OtpSecret, Principal, PrincipalProvider, PrincipalProviderError, SecretStore,
};

/// Resolves the principal from a [`Principal`] request extension.
///
/// The host's authentication layer, which runs before the gate, inserts the
/// extension for logged-in users. Secrets come from a [`SecretStore`].
#[derive(Clone)]
pub struct ExtensionPrincipalProvider<St> {
    secrets: St,
}

impl<St> ExtensionPrincipalProvider<St>
where
    St: SecretStore,
{
    pub fn new(secrets: St) -> Self {
        Self { secrets }
    }
}

#[async_trait::async_trait]
impl<St> PrincipalProvider for ExtensionPrincipalProvider<St>
where
    St: SecretStore,
{
    type RequestParts = Parts;

    async fn current_principal(&self, parts: &Parts) -> Option<Principal> {
        parts.extensions.get::<Principal>().cloned()
    }

    async fn secret_for(
        &self,
        principal: &Principal,
    ) -> Result<Option<OtpSecret>, PrincipalProviderError> {
        self.secrets
            .secret_for(principal)
            .await
            .map_err(|e| PrincipalProviderError::SecretLookup(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};
    use otpgate_adapters::HashMapSecretStore;

    use super::*;

    #[tokio::test]
    async fn test_reads_principal_extension() {
        let provider = ExtensionPrincipalProvider::new(HashMapSecretStore::new());

        let (parts, _) = Request::builder()
            .extension(Principal::new("alice"))
            .body(Body::empty())
            .unwrap()
            .into_parts();
        assert_eq!(
            provider.current_principal(&parts).await,
            Some(Principal::new("alice"))
        );

        let (parts, _) = Request::builder().body(Body::empty()).unwrap().into_parts();
        assert_eq!(provider.current_principal(&parts).await, None);
    }
}
