use crate::feed::{IdentityFeed, Unsubscribe};
use crate::{
    AuthProvider, ClassificationService, Identity, PredictRequest, PredictResponse, ProviderError,
};

/// Never signs anyone in and never classifies anything.
#[derive(Debug, Default)]
pub struct NoopProvider;

#[async_trait::async_trait]
impl AuthProvider for NoopProvider {
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Identity, ProviderError> {
        Err(ProviderError::NotImplemented)
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<Identity, ProviderError> {
        Err(ProviderError::NotImplemented)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        None
    }

    fn subscribe(&self, on_change: Box<dyn Fn(Option<Identity>) + Send + Sync>) -> Unsubscribe {
        // Nothing ever publishes; the handle is inert.
        IdentityFeed::new().subscribe(on_change)
    }

    async fn get_token(&self, _identity: &Identity) -> Result<String, ProviderError> {
        Err(ProviderError::NotSignedIn)
    }
}

#[async_trait::async_trait]
impl ClassificationService for NoopProvider {
    async fn predict(&self, _req: PredictRequest) -> Result<PredictResponse, ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}
