//! Provider abstractions for authentication and image classification.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod feed;
pub mod firebase;
pub mod http;
pub mod noop;

pub use feed::{IdentityFeed, Unsubscribe};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not implemented")]
    NotImplemented,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("service returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Service {
        status: u16,
        message: Option<String>,
    },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("{0}")]
    Rejected(String),
    #[error("not signed in")]
    NotSignedIn,
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

impl ProviderError {
    /// Message supplied by the remote side, if it sent one.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            ProviderError::Service {
                message: Some(m), ..
            } => Some(m.as_str()),
            _ => None,
        }
    }
}

/// Opaque handle for a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    uid: String,
    email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            email,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct PredictRequest {
    pub image: Bytes,
    pub file_name: String,
    pub mime: String,
    /// Backend identifier, e.g. `mobilenet`.
    pub model_type: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: i64,
    pub confidence: f64,
}

#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;
    async fn sign_out(&self) -> Result<(), ProviderError>;
    fn current_identity(&self) -> Option<Identity>;
    /// Registers a callback fired on every identity change. The callback is
    /// removed when the returned handle is dropped.
    fn subscribe(&self, on_change: Box<dyn Fn(Option<Identity>) + Send + Sync>) -> Unsubscribe;
    /// Short-lived bearer credential for `identity`.
    async fn get_token(&self, identity: &Identity) -> Result<String, ProviderError>;
}

#[async_trait::async_trait]
pub trait ClassificationService: Send + Sync {
    async fn predict(&self, req: PredictRequest) -> Result<PredictResponse, ProviderError>;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    auth: HashMap<String, Arc<dyn AuthProvider>>,
    classifiers: HashMap<String, Arc<dyn ClassificationService>>,
    pub preferred_auth: Option<String>,
    pub preferred_classifier: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auth(mut self, name: &str, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth.insert(name.to_string(), provider);
        self
    }

    pub fn with_classifier(mut self, name: &str, provider: Arc<dyn ClassificationService>) -> Self {
        self.classifiers.insert(name.to_string(), provider);
        self
    }

    pub fn set_preferred_auth(mut self, name: &str) -> Self {
        self.preferred_auth = Some(name.to_string());
        self
    }

    pub fn set_preferred_classifier(mut self, name: &str) -> Self {
        self.preferred_classifier = Some(name.to_string());
        self
    }

    pub fn auth(&self, name: Option<&str>) -> Result<Arc<dyn AuthProvider>, ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred_auth.clone())
            .ok_or_else(|| ProviderError::UnknownProvider("no auth provider configured".into()))?;
        self.auth
            .get(&key)
            .cloned()
            .ok_or(ProviderError::UnknownProvider(key))
    }

    pub fn classifier(
        &self,
        name: Option<&str>,
    ) -> Result<Arc<dyn ClassificationService>, ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred_classifier.clone())
            .ok_or_else(|| {
                ProviderError::UnknownProvider("no classification service configured".into())
            })?;
        self.classifiers
            .get(&key)
            .cloned()
            .ok_or(ProviderError::UnknownProvider(key))
    }
}
