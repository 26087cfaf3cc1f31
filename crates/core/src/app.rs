use crate::config::AppConfig;
use providers::firebase::{FirebaseAuth, FirebaseConfig};
use providers::http::{HttpClassifier, HttpClassifierConfig};
use providers::noop::NoopProvider;
use providers::{AuthProvider, ClassificationService, ProviderRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    let noop = Arc::new(NoopProvider);
    let mut reg = ProviderRegistry::new()
        .with_auth("noop", noop.clone())
        .with_classifier("noop", noop);

    let api_key = config
        .auth
        .api_key
        .clone()
        .or_else(|| std::env::var("FIREBASE_API_KEY").ok());
    match api_key {
        Some(api_key) => {
            reg = reg.with_auth(
                "firebase",
                Arc::new(FirebaseAuth::new(FirebaseConfig {
                    api_key,
                    identity_url: config.auth.identity_url.clone(),
                    token_url: config.auth.token_url.clone(),
                })),
            );
        }
        None if config.auth.provider == "firebase" => {
            warn!("firebase selected but no api key configured; sign-in will be unavailable");
        }
        None => {}
    }

    match HttpClassifier::new(HttpClassifierConfig {
        url: config.service.url.clone(),
        timeout: Duration::from_secs(config.service.timeout_secs),
    }) {
        Ok(http) => reg = reg.with_classifier("http", Arc::new(http)),
        Err(e) => warn!(error = %e, "http classification service unavailable"),
    }

    reg.set_preferred_auth(&config.auth.provider)
        .set_preferred_classifier(&config.service.provider)
}

/// Resolved collaborators for one client session.
#[derive(Clone)]
pub struct Providers {
    pub auth: Arc<dyn AuthProvider>,
    pub service: Arc<dyn ClassificationService>,
}

impl Providers {
    /// Falls back to the noop providers when the preferred ones are missing.
    pub fn resolve(registry: &ProviderRegistry) -> Self {
        let auth = registry.auth(None).unwrap_or_else(|e| {
            warn!(error = %e, "auth provider unavailable, using noop");
            Arc::new(NoopProvider) as Arc<dyn AuthProvider>
        });
        let service = registry.classifier(None).unwrap_or_else(|e| {
            warn!(error = %e, "classification service unavailable, using noop");
            Arc::new(NoopProvider) as Arc<dyn ClassificationService>
        });
        info!(
            auth = registry.preferred_auth.as_deref().unwrap_or("-"),
            service = registry.preferred_classifier.as_deref().unwrap_or("-"),
            "providers resolved"
        );
        Self { auth, service }
    }
}
