#![allow(dead_code)]

use providers::{
    AuthProvider, ClassificationService, Identity, IdentityFeed, PredictRequest, PredictResponse,
    ProviderError, Unsubscribe,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory auth provider with a fixed password per email.
#[derive(Default)]
pub struct FakeAuth {
    pub feed: IdentityFeed,
    pub accounts: Mutex<Vec<(String, String)>>,
    pub fail_tokens: Mutex<bool>,
    pub token_calls: AtomicUsize,
    pub sign_up_calls: AtomicUsize,
}

impl FakeAuth {
    pub fn with_account(email: &str, password: &str) -> Self {
        let auth = Self::default();
        auth.accounts
            .lock()
            .unwrap()
            .push((email.to_string(), password.to_string()));
        auth
    }

    pub fn signed_in(uid: &str) -> (Self, Identity) {
        let auth = Self::default();
        let identity = Identity::new(uid, Some(format!("{uid}@example.com")));
        auth.feed.publish(Some(identity.clone()));
        (auth, identity)
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let known = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .any(|(e, p)| e == email && p == password);
        if !known {
            return Err(ProviderError::Rejected(
                "Firebase: Error (auth/invalid-credential).".into(),
            ));
        }
        let identity = Identity::new(format!("uid-{email}"), Some(email.to_string()));
        self.feed.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        let exists = self.accounts.lock().unwrap().iter().any(|(e, _)| e == email);
        if exists {
            return Err(ProviderError::Rejected(
                "Firebase: Error (auth/email-already-in-use).".into(),
            ));
        }
        self.accounts
            .lock()
            .unwrap()
            .push((email.to_string(), password.to_string()));
        let identity = Identity::new(format!("uid-{email}"), Some(email.to_string()));
        self.feed.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.feed.publish(None);
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.feed.current()
    }

    fn subscribe(&self, on_change: Box<dyn Fn(Option<Identity>) + Send + Sync>) -> Unsubscribe {
        self.feed.subscribe(on_change)
    }

    async fn get_token(&self, identity: &Identity) -> Result<String, ProviderError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_tokens.lock().unwrap() {
            return Err(ProviderError::RequestFailed("token endpoint down".into()));
        }
        Ok(format!("token-for-{}", identity.uid()))
    }
}

/// Classification service that replays queued responses and records requests.
#[derive(Default)]
pub struct FakeService {
    pub responses: Mutex<VecDeque<Result<PredictResponse, ProviderError>>>,
    pub requests: Mutex<Vec<PredictRequest>>,
}

impl FakeService {
    pub fn replying(responses: Vec<Result<PredictResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ClassificationService for FakeService {
    async fn predict(&self, req: PredictRequest) -> Result<PredictResponse, ProviderError> {
        self.requests.lock().unwrap().push(req);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::RequestFailed("no response queued".into())))
    }
}

pub fn ok(prediction: i64, confidence: f64) -> Result<PredictResponse, ProviderError> {
    Ok(PredictResponse {
        prediction,
        confidence,
    })
}
