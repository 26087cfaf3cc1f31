use crate::feed::{IdentityFeed, Unsubscribe};
use crate::{AuthProvider, Identity, ProviderError};
use reqwest::Client;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Tokens closer than this to expiry are refreshed before use.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct FirebaseConfig {
    pub api_key: String,
    /// Identity Toolkit base, e.g. `https://identitytoolkit.googleapis.com/v1`.
    pub identity_url: String,
    /// Secure Token base, e.g. `https://securetoken.googleapis.com/v1`.
    pub token_url: String,
}

struct Session {
    identity: Identity,
    id_token: String,
    refresh_token: String,
    expires_at: Instant,
}

/// Email/password authentication against the Firebase REST endpoints.
#[derive(Clone)]
pub struct FirebaseAuth {
    client: Client,
    cfg: Arc<FirebaseConfig>,
    session: Arc<Mutex<Option<Session>>>,
    feed: IdentityFeed,
}

impl FirebaseAuth {
    pub fn new(cfg: FirebaseConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
            session: Arc::new(Mutex::new(None)),
            feed: IdentityFeed::new(),
        }
    }

    async fn password_call(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, ProviderError> {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct PasswordRequest<'a> {
            email: &'a str,
            password: &'a str,
            return_secure_token: bool,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct PasswordResponse {
            local_id: String,
            email: Option<String>,
            id_token: String,
            refresh_token: String,
            expires_in: String,
        }

        let url = format!(
            "{}/accounts:{}?key={}",
            self.cfg.identity_url, endpoint, self.cfg.api_key
        );
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected(rejection_message(&text)));
        }
        let parsed: PasswordResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let identity = Identity::new(parsed.local_id, parsed.email);
        let session = Session {
            identity: identity.clone(),
            id_token: parsed.id_token,
            refresh_token: parsed.refresh_token,
            expires_at: expiry_from(&parsed.expires_in),
        };
        if let Ok(mut slot) = self.session.lock() {
            *slot = Some(session);
        }
        info!(uid = identity.uid(), "signed in");
        self.feed.publish(Some(identity.clone()));
        Ok(identity)
    }

    /// Exchanges `refresh_token` for a new id token. The result is stored only
    /// if the session still belongs to `uid` once the exchange completes.
    async fn refresh(&self, uid: &str, refresh_token: String) -> Result<String, ProviderError> {
        #[derive(Deserialize)]
        struct RefreshResponse {
            id_token: String,
            refresh_token: String,
            expires_in: String,
        }

        let url = format!("{}/token?key={}", self.cfg.token_url, self.cfg.api_key);
        let resp = self
            .client
            .post(url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected(rejection_message(&text)));
        }
        let parsed: RefreshResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let mut slot = self
            .session
            .lock()
            .map_err(|_| ProviderError::NotSignedIn)?;
        let Some(session) = slot.as_mut().filter(|s| s.identity.uid() == uid) else {
            debug!(uid, "session changed during token refresh, discarding result");
            return Err(ProviderError::NotSignedIn);
        };
        session.id_token = parsed.id_token.clone();
        session.refresh_token = parsed.refresh_token;
        session.expires_at = expiry_from(&parsed.expires_in);
        debug!(uid = session.identity.uid(), "refreshed id token");
        Ok(parsed.id_token)
    }
}

fn expiry_from(expires_in: &str) -> Instant {
    let secs = expires_in.parse::<u64>().unwrap_or(0);
    Instant::now() + Duration::from_secs(secs)
}

/// Turns an Identity Toolkit error body into the SDK-style message.
fn rejection_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        message: String,
    }

    let code = serde_json::from_str::<Envelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_default();
    // Codes may carry a detail suffix: "WEAK_PASSWORD : Password should be ..."
    let code = code.split(':').next().unwrap_or("").trim();
    let text = match code {
        "EMAIL_EXISTS" => "Error (auth/email-already-in-use).".to_string(),
        "INVALID_EMAIL" => "Error (auth/invalid-email).".to_string(),
        "WEAK_PASSWORD" => {
            "Password should be at least 6 characters (auth/weak-password).".to_string()
        }
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "Error (auth/invalid-credential).".to_string()
        }
        "" => "Error (auth/internal-error).".to_string(),
        other => format!(
            "Error (auth/{}).",
            other.to_lowercase().replace('_', "-")
        ),
    };
    format!("Firebase: {text}")
}

#[async_trait::async_trait]
impl AuthProvider for FirebaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        if let Ok(mut slot) = self.session.lock() {
            *slot = None;
        }
        info!("signed out");
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
        let refresh_token = {
            let slot = self
                .session
                .lock()
                .map_err(|_| ProviderError::NotSignedIn)?;
            let session = slot
                .as_ref()
                .filter(|s| s.identity.uid() == identity.uid())
                .ok_or(ProviderError::NotSignedIn)?;
            if session.expires_at > Instant::now() + REFRESH_MARGIN {
                return Ok(session.id_token.clone());
            }
            session.refresh_token.clone()
        };
        self.refresh(identity.uid(), refresh_token).await
    }
}
