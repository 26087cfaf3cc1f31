//! Login and signup form submission. Failures stay on the form as a
//! field message and never touch the prediction workflow.

use crate::session::Route;
use providers::{AuthProvider, Identity};
use thiserror::Error;
use tracing::{info, warn};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FormError {
    pub message: String,
}

impl FormError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Where the host navigates after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub identity: Identity,
    pub navigate_to: Route,
}

pub async fn submit_login(auth: &dyn AuthProvider, form: &LoginForm) -> Result<Submitted, FormError> {
    match auth.sign_in(&form.email, &form.password).await {
        Ok(identity) => {
            info!(uid = identity.uid(), "login succeeded");
            Ok(Submitted {
                identity,
                navigate_to: Route::Home,
            })
        }
        Err(e) => {
            warn!(error = %e, "login failed");
            Err(FormError::new(INVALID_CREDENTIALS))
        }
    }
}

pub async fn submit_signup(
    auth: &dyn AuthProvider,
    form: &SignupForm,
) -> Result<Submitted, FormError> {
    if form.password != form.confirm_password {
        return Err(FormError::new(PASSWORD_MISMATCH));
    }
    match auth.sign_up(&form.email, &form.password).await {
        Ok(identity) => {
            info!(uid = identity.uid(), "signup succeeded");
            Ok(Submitted {
                identity,
                navigate_to: Route::Home,
            })
        }
        Err(e) => {
            warn!(error = %e, "signup failed");
            Err(FormError::new(signup_message(&e.to_string())))
        }
    }
}

/// Signup errors are shown without the provider's leading `Firebase: ` tag.
fn signup_message(text: &str) -> String {
    text.strip_prefix("Firebase: ").unwrap_or(text).to_string()
}
