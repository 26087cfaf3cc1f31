//! Session gate: tracks the signed-in identity, guards the workflow and
//! decides what each route shows.

use crate::workflow::Workflow;
use providers::{AuthProvider, Identity};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityState {
    /// The provider has not reported yet.
    Loading,
    Known(Option<Identity>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Signup,
    Login,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Route> {
        match path.trim_end_matches('/') {
            "" => Some(Route::Home),
            "/signup" => Some(Route::Signup),
            "/login" => Some(Route::Login),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Signup => "/signup",
            Route::Login => "/login",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Loading,
    Show(Route),
    Redirect(Route),
    NotFound,
}

#[derive(Debug)]
pub struct SessionGate {
    state: IdentityState,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGate {
    pub fn new() -> Self {
        Self {
            state: IdentityState::Loading,
        }
    }

    pub fn state(&self) -> &IdentityState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            IdentityState::Known(identity) => identity.as_ref(),
            IdentityState::Loading => None,
        }
    }

    pub fn can_enter_workflow(&self) -> bool {
        self.identity().is_some()
    }

    /// Records a new identity value from the provider. Losing the identity,
    /// or switching to another user, resets the workflow before returning.
    pub fn observe(&mut self, next: Option<Identity>, workflow: &mut Workflow) {
        let changed_user = match (self.identity(), next.as_ref()) {
            (Some(prev), Some(next)) => prev.uid() != next.uid(),
            (Some(_), None) => true,
            _ => false,
        };
        if changed_user {
            info!("session identity changed; clearing workflow");
            workflow.reset();
        }
        debug!(signed_in = next.is_some(), "identity observed");
        self.state = IdentityState::Known(next);
    }

    /// Signs out through the provider and clears local state even when the
    /// provider call fails.
    pub async fn sign_out(&mut self, auth: &dyn AuthProvider, workflow: &mut Workflow) {
        if let Err(e) = auth.sign_out().await {
            warn!(error = %e, "sign out failed at provider");
        }
        self.observe(None, workflow);
    }

    pub fn route(&self, route: Route) -> RouteDecision {
        if matches!(self.state, IdentityState::Loading) {
            return RouteDecision::Loading;
        }
        match route {
            Route::Home => RouteDecision::Show(Route::Home),
            Route::Signup | Route::Login if self.identity().is_some() => {
                RouteDecision::Redirect(Route::Home)
            }
            other => RouteDecision::Show(other),
        }
    }

    pub fn route_path(&self, path: &str) -> RouteDecision {
        match Route::from_path(path) {
            Some(route) => self.route(route),
            None if matches!(self.state, IdentityState::Loading) => RouteDecision::Loading,
            None => RouteDecision::NotFound,
        }
    }
}
