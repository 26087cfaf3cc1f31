//! Prediction workflow: file selection, submission and result display.
//!
//! The workflow is driven from a single task. A prediction is split into
//! [`Workflow::begin_predict`], which hands out a [`PredictTicket`], the async
//! [`dispatch`] of that ticket, and [`Workflow::apply`] of the resulting
//! [`PredictCompletion`]. Every ticket carries the generation it was issued
//! under; `cancel`, `select_file` and session resets bump the generation so a
//! completion that arrives late is dropped instead of applied.

use crate::models::{ModelChoice, PickedFile, PredictionOutcome, SelectedImage};
use crate::session::SessionGate;
use providers::{AuthProvider, ClassificationService, Identity, PredictRequest, ProviderError};
use thiserror::Error;
use tracing::{debug, warn};

pub const GENERIC_FAILURE: &str = "Prediction failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    NoFile,
    FileSelected,
    Submitting,
    ResultShown,
    ErrorShown,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("sign in to start predicting")]
    SignInRequired,
    #[error("workflow is not active")]
    NotActive,
    #[error("no image selected")]
    NoImage,
    #[error("a prediction is already in flight")]
    AlreadySubmitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterOutcome {
    Entered,
    /// Anonymous session; the host should navigate to the login route.
    RedirectToLogin,
}

/// Everything one in-flight prediction needs, detached from the workflow.
#[derive(Debug, Clone)]
pub struct PredictTicket {
    generation: u64,
    identity: Identity,
    image: SelectedImage,
    model: ModelChoice,
}

impl PredictTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn model(&self) -> ModelChoice {
        self.model
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictCompletion {
    generation: u64,
    pub outcome: PredictionOutcome,
}

#[derive(Debug, Default)]
pub struct Workflow {
    active: bool,
    image: Option<SelectedImage>,
    model: ModelChoice,
    outcome: Option<PredictionOutcome>,
    submitting: bool,
    generation: u64,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if !self.active {
            return Phase::Idle;
        }
        if self.submitting {
            return Phase::Submitting;
        }
        match (&self.image, &self.outcome) {
            (None, _) => Phase::NoFile,
            (Some(_), None) => Phase::FileSelected,
            (Some(_), Some(PredictionOutcome::Success { .. })) => Phase::ResultShown,
            (Some(_), Some(PredictionOutcome::Failure { .. })) => Phase::ErrorShown,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn selected_image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    pub fn model(&self) -> ModelChoice {
        self.model
    }

    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        self.outcome.as_ref()
    }

    pub fn can_predict(&self) -> bool {
        self.active && self.image.is_some() && !self.submitting
    }

    pub fn enter(&mut self, gate: &SessionGate) -> EnterOutcome {
        if !gate.can_enter_workflow() {
            debug!("workflow entry refused for anonymous session");
            return EnterOutcome::RedirectToLogin;
        }
        if !self.active {
            self.active = true;
            debug!("workflow entered");
        }
        EnterOutcome::Entered
    }

    pub fn select_file(&mut self, file: PickedFile) -> Result<(), WorkflowError> {
        if !self.active {
            return Err(WorkflowError::NotActive);
        }
        let image = SelectedImage::from_file(file);
        debug!(name = %image.name, mime = %image.mime, size = image.bytes.len(), "file selected");
        self.invalidate_in_flight();
        self.image = Some(image);
        self.outcome = None;
        Ok(())
    }

    pub fn set_model(&mut self, choice: ModelChoice) -> Result<(), WorkflowError> {
        if !self.active {
            return Err(WorkflowError::NotActive);
        }
        if self.submitting {
            return Err(WorkflowError::AlreadySubmitting);
        }
        self.model = choice;
        Ok(())
    }

    /// Moves to `Submitting` and returns the ticket to dispatch. Rejected
    /// calls leave the workflow untouched.
    pub fn begin_predict(&mut self, identity: &Identity) -> Result<PredictTicket, WorkflowError> {
        if !self.active {
            return Err(WorkflowError::NotActive);
        }
        if self.submitting {
            return Err(WorkflowError::AlreadySubmitting);
        }
        let image = self.image.clone().ok_or(WorkflowError::NoImage)?;
        self.submitting = true;
        self.outcome = None;
        debug!(generation = self.generation, model = %self.model, "prediction submitted");
        Ok(PredictTicket {
            generation: self.generation,
            identity: identity.clone(),
            image,
            model: self.model,
        })
    }

    /// Applies a completion if it still belongs to the current selection.
    /// Returns whether it was applied.
    pub fn apply(&mut self, completion: PredictCompletion) -> bool {
        if !self.submitting || completion.generation != self.generation {
            debug!(
                generation = completion.generation,
                current = self.generation,
                "discarding stale prediction result"
            );
            return false;
        }
        self.submitting = false;
        self.outcome = Some(completion.outcome);
        true
    }

    pub fn cancel(&mut self) {
        if !self.active {
            return;
        }
        self.reset();
        debug!("workflow cancelled");
    }

    /// Drops all transient state and returns to `Idle`.
    pub(crate) fn reset(&mut self) {
        self.invalidate_in_flight();
        self.active = false;
        self.image = None;
        self.outcome = None;
        self.model = ModelChoice::default();
    }

    fn invalidate_in_flight(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.submitting = false;
    }

    /// Runs a whole prediction in place. Convenient for hosts that do not
    /// interleave other events with the request.
    pub async fn predict(
        &mut self,
        identity: &Identity,
        auth: &dyn AuthProvider,
        service: &dyn ClassificationService,
    ) -> Result<bool, WorkflowError> {
        let ticket = self.begin_predict(identity)?;
        let completion = dispatch(ticket, auth, service).await;
        Ok(self.apply(completion))
    }
}

/// Fetches a bearer credential and calls the classification service once.
/// Never fails: every error becomes a `Failure` outcome.
pub async fn dispatch(
    ticket: PredictTicket,
    auth: &dyn AuthProvider,
    service: &dyn ClassificationService,
) -> PredictCompletion {
    let generation = ticket.generation;
    let token = match auth.get_token(&ticket.identity).await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "could not obtain bearer token");
            return PredictCompletion {
                generation,
                outcome: PredictionOutcome::Failure {
                    message: GENERIC_FAILURE.to_string(),
                },
            };
        }
    };

    let request = PredictRequest {
        image: ticket.image.bytes.clone(),
        file_name: ticket.image.name.clone(),
        mime: ticket.image.mime.clone(),
        model_type: ticket.model.backend_id().to_string(),
        token,
    };
    let outcome = match service.predict(request).await {
        Ok(resp) => PredictionOutcome::Success {
            class_index: resp.prediction,
            confidence: resp.confidence,
        },
        Err(e) => {
            warn!(error = %e, "prediction failed");
            PredictionOutcome::Failure {
                message: failure_message(&e),
            }
        }
    };
    PredictCompletion {
        generation,
        outcome,
    }
}

fn failure_message(err: &ProviderError) -> String {
    err.service_message()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(GENERIC_FAILURE)
        .to_string()
}
