//! Line-driven host for the session gate and prediction workflow.
//!
//! User input, identity changes and prediction completions are interleaved
//! on one task with `select!`; only one prediction runs at a time.

use crate::command::{Command, HELP};
use anyhow::Result;
use fruit_core::app::Providers;
use fruit_core::credentials::{submit_login, submit_signup, LoginForm, SignupForm};
use fruit_core::models::PickedFile;
use fruit_core::render::{RenderedOutcome, WorkflowView};
use fruit_core::session::{Route, RouteDecision, SessionGate};
use fruit_core::workflow::{dispatch, EnterOutcome, PredictCompletion, Workflow};
use providers::Identity;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

pub struct Shell {
    providers: Providers,
    gate: SessionGate,
    workflow: Workflow,
    in_flight: JoinSet<PredictCompletion>,
}

enum Flow {
    Continue,
    Quit,
}

impl Shell {
    pub fn new(providers: Providers) -> Self {
        Self {
            providers,
            gate: SessionGate::new(),
            workflow: Workflow::new(),
            in_flight: JoinSet::new(),
        }
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let (id_tx, mut id_rx) = mpsc::unbounded_channel();
        let _subscription = self
            .providers
            .auth
            .subscribe(Box::new(move |identity: Option<Identity>| {
                let _ = id_tx.send(identity);
            }));
        self.gate
            .observe(self.providers.auth.current_identity(), &mut self.workflow);

        let mut lines = input.lines();
        loop {
            // Identity events queued by the previous command are applied
            // before the next line is read.
            tokio::select! {
                biased;
                Some(identity) = id_rx.recv() => {
                    self.gate.observe(identity, &mut self.workflow);
                }
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    self.complete(joined, out)?;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if let Flow::Quit = self.handle_line(&line, out).await? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    async fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                writeln!(out, "{e}")?;
                return Ok(Flow::Continue);
            }
        };
        debug!(?command, "shell command");

        match command {
            Command::Go(path) => self.navigate(&path, out)?,
            Command::Signup {
                email,
                password,
                confirm,
            } => {
                let form = SignupForm {
                    email,
                    password,
                    confirm_password: confirm,
                };
                match submit_signup(self.providers.auth.as_ref(), &form).await {
                    Ok(done) => self.signed_in(done.identity, done.navigate_to, out)?,
                    Err(e) => writeln!(out, "signup: {}", e.message)?,
                }
            }
            Command::Login { email, password } => {
                let form = LoginForm { email, password };
                match submit_login(self.providers.auth.as_ref(), &form).await {
                    Ok(done) => self.signed_in(done.identity, done.navigate_to, out)?,
                    Err(e) => writeln!(out, "login: {}", e.message)?,
                }
            }
            Command::Logout => {
                self.gate
                    .sign_out(self.providers.auth.as_ref(), &mut self.workflow)
                    .await;
                writeln!(out, "signed out")?;
            }
            Command::Start => match self.workflow.enter(&self.gate) {
                EnterOutcome::Entered => self.show(out)?,
                EnterOutcome::RedirectToLogin => self.navigate(Route::Login.path(), out)?,
            },
            Command::Open(path) => match PickedFile::read(&path).await {
                Ok(file) => match self.workflow.select_file(file) {
                    Ok(()) => self.show(out)?,
                    Err(e) => writeln!(out, "{e}")?,
                },
                Err(e) => writeln!(out, "cannot read {}: {e}", path.display())?,
            },
            Command::Model(choice) => match self.workflow.set_model(choice) {
                Ok(()) => writeln!(out, "model: {choice}")?,
                Err(e) => writeln!(out, "{e}")?,
            },
            Command::Predict => self.predict(out)?,
            Command::Wait => {
                if self.in_flight.is_empty() {
                    writeln!(out, "nothing in flight")?;
                }
                // Cancelled requests may still be queued ahead of the live one.
                while let Some(joined) = self.in_flight.join_next().await {
                    self.complete(joined, out)?;
                }
            }
            Command::Cancel => {
                self.workflow.cancel();
                self.show(out)?;
            }
            Command::Show => self.show(out)?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn predict<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let Some(identity) = self.gate.identity().cloned() else {
            return self.navigate(Route::Login.path(), out);
        };
        match self.workflow.begin_predict(&identity) {
            Ok(ticket) => {
                let auth = self.providers.auth.clone();
                let service = self.providers.service.clone();
                self.in_flight
                    .spawn(async move { dispatch(ticket, auth.as_ref(), service.as_ref()).await });
                writeln!(out, "ANALYZING...")?;
            }
            Err(e) => writeln!(out, "{e}")?,
        }
        Ok(())
    }

    fn complete<W: Write>(
        &mut self,
        joined: Result<PredictCompletion, tokio::task::JoinError>,
        out: &mut W,
    ) -> Result<()> {
        match joined {
            Ok(completion) => {
                if self.workflow.apply(completion) {
                    self.show(out)?;
                }
            }
            Err(e) => warn!(error = %e, "prediction task failed"),
        }
        Ok(())
    }

    fn signed_in<W: Write>(&mut self, identity: Identity, next: Route, out: &mut W) -> Result<()> {
        // The subscription delivers the same value; observing now keeps
        // routing correct before the event is drained.
        self.gate.observe(Some(identity.clone()), &mut self.workflow);
        writeln!(out, "signed in as {}", identity.email().unwrap_or(identity.uid()))?;
        self.navigate(next.path(), out)
    }

    fn navigate<W: Write>(&mut self, path: &str, out: &mut W) -> Result<()> {
        match self.gate.route_path(path) {
            RouteDecision::Loading => writeln!(out, "Loading...")?,
            RouteDecision::Show(route) => writeln!(out, "page: {}", route.path())?,
            RouteDecision::Redirect(route) => writeln!(out, "redirect: {}", route.path())?,
            RouteDecision::NotFound => writeln!(out, "no page at {path}")?,
        }
        Ok(())
    }

    fn show<W: Write>(&self, out: &mut W) -> Result<()> {
        let view = WorkflowView::of(&self.workflow);
        writeln!(out, "[{:?}] model={} file={}", view.phase, view.model, view.upload_label)?;
        match view.outcome {
            Some(RenderedOutcome::Success { label, confidence }) => {
                writeln!(out, "Quality: {label}")?;
                writeln!(out, "Confidence: {confidence}")?;
            }
            Some(RenderedOutcome::Failure { message }) => writeln!(out, "Error: {message}")?,
            None => {}
        }
        Ok(())
    }
}
