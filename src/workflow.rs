//! The workflow contract: named linear steps, cooperative cancellation,
//! tri-state outcomes, and the single-flight coordinator that guarantees
//! at most one workflow runs against the session at a time.

use crate::errors::AutomationError;
use crate::navigation::LONG_BACK_BOUND;
use crate::Session;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of one discrete workflow step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub success: bool,
    pub message: String,
}

impl StepResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Why a workflow stopped before completing its steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAbort {
    Cancelled,
    Failed(String),
}

impl From<AutomationError> for StepAbort {
    fn from(err: AutomationError) -> Self {
        StepAbort::Failed(err.to_string())
    }
}

/// Final outcome delivered to the caller. Cancellation is a first-class
/// outcome, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Completed(String),
    Failed(String),
    Cancelled,
}

impl WorkflowOutcome {
    pub fn message(&self) -> &str {
        match self {
            WorkflowOutcome::Completed(msg) | WorkflowOutcome::Failed(msg) => msg,
            WorkflowOutcome::Cancelled => "Stopped by user",
        }
    }
}

/// Observable progress of a run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    NotStarted,
    Step(String),
    Succeeded,
    Failed,
    Cancelled,
}

/// Per-run context: the cancellation signal and the observable state.
///
/// Cancellation is cooperative. Workflows call [`RunContext::checkpoint`]
/// before and after every step and at the top of every iteration of a
/// long-running loop, so a stop request is observed within one iteration.
#[derive(Clone, Default)]
pub struct RunContext {
    token: CancellationToken,
    state: Arc<Mutex<WorkflowState>>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Short-circuit the current workflow if a stop was requested
    pub fn checkpoint(&self) -> Result<(), StepAbort> {
        if self.is_cancelled() {
            Err(StepAbort::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state.lock().unwrap().clone()
    }

    fn enter_step(&self, name: &str) {
        *self.state.lock().unwrap() = WorkflowState::Step(name.to_string());
    }

    fn set_terminal(&self, outcome: &WorkflowOutcome) {
        *self.state.lock().unwrap() = match outcome {
            WorkflowOutcome::Completed(_) => WorkflowState::Succeeded,
            WorkflowOutcome::Failed(_) => WorkflowState::Failed,
            WorkflowOutcome::Cancelled => WorkflowState::Cancelled,
        };
    }
}

/// Run one named step: cancellation check, the step body, cancellation
/// check again. A failed body short-circuits with the step's message.
pub async fn step<F>(ctx: &RunContext, name: &str, body: F) -> Result<(), StepAbort>
where
    F: Future<Output = StepResult>,
{
    ctx.checkpoint()?;
    ctx.enter_step(name);
    debug!("Running step: {name}");
    let result = body.await;
    if !result.success {
        warn!("Step '{name}' failed: {}", result.message);
        return Err(StepAbort::Failed(result.message));
    }
    ctx.checkpoint()?;
    Ok(())
}

/// One end-to-end automation routine, composed from the session's
/// primitives as a linear sequence of named steps
#[async_trait::async_trait]
pub trait Workflow: Send + Sync {
    fn name(&self) -> &str;

    /// Run the steps. `Ok` carries the success message; aborts carry
    /// either the failing step's message or the cancellation signal.
    async fn execute(&self, session: &Session, ctx: &RunContext) -> Result<String, StepAbort>;
}

/// Drive a workflow to its outcome, then return the session to a resting
/// state. The cleanup walk runs unconditionally on success, failure and
/// cancellation alike, and cannot change the outcome.
pub async fn run_workflow(
    session: &Session,
    ctx: &RunContext,
    workflow: &dyn Workflow,
) -> WorkflowOutcome {
    info!("Starting workflow '{}'", workflow.name());
    let result = workflow.execute(session, ctx).await;

    session.go_back(LONG_BACK_BOUND, false).await;

    let outcome = match result {
        Ok(message) => {
            info!("Workflow '{}' completed", workflow.name());
            WorkflowOutcome::Completed(message)
        }
        Err(StepAbort::Cancelled) => {
            info!("Workflow '{}' stopped by user", workflow.name());
            WorkflowOutcome::Cancelled
        }
        Err(StepAbort::Failed(message)) => {
            warn!("Workflow '{}' failed: {message}", workflow.name());
            WorkflowOutcome::Failed(message)
        }
    };
    ctx.set_terminal(&outcome);
    outcome
}

/// Handle to a spawned workflow run
pub struct WorkflowHandle {
    ctx: RunContext,
    join: JoinHandle<WorkflowOutcome>,
}

impl WorkflowHandle {
    /// Request a cooperative stop; the run finishes its current primitive,
    /// performs the resting-state cleanup and reports `Cancelled`.
    pub fn request_stop(&self) {
        self.ctx.cancel();
    }

    pub fn state(&self) -> WorkflowState {
        self.ctx.state()
    }

    /// Await the final outcome
    pub async fn join(self) -> WorkflowOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) => WorkflowOutcome::Failed(format!("Workflow task panicked: {e}")),
        }
    }
}

/// Guarantees at most one workflow runs at a time.
///
/// Workflows race on the foreground app; two of them interleaving against
/// one tree is never valid. A second start request is either rejected
/// ([`WorkflowCoordinator::spawn`]) or converted into a stop request for
/// the running one ([`WorkflowCoordinator::spawn_or_stop`]).
#[derive(Clone, Default)]
pub struct WorkflowCoordinator {
    active: Arc<Mutex<Option<RunContext>>>,
}

impl WorkflowCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.active.lock().unwrap().is_some()
    }

    /// Request cancellation of the active run, if any
    pub fn cancel_active(&self) -> bool {
        match self.active.lock().unwrap().as_ref() {
            Some(ctx) => {
                ctx.cancel();
                true
            }
            None => false,
        }
    }

    /// Spawn a workflow on the runtime, off the caller's interactive
    /// thread. Rejects when one is already running.
    pub fn spawn<W>(
        &self,
        session: &Session,
        workflow: W,
    ) -> Result<WorkflowHandle, AutomationError>
    where
        W: Workflow + 'static,
    {
        let mut active = self.active.lock().unwrap();
        if active.is_some() {
            return Err(AutomationError::UnsupportedOperation(
                "A workflow is already running".to_string(),
            ));
        }
        let ctx = RunContext::new();
        *active = Some(ctx.clone());
        drop(active);

        let session = session.clone();
        let coordinator = self.clone();
        let run_ctx = ctx.clone();
        let join = tokio::spawn(async move {
            let outcome = run_workflow(&session, &run_ctx, &workflow).await;
            coordinator.active.lock().unwrap().take();
            outcome
        });

        Ok(WorkflowHandle { ctx, join })
    }

    /// Toggle semantics for a single start/stop surface: spawns when idle,
    /// otherwise requests a stop of the running workflow and returns
    /// `None`.
    pub fn spawn_or_stop<W>(&self, session: &Session, workflow: W) -> Option<WorkflowHandle>
    where
        W: Workflow + 'static,
    {
        if self.is_running() {
            self.cancel_active();
            return None;
        }
        self.spawn(session, workflow).ok()
    }
}
