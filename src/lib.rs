//! Mobile UI automation through the accessibility tree
//!
//! This crate drives third-party apps by inspecting and manipulating the
//! platform accessibility tree, inspired by Playwright's web automation
//! model: declarative selectors, poll-waiting locators, and workflows
//! composed from small interaction primitives. The host's accessibility
//! service supplies the tree through the [`platforms::AccessibilityBridge`]
//! trait; everything above that seam is platform-agnostic and testable
//! against the scripted in-memory bridge.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

pub mod config;
pub mod enrich;
pub mod errors;
pub mod interactions;
pub mod locator;
pub mod navigation;
pub mod node;
pub mod platforms;
pub mod query;
pub mod selector;
#[cfg(test)]
mod tests;
pub mod utils;
pub mod workflow;
pub mod workflows;

pub use config::TargetConfig;
pub use errors::AutomationError;
pub use locator::Locator;
pub use node::{Bounds, NodeAttributes, NodeImpl, UiNode};
pub use platforms::{AccessibilityBridge, Gesture};
pub use selector::Selector;
pub use workflow::{
    RunContext, StepAbort, StepResult, Workflow, WorkflowCoordinator, WorkflowHandle,
    WorkflowOutcome, WorkflowState,
};

/// An action queued by the host for processing on the next tree-change
/// event. The happy-path workflows never need this; it exists for hosts
/// that want to defer work until the tree settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedAction {
    pub kind: String,
}

struct SessionInner {
    bridge: Arc<dyn AccessibilityBridge>,
    config: TargetConfig,
    connected: AtomicBool,
    queued: Mutex<VecDeque<QueuedAction>>,
}

/// The process-wide automation session, bound to the lifecycle of the
/// OS accessibility connection.
///
/// Created when the host's service connects, invalidated by
/// [`Session::interrupt`] when it disconnects. All workflows execute
/// against one session; the [`WorkflowCoordinator`] guarantees at most one
/// runs at a time. Cloning is cheap and shares the underlying connection.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    #[instrument(skip(bridge, config))]
    pub fn connect(bridge: Arc<dyn AccessibilityBridge>, config: TargetConfig) -> Self {
        info!("Automation session connected");
        Self {
            inner: Arc::new(SessionInner {
                bridge,
                config,
                connected: AtomicBool::new(true),
                queued: Mutex::new(VecDeque::new()),
            }),
        }
    }

    pub fn config(&self) -> &TargetConfig {
        &self.inner.config
    }

    pub(crate) fn bridge(&self) -> &Arc<dyn AccessibilityBridge> {
        &self.inner.bridge
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// Root of the active window's tree. `None` when the session has been
    /// interrupted or the platform has no active window to offer; callers
    /// treat that as "element not found", not as an error.
    pub fn root(&self) -> Option<UiNode> {
        if !self.is_connected() {
            return None;
        }
        self.inner.bridge.active_root()
    }

    /// A locator for the selector, polling the live tree until a match
    /// appears or the configured timeout elapses
    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        Locator::new(self.clone(), selector.into())
    }

    /// Package identifier of the current foreground window
    pub fn foreground_package(&self) -> Option<String> {
        self.root().and_then(|root| root.package_name())
    }

    /// Mark the session unusable after the OS interrupts or disconnects
    /// the service. Subsequent tree reads return nothing and running
    /// workflows fail their next step.
    #[instrument(skip(self))]
    pub fn interrupt(&self) {
        info!("Automation session interrupted");
        self.inner.connected.store(false, Ordering::SeqCst);
    }

    /// Queue an action for the next tree-change event
    pub fn enqueue_action(&self, action: QueuedAction) {
        self.inner.queued.lock().unwrap().push_back(action);
    }

    pub fn pending_action_count(&self) -> usize {
        self.inner.queued.lock().unwrap().len()
    }

    /// Host callback for tree-change events; drains the queued-actions
    /// buffer. Returns the drained actions so the host can act on them.
    pub fn notify_tree_event(&self) -> Vec<QueuedAction> {
        let drained: Vec<QueuedAction> =
            self.inner.queued.lock().unwrap().drain(..).collect();
        for action in &drained {
            debug!("Processing queued action: {}", action.kind);
        }
        drained
    }
}
