use crate::errors::AutomationError;
use crate::node::UiNode;
use crate::query;
use crate::selector::Selector;
use crate::Session;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, instrument};

const MIN_POLL: Duration = Duration::from_millis(1);

/// A high-level API for finding and waiting on tree elements.
///
/// Every poll re-fetches the root: the tree mutates underneath us whenever
/// the foreground app redraws, so a match is only ever valid for the
/// snapshot it came from.
#[derive(Clone)]
pub struct Locator {
    session: Session,
    selector: Selector,
    timeout: Duration,
    poll: Duration,
}

impl Locator {
    pub(crate) fn new(session: Session, selector: Selector) -> Self {
        let delays = &session.config().delays;
        let timeout = delays.wait_timeout();
        let poll = delays.wait_poll();
        Self {
            session,
            selector,
            timeout,
            poll,
        }
    }

    /// Override the default timeout for waiting operations on this
    /// locator instance
    pub fn set_default_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// First match in the current snapshot, without waiting
    pub fn first(&self) -> Option<UiNode> {
        let root = self.session.root()?;
        query::find(&root, &self.selector)
    }

    /// Every match in the current snapshot, without waiting
    pub fn all(&self) -> Vec<UiNode> {
        match self.session.root() {
            Some(root) => query::find_matches(&root, &self.selector),
            None => Vec::new(),
        }
    }

    /// Every visible match in the current snapshot. Stale off-screen
    /// duplicates left behind by tab transitions are dropped here.
    pub fn visible(&self) -> Vec<UiNode> {
        query::filter_visible(self.all())
    }

    /// Wait for a match to appear, polling the live tree up to the
    /// locator's timeout
    pub async fn wait(&self) -> Result<UiNode, AutomationError> {
        self.wait_with(None).await
    }

    #[instrument(level = "debug", skip(self, timeout))]
    pub async fn wait_with(
        &self,
        timeout: Option<Duration>,
    ) -> Result<UiNode, AutomationError> {
        let effective_timeout = timeout.unwrap_or(self.timeout);
        let poll = self.poll.max(MIN_POLL);
        debug!(
            "Waiting up to {effective_timeout:?} for element matching {:?}",
            self.selector
        );
        let deadline = Instant::now() + effective_timeout;
        loop {
            if let Some(root) = self.session.root() {
                if let Some(node) = query::find(&root, &self.selector) {
                    return Ok(node);
                }
            }
            if Instant::now() >= deadline {
                return Err(AutomationError::Timeout(format!(
                    "Timed out after {effective_timeout:?} waiting for element matching {:?}",
                    self.selector
                )));
            }
            sleep(poll).await;
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}
