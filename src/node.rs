use crate::errors::AutomationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;
use tracing::warn;

/// Screen-space bounds of a node, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn center_x(&self) -> i32 {
        (self.left + self.right) / 2
    }

    pub fn center_y(&self) -> i32 {
        (self.top + self.bottom) / 2
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Attribute snapshot of a node, serializable for logging and debugging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeAttributes {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub content_description: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_string")]
    pub package_name: Option<String>,
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default, skip_serializing_if = "is_false")]
    pub clickable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub scrollable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub focused: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_count: Option<usize>,
}

fn is_empty_string(opt: &Option<String>) -> bool {
    match opt {
        Some(s) => s.is_empty(),
        None => true,
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Interface the host's accessibility layer implements for each live node.
///
/// Implementations wrap an ephemeral platform reference; a handle obtained
/// from one tree snapshot must not be assumed valid after the foreground
/// screen may have changed. Callers re-query instead of caching.
pub trait NodeImpl: Send + Sync + Debug {
    fn class_name(&self) -> String;
    fn text(&self) -> Option<String>;
    fn content_description(&self) -> Option<String>;
    fn resource_id(&self) -> Option<String>;
    fn package_name(&self) -> Option<String>;
    fn bounds(&self) -> Bounds;
    fn is_clickable(&self) -> bool;
    fn is_visible(&self) -> bool;
    fn is_scrollable(&self) -> bool;
    fn is_focused(&self) -> bool;
    fn is_editable(&self) -> bool;
    fn child_count(&self) -> usize;
    fn child(&self, index: usize) -> Result<Option<UiNode>, AutomationError>;
    fn parent(&self) -> Option<UiNode>;

    /// Perform the native accessibility click action.
    /// Returns whether the action was accepted, never errors.
    fn perform_click(&self) -> bool;

    /// Perform the native set-text action with the literal string.
    fn perform_set_text(&self, text: &str) -> bool;

    /// Native scroll-forward action on a scrollable container.
    fn perform_scroll_forward(&self) -> bool;

    /// Native scroll-backward action on a scrollable container.
    fn perform_scroll_backward(&self) -> bool;

    fn clone_box(&self) -> Box<dyn NodeImpl>;
}

/// A handle to one element of the accessibility tree at a point in time
#[derive(Debug)]
pub struct UiNode {
    inner: Box<dyn NodeImpl>,
}

impl UiNode {
    pub fn new(impl_: Box<dyn NodeImpl>) -> Self {
        Self { inner: impl_ }
    }

    pub fn class_name(&self) -> String {
        self.inner.class_name()
    }

    pub fn text(&self) -> Option<String> {
        self.inner.text()
    }

    pub fn content_description(&self) -> Option<String> {
        self.inner.content_description()
    }

    pub fn resource_id(&self) -> Option<String> {
        self.inner.resource_id()
    }

    pub fn package_name(&self) -> Option<String> {
        self.inner.package_name()
    }

    pub fn bounds(&self) -> Bounds {
        self.inner.bounds()
    }

    pub fn is_clickable(&self) -> bool {
        self.inner.is_clickable()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.is_visible()
    }

    pub fn is_scrollable(&self) -> bool {
        self.inner.is_scrollable()
    }

    pub fn is_focused(&self) -> bool {
        self.inner.is_focused()
    }

    pub fn is_editable(&self) -> bool {
        self.inner.is_editable()
    }

    pub fn child_count(&self) -> usize {
        self.inner.child_count()
    }

    pub fn parent(&self) -> Option<UiNode> {
        self.inner.parent()
    }

    /// Children of this node. A failed fetch of an individual child is
    /// logged and skipped so a partially detached subtree does not fail
    /// the whole traversal.
    pub fn children(&self) -> Vec<UiNode> {
        let mut out = Vec::with_capacity(self.inner.child_count());
        for i in 0..self.inner.child_count() {
            match self.inner.child(i) {
                Ok(Some(child)) => out.push(child),
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping unreadable child {i}: {e}");
                }
            }
        }
        out
    }

    /// Text if present, otherwise the content description. List items and
    /// buttons intermittently surface only one of the two.
    pub fn text_or_description(&self) -> Option<String> {
        self.inner.text().or_else(|| self.inner.content_description())
    }

    pub fn perform_click(&self) -> bool {
        self.inner.perform_click()
    }

    pub fn perform_set_text(&self, text: &str) -> bool {
        self.inner.perform_set_text(text)
    }

    pub fn perform_scroll_forward(&self) -> bool {
        self.inner.perform_scroll_forward()
    }

    pub fn perform_scroll_backward(&self) -> bool {
        self.inner.perform_scroll_backward()
    }

    /// Attribute snapshot for logging and serialization
    pub fn attributes(&self) -> NodeAttributes {
        NodeAttributes {
            class_name: self.class_name(),
            text: self.text(),
            content_description: self.content_description(),
            resource_id: self.resource_id(),
            package_name: self.package_name(),
            bounds: self.bounds(),
            clickable: self.is_clickable(),
            visible: self.is_visible(),
            scrollable: self.is_scrollable(),
            focused: self.is_focused(),
            editable: self.is_editable(),
            child_count: Some(self.child_count()),
        }
    }
}

impl Clone for UiNode {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_box(),
        }
    }
}

impl fmt::Display for UiNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.class_name())?;
        if let Some(id) = self.resource_id() {
            write!(f, "[{id}] ")?;
        }
        if let Some(text) = self.text_or_description() {
            write!(f, "{text:?}")?;
        }
        Ok(())
    }
}
