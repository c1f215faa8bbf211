//! Interaction primitives: clicks, text injection, synthesized gestures.
//!
//! Everything here returns a plain `bool`: `false` means the platform
//! rejected the action or no target was found, and callers decide whether
//! a fallback applies. Side effects live only in this layer; the query
//! layer stays pure.

use crate::node::UiNode;
use crate::platforms::Gesture;
use crate::query;
use crate::Session;
use std::time::Duration;
use tracing::{debug, warn};

/// Default stroke duration for vertical swipes
pub const SWIPE_VERTICAL_DURATION: Duration = Duration::from_millis(400);
/// Default stroke duration for horizontal swipes
pub const SWIPE_HORIZONTAL_DURATION: Duration = Duration::from_millis(300);

/// Screen-fraction geometry for vertical swipes: travel between 78% and
/// 35% of the display height at mid-width.
const SWIPE_Y_LOW: f32 = 0.78;
const SWIPE_Y_HIGH: f32 = 0.35;

impl Session {
    /// Click a node, trying in order: the native accessibility click
    /// action, the parent's click action (only when the node itself is not
    /// clickable), and finally a synthesized tap at the node's centroid.
    /// Any success short-circuits.
    pub fn click_node(&self, node: &UiNode) -> bool {
        if node.perform_click() {
            return true;
        }
        if !node.is_clickable() {
            if let Some(parent) = node.parent() {
                if parent.perform_click() {
                    return true;
                }
            }
        }
        self.tap_node(node)
    }

    /// Click variant that leads with the synthesized tap, for widgets whose
    /// native click action is accepted but ignored
    pub fn click_node_tap_first(&self, node: &UiNode) -> bool {
        if self.tap_node(node) {
            return true;
        }
        self.click_node(node)
    }

    /// Synthesized single-point tap at the node's screen-space centroid
    pub fn tap_node(&self, node: &UiNode) -> bool {
        let bounds = node.bounds();
        self.tap_at(bounds.center_x() as f32, bounds.center_y() as f32)
    }

    pub fn tap_at(&self, x: f32, y: f32) -> bool {
        self.dispatch(&Gesture::tap(x, y))
    }

    /// Tap at screen-fraction coordinates, e.g. `(0.9, 0.2)` for the
    /// upper right edge
    pub fn tap_at_fraction(&self, fx: f32, fy: f32) -> bool {
        let (width, height) = self.bridge().display_size();
        self.tap_at(width as f32 * fx, height as f32 * fy)
    }

    /// Find the first match for `text` and click it
    pub fn click_by_text(&self, text: &str, exact: bool) -> bool {
        let Some(root) = self.root() else {
            return false;
        };
        match query::find_by_text(&root, text, exact) {
            Some(node) => self.click_node(&node),
            None => false,
        }
    }

    /// Find the `index`-th node carrying the resource id and click it
    pub fn click_by_resource_id(&self, resource_id: &str, index: usize) -> bool {
        let Some(root) = self.root() else {
            return false;
        };
        match query::find_by_resource_id(&root, resource_id, index) {
            Some(node) => {
                debug!("Clicking node by resource id: {resource_id}");
                self.click_node(&node)
            }
            None => {
                debug!("Node with resource id {resource_id} not found");
                false
            }
        }
    }

    /// Inject text into the `index`-th editable input widget via the
    /// native set-text action. No retry: callers verify the resulting text
    /// themselves if correctness matters.
    pub fn input_text(&self, text: &str, index: usize) -> bool {
        let Some(root) = self.root() else {
            return false;
        };
        match query::find_editable(&root, index) {
            Some(node) => node.perform_set_text(text),
            None => false,
        }
    }

    /// Inject text into the node carrying the resource id
    pub fn input_text_by_resource_id(&self, resource_id: &str, text: &str) -> bool {
        let Some(root) = self.root() else {
            return false;
        };
        match query::find_by_resource_id(&root, resource_id, 0) {
            Some(node) => {
                debug!("Setting text in node with resource id: {resource_id}");
                node.perform_set_text(text)
            }
            None => {
                debug!("Node with resource id {resource_id} not found for text input");
                false
            }
        }
    }

    /// Text (or content description) of the first node carrying the
    /// resource id
    pub fn text_by_resource_id(&self, resource_id: &str) -> Option<String> {
        let root = self.root()?;
        query::find_by_resource_id(&root, resource_id, 0)
            .and_then(|node| node.text_or_description())
    }

    /// Text values of every node carrying the resource id
    pub fn all_texts_by_resource_id(&self, resource_id: &str) -> Vec<String> {
        match self.root() {
            Some(root) => query::collect_texts_by_resource_id(&root, resource_id),
            None => Vec::new(),
        }
    }

    /// Native scroll-forward on the `index`-th scrollable container
    pub fn scroll_forward(&self, index: usize) -> bool {
        let Some(root) = self.root() else {
            return false;
        };
        match query::find_scrollable(&root, index) {
            Some(node) => node.perform_scroll_forward(),
            None => false,
        }
    }

    /// Vertical swipe from the lower-middle to the upper-middle area,
    /// scrolling the visible content forward
    pub fn swipe_up(&self, duration: Duration) -> bool {
        let (width, height) = self.bridge().display_size();
        let x = width as f32 * 0.5;
        self.dispatch(&Gesture::stroke(
            (x, height as f32 * SWIPE_Y_LOW),
            (x, height as f32 * SWIPE_Y_HIGH),
            duration,
        ))
    }

    /// Vertical swipe from the upper-middle to the lower-middle area
    pub fn swipe_down(&self, duration: Duration) -> bool {
        let (width, height) = self.bridge().display_size();
        let x = width as f32 * 0.5;
        self.dispatch(&Gesture::stroke(
            (x, height as f32 * SWIPE_Y_HIGH),
            (x, height as f32 * SWIPE_Y_LOW),
            duration,
        ))
    }

    /// Horizontal swipe from the right edge toward the left edge at
    /// mid-height
    pub fn swipe_right_to_left(&self, duration: Duration) -> bool {
        let (width, height) = self.bridge().display_size();
        let y = height as f32 * 0.5;
        self.dispatch(&Gesture::stroke(
            (width as f32 * 0.9, y),
            (width as f32 * 0.1, y),
            duration,
        ))
    }

    /// Click the most top-right visible action affordance.
    ///
    /// Publish/Done/Save buttons commonly sit in the right 25% / top 15%
    /// of the screen; this collects visible clickable button-like nodes in
    /// that region and clicks the rightmost, then topmost, one.
    pub fn click_top_right_action(&self) -> bool {
        let Some(root) = self.root() else {
            return false;
        };
        let (width, height) = self.bridge().display_size();
        let right_threshold = (width as f32 * 0.75) as i32;
        let top_threshold = (height as f32 * 0.15) as i32;

        let mut candidates: Vec<(UiNode, i32, i32)> =
            query::find_all(&root, |node| {
                if !node.is_clickable() || !node.is_visible() {
                    return false;
                }
                let class = node.class_name();
                class.contains("Button")
                    || class.contains("ImageView")
                    || class.contains("TextView")
            })
            .into_iter()
            .filter_map(|node| {
                let bounds = node.bounds();
                let (cx, cy) = (bounds.center_x(), bounds.center_y());
                (cx > right_threshold && cy < top_threshold).then_some((node, cx, cy))
            })
            .collect();

        if candidates.is_empty() {
            debug!("No clickable affordance found in the top-right corner");
            return false;
        }

        candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        let (target, x, y) = &candidates[0];
        debug!("Clicking top-right affordance at ({x}, {y})");
        self.click_node(target)
    }

    fn dispatch(&self, gesture: &Gesture) -> bool {
        let bridge = self.bridge();
        if !bridge.supports_gestures() {
            warn!("Gesture dispatch unavailable on this platform");
            return false;
        }
        bridge.dispatch_gesture(gesture)
    }
}
