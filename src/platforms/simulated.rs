//! In-memory bridge implementation backed by scripted screens.
//!
//! Used by the test suite and by hosts that want dry runs without a live
//! accessibility connection. Screens are registered by name; a stack of
//! screen names models the foreground navigation state, and node click
//! effects push, pop or replace screens the way real app navigation would.

use crate::errors::AutomationError;
use crate::node::{Bounds, NodeImpl, UiNode};
use crate::platforms::{AccessibilityBridge, Gesture};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Navigation effect applied when a scripted node is successfully clicked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClickEffect {
    /// Click is accepted but nothing navigates
    #[default]
    Stay,
    /// Push a screen onto the stack
    Push(String),
    /// Pop the current screen
    Pop,
    /// Replace the current screen
    Replace(String),
}

#[derive(Debug)]
pub struct SimNodeData {
    class_name: String,
    text: Mutex<Option<String>>,
    content_description: Option<String>,
    resource_id: Option<String>,
    bounds: Bounds,
    clickable: bool,
    visible: AtomicBool,
    scrollable: bool,
    focused: AtomicBool,
    editable: bool,
    effect: Mutex<ClickEffect>,
    fail_children: AtomicBool,
    children: Vec<Arc<SimNodeData>>,
    parent: Mutex<Weak<SimNodeData>>,
}

impl SimNodeData {
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock().unwrap() = Some(text.into());
    }

    pub fn text(&self) -> Option<String> {
        self.text.lock().unwrap().clone()
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    /// Make child fetches on this node error out, simulating a subtree
    /// detached mid-traversal
    pub fn poison_children(&self, poisoned: bool) {
        self.fail_children.store(poisoned, Ordering::SeqCst);
    }

    /// First descendant (or self) carrying the resource id
    pub fn find_by_resource_id(self: &Arc<Self>, id: &str) -> Option<Arc<SimNodeData>> {
        if self.resource_id.as_deref() == Some(id) {
            return Some(self.clone());
        }
        for child in &self.children {
            if let Some(found) = child.find_by_resource_id(id) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant (or self) carrying the resource id, pre-order
    pub fn find_all_by_resource_id(self: &Arc<Self>, id: &str) -> Vec<Arc<SimNodeData>> {
        let mut out = Vec::new();
        self.collect_by_resource_id(id, &mut out);
        out
    }

    fn collect_by_resource_id(self: &Arc<Self>, id: &str, out: &mut Vec<Arc<SimNodeData>>) {
        if self.resource_id.as_deref() == Some(id) {
            out.push(self.clone());
        }
        for child in &self.children {
            child.collect_by_resource_id(id, out);
        }
    }
}

/// Builder for one scripted node and its subtree
pub struct SimNodeBuilder {
    class_name: String,
    text: Option<String>,
    content_description: Option<String>,
    resource_id: Option<String>,
    bounds: Bounds,
    clickable: bool,
    visible: bool,
    scrollable: bool,
    focused: bool,
    editable: bool,
    effect: ClickEffect,
    children: Vec<SimNodeBuilder>,
}

impl SimNodeBuilder {
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            text: None,
            content_description: None,
            resource_id: None,
            bounds: Bounds::new(0, 0, 1080, 1920),
            clickable: false,
            visible: true,
            scrollable: false,
            focused: false,
            editable: false,
            effect: ClickEffect::Stay,
            children: Vec::new(),
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.content_description = Some(description.to_string());
        self
    }

    pub fn resource_id(mut self, id: &str) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn bounds(mut self, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        self.bounds = Bounds::new(left, top, right, bottom);
        self
    }

    pub fn clickable(mut self) -> Self {
        self.clickable = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn scrollable(mut self) -> Self {
        self.scrollable = true;
        self
    }

    pub fn focused(mut self) -> Self {
        self.focused = true;
        self
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn on_click(mut self, effect: ClickEffect) -> Self {
        self.effect = effect;
        self
    }

    pub fn child(mut self, child: SimNodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    fn build(self) -> Arc<SimNodeData> {
        let children: Vec<Arc<SimNodeData>> =
            self.children.into_iter().map(|c| c.build()).collect();
        let node = Arc::new(SimNodeData {
            class_name: self.class_name,
            text: Mutex::new(self.text),
            content_description: self.content_description,
            resource_id: self.resource_id,
            bounds: self.bounds,
            clickable: self.clickable,
            visible: AtomicBool::new(self.visible),
            scrollable: self.scrollable,
            focused: AtomicBool::new(self.focused),
            editable: self.editable,
            effect: Mutex::new(self.effect),
            fail_children: AtomicBool::new(false),
            children,
            parent: Mutex::new(Weak::new()),
        });
        for child in &node.children {
            *child.parent.lock().unwrap() = Arc::downgrade(&node);
        }
        node
    }
}

struct SimScreen {
    package: String,
    root: Arc<SimNodeData>,
    /// Back presses this screen swallows before popping, modeling
    /// transient overlays like the on-screen keyboard
    consume_back: AtomicUsize,
}

struct SimShared {
    screens: Mutex<HashMap<String, SimScreen>>,
    stack: Mutex<Vec<String>>,
    entry_points: Mutex<HashMap<String, String>>,
    display: (u32, u32),
    gestures: Mutex<Vec<Gesture>>,
    gestures_enabled: AtomicBool,
    back_presses: AtomicUsize,
    launches: Mutex<Vec<String>>,
    visited: Mutex<Vec<String>>,
}

impl SimShared {
    fn apply_effect(&self, effect: &ClickEffect) {
        let mut stack = self.stack.lock().unwrap();
        match effect {
            ClickEffect::Stay => {}
            ClickEffect::Push(name) => {
                self.visited.lock().unwrap().push(name.clone());
                stack.push(name.clone());
            }
            ClickEffect::Pop => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            ClickEffect::Replace(name) => {
                self.visited.lock().unwrap().push(name.clone());
                stack.pop();
                stack.push(name.clone());
            }
        }
    }

    fn hit_test(&self, x: i32, y: i32) -> Option<ClickEffect> {
        let stack = self.stack.lock().unwrap();
        let name = stack.last()?.clone();
        drop(stack);
        let screens = self.screens.lock().unwrap();
        let screen = screens.get(&name)?;
        let mut best: Option<(usize, ClickEffect)> = None;
        Self::hit_test_node(&screen.root, x, y, 0, &mut best);
        best.map(|(_, effect)| effect)
    }

    fn hit_test_node(
        node: &Arc<SimNodeData>,
        x: i32,
        y: i32,
        depth: usize,
        best: &mut Option<(usize, ClickEffect)>,
    ) {
        if !node.visible.load(Ordering::SeqCst) {
            return;
        }
        if node.bounds.contains(x, y) {
            let effect = node.effect.lock().unwrap().clone();
            if node.clickable || effect != ClickEffect::Stay {
                let deeper = best.as_ref().map_or(true, |(d, _)| depth >= *d);
                if deeper {
                    *best = Some((depth, effect));
                }
            }
        }
        for child in &node.children {
            Self::hit_test_node(child, x, y, depth + 1, best);
        }
    }
}

/// A scriptable bridge over in-memory screens
pub struct SimulatedBridge {
    shared: Arc<SimShared>,
}

impl SimulatedBridge {
    pub fn new(display: (u32, u32)) -> Self {
        Self {
            shared: Arc::new(SimShared {
                screens: Mutex::new(HashMap::new()),
                stack: Mutex::new(Vec::new()),
                entry_points: Mutex::new(HashMap::new()),
                display,
                gestures: Mutex::new(Vec::new()),
                gestures_enabled: AtomicBool::new(true),
                back_presses: AtomicUsize::new(0),
                launches: Mutex::new(Vec::new()),
                visited: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register a screen; returns the built root for later mutation
    pub fn add_screen(
        &self,
        name: &str,
        package: &str,
        root: SimNodeBuilder,
    ) -> Arc<SimNodeData> {
        let built = root.build();
        self.shared.screens.lock().unwrap().insert(
            name.to_string(),
            SimScreen {
                package: package.to_string(),
                root: built.clone(),
                consume_back: AtomicUsize::new(0),
            },
        );
        built
    }

    /// Make the named screen swallow the next `count` back presses, the
    /// way an on-screen keyboard absorbs back before the screen itself
    pub fn consume_next_back(&self, screen: &str, count: usize) {
        if let Some(s) = self.shared.screens.lock().unwrap().get(screen) {
            s.consume_back.store(count, Ordering::SeqCst);
        }
    }

    /// Declare which screen launching a package lands on
    pub fn register_entry(&self, package: &str, screen: &str) {
        self.shared
            .entry_points
            .lock()
            .unwrap()
            .insert(package.to_string(), screen.to_string());
    }

    pub fn set_stack(&self, names: &[&str]) {
        *self.shared.stack.lock().unwrap() =
            names.iter().map(|s| s.to_string()).collect();
    }

    pub fn current_screen(&self) -> Option<String> {
        self.shared.stack.lock().unwrap().last().cloned()
    }

    pub fn back_press_count(&self) -> usize {
        self.shared.back_presses.load(Ordering::SeqCst)
    }

    pub fn dispatched_gestures(&self) -> Vec<Gesture> {
        self.shared.gestures.lock().unwrap().clone()
    }

    pub fn launched_packages(&self) -> Vec<String> {
        self.shared.launches.lock().unwrap().clone()
    }

    /// Screens navigated to via click effects or launches, in order
    pub fn visit_log(&self) -> Vec<String> {
        self.shared.visited.lock().unwrap().clone()
    }

    /// Scripted node data of a registered screen, by resource id
    pub fn find_screen_node(
        &self,
        screen: &str,
        resource_id: &str,
    ) -> Option<Arc<SimNodeData>> {
        let screens = self.shared.screens.lock().unwrap();
        screens.get(screen)?.root.find_by_resource_id(resource_id)
    }

    pub fn set_gestures_enabled(&self, enabled: bool) {
        self.shared
            .gestures_enabled
            .store(enabled, Ordering::SeqCst);
    }
}

impl AccessibilityBridge for SimulatedBridge {
    fn active_root(&self) -> Option<UiNode> {
        let name = self.shared.stack.lock().unwrap().last().cloned()?;
        let screens = self.shared.screens.lock().unwrap();
        let screen = screens.get(&name)?;
        Some(UiNode::new(Box::new(SimNode {
            data: screen.root.clone(),
            package: screen.package.clone(),
            shared: Arc::downgrade(&self.shared),
        })))
    }

    fn display_size(&self) -> (u32, u32) {
        self.shared.display
    }

    fn supports_gestures(&self) -> bool {
        self.shared.gestures_enabled.load(Ordering::SeqCst)
    }

    fn dispatch_gesture(&self, gesture: &Gesture) -> bool {
        if !self.supports_gestures() {
            return false;
        }
        self.shared.gestures.lock().unwrap().push(gesture.clone());
        if gesture.is_tap() {
            let (x, y) = gesture.start;
            if let Some(effect) = self.shared.hit_test(x as i32, y as i32) {
                self.shared.apply_effect(&effect);
            }
        }
        true
    }

    fn press_back(&self) -> bool {
        self.shared.back_presses.fetch_add(1, Ordering::SeqCst);
        let top = self.shared.stack.lock().unwrap().last().cloned();
        if let Some(name) = top {
            let screens = self.shared.screens.lock().unwrap();
            if let Some(screen) = screens.get(&name) {
                let remaining = screen.consume_back.load(Ordering::SeqCst);
                if remaining > 0 {
                    screen.consume_back.store(remaining - 1, Ordering::SeqCst);
                    return true;
                }
            }
        }
        let mut stack = self.shared.stack.lock().unwrap();
        if stack.len() > 1 {
            stack.pop();
        }
        true
    }

    fn launch_app(&self, package: &str) -> bool {
        self.shared
            .launches
            .lock()
            .unwrap()
            .push(package.to_string());
        let entry = self
            .shared
            .entry_points
            .lock()
            .unwrap()
            .get(package)
            .cloned();
        match entry {
            Some(screen) => {
                let mut stack = self.shared.stack.lock().unwrap();
                if stack.last() != Some(&screen) {
                    self.shared.visited.lock().unwrap().push(screen.clone());
                    stack.push(screen);
                }
                true
            }
            None => false,
        }
    }
}

/// Live node handle into a scripted screen
#[derive(Clone)]
struct SimNode {
    data: Arc<SimNodeData>,
    package: String,
    shared: Weak<SimShared>,
}

impl fmt::Debug for SimNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimNode")
            .field("class_name", &self.data.class_name)
            .field("resource_id", &self.data.resource_id)
            .finish()
    }
}

impl SimNode {
    fn wrap(&self, data: Arc<SimNodeData>) -> UiNode {
        UiNode::new(Box::new(SimNode {
            data,
            package: self.package.clone(),
            shared: self.shared.clone(),
        }))
    }
}

impl NodeImpl for SimNode {
    fn class_name(&self) -> String {
        self.data.class_name.clone()
    }

    fn text(&self) -> Option<String> {
        self.data.text()
    }

    fn content_description(&self) -> Option<String> {
        self.data.content_description.clone()
    }

    fn resource_id(&self) -> Option<String> {
        self.data.resource_id.clone()
    }

    fn package_name(&self) -> Option<String> {
        Some(self.package.clone())
    }

    fn bounds(&self) -> Bounds {
        self.data.bounds
    }

    fn is_clickable(&self) -> bool {
        self.data.clickable
    }

    fn is_visible(&self) -> bool {
        self.data.visible.load(Ordering::SeqCst)
    }

    fn is_scrollable(&self) -> bool {
        self.data.scrollable
    }

    fn is_focused(&self) -> bool {
        self.data.focused.load(Ordering::SeqCst)
    }

    fn is_editable(&self) -> bool {
        self.data.editable
    }

    fn child_count(&self) -> usize {
        self.data.children.len()
    }

    fn child(&self, index: usize) -> Result<Option<UiNode>, AutomationError> {
        if self.data.fail_children.load(Ordering::SeqCst) {
            return Err(AutomationError::PlatformError(
                "Child fetch failed: node detached".to_string(),
            ));
        }
        Ok(self.data.children.get(index).cloned().map(|c| self.wrap(c)))
    }

    fn parent(&self) -> Option<UiNode> {
        let parent = self.data.parent.lock().unwrap().upgrade()?;
        Some(self.wrap(parent))
    }

    fn perform_click(&self) -> bool {
        if !self.data.clickable {
            return false;
        }
        let effect = self.data.effect.lock().unwrap().clone();
        if let Some(shared) = self.shared.upgrade() {
            shared.apply_effect(&effect);
        }
        true
    }

    fn perform_set_text(&self, text: &str) -> bool {
        if !self.data.editable {
            return false;
        }
        self.data.set_text(text);
        true
    }

    fn perform_scroll_forward(&self) -> bool {
        self.data.scrollable
    }

    fn perform_scroll_backward(&self) -> bool {
        self.data.scrollable
    }

    fn clone_box(&self) -> Box<dyn NodeImpl> {
        Box::new(self.clone())
    }
}
