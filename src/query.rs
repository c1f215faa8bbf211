//! Stateless search algorithms over a tree snapshot.
//!
//! All searches are depth-first pre-order walks starting at the supplied
//! root. They are pure: no clicks, no text injection, no side effects on
//! the tree. Results are `Option`s or lists; "nothing matched" is an
//! ordinary empty result, never an error.

use crate::node::UiNode;
use crate::selector::Selector;
use tracing::debug;

const EDITABLE_CLASSES: [&str; 2] = [
    "android.widget.EditText",
    "android.widget.AutoCompleteTextView",
];

/// Walk the tree in pre-order, stopping as soon as `visit` returns true.
fn walk(node: &UiNode, visit: &mut impl FnMut(&UiNode) -> bool) -> bool {
    if visit(node) {
        return true;
    }
    for child in node.children() {
        if walk(&child, visit) {
            return true;
        }
    }
    false
}

/// First node matching the predicate, in depth-first pre-order
pub fn find_first(root: &UiNode, pred: impl Fn(&UiNode) -> bool) -> Option<UiNode> {
    let mut found = None;
    walk(root, &mut |node| {
        if pred(node) {
            found = Some(node.clone());
            true
        } else {
            false
        }
    });
    found
}

/// Every node matching the predicate, in depth-first pre-order
pub fn find_all(root: &UiNode, pred: impl Fn(&UiNode) -> bool) -> Vec<UiNode> {
    let mut out = Vec::new();
    walk(root, &mut |node| {
        if pred(node) {
            out.push(node.clone());
        }
        false
    });
    out
}

fn text_matches(node: &UiNode, wanted: &str, exact: bool) -> bool {
    let check = |field: Option<String>| {
        field.map_or(false, |value| {
            if exact {
                value.trim() == wanted.trim()
            } else {
                value.contains(wanted)
            }
        })
    };
    check(node.text()) || check(node.content_description())
}

/// Find by visible text or content description. `exact` compares trimmed
/// equality, otherwise substring containment.
pub fn find_by_text(root: &UiNode, text: &str, exact: bool) -> Option<UiNode> {
    find_first(root, |node| text_matches(node, text, exact))
}

pub fn find_all_by_text(root: &UiNode, text: &str, exact: bool) -> Vec<UiNode> {
    find_all(root, |node| text_matches(node, text, exact))
}

/// The `index`-th node carrying the resource id, counted across the whole
/// tree in traversal order. An index beyond the match count returns `None`.
pub fn find_by_resource_id(root: &UiNode, resource_id: &str, index: usize) -> Option<UiNode> {
    find_all_by_resource_id(root, resource_id)
        .into_iter()
        .nth(index)
}

pub fn find_all_by_resource_id(root: &UiNode, resource_id: &str) -> Vec<UiNode> {
    find_all(root, |node| {
        node.resource_id().as_deref() == Some(resource_id)
    })
}

/// Class-name matching uses substring containment: target apps rename
/// concrete widget subclasses between versions, the base name survives.
pub fn find_by_class(root: &UiNode, class_name: &str) -> Option<UiNode> {
    find_first(root, |node| node.class_name().contains(class_name))
}

pub fn find_all_by_class(root: &UiNode, class_name: &str) -> Vec<UiNode> {
    find_all(root, |node| node.class_name().contains(class_name))
}

fn is_editable_widget(node: &UiNode) -> bool {
    let class = node.class_name();
    EDITABLE_CLASSES
        .iter()
        .any(|c| class.eq_ignore_ascii_case(c))
}

/// The n-th editable input widget in traversal order (0-based)
pub fn find_editable(root: &UiNode, index: usize) -> Option<UiNode> {
    let mut seen = 0usize;
    let mut found = None;
    walk(root, &mut |node| {
        if is_editable_widget(node) {
            if seen == index {
                found = Some(node.clone());
                return true;
            }
            seen += 1;
        }
        false
    });
    found
}

/// The n-th scrollable container in traversal order (0-based)
pub fn find_scrollable(root: &UiNode, index: usize) -> Option<UiNode> {
    let mut seen = 0usize;
    let mut found = None;
    walk(root, &mut |node| {
        if node.is_scrollable() {
            if seen == index {
                found = Some(node.clone());
                return true;
            }
            seen += 1;
        }
        false
    });
    found
}

/// The currently focused node, if any
pub fn find_focused(root: &UiNode) -> Option<UiNode> {
    find_first(root, |node| node.is_focused())
}

/// Resolve a declarative selector to its first match
pub fn find(root: &UiNode, selector: &Selector) -> Option<UiNode> {
    match selector {
        Selector::Text { value, exact } => find_by_text(root, value, *exact),
        Selector::ResourceId { id, index } => find_by_resource_id(root, id, *index),
        Selector::ClassName(name) => find_by_class(root, name),
        Selector::EditableIndex(n) => find_editable(root, *n),
        Selector::ScrollableIndex(n) => find_scrollable(root, *n),
        Selector::Invalid(reason) => {
            debug!("Refusing to search with invalid selector: {reason}");
            None
        }
    }
}

/// Resolve a declarative selector to every match
pub fn find_matches(root: &UiNode, selector: &Selector) -> Vec<UiNode> {
    match selector {
        Selector::Text { value, exact } => find_all_by_text(root, value, *exact),
        Selector::ResourceId { id, .. } => find_all_by_resource_id(root, id),
        Selector::ClassName(name) => find_all_by_class(root, name),
        Selector::EditableIndex(n) => find_editable(root, *n).into_iter().collect(),
        Selector::ScrollableIndex(n) => find_scrollable(root, *n).into_iter().collect(),
        Selector::Invalid(reason) => {
            debug!("Refusing to search with invalid selector: {reason}");
            Vec::new()
        }
    }
}

/// Drop nodes whose visible flag is false.
///
/// Tab switches leave stale off-screen duplicates of identifier-tagged
/// nodes behind; those must not be read as current data. Filtering an
/// already-filtered list returns the same list.
pub fn filter_visible(nodes: Vec<UiNode>) -> Vec<UiNode> {
    nodes.into_iter().filter(|n| n.is_visible()).collect()
}

/// Text values of every node carrying the resource id, in traversal order
pub fn collect_texts_by_resource_id(root: &UiNode, resource_id: &str) -> Vec<String> {
    find_all_by_resource_id(root, resource_id)
        .iter()
        .filter_map(|node| node.text())
        .collect()
}
