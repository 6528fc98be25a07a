//! DOM helpers shared by the widgets.

use inkui_core::dom::Node;

/// Prefix for every widget CSS class.
pub const CLS_PREFIX: &str = "ink-";

/// Builds a prefixed class name: `cls("popup")` is `"ink-popup"`.
#[must_use]
pub fn cls(name: &str) -> String {
    format!("{CLS_PREFIX}{name}")
}

/// Returns `true` when the node's `class` attribute contains `class_name`
/// as a whole word.
#[must_use]
pub fn has_class(node: &Node, class_name: &str) -> bool {
    node.attribute("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
}

/// Walks from `node` up through its ancestors and returns the first node
/// carrying `class_name`, including `node` itself.
#[must_use]
pub fn closest(node: &Node, class_name: &str) -> Option<Node> {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if has_class(&candidate, class_name) {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}
