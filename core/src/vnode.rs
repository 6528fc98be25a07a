//! The virtual node model.
//!
//! A render pass produces a fresh [`VNode`] tree; the tree is pure data
//! and is never mutated once handed to the reconciler. The only behavior
//! defined here are the identity rules the reconciler uses to decide
//! whether two nodes from consecutive renders are "the same node".

use std::fmt;
use std::rc::Rc;

use crate::component::Component;
use crate::value::{EventHandler, PropMap, RefCallback};

/// One node of a rendered virtual tree.
#[derive(Clone, Debug, PartialEq)]
pub enum VNode {
    /// A DOM element with attributes, bindings and children.
    Element(VElement),
    /// A literal text node.
    Text(String),
    /// A nested component occurrence; owns a component instance once
    /// committed.
    Component(VComponent),
}

impl VNode {
    /// Creates a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// The stable identity key of this node, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Element(el) => el.key.as_deref(),
            Self::Component(comp) => comp.key.as_deref(),
            Self::Text(_) => None,
        }
    }
}

/// An element node: tag, ordered attributes, bindings and children.
#[derive(Clone, Default)]
pub struct VElement {
    /// Tag name, already resolved to a string (dynamic tags resolve at
    /// substitution time).
    pub tag: String,
    /// Stable identity hint for list reconciliation.
    pub key: Option<String>,
    /// Ordered attribute name/value pairs, already coerced to strings.
    pub attrs: Vec<(String, String)>,
    /// Ordered inline style entries; `None` removes the property.
    pub style: Vec<(String, Option<String>)>,
    /// Ref binding, if any.
    pub node_ref: Option<RefSlot>,
    /// Declarative event bindings (event name, handler).
    pub events: Vec<(String, EventHandler)>,
    /// Child nodes in order.
    pub children: Vec<VNode>,
}

impl VElement {
    /// Creates an empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Identity rule for elements: same tag and same key (or both
    /// keyless) at the same position means the DOM node is reused.
    #[must_use]
    pub fn same_node(&self, other: &Self) -> bool {
        self.tag == other.tag && self.key == other.key
    }

    /// Returns the value of an attribute by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for VElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VElement")
            .field("tag", &self.tag)
            .field("key", &self.key)
            .field("attrs", &self.attrs)
            .field("style", &self.style)
            .field("events", &self.events.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl PartialEq for VElement {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.key == other.key
            && self.attrs == other.attrs
            && self.style == other.style
            && ref_slots_eq(self.node_ref.as_ref(), other.node_ref.as_ref())
            && self.events.len() == other.events.len()
            && self
                .events
                .iter()
                .zip(other.events.iter())
                .all(|((ka, ha), (kb, hb))| ka == kb && Rc::ptr_eq(ha, hb))
            && self.children == other.children
    }
}

fn ref_slots_eq(a: Option<&RefSlot>, b: Option<&RefSlot>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_binding(b),
        _ => false,
    }
}

/// A ref binding on an element.
#[derive(Clone)]
pub enum RefSlot {
    /// Registers the DOM node into the owning instance's refs map.
    Named(String),
    /// Invokes a callback with the DOM node (and `None` on removal).
    Callback(RefCallback),
}

impl RefSlot {
    /// Identity rule for refs: named refs compare by name, callbacks by
    /// reference identity. Unchanged bindings are not re-invoked on
    /// re-render.
    #[must_use]
    pub fn same_binding(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Named(a), Self::Named(b)) => a == b,
            (Self::Callback(a), Self::Callback(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for RefSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// A nested component occurrence: definition plus props.
#[derive(Clone, Debug, PartialEq)]
pub struct VComponent {
    /// The component definition this node instantiates.
    pub def: ComponentDef,
    /// Props owned by the parent, replaced wholesale on each render.
    pub props: PropMap,
    /// Stable identity hint for list reconciliation.
    pub key: Option<String>,
}

impl VComponent {
    /// Creates a component node.
    #[must_use]
    pub const fn new(def: ComponentDef, props: PropMap, key: Option<String>) -> Self {
        Self { def, props, key }
    }

    /// Identity rule for components: same definition and same key means
    /// the existing instance is reused in place.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        self.def == other.def && self.key == other.key
    }
}

/// A component definition: a name plus a factory for fresh component
/// objects. Definitions are compared by name and factory identity.
#[derive(Clone, Copy)]
pub struct ComponentDef {
    name: &'static str,
    create: fn() -> Box<dyn Component>,
}

impl ComponentDef {
    /// Creates a definition from a name and a factory function.
    #[must_use]
    pub const fn new(name: &'static str, create: fn() -> Box<dyn Component>) -> Self {
        Self { name, create }
    }

    /// The component's display name, used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Instantiates a fresh component object.
    #[must_use]
    pub fn instantiate(&self) -> Box<dyn Component> {
        (self.create)()
    }
}

impl fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentDef").field(&self.name).finish()
    }
}

impl PartialEq for ComponentDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::fn_addr_eq(self.create, other.create)
    }
}

impl Eq for ComponentDef {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Scope;
    use crate::error::RenderError;

    #[derive(Debug, Default)]
    struct Probe;

    impl Component for Probe {
        fn render(&self, _cx: &Scope) -> Result<VNode, RenderError> {
            Ok(VNode::text("probe"))
        }
    }

    fn probe() -> Box<dyn Component> {
        Box::new(Probe)
    }

    #[test]
    fn test_element_identity() {
        let mut a = VElement::new("div");
        let mut b = VElement::new("div");
        assert!(a.same_node(&b));

        b.tag = "span".into();
        assert!(!a.same_node(&b));

        b.tag = "div".into();
        a.key = Some("x".into());
        assert!(!a.same_node(&b));
        b.key = Some("x".into());
        assert!(a.same_node(&b));
    }

    #[test]
    fn test_component_identity() {
        let def = ComponentDef::new("Probe", probe);
        let a = VComponent::new(def, PropMap::new(), None);
        let b = VComponent::new(def, PropMap::new().with("x", 1), None);
        assert!(a.same_instance(&b));

        let keyed = VComponent::new(def, PropMap::new(), Some("k".into()));
        assert!(!a.same_instance(&keyed));
    }

    #[test]
    fn test_ref_slot_identity() {
        let named_a = RefSlot::Named("el".into());
        let named_b = RefSlot::Named("el".into());
        assert!(named_a.same_binding(&named_b));

        let cb = RefSlot::Callback(Rc::new(|_| Ok(())));
        assert!(!named_a.same_binding(&cb));
        assert!(cb.same_binding(&cb.clone()));
    }
}
