//! The retained in-memory DOM the reconciler mutates.
//!
//! The host owns a [`Document`]; the framework creates, moves and removes
//! [`Node`] handles underneath it. Nodes carry attributes, inline style,
//! event listeners, children and host-supplied layout metrics
//! (`offset_*`). A document can additionally record a [`Mutation`] log so
//! tests can observe exactly which parts of the tree were touched by a
//! patch.
//!
//! Document-level listeners (global mousedown/keydown handlers used by
//! popup-like widgets) are capability handles: [`Document::add_listener`]
//! returns a [`ListenerGuard`] whose drop removes the listener, so a
//! component scope can guarantee release on destroy.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::value::{EventHandler, Value};

/// One recorded DOM mutation, used by tests to assert patch minimality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// A node was attached (or moved) under a parent.
    Insert {
        /// Tag of the inserted node, or `#text` for text nodes.
        node: String,
    },
    /// A node was detached from its parent.
    Remove {
        /// Tag of the removed node, or `#text` for text nodes.
        node: String,
    },
    /// An attribute was written.
    SetAttribute {
        /// Tag of the mutated element.
        node: String,
        /// Attribute name.
        name: String,
        /// New attribute value.
        value: String,
    },
    /// An attribute was removed.
    RemoveAttribute {
        /// Tag of the mutated element.
        node: String,
        /// Attribute name.
        name: String,
    },
    /// An inline style property was written.
    SetStyle {
        /// Tag of the mutated element.
        node: String,
        /// Style property name.
        name: String,
        /// New property value.
        value: String,
    },
    /// An inline style property was removed.
    RemoveStyle {
        /// Tag of the mutated element.
        node: String,
        /// Style property name.
        name: String,
    },
    /// A text node's content was replaced.
    SetText {
        /// The new content.
        text: String,
    },
    /// An event listener was attached or replaced.
    AttachListener {
        /// Event name.
        kind: String,
    },
    /// An event listener was detached.
    DetachListener {
        /// Event name.
        kind: String,
    },
}

/// An event dispatched to a node or to the document.
#[derive(Clone, Debug, Default)]
pub struct Event {
    kind: String,
    target: Option<Node>,
    key: Option<String>,
    data: Value,
}

impl Event {
    /// Creates an event of the given kind (`click`, `keydown`, ...).
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            target: None,
            key: None,
            data: Value::Null,
        }
    }

    /// Sets the event target.
    #[must_use]
    pub fn with_target(mut self, target: Node) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the pressed key (for keyboard events).
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches an arbitrary payload.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = data.into();
        self
    }

    /// The event kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The node the event was dispatched at, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&Node> {
        self.target.as_ref()
    }

    /// The pressed key, for keyboard events.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The event payload.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }
}

#[derive(Default)]
struct Offsets {
    left: Cell<i64>,
    top: Cell<i64>,
    width: Cell<i64>,
    height: Cell<i64>,
}

enum NodeKind {
    Element {
        tag: String,
        attrs: RefCell<Vec<(String, String)>>,
        style: RefCell<Vec<(String, String)>>,
        listeners: RefCell<Vec<(String, EventHandler)>>,
        children: RefCell<Vec<Node>>,
        offsets: Offsets,
    },
    Text {
        content: RefCell<String>,
    },
}

struct NodeInner {
    document: Weak<DocumentInner>,
    parent: RefCell<Weak<NodeInner>>,
    kind: NodeKind,
}

/// A handle to one node of the retained DOM tree.
///
/// Handles are cheap to clone and compare by node identity via
/// [`Node::ptr_eq`].
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            NodeKind::Element { tag, .. } => write!(f, "Node(<{tag}>)"),
            NodeKind::Text { content } => write!(f, "Node({:?})", content.borrow()),
        }
    }
}

impl Node {
    /// Returns `true` when both handles refer to the same node.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// The owning document, if it is still alive.
    #[must_use]
    pub fn document(&self) -> Option<Document> {
        self.inner.document.upgrade().map(|inner| Document { inner })
    }

    /// The element's tag name, or `None` for text nodes.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match &self.inner.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text { .. } => None,
        }
    }

    /// Returns `true` for text nodes.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.inner.kind, NodeKind::Text { .. })
    }

    fn describe(&self) -> String {
        self.tag().map_or_else(|| "#text".to_owned(), str::to_owned)
    }

    fn record(&self, mutation: Mutation) {
        if let Some(doc) = self.inner.document.upgrade() {
            doc.record(mutation);
        }
    }

    /// The text content of a text node.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match &self.inner.kind {
            NodeKind::Text { content } => Some(content.borrow().clone()),
            NodeKind::Element { .. } => None,
        }
    }

    /// Replaces the content of a text node. No-op on elements.
    pub fn set_text(&self, text: impl Into<String>) {
        if let NodeKind::Text { content } = &self.inner.kind {
            let text = text.into();
            *content.borrow_mut() = text.clone();
            self.record(Mutation::SetText { text });
        }
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.inner.kind {
            NodeKind::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
            NodeKind::Text { .. } => None,
        }
    }

    /// Writes an attribute, preserving its position if it exists.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        if let NodeKind::Element { attrs, .. } = &self.inner.kind {
            let name = name.into();
            let value = value.into();
            let mut attrs = attrs.borrow_mut();
            if let Some(entry) = attrs.iter_mut().find(|(k, _)| *k == name) {
                entry.1 = value.clone();
            } else {
                attrs.push((name.clone(), value.clone()));
            }
            drop(attrs);
            self.record(Mutation::SetAttribute {
                node: self.describe(),
                name,
                value,
            });
        }
    }

    /// Removes an attribute if present.
    pub fn remove_attribute(&self, name: &str) {
        if let NodeKind::Element { attrs, .. } = &self.inner.kind {
            let mut attrs = attrs.borrow_mut();
            let before = attrs.len();
            attrs.retain(|(k, _)| k != name);
            let removed = attrs.len() != before;
            drop(attrs);
            if removed {
                self.record(Mutation::RemoveAttribute {
                    node: self.describe(),
                    name: name.to_owned(),
                });
            }
        }
    }

    /// Returns the value of an inline style property.
    #[must_use]
    pub fn style(&self, name: &str) -> Option<String> {
        match &self.inner.kind {
            NodeKind::Element { style, .. } => style
                .borrow()
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
            NodeKind::Text { .. } => None,
        }
    }

    /// Writes an inline style property.
    pub fn set_style(&self, name: impl Into<String>, value: impl Into<String>) {
        if let NodeKind::Element { style, .. } = &self.inner.kind {
            let name = name.into();
            let value = value.into();
            let mut style = style.borrow_mut();
            if let Some(entry) = style.iter_mut().find(|(k, _)| *k == name) {
                entry.1 = value.clone();
            } else {
                style.push((name.clone(), value.clone()));
            }
            drop(style);
            self.record(Mutation::SetStyle {
                node: self.describe(),
                name,
                value,
            });
        }
    }

    /// Removes an inline style property if present.
    pub fn remove_style(&self, name: &str) {
        if let NodeKind::Element { style, .. } = &self.inner.kind {
            let mut style = style.borrow_mut();
            let before = style.len();
            style.retain(|(k, _)| k != name);
            let removed = style.len() != before;
            drop(style);
            if removed {
                self.record(Mutation::RemoveStyle {
                    node: self.describe(),
                    name: name.to_owned(),
                });
            }
        }
    }

    /// Attaches (or replaces) the listener for an event kind.
    pub fn set_listener(&self, kind: impl Into<String>, handler: EventHandler) {
        if let NodeKind::Element { listeners, .. } = &self.inner.kind {
            let kind = kind.into();
            let mut listeners = listeners.borrow_mut();
            if let Some(entry) = listeners.iter_mut().find(|(k, _)| *k == kind) {
                entry.1 = handler;
            } else {
                listeners.push((kind.clone(), handler));
            }
            drop(listeners);
            self.record(Mutation::AttachListener { kind });
        }
    }

    /// Detaches the listener for an event kind, if any.
    pub fn remove_listener(&self, kind: &str) {
        if let NodeKind::Element { listeners, .. } = &self.inner.kind {
            let mut listeners = listeners.borrow_mut();
            let before = listeners.len();
            listeners.retain(|(k, _)| k != kind);
            let removed = listeners.len() != before;
            drop(listeners);
            if removed {
                self.record(Mutation::DetachListener {
                    kind: kind.to_owned(),
                });
            }
        }
    }

    /// Returns `true` when a listener is attached for the event kind.
    #[must_use]
    pub fn has_listener(&self, kind: &str) -> bool {
        match &self.inner.kind {
            NodeKind::Element { listeners, .. } => {
                listeners.borrow().iter().any(|(k, _)| k == kind)
            }
            NodeKind::Text { .. } => false,
        }
    }

    /// Invokes the node's listener for the event's kind, filling in the
    /// target if the caller did not set one.
    pub fn dispatch(&self, event: &Event) {
        let handler = match &self.inner.kind {
            NodeKind::Element { listeners, .. } => listeners
                .borrow()
                .iter()
                .find(|(k, _)| k == event.kind())
                .map(|(_, h)| h.clone()),
            NodeKind::Text { .. } => None,
        };
        if let Some(handler) = handler {
            if event.target().is_none() {
                let event = event.clone().with_target(self.clone());
                handler(&event);
            } else {
                handler(event);
            }
        }
    }

    /// The parent node, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<Node> {
        self.inner
            .parent
            .borrow()
            .upgrade()
            .map(|inner| Node { inner })
    }

    /// A snapshot of the child list.
    #[must_use]
    pub fn children(&self) -> Vec<Node> {
        match &self.inner.kind {
            NodeKind::Element { children, .. } => children.borrow().clone(),
            NodeKind::Text { .. } => Vec::new(),
        }
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        match &self.inner.kind {
            NodeKind::Element { children, .. } => children.borrow().len(),
            NodeKind::Text { .. } => 0,
        }
    }

    /// The child at `index`, if in bounds.
    #[must_use]
    pub fn child_at(&self, index: usize) -> Option<Node> {
        match &self.inner.kind {
            NodeKind::Element { children, .. } => children.borrow().get(index).cloned(),
            NodeKind::Text { .. } => None,
        }
    }

    /// The first child, if any.
    #[must_use]
    pub fn first_child(&self) -> Option<Node> {
        self.child_at(0)
    }

    /// The next sibling of this node, if any.
    #[must_use]
    pub fn next_sibling(&self) -> Option<Node> {
        let parent = self.parent()?;
        let siblings = parent.children();
        let index = siblings.iter().position(|n| Self::ptr_eq(n, self))?;
        siblings.get(index + 1).cloned()
    }

    /// Returns `true` when `other` is this node or a descendant of it.
    #[must_use]
    pub fn contains(&self, other: &Node) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if Self::ptr_eq(&node, self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn detach(&self) {
        if let Some(parent) = self.parent() {
            if let NodeKind::Element { children, .. } = &parent.inner.kind {
                children.borrow_mut().retain(|n| !Self::ptr_eq(n, self));
            }
            *self.inner.parent.borrow_mut() = Weak::new();
        }
    }

    /// Appends `child` as the last child, detaching it from any previous
    /// parent first.
    ///
    /// # Panics
    ///
    /// Panics when called on a text node; that is a programmer error.
    pub fn append_child(&self, child: &Node) {
        self.insert_before(child, None);
    }

    /// Inserts `child` before `before` (or appends when `before` is
    /// `None`), detaching it from any previous parent first. Moving an
    /// already-attached node preserves its identity.
    ///
    /// # Panics
    ///
    /// Panics when called on a text node or when `before` is not a child
    /// of this node; both are programmer errors in the reconciler, not
    /// recoverable conditions.
    pub fn insert_before(&self, child: &Node, before: Option<&Node>) {
        if let Some(before) = before {
            if Self::ptr_eq(child, before) {
                return;
            }
        }
        let NodeKind::Element { children, .. } = &self.inner.kind else {
            panic!("cannot insert children into a text node");
        };
        child.detach();
        let mut list = children.borrow_mut();
        let index = match before {
            Some(anchor) => list
                .iter()
                .position(|n| Self::ptr_eq(n, anchor))
                .expect("insert_before anchor is not a child of this node"),
            None => list.len(),
        };
        list.insert(index, child.clone());
        drop(list);
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        self.record(Mutation::Insert {
            node: child.describe(),
        });
    }

    /// Removes `child` from this node.
    ///
    /// # Panics
    ///
    /// Panics when `child` is not a child of this node; a commit tree that
    /// disagrees with the DOM is a programmer error.
    pub fn remove_child(&self, child: &Node) {
        let NodeKind::Element { children, .. } = &self.inner.kind else {
            panic!("cannot remove children from a text node");
        };
        let mut list = children.borrow_mut();
        let index = list
            .iter()
            .position(|n| Self::ptr_eq(n, child))
            .expect("remove_child target is not a child of this node");
        list.remove(index);
        drop(list);
        *child.inner.parent.borrow_mut() = Weak::new();
        self.record(Mutation::Remove {
            node: child.describe(),
        });
    }

    /// Host-supplied layout metric: distance from the left edge.
    #[must_use]
    pub fn offset_left(&self) -> i64 {
        self.offsets().map_or(0, |o| o.left.get())
    }

    /// Host-supplied layout metric: distance from the top edge.
    #[must_use]
    pub fn offset_top(&self) -> i64 {
        self.offsets().map_or(0, |o| o.top.get())
    }

    /// Host-supplied layout metric: rendered width.
    #[must_use]
    pub fn offset_width(&self) -> i64 {
        self.offsets().map_or(0, |o| o.width.get())
    }

    /// Host-supplied layout metric: rendered height.
    #[must_use]
    pub fn offset_height(&self) -> i64 {
        self.offsets().map_or(0, |o| o.height.get())
    }

    /// Sets the host-supplied layout metrics in one call.
    pub fn set_offsets(&self, left: i64, top: i64, width: i64, height: i64) {
        if let Some(offsets) = self.offsets() {
            offsets.left.set(left);
            offsets.top.set(top);
            offsets.width.set(width);
            offsets.height.set(height);
        }
    }

    /// Sets the host-supplied rendered width.
    pub fn set_offset_width(&self, width: i64) {
        if let Some(offsets) = self.offsets() {
            offsets.width.set(width);
        }
    }

    fn offsets(&self) -> Option<&Offsets> {
        match &self.inner.kind {
            NodeKind::Element { offsets, .. } => Some(offsets),
            NodeKind::Text { .. } => None,
        }
    }

    /// Marks this node as the document's active element.
    pub fn focus(&self) {
        if let Some(doc) = self.inner.document.upgrade() {
            *doc.active_element.borrow_mut() = Some(self.clone());
        }
    }
}

struct DocListener {
    id: u64,
    kind: String,
    handler: EventHandler,
}

struct DocumentInner {
    listeners: RefCell<Vec<DocListener>>,
    next_listener_id: Cell<u64>,
    log: RefCell<Option<Vec<Mutation>>>,
    active_element: RefCell<Option<Node>>,
}

impl DocumentInner {
    fn record(&self, mutation: Mutation) {
        if let Some(log) = self.log.borrow_mut().as_mut() {
            log.push(mutation);
        }
    }
}

/// The host-owned document: node factory, document-level listener
/// registry and optional mutation log.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
                log: RefCell::new(None),
                active_element: RefCell::new(None),
            }),
        }
    }

    /// Creates a detached element node.
    #[must_use]
    pub fn create_element(&self, tag: impl Into<String>) -> Node {
        Node {
            inner: Rc::new(NodeInner {
                document: Rc::downgrade(&self.inner),
                parent: RefCell::new(Weak::new()),
                kind: NodeKind::Element {
                    tag: tag.into(),
                    attrs: RefCell::new(Vec::new()),
                    style: RefCell::new(Vec::new()),
                    listeners: RefCell::new(Vec::new()),
                    children: RefCell::new(Vec::new()),
                    offsets: Offsets::default(),
                },
            }),
        }
    }

    /// Creates a detached text node.
    #[must_use]
    pub fn create_text(&self, content: impl Into<String>) -> Node {
        Node {
            inner: Rc::new(NodeInner {
                document: Rc::downgrade(&self.inner),
                parent: RefCell::new(Weak::new()),
                kind: NodeKind::Text {
                    content: RefCell::new(content.into()),
                },
            }),
        }
    }

    /// Registers a document-level listener and returns the guard that
    /// removes it when dropped.
    #[must_use]
    pub fn add_listener(&self, kind: impl Into<String>, handler: EventHandler) -> ListenerGuard {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        let kind = kind.into();
        self.inner.listeners.borrow_mut().push(DocListener {
            id,
            kind: kind.clone(),
            handler,
        });
        ListenerGuard {
            document: Rc::downgrade(&self.inner),
            id,
            kind,
        }
    }

    /// Number of live document-level listeners for an event kind.
    #[must_use]
    pub fn listener_count(&self, kind: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }

    /// Invokes every document-level listener registered for the event's
    /// kind, in registration order. One listener's work never prevents
    /// the others from running.
    pub fn dispatch(&self, event: &Event) {
        let handlers: Vec<EventHandler> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.kind == event.kind())
            .map(|l| l.handler.clone())
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    /// The node that last received focus, if any.
    #[must_use]
    pub fn active_element(&self) -> Option<Node> {
        self.inner.active_element.borrow().clone()
    }

    /// Starts recording mutations; any previously recorded log is cleared.
    pub fn enable_mutation_log(&self) {
        *self.inner.log.borrow_mut() = Some(Vec::new());
    }

    /// Returns the recorded mutations and resets the log.
    #[must_use]
    pub fn take_mutations(&self) -> Vec<Mutation> {
        match self.inner.log.borrow_mut().as_mut() {
            Some(log) => std::mem::take(log),
            None => Vec::new(),
        }
    }

    /// Returns `true` when both handles refer to the same document.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    fn record(&self, mutation: Mutation) {
        self.inner.record(mutation);
    }

    /// Walks the subtree under `root` breadth-first, yielding every node.
    /// Convenience for hosts and tests.
    #[must_use]
    pub fn walk(root: &Node) -> Vec<Node> {
        let mut out = Vec::new();
        let mut queue: VecDeque<Node> = VecDeque::new();
        queue.push_back(root.clone());
        while let Some(node) = queue.pop_front() {
            for child in node.children() {
                queue.push_back(child);
            }
            out.push(node);
        }
        out
    }
}

/// Capability handle for one document-level listener. Dropping the guard
/// removes the listener; leaking one past destroy is a correctness defect
/// the scope prevents by owning its guards.
pub struct ListenerGuard {
    document: Weak<DocumentInner>,
    id: u64,
    kind: String,
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(doc) = self.document.upgrade() {
            doc.listeners.borrow_mut().retain(|l| l.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_tree_edits() {
        let doc = Document::new();
        let parent = doc.create_element("div");
        let a = doc.create_element("span");
        let b = doc.create_text("hello");
        parent.append_child(&a);
        parent.insert_before(&b, Some(&a));
        assert_eq!(parent.child_count(), 2);
        assert!(Node::ptr_eq(&parent.first_child().unwrap(), &b));
        assert!(Node::ptr_eq(&a.parent().unwrap(), &parent));

        parent.remove_child(&b);
        assert_eq!(parent.child_count(), 1);
        assert!(b.parent().is_none());
    }

    #[test]
    fn test_move_preserves_identity() {
        let doc = Document::new();
        let parent = doc.create_element("ul");
        let a = doc.create_element("li");
        let b = doc.create_element("li");
        parent.append_child(&a);
        parent.append_child(&b);

        parent.insert_before(&b, Some(&a));
        let children = parent.children();
        assert!(Node::ptr_eq(&children[0], &b));
        assert!(Node::ptr_eq(&children[1], &a));
    }

    #[test]
    fn test_mutation_log_records_attribute_writes() {
        let doc = Document::new();
        let el = doc.create_element("div");
        doc.enable_mutation_log();
        el.set_attribute("class", "popup");
        el.remove_attribute("class");
        assert_eq!(
            doc.take_mutations(),
            vec![
                Mutation::SetAttribute {
                    node: "div".into(),
                    name: "class".into(),
                    value: "popup".into(),
                },
                Mutation::RemoveAttribute {
                    node: "div".into(),
                    name: "class".into(),
                },
            ]
        );
    }

    #[test]
    fn test_listener_guard_removes_on_drop() {
        let doc = Document::new();
        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        let guard = doc.add_listener("mousedown", Rc::new(move |_| seen.set(seen.get() + 1)));
        doc.dispatch(&Event::new("mousedown"));
        assert_eq!(hits.get(), 1);

        drop(guard);
        doc.dispatch(&Event::new("mousedown"));
        assert_eq!(hits.get(), 1);
        assert_eq!(doc.listener_count("mousedown"), 0);
    }

    #[test]
    fn test_dispatch_fills_target() {
        let doc = Document::new();
        let el = doc.create_element("button");
        let clicked = Rc::new(Cell::new(false));
        let seen = clicked.clone();
        let target_probe = el.clone();
        el.set_listener(
            "click",
            Rc::new(move |ev| {
                assert!(Node::ptr_eq(ev.target().unwrap(), &target_probe));
                seen.set(true);
            }),
        );
        el.dispatch(&Event::new("click"));
        assert!(clicked.get());
    }

    #[test]
    fn test_contains() {
        let doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        let stranger = doc.create_element("p");
        outer.append_child(&inner);
        assert!(outer.contains(&inner));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&stranger));
    }
}
