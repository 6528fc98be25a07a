//! Component contract and per-instance scope.
//!
//! A [`Component`] is the user-authored behavior: a pure `render` plus
//! optional lifecycle hooks. The runtime owns one [`Scope`] per mounted
//! instance; the scope carries props, state, named refs and the handle
//! through which `set_state` requests a re-render. Scopes are cheap to
//! clone into event handler closures.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::dom::{Document, Event, ListenerGuard, Node};
use crate::error::{HookError, RenderError};
use crate::value::{PropMap, Value};
use crate::vnode::VNode;

/// A user-authored component.
///
/// `render` must be pure: same props and state produce the same tree, and
/// no DOM access happens inside it. The lifecycle hooks run after the
/// corresponding commit; a hook failure is logged and contained to this
/// instance, never aborting siblings.
pub trait Component {
    /// Seeds the instance's state before the first render.
    fn initial_state(&self, props: &PropMap) -> PropMap {
        let _ = props;
        PropMap::new()
    }

    /// Produces the virtual tree for the current props and state.
    ///
    /// # Errors
    ///
    /// Returns an error when the template is malformed or the component
    /// cannot render; the previously committed tree stays in place.
    fn render(&self, cx: &Scope) -> Result<VNode, RenderError>;

    /// Runs once after the instance's DOM is first attached.
    ///
    /// # Errors
    ///
    /// Hook errors are logged and contained to this instance.
    fn mounted(&self, cx: &Scope) -> Result<(), HookError> {
        let _ = cx;
        Ok(())
    }

    /// Runs after every committed re-render of a mounted instance.
    /// `prev_props` holds the props the previous commit rendered with;
    /// for state-driven re-renders they equal the current props.
    ///
    /// # Errors
    ///
    /// Hook errors are logged and contained to this instance.
    fn updated(&self, cx: &Scope, prev_props: &PropMap) -> Result<(), HookError> {
        let _ = (cx, prev_props);
        Ok(())
    }

    /// Runs right before the instance's DOM is detached.
    ///
    /// # Errors
    ///
    /// Hook errors are logged and never prevent the teardown itself.
    fn before_destroy(&self, cx: &Scope) -> Result<(), HookError> {
        let _ = cx;
        Ok(())
    }
}

/// Receives re-render requests from [`Scope::set_state`].
///
/// The runtime installs one scheduler per instance; a scope without a
/// scheduler (not yet mounted, or already destroyed) drops the request.
pub trait UpdateScheduler {
    /// Requests a re-render of the owning instance.
    fn schedule_update(&self);
}

struct ScopeInner {
    name: &'static str,
    props: RefCell<PropMap>,
    state: RefCell<PropMap>,
    refs: RefCell<Vec<(String, Node)>>,
    document: Document,
    scheduler: RefCell<Option<Rc<dyn UpdateScheduler>>>,
    guards: RefCell<Vec<ListenerGuard>>,
    destroyed: Cell<bool>,
}

/// The per-instance scope handed to every [`Component`] call.
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("component", &self.inner.name)
            .field("destroyed", &self.inner.destroyed.get())
            .finish_non_exhaustive()
    }
}

impl Scope {
    /// Creates a scope for one instance of the named component.
    #[must_use]
    pub fn new(name: &'static str, props: PropMap, document: Document) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                name,
                props: RefCell::new(props),
                state: RefCell::new(PropMap::new()),
                refs: RefCell::new(Vec::new()),
                document,
                scheduler: RefCell::new(None),
                guards: RefCell::new(Vec::new()),
                destroyed: Cell::new(false),
            }),
        }
    }

    /// The owning component's display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// The document this instance renders into.
    #[must_use]
    pub fn document(&self) -> Document {
        self.inner.document.clone()
    }

    /// Returns one prop by key, or [`Value::Null`].
    #[must_use]
    pub fn prop(&self, key: &str) -> Value {
        self.inner.props.borrow().get_or_null(key)
    }

    /// A snapshot of all current props.
    #[must_use]
    pub fn props(&self) -> PropMap {
        self.inner.props.borrow().clone()
    }

    /// Replaces the props wholesale. Called by the runtime when the
    /// parent re-renders; components never call this.
    pub fn replace_props(&self, props: PropMap) {
        *self.inner.props.borrow_mut() = props;
    }

    /// Returns one state entry by key, or [`Value::Null`].
    #[must_use]
    pub fn state(&self, key: &str) -> Value {
        self.inner.state.borrow().get_or_null(key)
    }

    /// A snapshot of the current state.
    #[must_use]
    pub fn state_snapshot(&self) -> PropMap {
        self.inner.state.borrow().clone()
    }

    /// Merges `patch` into the state and requests a re-render.
    ///
    /// The merge is visible immediately to subsequent reads; the render
    /// itself is scheduled through the runtime, which coalesces several
    /// calls within one batch into a single render pass. Calls on a
    /// destroyed scope are ignored.
    pub fn set_state(&self, patch: PropMap) {
        if self.inner.destroyed.get() {
            tracing::debug!(component = self.inner.name, "set_state on destroyed scope ignored");
            return;
        }
        self.inner.state.borrow_mut().merge(&patch);
        // Borrow released before scheduling: the scheduler may flush
        // synchronously and re-enter render, which reads the state.
        let scheduler = self.inner.scheduler.borrow().clone();
        if let Some(scheduler) = scheduler {
            scheduler.schedule_update();
        }
    }

    /// Replaces the state wholesale and requests a re-render. Calls on a
    /// destroyed scope are ignored.
    pub fn replace_state(&self, state: PropMap) {
        if self.inner.destroyed.get() {
            return;
        }
        *self.inner.state.borrow_mut() = state;
        let scheduler = self.inner.scheduler.borrow().clone();
        if let Some(scheduler) = scheduler {
            scheduler.schedule_update();
        }
    }

    /// Installs the runtime's scheduler for this instance.
    pub fn attach_scheduler(&self, scheduler: Rc<dyn UpdateScheduler>) {
        *self.inner.scheduler.borrow_mut() = Some(scheduler);
    }

    /// The DOM node bound under a named ref, if currently attached.
    #[must_use]
    pub fn ref_node(&self, name: &str) -> Option<Node> {
        self.inner
            .refs
            .borrow()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, n)| n.clone())
    }

    /// Binds or releases a named ref. Called by the binder during
    /// commit; components only read refs.
    pub fn bind_ref(&self, name: &str, node: Option<Node>) {
        let mut refs = self.inner.refs.borrow_mut();
        match node {
            Some(node) => {
                if let Some(entry) = refs.iter_mut().find(|(k, _)| k == name) {
                    entry.1 = node;
                } else {
                    refs.push((name.to_owned(), node));
                }
            }
            None => refs.retain(|(k, _)| k != name),
        }
    }

    /// Registers a document-level listener owned by this instance. The
    /// listener is removed automatically when the instance is destroyed.
    pub fn listen_document(&self, kind: impl Into<String>, handler: impl Fn(&Event) + 'static) {
        if self.inner.destroyed.get() {
            return;
        }
        let guard = self.inner.document.add_listener(kind, Rc::new(handler));
        self.inner.guards.borrow_mut().push(guard);
    }

    /// Returns `true` once the instance has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Marks the scope destroyed: drops its document listeners, detaches
    /// the scheduler and silences further `set_state` calls.
    pub fn mark_destroyed(&self) {
        self.inner.destroyed.set(true);
        self.inner.guards.borrow_mut().clear();
        *self.inner.scheduler.borrow_mut() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingScheduler {
        calls: Cell<usize>,
    }

    impl UpdateScheduler for CountingScheduler {
        fn schedule_update(&self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    #[test]
    fn test_set_state_merges_and_schedules() {
        let cx = Scope::new("Probe", PropMap::new(), Document::new());
        let scheduler = Rc::new(CountingScheduler {
            calls: Cell::new(0),
        });
        cx.attach_scheduler(scheduler.clone());

        cx.set_state(PropMap::new().with("count", 1));
        cx.set_state(PropMap::new().with("label", "x"));
        assert_eq!(cx.state("count"), Value::Int(1));
        assert_eq!(cx.state("label"), Value::Str("x".into()));
        assert_eq!(scheduler.calls.get(), 2);
    }

    #[test]
    fn test_set_state_ignored_after_destroy() {
        let cx = Scope::new("Probe", PropMap::new(), Document::new());
        let scheduler = Rc::new(CountingScheduler {
            calls: Cell::new(0),
        });
        cx.attach_scheduler(scheduler.clone());
        cx.mark_destroyed();

        cx.set_state(PropMap::new().with("count", 1));
        assert!(cx.state("count").is_null());
        assert_eq!(scheduler.calls.get(), 0);
    }

    #[test]
    fn test_destroy_drops_document_listeners() {
        let doc = Document::new();
        let cx = Scope::new("Probe", PropMap::new(), doc.clone());
        cx.listen_document("mousedown", |_| {});
        assert_eq!(doc.listener_count("mousedown"), 1);

        cx.mark_destroyed();
        assert_eq!(doc.listener_count("mousedown"), 0);
    }

    #[test]
    fn test_named_refs_bind_and_release() {
        let doc = Document::new();
        let cx = Scope::new("Probe", PropMap::new(), doc.clone());
        let el = doc.create_element("div");
        cx.bind_ref("el", Some(el.clone()));
        assert!(Node::ptr_eq(&cx.ref_node("el").unwrap(), &el));

        cx.bind_ref("el", None);
        assert!(cx.ref_node("el").is_none());
    }
}
