//! Component instance lifecycle and update batching.
//!
//! A [`Runtime`] owns the update queue for one document. Each mounted
//! component gets an [`Instance`]: the component object, its scope, and
//! the commit tree from its last successful render. `set_state` marks the
//! instance dirty and enqueues it; outside a batch the queue flushes
//! synchronously, inside one it flushes once at the end, so several state
//! writes coalesce into a single render pass per instance.
//!
//! Failures are contained per instance: a failed mount render commits an
//! empty placeholder, a failed re-render keeps the previous tree, and
//! hook errors are logged without touching siblings.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use inkui_core::component::{Component, Scope, UpdateScheduler};
use inkui_core::dom::{Document, Node};
use inkui_core::error::RenderError;
use inkui_core::value::PropMap;
use inkui_core::vnode::ComponentDef;

use crate::reconcile::{self, Commit, Ctx, TextCommit};

struct RuntimeInner {
    document: Document,
    queue: RefCell<VecDeque<Instance>>,
    batching: Cell<bool>,
    flushing: Cell<bool>,
}

/// The per-document scheduler and instance factory.
#[derive(Clone)]
pub(crate) struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(document: Document) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                document,
                queue: RefCell::new(VecDeque::new()),
                batching: Cell::new(false),
                flushing: Cell::new(false),
            }),
        }
    }

    pub fn document(&self) -> Document {
        self.inner.document.clone()
    }

    /// Mounts a nested component occurrence. A failed first render is
    /// contained: the instance commits an empty text placeholder and the
    /// parent's patch continues.
    pub fn mount_component(&self, def: ComponentDef, props: PropMap) -> Instance {
        match self.try_mount_component(def, props) {
            Ok(instance) => instance,
            Err((instance, err)) => {
                tracing::error!(
                    component = def.name(),
                    error = %err,
                    "mount render failed, committing empty placeholder"
                );
                instance.commit_placeholder();
                instance
            }
        }
    }

    /// Mounts a component and surfaces the first render's error instead
    /// of containing it. Used for application roots.
    pub fn try_mount_component(
        &self,
        def: ComponentDef,
        props: PropMap,
    ) -> Result<Instance, (Instance, RenderError)> {
        let instance = Instance::new(self.clone(), def, props);
        match instance.initial_render() {
            Ok(()) => Ok(instance),
            Err(err) => Err((instance, err)),
        }
    }

    /// Enqueues a dirty instance. Outside a batch or flush the queue
    /// drains immediately; otherwise the instance renders when the
    /// current batch ends.
    pub fn schedule(&self, instance: &Instance) {
        if instance.inner.destroyed.get() || instance.inner.dirty.replace(true) {
            return;
        }
        self.inner.queue.borrow_mut().push_back(instance.clone());
        if !self.inner.batching.get() && !self.inner.flushing.get() {
            self.flush();
        }
    }

    /// Runs `f` with update flushing deferred to the end, so every
    /// `set_state` inside coalesces per instance.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        if self.inner.batching.get() {
            return f();
        }
        self.inner.batching.set(true);
        let out = f();
        self.inner.batching.set(false);
        self.flush();
        out
    }

    fn flush(&self) {
        if self.inner.flushing.replace(true) {
            return;
        }
        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(instance) = next else { break };
            // Skip superseded requests: a synchronous props update may
            // already have rendered this instance.
            if instance.inner.destroyed.get() || !instance.inner.dirty.replace(false) {
                continue;
            }
            instance.rerender();
        }
        self.inner.flushing.set(false);
    }
}

struct InstanceScheduler {
    runtime: Weak<RuntimeInner>,
    instance: Weak<InstanceInner>,
}

impl UpdateScheduler for InstanceScheduler {
    fn schedule_update(&self) {
        if let (Some(runtime), Some(inner)) = (self.runtime.upgrade(), self.instance.upgrade()) {
            Runtime { inner: runtime }.schedule(&Instance { inner });
        }
    }
}

struct InstanceInner {
    def: ComponentDef,
    component: Box<dyn Component>,
    scope: Scope,
    runtime: Runtime,
    commit: RefCell<Option<Commit>>,
    dirty: Cell<bool>,
    destroyed: Cell<bool>,
}

/// One mounted component: component object, scope and committed tree.
#[derive(Clone)]
pub(crate) struct Instance {
    inner: Rc<InstanceInner>,
}

impl Instance {
    fn new(runtime: Runtime, def: ComponentDef, props: PropMap) -> Self {
        let component = def.instantiate();
        let scope = Scope::new(def.name(), props, runtime.document());
        // Seeding state before the scheduler is attached cannot trigger
        // a render.
        scope.set_state(component.initial_state(&scope.props()));
        let instance = Self {
            inner: Rc::new(InstanceInner {
                def,
                component,
                scope,
                runtime,
                commit: RefCell::new(None),
                dirty: Cell::new(false),
                destroyed: Cell::new(false),
            }),
        };
        let scheduler = Rc::new(InstanceScheduler {
            runtime: Rc::downgrade(&instance.inner.runtime.inner),
            instance: Rc::downgrade(&instance.inner),
        });
        instance.inner.scope.attach_scheduler(scheduler);
        instance
    }

    /// The DOM node currently at this instance's root.
    ///
    /// # Panics
    ///
    /// Panics on an instance without a committed tree; mounting always
    /// commits one before the instance is visible to the reconciler.
    pub fn root_dom(&self) -> Node {
        self.inner
            .commit
            .borrow()
            .as_ref()
            .map(Commit::dom)
            .expect("mounted instance has a committed tree")
    }

    fn initial_render(&self) -> Result<(), RenderError> {
        let vnode = self.inner.component.render(&self.inner.scope)?;
        let ctx = Ctx {
            owner: &self.inner.scope,
            runtime: &self.inner.runtime,
        };
        let commit = reconcile::create(&ctx, &vnode);
        *self.inner.commit.borrow_mut() = Some(commit);
        Ok(())
    }

    fn commit_placeholder(&self) {
        let dom = self.inner.runtime.document().create_text("");
        *self.inner.commit.borrow_mut() = Some(Commit::Text(TextCommit {
            text: String::new(),
            dom,
        }));
    }

    /// Appends this instance and every nested one to `out`, children
    /// first, for bottom-up mounted hooks.
    pub fn collect_mounts_into(&self, out: &mut Vec<Instance>) {
        if let Some(commit) = self.inner.commit.borrow().as_ref() {
            reconcile::collect_mounts(commit, out);
        }
        out.push(self.clone());
    }

    /// Runs the mounted hook once the DOM is attached. Errors are logged
    /// and contained to this instance.
    pub fn fire_mounted(&self) {
        if self.inner.destroyed.get() {
            return;
        }
        if let Err(err) = self.inner.component.mounted(&self.inner.scope) {
            tracing::error!(
                component = self.inner.def.name(),
                error = %err,
                "mounted hook failed"
            );
        }
    }

    fn fire_updated(&self, prev_props: &PropMap) {
        if self.inner.destroyed.get() {
            return;
        }
        if let Err(err) = self.inner.component.updated(&self.inner.scope, prev_props) {
            tracing::error!(
                component = self.inner.def.name(),
                error = %err,
                "updated hook failed"
            );
        }
    }

    /// Re-renders with the current props and state. A failed render keeps
    /// the previously committed tree on screen.
    pub fn rerender(&self) {
        if self.inner.destroyed.get() {
            return;
        }
        // State-driven re-render: the previous commit used these props.
        let prev_props = self.inner.scope.props();
        self.render_and_apply(&prev_props);
    }

    /// Replaces the props wholesale and re-renders synchronously within
    /// the parent's patch. Supersedes any queued state update.
    pub fn update_props(&self, props: PropMap) {
        if self.inner.destroyed.get() {
            return;
        }
        // Equal props with no pending state change: the committed tree is
        // already current.
        if !self.inner.dirty.get() && self.inner.scope.props() == props {
            return;
        }
        let prev_props = self.inner.scope.props();
        self.inner.scope.replace_props(props);
        self.inner.dirty.set(false);
        self.render_and_apply(&prev_props);
    }

    fn render_and_apply(&self, prev_props: &PropMap) {
        match self.inner.component.render(&self.inner.scope) {
            Ok(vnode) => self.apply(&vnode, prev_props),
            Err(err) => {
                tracing::error!(
                    component = self.inner.def.name(),
                    error = %err,
                    "render failed, keeping previous tree"
                );
            }
        }
    }

    fn apply(&self, vnode: &inkui_core::VNode, prev_props: &PropMap) {
        let old = self
            .inner
            .commit
            .borrow_mut()
            .take()
            .expect("mounted instance has a committed tree");
        let ctx = Ctx {
            owner: &self.inner.scope,
            runtime: &self.inner.runtime,
        };
        let mut mounts = Vec::new();
        let next = if old.matches(vnode) {
            reconcile::patch(&ctx, old, vnode)
        } else {
            // Root identity changed: replace in place, keeping position.
            let dom = old.dom();
            let parent = dom.parent();
            let anchor = dom.next_sibling();
            reconcile::teardown(&self.inner.scope, old, true);
            let commit = reconcile::create(&ctx, vnode);
            if let Some(parent) = &parent {
                parent.insert_before(&commit.dom(), anchor.as_ref());
            }
            reconcile::collect_mounts(&commit, &mut mounts);
            commit
        };
        *self.inner.commit.borrow_mut() = Some(next);
        for instance in mounts {
            instance.fire_mounted();
        }
        self.fire_updated(prev_props);
    }

    /// Destroys the instance: destroy hook, scope teardown, then subtree
    /// teardown. Only the outermost destroyed instance detaches its DOM.
    pub fn destroy(&self, remove_dom: bool) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        if let Err(err) = self.inner.component.before_destroy(&self.inner.scope) {
            tracing::error!(
                component = self.inner.def.name(),
                error = %err,
                "before_destroy hook failed"
            );
        }
        self.inner.scope.mark_destroyed();
        if let Some(commit) = self.inner.commit.borrow_mut().take() {
            reconcile::teardown(&self.inner.scope, commit, remove_dom);
        }
    }
}
