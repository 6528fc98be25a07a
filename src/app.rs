//! Application roots.
//!
//! [`App::mount`] attaches a root component under a host node and returns
//! the handle the embedding host drives: prop updates, event dispatch and
//! unmounting. Every entry point wraps the work in a batch, so all state
//! writes triggered by one host event collapse into a single render pass
//! per instance.

use inkui_core::dom::{Document, Event, Node};
use inkui_core::error::RenderError;
use inkui_core::value::PropMap;
use inkui_core::vnode::ComponentDef;

use crate::runtime::{Instance, Runtime};

/// A mounted root component and its runtime.
#[derive(Clone)]
pub struct App {
    runtime: Runtime,
    root: Instance,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").finish_non_exhaustive()
    }
}

impl App {
    /// Mounts `def` with `props` as the last child of `host`.
    ///
    /// This is the one place a render error propagates: nested component
    /// failures are contained per instance, but a root that cannot render
    /// at all has nothing to fall back to.
    ///
    /// # Errors
    ///
    /// Returns the root component's first render error, or an error when
    /// `host` does not belong to a live document.
    pub fn mount(def: ComponentDef, props: PropMap, host: &Node) -> Result<Self, RenderError> {
        let document = host
            .document()
            .ok_or_else(|| RenderError::msg("host node has no document"))?;
        let runtime = Runtime::new(document);
        let root = runtime
            .try_mount_component(def, props)
            .map_err(|(_, err)| err)?;
        runtime.batch(|| {
            host.append_child(&root.root_dom());
            let mut mounts = Vec::new();
            root.collect_mounts_into(&mut mounts);
            for instance in mounts {
                instance.fire_mounted();
            }
        });
        Ok(Self { runtime, root })
    }

    /// Replaces the root component's props and re-renders.
    pub fn update(&self, props: PropMap) {
        self.runtime.batch(|| self.root.update_props(props));
    }

    /// Destroys the root component and detaches its DOM from the host.
    pub fn unmount(self) {
        self.root.destroy(true);
    }

    /// Dispatches an event to a node's own listener, flushing all state
    /// updates it causes in one batch.
    pub fn dispatch(&self, target: &Node, event: &Event) {
        self.runtime.batch(|| target.dispatch(event));
    }

    /// Dispatches an event to every document-level listener, flushing all
    /// state updates it causes in one batch.
    pub fn dispatch_document(&self, event: &Event) {
        self.runtime.batch(|| self.document().dispatch(event));
    }

    /// Runs `f` with update flushing deferred to the end of the call.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.runtime.batch(f)
    }

    /// The document the app renders into.
    #[must_use]
    pub fn document(&self) -> Document {
        self.runtime.document()
    }

    /// The root component's current root DOM node.
    #[must_use]
    pub fn root_node(&self) -> Node {
        self.root.root_dom()
    }
}
