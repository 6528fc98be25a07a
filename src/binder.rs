//! Ref and event binding.
//!
//! Both kinds of binding diff by identity: a handler or ref callback is
//! re-bound only when the interpolated `Rc` changed, and a named ref only
//! when the name changed. Ref callback failures are logged and contained;
//! the surrounding patch always completes.

use std::rc::Rc;

use inkui_core::Scope;
use inkui_core::dom::Node;
use inkui_core::value::EventHandler;
use inkui_core::vnode::RefSlot;

/// Diffs two declarative event lists onto a DOM node.
pub fn bind_events(
    dom: &Node,
    old: &[(String, EventHandler)],
    new: &[(String, EventHandler)],
) {
    for (kind, _) in old {
        if !new.iter().any(|(k, _)| k == kind) {
            dom.remove_listener(kind);
        }
    }
    for (kind, handler) in new {
        let unchanged = old
            .iter()
            .any(|(k, h)| k == kind && Rc::ptr_eq(h, handler));
        if !unchanged {
            dom.set_listener(kind.clone(), handler.clone());
        }
    }
}

/// Binds a ref to `Some(node)` or releases it with `None`.
pub fn apply_ref(owner: &Scope, slot: &RefSlot, node: Option<&Node>) {
    match slot {
        RefSlot::Named(name) => owner.bind_ref(name, node.cloned()),
        RefSlot::Callback(callback) => {
            if let Err(err) = callback(node) {
                tracing::error!(component = owner.name(), %err, "ref callback failed");
            }
        }
    }
}

/// Moves an element from one ref binding to another. An unchanged binding
/// is not re-invoked.
pub fn update_ref(owner: &Scope, old: Option<&RefSlot>, new: Option<&RefSlot>, node: &Node) {
    match (old, new) {
        (Some(old), Some(new)) if old.same_binding(new) => {}
        (old, new) => {
            if let Some(old) = old {
                apply_ref(owner, old, None);
            }
            if let Some(new) = new {
                apply_ref(owner, new, Some(node));
            }
        }
    }
}
