//! Diff/patch between committed trees and freshly rendered virtual trees.
//!
//! A [`Commit`] mirrors the last virtual tree an instance rendered, with
//! every node paired to its live DOM handle. Patching walks the old commit
//! and the new tree together and touches the DOM only where they disagree;
//! an unchanged render produces zero mutations.
//!
//! The functions here are infallible: render errors are contained at
//! instance boundaries before the reconciler runs, and a commit tree that
//! disagrees with the DOM is a programmer error that panics.

use std::collections::HashMap;

use inkui_core::Scope;
use inkui_core::dom::Node;
use inkui_core::vnode::{VComponent, VElement, VNode};

use crate::binder::{apply_ref, bind_events, update_ref};
use crate::runtime::{Instance, Runtime};

/// Everything a reconciliation pass needs: the scope owning named refs
/// and the runtime that mounts nested component instances.
pub(crate) struct Ctx<'a> {
    pub owner: &'a Scope,
    pub runtime: &'a Runtime,
}

/// One committed node: the virtual node it came from plus its DOM handle.
pub(crate) enum Commit {
    Element(ElementCommit),
    Text(TextCommit),
    Component(ComponentCommit),
}

pub(crate) struct ElementCommit {
    pub vel: VElement,
    pub dom: Node,
    pub children: Vec<Commit>,
}

pub(crate) struct TextCommit {
    pub text: String,
    pub dom: Node,
}

pub(crate) struct ComponentCommit {
    pub vnode: VComponent,
    pub instance: Instance,
}

impl Commit {
    /// The DOM node this commit anchors to. For component commits that is
    /// the instance's current root.
    pub fn dom(&self) -> Node {
        match self {
            Self::Element(c) => c.dom.clone(),
            Self::Text(c) => c.dom.clone(),
            Self::Component(c) => c.instance.root_dom(),
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Element(c) => c.vel.key.as_deref(),
            Self::Component(c) => c.vnode.key.as_deref(),
            Self::Text(_) => None,
        }
    }

    /// Whether `vnode` is the same node per the identity rules, i.e. it
    /// can be patched in place instead of recreated.
    pub fn matches(&self, vnode: &VNode) -> bool {
        match (self, vnode) {
            (Self::Element(c), VNode::Element(el)) => c.vel.same_node(el),
            (Self::Text(_), VNode::Text(_)) => true,
            (Self::Component(c), VNode::Component(comp)) => c.vnode.same_instance(comp),
            _ => false,
        }
    }
}

/// Builds a detached commit subtree for a fresh virtual node. The caller
/// attaches the root and fires mounted hooks afterwards.
pub(crate) fn create(ctx: &Ctx<'_>, vnode: &VNode) -> Commit {
    match vnode {
        VNode::Text(text) => Commit::Text(TextCommit {
            text: text.clone(),
            dom: ctx.owner.document().create_text(text.clone()),
        }),
        VNode::Element(vel) => {
            let dom = ctx.owner.document().create_element(vel.tag.clone());
            for (name, value) in &vel.attrs {
                dom.set_attribute(name.clone(), value.clone());
            }
            for (prop, value) in &vel.style {
                if let Some(value) = value {
                    dom.set_style(prop.clone(), value.clone());
                }
            }
            bind_events(&dom, &[], &vel.events);
            // Refs bind before the subtree exists; consumers may rely on
            // seeing the element unpopulated.
            if let Some(slot) = &vel.node_ref {
                apply_ref(ctx.owner, slot, Some(&dom));
            }
            let mut children = Vec::with_capacity(vel.children.len());
            for child in &vel.children {
                let commit = create(ctx, child);
                dom.append_child(&commit.dom());
                children.push(commit);
            }
            Commit::Element(ElementCommit {
                vel: vel.clone(),
                dom,
                children,
            })
        }
        VNode::Component(comp) => Commit::Component(ComponentCommit {
            vnode: comp.clone(),
            instance: ctx.runtime.mount_component(comp.def, comp.props.clone()),
        }),
    }
}

/// Collects every component instance in a commit subtree, children before
/// parents, so mounted hooks fire bottom-up after the DOM is attached.
pub(crate) fn collect_mounts(commit: &Commit, out: &mut Vec<Instance>) {
    match commit {
        Commit::Text(_) => {}
        Commit::Element(c) => {
            for child in &c.children {
                collect_mounts(child, out);
            }
        }
        Commit::Component(c) => c.instance.collect_mounts_into(out),
    }
}

/// Fires mounted hooks for every instance in an already-attached subtree.
pub(crate) fn notify_mounted(commit: &Commit) {
    let mut mounts = Vec::new();
    collect_mounts(commit, &mut mounts);
    for instance in mounts {
        instance.fire_mounted();
    }
}

/// Patches a committed node in place.
///
/// # Panics
///
/// Panics when `new` fails the identity rules against `old`; callers
/// decide replace-vs-patch before getting here.
pub(crate) fn patch(ctx: &Ctx<'_>, old: Commit, new: &VNode) -> Commit {
    assert!(
        old.matches(new),
        "patch applied across mismatched node identities"
    );
    match (old, new) {
        (Commit::Text(c), VNode::Text(text)) => {
            if c.text != *text {
                c.dom.set_text(text.clone());
            }
            Commit::Text(TextCommit {
                text: text.clone(),
                dom: c.dom,
            })
        }
        (Commit::Element(c), VNode::Element(vel)) => patch_element(ctx, c, vel),
        (Commit::Component(c), VNode::Component(comp)) => {
            c.instance.update_props(comp.props.clone());
            Commit::Component(ComponentCommit {
                vnode: comp.clone(),
                instance: c.instance,
            })
        }
        _ => unreachable!("identity check admits only like-kinded pairs"),
    }
}

fn patch_element(ctx: &Ctx<'_>, old: ElementCommit, new: &VElement) -> Commit {
    let dom = old.dom;

    for (name, value) in &new.attrs {
        if old.vel.attr(name) != Some(value.as_str()) {
            dom.set_attribute(name.clone(), value.clone());
        }
    }
    for (name, _) in &old.vel.attrs {
        if new.attr(name).is_none() {
            dom.remove_attribute(name);
        }
    }

    for (prop, value) in &new.style {
        match value {
            Some(value) => {
                if style_of(&old.vel, prop) != Some(value.as_str()) {
                    dom.set_style(prop.clone(), value.clone());
                }
            }
            None => dom.remove_style(prop),
        }
    }
    for (prop, _) in &old.vel.style {
        if !new.style.iter().any(|(p, _)| p == prop) {
            dom.remove_style(prop);
        }
    }

    bind_events(&dom, &old.vel.events, &new.events);
    update_ref(ctx.owner, old.vel.node_ref.as_ref(), new.node_ref.as_ref(), &dom);

    let children = reconcile_children(ctx, &dom, old.children, &new.children);

    Commit::Element(ElementCommit {
        vel: new.clone(),
        dom,
        children,
    })
}

fn style_of<'a>(vel: &'a VElement, prop: &str) -> Option<&'a str> {
    vel.style
        .iter()
        .find(|(p, _)| p == prop)
        .and_then(|(_, v)| v.as_deref())
}

/// Reconciles an element's child list.
///
/// Keyed children pair through a key map and keep their DOM nodes across
/// reorders; unkeyed children pair positionally. Unpaired old children are
/// torn down (hooks first, DOM detach second) before any placement, then
/// each new child is patched or created and moved to its index only when
/// it is not already there.
pub(crate) fn reconcile_children(
    ctx: &Ctx<'_>,
    parent: &Node,
    old: Vec<Commit>,
    new: &[VNode],
) -> Vec<Commit> {
    let mut slots: Vec<Option<Commit>> = old.into_iter().map(Some).collect();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    for (i, slot) in slots.iter().enumerate() {
        if let Some(key) = slot.as_ref().and_then(Commit::key) {
            by_key.entry(key.to_owned()).or_insert(i);
        }
    }

    // Pair pass: take each matched old commit out of its slot.
    let mut cursor = 0;
    let paired: Vec<Option<Commit>> = new
        .iter()
        .map(|child| {
            let candidate = match child.key() {
                Some(key) => by_key.get(key).copied(),
                None => {
                    let mut found = None;
                    while cursor < slots.len() {
                        let unkeyed = slots[cursor]
                            .as_ref()
                            .is_some_and(|c| c.key().is_none());
                        cursor += 1;
                        if unkeyed {
                            found = Some(cursor - 1);
                            break;
                        }
                    }
                    found
                }
            };
            candidate
                .filter(|&i| slots[i].as_ref().is_some_and(|c| c.matches(child)))
                .and_then(|i| slots[i].take())
        })
        .collect();

    // Everything left over is gone from the new tree.
    for slot in &mut slots {
        if let Some(commit) = slot.take() {
            teardown(ctx.owner, commit, true);
        }
    }

    // Build/patch pass with in-place placement checks.
    let mut out = Vec::with_capacity(new.len());
    for (index, (old, vnode)) in paired.into_iter().zip(new).enumerate() {
        let (commit, created) = match old {
            Some(old) => (patch(ctx, old, vnode), false),
            None => (create(ctx, vnode), true),
        };
        let dom = commit.dom();
        let current = parent.child_at(index);
        let in_place = current.as_ref().is_some_and(|n| Node::ptr_eq(n, &dom));
        if !in_place {
            parent.insert_before(&dom, current.as_ref());
        }
        if created {
            notify_mounted(&commit);
        }
        out.push(commit);
    }
    out
}

/// Tears down a committed subtree: refs release and destroy hooks run
/// before any DOM detach, and only the outermost node leaves the tree.
pub(crate) fn teardown(owner: &Scope, commit: Commit, remove_dom: bool) {
    match commit {
        Commit::Text(c) => {
            if remove_dom {
                if let Some(parent) = c.dom.parent() {
                    parent.remove_child(&c.dom);
                }
            }
        }
        Commit::Element(c) => {
            if let Some(slot) = &c.vel.node_ref {
                apply_ref(owner, slot, None);
            }
            for child in c.children {
                teardown(owner, child, false);
            }
            if remove_dom {
                if let Some(parent) = c.dom.parent() {
                    parent.remove_child(&c.dom);
                }
            }
        }
        Commit::Component(c) => c.instance.destroy(remove_dom),
    }
}
