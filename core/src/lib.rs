//! Core data model for the inkui rendering framework.
//!
//! This crate defines everything a component author touches and everything
//! the reconciler consumes, without any reconciliation logic of its own:
//!
//! * [`template::html`] — markup plus slot values in, a [`vnode::VNode`]
//!   tree out, with per-call-site skeleton caching;
//! * [`value::Value`] and [`value::PropMap`] — slot values and the ordered
//!   maps used for props, state and styles;
//! * [`component::Component`] and [`component::Scope`] — the user-facing
//!   component contract and its per-instance scope;
//! * [`dom`] — the retained in-memory DOM the reconciler mutates, with an
//!   optional mutation log for tests.

#[macro_use]
mod macros;

pub mod component;
pub mod dom;
pub mod error;
pub mod template;
pub mod value;
pub mod vnode;

#[doc(inline)]
pub use component::{Component, Scope};
#[doc(inline)]
pub use template::html;
#[doc(inline)]
pub use value::{PropMap, Value};
#[doc(inline)]
pub use vnode::{ComponentDef, VNode};
