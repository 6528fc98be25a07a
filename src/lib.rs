#![doc = include_str!("../README.md")]

mod app;
mod binder;
mod reconcile;
mod runtime;

#[doc(inline)]
pub use app::App;
pub use inkui_core as core;
pub use inkui_widgets as widgets;

pub mod prelude {
    //! Commonly used types for component authors and embedding hosts.
    //!
    //! # Example
    //!
    //! ```rust
    //! use inkui::prelude::*;
    //!
    //! #[derive(Debug, Default)]
    //! struct Hello;
    //!
    //! impl Component for Hello {
    //!     fn render(&self, cx: &Scope) -> Result<VNode, RenderError> {
    //!         Ok(html("<p>hello {}</p>", vec![cx.prop("name")])?)
    //!     }
    //! }
    //! ```

    pub use crate::App;
    pub use inkui_core::component::{Component, Scope};
    pub use inkui_core::dom::{Document, Event, Node};
    pub use inkui_core::error::{HookError, RenderError, TemplateError};
    pub use inkui_core::props;
    pub use inkui_core::template::html;
    pub use inkui_core::value::{PropMap, Value};
    pub use inkui_core::vnode::{ComponentDef, VNode};
}
