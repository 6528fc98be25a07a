//! Editor toolbar widgets built on the inkui rendering core.
//!
//! Each widget is a [`Component`](inkui_core::Component) the host mounts
//! through its `def()` constructor. Widgets receive everything they need
//! as props: command callbacks are handler values, record-like data
//! (toolbar items, popup info) travels as ordered maps.

pub mod popup;
pub mod toolbar;
pub mod util;

#[doc(inline)]
pub use popup::Popup;
#[doc(inline)]
pub use toolbar::{DropdownToolbarButton, HeadingMenu, ToolbarGroup};
pub use util::{closest, cls, has_class};
