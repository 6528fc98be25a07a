//! Toolbar widgets: button groups, the overflow dropdown and the heading
//! menu.

mod dropdown;
mod group;
mod headings;

pub use dropdown::DropdownToolbarButton;
pub use group::ToolbarGroup;
pub use headings::HeadingMenu;
