//! The "more tools" dropdown button.
//!
//! The button toggles an absolutely positioned dropdown holding the
//! toolbar groups that did not fit the main toolbar row. The dropdown's
//! position is measured from the button on the first render after it
//! opens; Escape and clicks outside both the dropdown and the opener
//! close it again and return focus to the button.

use std::cell::Cell;

use inkui_core::component::{Component, Scope};
use inkui_core::error::{HookError, RenderError};
use inkui_core::props;
use inkui_core::template::html;
use inkui_core::value::{PropMap, Value};
use inkui_core::vnode::{ComponentDef, VNode};

use super::ToolbarGroup;
use crate::util::{closest, cls};

const POPUP_INDENT: i64 = 4;

/// Class of the opener button; clicks inside it never close the dropdown.
const MORE_BUTTON_CLASS: &str = "more";

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(0) };
}

fn fresh_id() -> String {
    let n = NEXT_ID.with(|id| {
        let n = id.get();
        id.set(n + 1);
        n
    });
    format!("{}-{n}", cls("dropdown-toolbar"))
}

/// Dropdown toolbar button widget.
///
/// Props: `disabled` (bool), `item` (map with `class_name`, `tooltip`,
/// `aria_has_popup`), `items` (list of group maps, each optionally
/// `hidden`) and `exec_command` (handler forwarded to the groups).
#[derive(Debug, Default)]
pub struct DropdownToolbarButton;

impl DropdownToolbarButton {
    /// The component definition hosts mount.
    #[must_use]
    pub fn def() -> ComponentDef {
        ComponentDef::new("DropdownToolbarButton", || Box::new(Self))
    }
}

fn hide_dropdown(cx: &Scope) {
    let was_shown = cx.state("show_dropdown").truthy();
    cx.set_state(props! {
        "show_dropdown" => false,
        "dropdown_pos" => Value::Null,
    });
    if was_shown {
        if let Some(el) = cx.ref_node("el") {
            el.focus();
        }
    }
}

impl Component for DropdownToolbarButton {
    fn initial_state(&self, _props: &PropMap) -> PropMap {
        props! {
            "show_dropdown" => false,
            "dropdown_pos" => Value::Null,
            "id" => fresh_id(),
        }
    }

    fn render(&self, cx: &Scope) -> Result<VNode, RenderError> {
        let show = cx.state("show_dropdown").truthy();
        let id = cx.state("id");
        let item = cx.prop("item");
        let item = item.as_map().cloned().unwrap_or_default();
        let has_popup = item.get_or_null("aria_has_popup").truthy();

        let items = cx.prop("items");
        let visible: Vec<PropMap> = items
            .as_list()
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_map)
            .filter(|group| !group.get_or_null("hidden").truthy())
            .cloned()
            .collect();

        let group_style = if visible.is_empty() {
            Value::Map(props! { "display" => "none" })
        } else {
            Value::Null
        };

        let mut dropdown_style = PropMap::new();
        if !show {
            dropdown_style.set("display", "none");
        }
        if let Some(pos) = cx.state("dropdown_pos").as_map() {
            dropdown_style.merge(pos);
        }

        let scope = cx.clone();
        let open = Value::handler(move |_ev| {
            scope.set_state(props! { "show_dropdown" => true });
        });

        let mut groups = Vec::new();
        let last = visible.len().saturating_sub(1);
        for (index, group) in visible.into_iter().enumerate() {
            groups.push(html(
                "<{} group={} hidden_divider={} ...{}></$>",
                vec![
                    ToolbarGroup::def().into(),
                    group.into(),
                    (index == last).into(),
                    cx.props().into(),
                ],
            )?);
        }

        Ok(html(
            r#"<div class="{}" style={}>
                <button
                    ref="el"
                    type="button"
                    class={}
                    onClick={}
                    disabled={}
                    aria-label={}
                    aria-haspopup={}
                    aria-expanded={}
                    aria-controls={}
                ></button>
                <div id={} class="{}" style={} ref="dropdown_el">{}</div>
            </div>"#,
            vec![
                cls("toolbar-group").into(),
                group_style,
                item.get_or_null("class_name"),
                open,
                cx.prop("disabled"),
                item.get_or_null("tooltip"),
                has_popup.into(),
                (has_popup && show).into(),
                id.clone(),
                id,
                cls("dropdown-toolbar").into(),
                dropdown_style.into(),
                groups.into(),
            ],
        )?)
    }

    fn mounted(&self, cx: &Scope) -> Result<(), HookError> {
        let scope = cx.clone();
        cx.listen_document("click", move |ev| {
            let inside = ev.target().is_some_and(|target| {
                closest(target, &cls("dropdown-toolbar")).is_some()
                    || closest(target, MORE_BUTTON_CLASS).is_some()
            });
            if !inside {
                hide_dropdown(&scope);
            }
        });
        let scope = cx.clone();
        cx.listen_document("keydown", move |ev| {
            if ev.key() == Some("Escape") && scope.state("show_dropdown").truthy() {
                hide_dropdown(&scope);
            }
        });
        Ok(())
    }

    fn updated(&self, cx: &Scope, _prev_props: &PropMap) -> Result<(), HookError> {
        if cx.state("show_dropdown").truthy() && cx.state("dropdown_pos").is_null() {
            if let Some(el) = cx.ref_node("el") {
                cx.set_state(props! {
                    "dropdown_pos" => props! {
                        "top" => el.offset_top() + el.offset_height() + POPUP_INDENT,
                        "right" => 10,
                    },
                });
            }
        }
        Ok(())
    }
}
