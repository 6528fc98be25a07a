//! The shared popup container.
//!
//! Visibility is owned by the host through the `show` prop; the popup
//! itself only decides where to sit. On the render after `show` turns on
//! it measures its own width against the surrounding toolbar and clamps
//! its committed `left` so it never overflows the right edge. Clicking
//! outside the popup or pressing Escape asks the host to hide it via the
//! `hide_popup` handler prop.

use inkui_core::component::{Component, Scope};
use inkui_core::error::{HookError, RenderError};
use inkui_core::props;
use inkui_core::template::html;
use inkui_core::value::{PropMap, Value};
use inkui_core::vnode::{ComponentDef, VNode};

use crate::util::{closest, cls};

const MARGIN_FROM_RIGHT_SIDE: i64 = 20;

/// Popup container widget.
///
/// Props: `show` (bool), `info` (map with `class_name`, `style`, `pos`
/// and optionally `from_el`, the class name of the opener element whose
/// clicks never count as outside), `hide_popup` (handler), `body` (node
/// or nodes rendered inside).
#[derive(Debug, Default)]
pub struct Popup;

impl Popup {
    /// The component definition hosts mount.
    #[must_use]
    pub fn def() -> ComponentDef {
        ComponentDef::new("Popup", || Box::new(Self))
    }
}

fn info_entry(cx: &Scope, key: &str) -> Value {
    cx.prop("info")
        .as_map()
        .map_or(Value::Null, |info| info.get_or_null(key))
}

fn hide(cx: &Scope) {
    cx.prop("hide_popup")
        .invoke(&inkui_core::dom::Event::new("hidepopup"));
}

impl Component for Popup {
    fn initial_state(&self, _props: &PropMap) -> PropMap {
        props! { "popup_pos" => Value::Null }
    }

    fn render(&self, cx: &Scope) -> Result<VNode, RenderError> {
        let show = cx.prop("show").truthy();

        let mut style = props! { "display" => if show { "block" } else { "none" } };
        if let Some(info_style) = info_entry(cx, "style").as_map() {
            style.merge(info_style);
        }
        if let Some(pos) = cx.state("popup_pos").as_map() {
            style.merge(pos);
        }

        let class_name = info_entry(cx, "class_name")
            .to_text()
            .unwrap_or_default();

        Ok(html(
            r#"<div class="{} {}" style={} ref="el"><div class="{}">{}</div></div>"#,
            vec![
                cls("popup").into(),
                class_name.into(),
                style.into(),
                cls("popup-body").into(),
                cx.prop("body"),
            ],
        )?)
    }

    fn mounted(&self, cx: &Scope) -> Result<(), HookError> {
        let scope = cx.clone();
        cx.listen_document("mousedown", move |ev| {
            let inside = ev.target().is_some_and(|target| {
                if closest(target, &cls("popup")).is_some() {
                    return true;
                }
                // The opener's own mousedown must not re-hide the popup
                // it just opened.
                info_entry(&scope, "from_el")
                    .as_str()
                    .is_some_and(|opener| closest(target, opener).is_some())
            });
            if !inside {
                hide(&scope);
            }
        });
        let scope = cx.clone();
        cx.listen_document("keydown", move |ev| {
            if scope.prop("show").truthy() && ev.key() == Some("Escape") {
                hide(&scope);
            }
        });
        Ok(())
    }

    fn updated(&self, cx: &Scope, _prev_props: &PropMap) -> Result<(), HookError> {
        let show = cx.prop("show").truthy();
        if show && cx.state("popup_pos").is_null() {
            let Some(el) = cx.ref_node("el") else {
                return Ok(());
            };
            let pos = info_entry(cx, "pos");
            let Some(pos) = pos.as_map() else {
                return Ok(());
            };
            let mut left = pos.get_or_null("left").as_int().unwrap_or(0);
            let top = pos.get_or_null("top").as_int().unwrap_or(0);
            if let Some(toolbar) = closest(&el, &cls("toolbar")) {
                let toolbar_width = toolbar.offset_width();
                let width = el.offset_width();
                if left + width >= toolbar_width {
                    left = toolbar_width - width - MARGIN_FROM_RIGHT_SIDE;
                    tracing::debug!(left, toolbar_width, "popup clamped to toolbar edge");
                }
            }
            cx.set_state(props! {
                "popup_pos" => props! { "left" => left, "top" => top },
            });
        } else if !show && !cx.state("popup_pos").is_null() {
            // Next show re-measures from scratch.
            cx.set_state(props! { "popup_pos" => Value::Null });
        }
        Ok(())
    }
}
