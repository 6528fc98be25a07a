//! One group of toolbar buttons with a trailing divider.

use inkui_core::component::{Component, Scope};
use inkui_core::dom::Event;
use inkui_core::error::RenderError;
use inkui_core::props;
use inkui_core::template::html;
use inkui_core::value::Value;
use inkui_core::vnode::{ComponentDef, VNode};

use crate::util::cls;

/// Renders the buttons of one toolbar group.
///
/// Props: `group` (map with an `items` list of button maps carrying
/// `class_name`, `tooltip`, `command` and optional `text`),
/// `hidden_divider` (truthy suppresses the trailing divider) and
/// `exec_command` (handler receiving the clicked command's name).
#[derive(Debug, Default)]
pub struct ToolbarGroup;

impl ToolbarGroup {
    /// The component definition hosts and parents mount.
    #[must_use]
    pub fn def() -> ComponentDef {
        ComponentDef::new("ToolbarGroup", || Box::new(Self))
    }
}

impl Component for ToolbarGroup {
    fn render(&self, cx: &Scope) -> Result<VNode, RenderError> {
        let group = cx.prop("group");
        let exec_command = cx.prop("exec_command");

        let mut buttons = Vec::new();
        if let Some(items) = group.as_map().and_then(|g| g.get("items")).and_then(Value::as_list) {
            for item in items {
                let Some(item) = item.as_map() else {
                    continue;
                };
                let command = item.get_or_null("command");
                let exec = exec_command.clone();
                let on_click = Value::handler(move |_ev| {
                    exec.invoke(
                        &Event::new("command")
                            .with_data(props! { "name" => command.clone() }),
                    );
                });
                buttons.push(html(
                    r#"<button type="button" class={} aria-label={} onClick={}>{}</button>"#,
                    vec![
                        item.get_or_null("class_name"),
                        item.get_or_null("tooltip"),
                        on_click,
                        item.get_or_null("text"),
                    ],
                )?);
            }
        }

        let divider = if cx.prop("hidden_divider").truthy() {
            Value::Null
        } else {
            html(r#"<div class="{}"></div>"#, vec![cls("divider").into()])?.into()
        };

        Ok(html(
            r#"<div class="{}">{}{}</div>"#,
            vec![cls("toolbar-group").into(), buttons.into(), divider],
        )?)
    }
}
