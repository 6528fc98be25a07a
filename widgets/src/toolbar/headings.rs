//! The heading-level menu shown by the headings popup.

use inkui_core::component::{Component, Scope};
use inkui_core::dom::Event;
use inkui_core::error::RenderError;
use inkui_core::props;
use inkui_core::template::html;
use inkui_core::value::Value;
use inkui_core::vnode::{ComponentDef, VNode};

use crate::util::cls;

/// Menu with one entry per heading level plus a paragraph entry.
///
/// Props: `exec_command` — handler receiving a `command` event whose data
/// carries `name: "heading"` and `level` (1 to 6, or null for paragraph).
#[derive(Debug, Default)]
pub struct HeadingMenu;

impl HeadingMenu {
    /// The component definition hosts mount.
    #[must_use]
    pub fn def() -> ComponentDef {
        ComponentDef::new("HeadingMenu", || Box::new(Self))
    }
}

fn command_handler(cx: &Scope, level: Value) -> Value {
    let exec = cx.prop("exec_command");
    Value::handler(move |_ev| {
        exec.invoke(&Event::new("command").with_data(props! {
            "name" => "heading",
            "level" => level.clone(),
        }));
    })
}

impl Component for HeadingMenu {
    fn render(&self, cx: &Scope) -> Result<VNode, RenderError> {
        let mut entries = Vec::new();
        for level in 1..=6_i64 {
            entries.push(html(
                r#"<li data-type="Heading" role="none">
                    <{} role="presentation">
                        <button type="button" role="menuitem" onClick={}>Heading {}</button>
                    </$>
                </li>"#,
                vec![
                    format!("h{level}").into(),
                    command_handler(cx, level.into()),
                    level.into(),
                ],
            )?);
        }

        Ok(html(
            r#"<ul role="menu" aria-label="Headings" class="{}">
                {}
                <li data-type="Paragraph" role="none">
                    <div>
                        <button type="button" role="menuitem" onClick={}>Paragraph</button>
                    </div>
                </li>
            </ul>"#,
            vec![
                cls("menu-headings").into(),
                entries.into(),
                command_handler(cx, Value::Null),
            ],
        )?)
    }
}
