//! Templates: markup plus slot values in, virtual trees out.
//!
//! [`html`] is the single entry point components use from `render`. The
//! markup is a `&'static str`, so each call site's skeleton is parsed once
//! and cached by the literal's address; every subsequent render only pays
//! for slot substitution.
//!
//! Slot positions and their accepted values:
//!
//! * child position `{}` — strings and numbers become text nodes, nodes
//!   and node lists are spliced in, `Null`/`false` produce nothing;
//! * bare attribute `name={}` — the raw value, so handlers (`onClick`),
//!   refs (`ref`) and maps (`style`, spreads) keep their type;
//! * quoted attribute `name="a-{}"` — parts are string-coerced and joined;
//! * spread `...{}` — the map's entries merge into the element in order;
//! * tag position `<{}>...</$>` — a string picks the element tag, a
//!   component definition turns the node into a component occurrence.

mod parser;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub use parser::{AttrPart, SkelAttr, SkelElement, SkelNode, SkelTag, Skeleton, parse};

use crate::error::TemplateError;
use crate::value::{PropMap, Value};
use crate::vnode::{RefSlot, VComponent, VElement, VNode};

thread_local! {
    static SKELETONS: RefCell<HashMap<(usize, usize), Rc<Skeleton>>> =
        RefCell::new(HashMap::new());
}

/// Builds a virtual tree from markup and slot values.
///
/// # Errors
///
/// Returns a [`TemplateError`] when the markup is malformed, the value
/// count does not match the slot count, a value is unusable in its slot's
/// position, or the markup does not produce exactly one root node.
pub fn html(markup: &'static str, values: Vec<Value>) -> Result<VNode, TemplateError> {
    let skeleton = cached_skeleton(markup)?;
    if values.len() != skeleton.slot_count {
        return Err(TemplateError::SlotCountMismatch {
            slots: skeleton.slot_count,
            values: values.len(),
        });
    }
    let mut roots = Vec::new();
    for node in &skeleton.roots {
        build_node(node, &values, &mut roots)?;
    }
    if roots.len() == 1 {
        Ok(roots.remove(0))
    } else {
        Err(TemplateError::SingleRootRequired)
    }
}

fn cached_skeleton(markup: &'static str) -> Result<Rc<Skeleton>, TemplateError> {
    let key = (markup.as_ptr() as usize, markup.len());
    if let Some(hit) = SKELETONS.with(|cache| cache.borrow().get(&key).cloned()) {
        return Ok(hit);
    }
    let skeleton = Rc::new(parse(markup)?);
    SKELETONS.with(|cache| cache.borrow_mut().insert(key, skeleton.clone()));
    Ok(skeleton)
}

#[cfg(test)]
fn skeleton_cache_len() -> usize {
    SKELETONS.with(|cache| cache.borrow().len())
}

fn build_node(
    node: &SkelNode,
    values: &[Value],
    out: &mut Vec<VNode>,
) -> Result<(), TemplateError> {
    match node {
        SkelNode::Text(text) => out.push(VNode::Text(text.clone())),
        SkelNode::Slot(slot) => splice_child(&values[*slot], out)?,
        SkelNode::Element(el) => out.push(build_element(el, values)?),
    }
    Ok(())
}

fn splice_child(value: &Value, out: &mut Vec<VNode>) -> Result<(), TemplateError> {
    match value {
        Value::Null | Value::Bool(false) => {}
        Value::Node(node) => out.push(node.clone()),
        Value::Nodes(nodes) => out.extend(nodes.iter().cloned()),
        Value::List(items) => {
            for item in items {
                splice_child(item, out)?;
            }
        }
        Value::Bool(true) | Value::Int(_) | Value::Float(_) | Value::Str(_) => {
            if let Some(text) = value.to_text() {
                out.push(VNode::Text(text));
            }
        }
        Value::Map(_) | Value::Handler(_) | Value::Ref(_) | Value::Component(_) => {
            return Err(TemplateError::InvalidSlotPosition {
                position: "in child position".to_owned(),
            });
        }
    }
    Ok(())
}

fn build_element(el: &SkelElement, values: &[Value]) -> Result<VNode, TemplateError> {
    // Attributes and spreads collapse into one ordered map before any
    // classification, so a spread and a literal attribute interleave the
    // same way regardless of which kind each entry came from.
    let mut raw = PropMap::new();
    for attr in &el.attrs {
        match attr {
            SkelAttr::Static { name, value } => raw.set(name.clone(), value.as_str()),
            SkelAttr::Flag { name } => raw.set(name.clone(), true),
            SkelAttr::BareSlot { name, slot } => raw.set(name.clone(), values[*slot].clone()),
            SkelAttr::Composite { name, parts } => {
                let mut joined = String::new();
                for part in parts {
                    match part {
                        AttrPart::Text(text) => joined.push_str(text),
                        AttrPart::Slot(slot) => {
                            joined.push_str(&values[*slot].to_text().unwrap_or_default());
                        }
                    }
                }
                raw.set(name.clone(), joined);
            }
            SkelAttr::Spread { slot } => match &values[*slot] {
                Value::Map(map) => raw.merge(map),
                Value::Null => {}
                _ => {
                    return Err(TemplateError::ExpectedMap {
                        name: "...".to_owned(),
                    });
                }
            },
        }
    }

    let mut children = Vec::new();
    for child in &el.children {
        build_node(child, values, &mut children)?;
    }

    match &el.tag {
        SkelTag::Static(tag) => finish_element(tag.clone(), raw, children),
        SkelTag::Slot(slot) => match &values[*slot] {
            Value::Str(tag) => finish_element(tag.clone(), raw, children),
            Value::Component(def) => {
                let key = raw.remove("key").and_then(|v| v.to_text());
                let mut props = raw;
                if !children.is_empty() {
                    props.set("children", Value::Nodes(children));
                }
                Ok(VNode::Component(VComponent::new(*def, props, key)))
            }
            _ => Err(TemplateError::InvalidTag),
        },
    }
}

fn finish_element(
    tag: String,
    raw: PropMap,
    children: Vec<VNode>,
) -> Result<VNode, TemplateError> {
    let mut element = VElement::new(tag);
    element.children = children;
    for (name, value) in raw {
        if name == "key" {
            element.key = value.to_text();
        } else if name == "ref" {
            match value {
                Value::Null => {}
                Value::Str(name) => element.node_ref = Some(RefSlot::Named(name)),
                Value::Ref(callback) => element.node_ref = Some(RefSlot::Callback(callback)),
                _ => return Err(TemplateError::InvalidRef),
            }
        } else if name == "style" {
            match value {
                Value::Null => {}
                Value::Map(map) => {
                    for (prop, v) in map.iter() {
                        element.style.push((prop.to_owned(), style_text(v)));
                    }
                }
                Value::Str(literal) => parse_style_literal(&literal, &mut element.style),
                _ => {
                    return Err(TemplateError::ExpectedMap {
                        name: "style".to_owned(),
                    });
                }
            }
        } else if let Some(event) = event_name(&name) {
            match value {
                Value::Handler(handler) => element.events.push((event, handler)),
                Value::Null | Value::Bool(false) => {}
                _ => return Err(TemplateError::ExpectedHandler { name }),
            }
        } else if !matches!(value, Value::Null | Value::Bool(false)) {
            // Null and false omit the attribute; anything else that has no
            // text form does not belong in a plain attribute slot.
            let Some(text) = value.to_text() else {
                return Err(TemplateError::InvalidSlotPosition {
                    position: format!("in attribute `{name}`"),
                });
            };
            element.attrs.push((name, text));
        }
    }
    Ok(VNode::Element(element))
}

/// `onClick` binds `click`; a lowercase third letter (`online`) is a plain
/// attribute.
fn event_name(attr: &str) -> Option<String> {
    let rest = attr.strip_prefix("on")?;
    let first = rest.chars().next()?;
    first
        .is_ascii_uppercase()
        .then(|| rest.to_ascii_lowercase())
}

/// Bare numbers in style maps mean pixels.
fn style_text(value: &Value) -> Option<String> {
    match value {
        Value::Int(n) => Some(format!("{n}px")),
        Value::Float(f) => Some(format!("{f}px")),
        _ => value.to_text(),
    }
}

fn parse_style_literal(literal: &str, out: &mut Vec<(String, Option<String>)>) {
    for decl in literal.split(';') {
        if let Some((prop, value)) = decl.split_once(':') {
            let prop = prop.trim();
            let value = value.trim();
            if !prop.is_empty() && !value.is_empty() {
                out.push((prop.to_owned(), Some(value.to_owned())));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, Scope};
    use crate::error::RenderError;

    fn el(node: &VNode) -> &VElement {
        match node {
            VNode::Element(el) => el,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_text_and_attribute_slots() {
        let node = html(
            "<div class=\"tab-{}\" id={}>count: {}</div>",
            vec!["active".into(), "t1".into(), 3.into()],
        )
        .unwrap();
        let div = el(&node);
        assert_eq!(div.attr("class"), Some("tab-active"));
        assert_eq!(div.attr("id"), Some("t1"));
        assert_eq!(
            div.children,
            vec![VNode::text("count: "), VNode::text("3")]
        );
    }

    #[test]
    fn test_handler_slot_binds_event() {
        let handler = Value::handler(|_| {});
        let node = html("<button onClick={}>ok</button>", vec![handler]).unwrap();
        let button = el(&node);
        assert_eq!(button.events.len(), 1);
        assert_eq!(button.events[0].0, "click");
        assert!(button.attr("onClick").is_none());
    }

    #[test]
    fn test_false_and_null_attrs_are_omitted() {
        let node = html(
            "<input disabled={} readonly={} checked={}>",
            vec![false.into(), Value::Null, true.into()],
        )
        .unwrap();
        let input = el(&node);
        assert!(input.attr("disabled").is_none());
        assert!(input.attr("readonly").is_none());
        assert_eq!(input.attr("checked"), Some("true"));
    }

    #[test]
    fn test_style_map_adds_px_to_numbers() {
        let style = PropMap::new()
            .with("left", 40)
            .with("display", "block")
            .with("top", Value::Null);
        let node = html("<div style={}></div>", vec![style.into()]).unwrap();
        assert_eq!(
            el(&node).style,
            vec![
                ("left".to_owned(), Some("40px".to_owned())),
                ("display".to_owned(), Some("block".to_owned())),
                ("top".to_owned(), None),
            ]
        );
    }

    #[test]
    fn test_style_literal_is_parsed() {
        let node = html("<div style=\"left: 4px; display: none\"></div>", vec![]).unwrap();
        assert_eq!(
            el(&node).style,
            vec![
                ("left".to_owned(), Some("4px".to_owned())),
                ("display".to_owned(), Some("none".to_owned())),
            ]
        );
    }

    #[test]
    fn test_spread_interleaves_with_literals() {
        let extra = PropMap::new().with("class", "override").with("role", "menu");
        let node = html(
            "<div class=\"base\" ...{} id=\"x\"></div>",
            vec![extra.into()],
        )
        .unwrap();
        assert_eq!(
            el(&node).attrs,
            vec![
                ("class".to_owned(), "override".to_owned()),
                ("role".to_owned(), "menu".to_owned()),
                ("id".to_owned(), "x".to_owned()),
            ]
        );
    }

    #[test]
    fn test_dynamic_tag_from_string() {
        let node = html("<{}>Heading 3</$>", vec!["h3".into()]).unwrap();
        assert_eq!(el(&node).tag, "h3");
    }

    #[derive(Debug, Default)]
    struct Item;

    impl Component for Item {
        fn render(&self, _cx: &Scope) -> Result<VNode, RenderError> {
            Ok(VNode::text("item"))
        }
    }

    fn item() -> Box<dyn Component> {
        Box::new(Item)
    }

    #[test]
    fn test_dynamic_tag_from_component_def() {
        use crate::vnode::ComponentDef;
        let def = ComponentDef::new("Item", item);
        let node = html(
            "<{} label={} key=\"k1\"></$>",
            vec![def.into(), "first".into()],
        )
        .unwrap();
        let VNode::Component(comp) = node else {
            panic!("expected component node");
        };
        assert_eq!(comp.def.name(), "Item");
        assert_eq!(comp.key.as_deref(), Some("k1"));
        assert_eq!(comp.props.get("label").and_then(Value::as_str), Some("first"));
        assert!(!comp.props.contains("key"));
    }

    #[test]
    fn test_node_lists_are_spliced() {
        let items = vec![VNode::text("a"), VNode::text("b")];
        let node = html("<ul>{}</ul>", vec![items.into()]).unwrap();
        assert_eq!(el(&node).children.len(), 2);
    }

    #[test]
    fn test_slot_count_mismatch() {
        assert_eq!(
            html("<div id={}></div>", vec![]),
            Err(TemplateError::SlotCountMismatch {
                slots: 1,
                values: 0,
            })
        );
    }

    #[test]
    fn test_single_root_enforced() {
        assert_eq!(
            html("<div></div><div></div>", vec![]),
            Err(TemplateError::SingleRootRequired)
        );
    }

    #[test]
    fn test_map_in_plain_attribute_slot_is_rejected() {
        assert_eq!(
            html("<div data-info={}></div>", vec![PropMap::new().into()]),
            Err(TemplateError::InvalidSlotPosition {
                position: "in attribute `data-info`".into(),
            })
        );
    }

    #[test]
    fn test_handler_slot_rejects_plain_value() {
        assert_eq!(
            html("<div onClick={}></div>", vec!["nope".into()]),
            Err(TemplateError::ExpectedHandler {
                name: "onClick".into(),
            })
        );
    }

    #[test]
    fn test_skeleton_parsed_once_per_call_site() {
        let markup = "<p>cached {}</p>";
        let before = skeleton_cache_len();
        html(markup, vec![1.into()]).unwrap();
        assert_eq!(skeleton_cache_len(), before + 1);
        html(markup, vec![2.into()]).unwrap();
        assert_eq!(skeleton_cache_len(), before + 1);
    }
}
