//! Slot values and ordered maps.
//!
//! [`Value`] is the union of everything a template slot can receive:
//! primitives, virtual nodes, handler callbacks, ref callbacks, component
//! definitions and nested maps/lists. [`PropMap`] is the ordered
//! string-to-value map used for props, state, style maps and spread
//! merging; writing to an existing key replaces the value in place, so
//! first-writer key order is preserved while the last writer wins on the
//! value.

use std::fmt;
use std::rc::Rc;

use crate::dom::{Event, Node};
use crate::error::RefBindingError;
use crate::vnode::{ComponentDef, VNode};

/// A declarative event handler attached to an element.
///
/// Handlers are compared by reference identity during reconciliation: a
/// handler is re-bound only when the interpolated `Rc` changed.
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// A ref callback invoked with `Some(node)` once the DOM node exists and
/// with `None` when the node is removed or replaced.
pub type RefCallback = Rc<dyn Fn(Option<&Node>) -> Result<(), RefBindingError>>;

/// The value of one interpolated template slot.
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value; produces no node and removes attributes.
    #[default]
    Null,
    /// Boolean; `false` behaves like [`Value::Null`] in most positions.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// String.
    Str(String),
    /// An already-built virtual node, spliced into child position.
    Node(VNode),
    /// A sequence of virtual nodes, spliced into child position.
    Nodes(Vec<VNode>),
    /// A list of arbitrary values, used for record-like widget data.
    List(Vec<Value>),
    /// An ordered map, used for `style`, spreads and record-like data.
    Map(PropMap),
    /// An event handler for an `on*` slot.
    Handler(EventHandler),
    /// A ref callback for a `ref` slot.
    Ref(RefCallback),
    /// A component definition for a dynamic tag slot.
    Component(ComponentDef),
}

impl Value {
    /// Wraps a closure into a handler value for an `on*` slot.
    pub fn handler(f: impl Fn(&Event) + 'static) -> Self {
        Self::Handler(Rc::new(f))
    }

    /// Wraps a fallible closure into a ref callback value.
    pub fn ref_callback(
        f: impl Fn(Option<&Node>) -> Result<(), RefBindingError> + 'static,
    ) -> Self {
        Self::Ref(Rc::new(f))
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// JavaScript-style truthiness: `Null`, `false`, `0`, `0.0` and the
    /// empty string are falsy, everything else is truthy.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Null | Self::Bool(false) => false,
            Self::Int(n) => *n != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Returns the string slice if this is a [`Value::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`Value::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the map if this is a [`Value::Map`].
    #[must_use]
    pub const fn as_map(&self) -> Option<&PropMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the list if this is a [`Value::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the handler if this is a [`Value::Handler`].
    #[must_use]
    pub const fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Self::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Invokes the handler with `event` if this is a [`Value::Handler`].
    pub fn invoke(&self, event: &Event) {
        if let Self::Handler(h) = self {
            h(event);
        }
    }

    /// Coerces this value to text for attribute and text-node positions.
    ///
    /// `None` means the value produces nothing there: `Null` and `false`
    /// remove an attribute instead of stringifying.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::Bool(false) => None,
            Self::Bool(true) => Some("true".to_owned()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(n) => write!(f, "Int({n})"),
            Self::Float(x) => write!(f, "Float({x})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Self::Nodes(nodes) => f.debug_tuple("Nodes").field(nodes).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Ref(_) => f.write_str("Ref(..)"),
            Self::Component(def) => f.debug_tuple("Component").field(&def.name()).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a == b,
            (Self::Nodes(a), Self::Nodes(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            // Callbacks compare by reference identity.
            (Self::Handler(a), Self::Handler(b)) => Rc::ptr_eq(a, b),
            (Self::Ref(a), Self::Ref(b)) => Rc::ptr_eq(a, b),
            (Self::Component(a), Self::Component(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<VNode> for Value {
    fn from(value: VNode) -> Self {
        Self::Node(value)
    }
}

impl From<Vec<VNode>> for Value {
    fn from(value: Vec<VNode>) -> Self {
        Self::Nodes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<PropMap> for Value {
    fn from(value: PropMap) -> Self {
        Self::Map(value)
    }
}

impl From<ComponentDef> for Value {
    fn from(value: ComponentDef) -> Self {
        Self::Component(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// An ordered string-to-value map.
///
/// Backed by a `Vec` so iteration order is deterministic. [`PropMap::set`]
/// on an existing key replaces the value in place, which is what makes
/// spread merging first-writer-wins on key order and last-writer-wins on
/// the value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropMap {
    entries: Vec<(String, Value)>,
}

impl PropMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns the value stored under `key`, or [`Value::Null`].
    #[must_use]
    pub fn get_or_null(&self, key: &str) -> Value {
        self.get(key).cloned().unwrap_or(Value::Null)
    }

    /// Stores `value` under `key`, keeping the key's original position if
    /// it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Removes `key` and returns its value if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns `true` when `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Writes every entry of `other` into this map in order.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in other.iter() {
            self.set(key, value.clone());
        }
    }

    /// Builder-style [`PropMap::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }
}

impl FromIterator<(String, Value)> for PropMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.set(key, value);
        }
        map
    }
}

impl IntoIterator for PropMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
