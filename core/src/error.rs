//! Error types shared across the framework.
//!
//! The taxonomy separates caller contract violations (`TemplateError`),
//! failed render passes (`RenderError`) and failures that are contained
//! rather than propagated (`RefBindingError`, `HookError`). Reconciler
//! invariant violations are programmer errors and panic instead of
//! surfacing here.

use thiserror::Error;

/// Malformed template markup or a slot used in an unsupported position.
///
/// Template errors are detected while parsing the markup skeleton or while
/// substituting slot values, before any DOM mutation happens. They are
/// fatal to the render pass that produced them and are surfaced to the
/// caller rather than swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template ended while a tag was still open.
    #[error("unclosed tag `<{tag}>` in template")]
    UnclosedTag {
        /// Name of the tag that was never closed (`$` for a dynamic tag).
        tag: String,
    },
    /// A closing tag did not match the innermost open tag.
    #[error("closing tag `</{found}>` does not match open tag `<{expected}>`")]
    MismatchedClosingTag {
        /// Name of the innermost open tag.
        expected: String,
        /// Name found in the closing tag.
        found: String,
    },
    /// A closing tag appeared with no matching open tag.
    #[error("closing tag `</{found}>` has no matching open tag")]
    StrayClosingTag {
        /// Name found in the closing tag.
        found: String,
    },
    /// The number of supplied values does not match the slot count.
    #[error("template declares {slots} slot(s) but {values} value(s) were supplied")]
    SlotCountMismatch {
        /// Slots declared by the markup.
        slots: usize,
        /// Values supplied by the caller.
        values: usize,
    },
    /// A slot value cannot be used where the markup placed it.
    #[error("interpolated value is not allowed {position}")]
    InvalidSlotPosition {
        /// Human-readable description of the offending position.
        position: String,
    },
    /// An `on*` event slot received something other than a handler.
    #[error("`{name}` expects a handler value")]
    ExpectedHandler {
        /// The attribute name of the event slot.
        name: String,
    },
    /// A `style` or spread slot received something other than a map.
    #[error("`{name}` expects a map value")]
    ExpectedMap {
        /// The attribute name of the slot.
        name: String,
    },
    /// A `ref` slot received something other than a name or callback.
    #[error("`ref` expects a name string or a ref callback")]
    InvalidRef,
    /// A tag-position slot received something other than a string or
    /// component definition.
    #[error("tag slot expects a string or a component definition")]
    InvalidTag,
    /// The template produced zero or several root nodes.
    #[error("template must produce exactly one root node")]
    SingleRootRequired,
}

/// A component's render pass failed.
///
/// The previously committed tree stays on screen; no partial mutation from
/// the failed attempt reaches the DOM.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The render function produced malformed template output.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// A component-specific failure.
    #[error("{0}")]
    Message(String),
}

impl RenderError {
    /// Creates a component-specific render error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// A ref callback failed while being bound or released.
///
/// Ref binding failures are logged and do not abort the surrounding patch;
/// sibling mutations still complete so the tree is never half-applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ref binding failed: {0}")]
pub struct RefBindingError(pub String);

/// A lifecycle hook (`mounted`, `updated`, `before_destroy`) failed.
///
/// Hook failures are isolated per instance: they are logged and never
/// prevent sibling instances' hooks from running in the same pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lifecycle hook failed: {0}")]
pub struct HookError(pub String);

impl HookError {
    /// Creates a hook error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
