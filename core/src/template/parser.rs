//! Markup skeleton parser.
//!
//! A template's markup is a `&'static str` with `{}` slot markers. The
//! parser runs once per call site and produces a [`Skeleton`]: the static
//! shape of the tree with every slot numbered in source order. Slot values
//! are substituted into the skeleton on every render, so all scanning work
//! happens exactly once.

use crate::error::TemplateError;

/// Elements that never take children and need no closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// The parsed static shape of one template call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    /// Top-level nodes in source order.
    pub roots: Vec<SkelNode>,
    /// Total number of `{}` slots in the markup.
    pub slot_count: usize,
}

/// One node of the skeleton tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkelNode {
    /// An element with a static or slot tag.
    Element(SkelElement),
    /// Literal text, already whitespace-normalized.
    Text(String),
    /// A `{}` slot in child position.
    Slot(usize),
}

/// An element shape: tag, attribute slots and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkelElement {
    /// Static tag name or a slot resolved at substitution time.
    pub tag: SkelTag,
    /// Attributes in source order.
    pub attrs: Vec<SkelAttr>,
    /// Child nodes in source order.
    pub children: Vec<SkelNode>,
}

/// The tag position of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkelTag {
    /// A literal tag name.
    Static(String),
    /// A `<{}>` dynamic tag; its closing form is `</$>`.
    Slot(usize),
}

impl SkelTag {
    fn closing_name(&self) -> &str {
        match self {
            Self::Static(name) => name,
            Self::Slot(_) => "$",
        }
    }
}

/// One attribute of an element shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkelAttr {
    /// `name="literal"` with no slots.
    Static {
        /// Attribute name.
        name: String,
        /// Literal value.
        value: String,
    },
    /// `name={}`: the slot's value is kept as-is (handlers, refs, maps).
    BareSlot {
        /// Attribute name.
        name: String,
        /// Slot index.
        slot: usize,
    },
    /// `name="pre{}post"`: slot values are string-coerced and joined.
    Composite {
        /// Attribute name.
        name: String,
        /// Literal and slot parts in order.
        parts: Vec<AttrPart>,
    },
    /// `...{}`: the slot's map is merged into the element's props.
    Spread {
        /// Slot index.
        slot: usize,
    },
    /// A valueless attribute such as `disabled`.
    Flag {
        /// Attribute name.
        name: String,
    },
}

/// One piece of a composite attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrPart {
    /// Literal text.
    Text(String),
    /// A string-coerced slot.
    Slot(usize),
}

/// Parses markup into a skeleton.
///
/// # Errors
///
/// Returns a [`TemplateError`] when the markup is malformed: unclosed or
/// mismatched tags, stray closing tags, or an empty tag name.
pub fn parse(markup: &str) -> Result<Skeleton, TemplateError> {
    Parser {
        src: markup,
        pos: 0,
        slots: 0,
    }
    .run()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    slots: usize,
}

impl Parser<'_> {
    fn run(mut self) -> Result<Skeleton, TemplateError> {
        let mut roots = Vec::new();
        let mut stack: Vec<SkelElement> = Vec::new();

        while self.pos < self.src.len() {
            if self.eat("</") {
                let element = self.close_tag(&mut stack)?;
                attach(SkelNode::Element(element), &mut stack, &mut roots);
            } else if self.peek() == Some('<') {
                self.pos += 1;
                let (element, complete) = self.open_tag()?;
                if complete {
                    attach(SkelNode::Element(element), &mut stack, &mut roots);
                } else {
                    stack.push(element);
                }
            } else if self.eat("{}") {
                let slot = self.next_slot();
                attach(SkelNode::Slot(slot), &mut stack, &mut roots);
            } else {
                let text = self.text_run();
                if let Some(text) = normalize_text(text) {
                    attach(SkelNode::Text(text), &mut stack, &mut roots);
                }
            }
        }

        if let Some(open) = stack.pop() {
            return Err(TemplateError::UnclosedTag {
                tag: open.tag.closing_name().to_owned(),
            });
        }

        Ok(Skeleton {
            roots,
            slot_count: self.slots,
        })
    }

    fn close_tag(&mut self, stack: &mut Vec<SkelElement>) -> Result<SkelElement, TemplateError> {
        // `</{}>` mirrors the opening slot and means the same as `</$>`;
        // it is not a value slot.
        let name = if self.eat("{}") {
            "$".to_owned()
        } else {
            self.ident_or_dollar()
        };
        self.skip_whitespace();
        if !self.eat(">") {
            return Err(TemplateError::UnclosedTag { tag: name });
        }
        let Some(open) = stack.pop() else {
            return Err(TemplateError::StrayClosingTag { found: name });
        };
        if open.tag.closing_name() != name {
            return Err(TemplateError::MismatchedClosingTag {
                expected: open.tag.closing_name().to_owned(),
                found: name,
            });
        }
        Ok(open)
    }

    /// Parses from just after `<` to just after `>` or `/>`. Returns the
    /// element and whether it is already complete (self-closing or void).
    fn open_tag(&mut self) -> Result<(SkelElement, bool), TemplateError> {
        let tag = if self.eat("{}") {
            SkelTag::Slot(self.next_slot())
        } else {
            let name = self.ident_or_dollar();
            if name.is_empty() || name == "$" {
                return Err(TemplateError::InvalidTag);
            }
            SkelTag::Static(name)
        };

        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat("/>") {
                return Ok((
                    SkelElement {
                        tag,
                        attrs,
                        children: Vec::new(),
                    },
                    true,
                ));
            }
            if self.eat(">") {
                let void = matches!(&tag, SkelTag::Static(name) if VOID_TAGS.contains(&name.as_str()));
                return Ok((
                    SkelElement {
                        tag,
                        attrs,
                        children: Vec::new(),
                    },
                    void,
                ));
            }
            if self.pos >= self.src.len() {
                return Err(TemplateError::UnclosedTag {
                    tag: tag.closing_name().to_owned(),
                });
            }
            attrs.push(self.attribute(&tag)?);
        }
    }

    fn attribute(&mut self, tag: &SkelTag) -> Result<SkelAttr, TemplateError> {
        if self.eat("...{}") {
            return Ok(SkelAttr::Spread {
                slot: self.next_slot(),
            });
        }
        let name = self.attr_name();
        if name.is_empty() {
            return Err(TemplateError::InvalidTag);
        }
        if !self.eat("=") {
            return Ok(SkelAttr::Flag { name });
        }
        if self.eat("{}") {
            return Ok(SkelAttr::BareSlot {
                name,
                slot: self.next_slot(),
            });
        }
        if self.eat("\"") {
            return self.quoted_value(name, tag);
        }
        // Unquoted literal value, ended by whitespace or tag end.
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == '>' || ch == '/' {
                break;
            }
            self.pos += ch.len_utf8();
        }
        Ok(SkelAttr::Static {
            name,
            value: self.src[start..self.pos].to_owned(),
        })
    }

    fn quoted_value(&mut self, name: String, tag: &SkelTag) -> Result<SkelAttr, TemplateError> {
        let mut parts: Vec<AttrPart> = Vec::new();
        let mut literal = String::new();
        loop {
            if self.eat("\"") {
                break;
            }
            if self.eat("{}") {
                if !literal.is_empty() {
                    parts.push(AttrPart::Text(std::mem::take(&mut literal)));
                }
                parts.push(AttrPart::Slot(self.next_slot()));
                continue;
            }
            let Some(ch) = self.peek() else {
                return Err(TemplateError::UnclosedTag {
                    tag: tag.closing_name().to_owned(),
                });
            };
            literal.push(ch);
            self.pos += ch.len_utf8();
        }
        if parts.is_empty() {
            return Ok(SkelAttr::Static {
                name,
                value: literal,
            });
        }
        if !literal.is_empty() {
            parts.push(AttrPart::Text(literal));
        }
        Ok(SkelAttr::Composite { name, parts })
    }

    fn text_run(&mut self) -> &str {
        let start = self.pos;
        while self.pos < self.src.len() {
            if self.peek() == Some('<') || self.src[self.pos..].starts_with("{}") {
                break;
            }
            let ch = self.peek().unwrap_or('\0');
            self.pos += ch.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn ident_or_dollar(&mut self) -> String {
        if self.eat("$") {
            return "$".to_owned();
        }
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_owned()
    }

    fn attr_name(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':' {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_owned()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.src[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn next_slot(&mut self) -> usize {
        let slot = self.slots;
        self.slots += 1;
        slot
    }
}

fn attach(node: SkelNode, stack: &mut [SkelElement], roots: &mut Vec<SkelNode>) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    } else {
        roots.push(node);
    }
}

/// Indentation-only segments disappear; segments broken across lines are
/// trimmed so markup layout never leaks into text nodes.
fn normalize_text(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    if text.contains('\n') {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        return Some(trimmed.to_owned());
    }
    Some(text.to_owned())
}
