//! In-memory XML element tree.
//!
//! Documents are parsed once with `quick_xml` into a plain owned tree; field
//! lookups are pure queries over that tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::reader::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("Invalid attribute: {0}")]
    Attribute(String),

    #[error("Invalid escape sequence: {0}")]
    Escape(String),

    #[error("Unknown entity reference: &{0};")]
    UnknownEntity(String),

    #[error("Unexpected end of document inside <{0}>")]
    Unclosed(String),

    #[error("Document has no root element")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, DocumentError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| DocumentError::Attribute(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw)
                .map_err(|e| DocumentError::Attribute(format!("{key}: {e}")))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Parses a whole document and returns its root element.
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Self> = Vec::new();
        let mut root: Option<Self> = None;

        loop {
            match reader.read_event()? {
                Event::Start(ref e) => stack.push(Self::from_start(e)?),
                Event::Empty(ref e) => {
                    let element = Self::from_start(e)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    // quick-xml verifies that end names match their start tags
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(ref e) => {
                    let raw = String::from_utf8_lossy(e);
                    let text = unescape(&raw)
                        .map_err(|err| DocumentError::Escape(err.to_string()))?;
                    push_text(&mut stack, &text);
                }
                Event::CData(ref e) => {
                    push_text(&mut stack, &String::from_utf8_lossy(e));
                }
                Event::GeneralRef(ref e) => {
                    let name = String::from_utf8_lossy(e).into_owned();
                    let resolved = resolve_reference(&name)
                        .ok_or(DocumentError::UnknownEntity(name))?;
                    push_text(&mut stack, &resolved);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(DocumentError::Unclosed(open.name));
        }
        root.ok_or(DocumentError::Empty)
    }

    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text of the element's direct text children.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Direct child elements with the given name.
    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Self> + use<'a, 'n> {
        self.children.iter().filter_map(move |child| match child {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find_map(|child| match child {
            Node::Element(e) if e.name == name => Some(e),
            Node::Element(_) | Node::Text(_) => None,
        })
    }

    /// All elements named `name` in document order, the element itself included.
    #[must_use]
    pub fn descendants(&self, name: &str) -> Vec<&Self> {
        let mut found = Vec::new();
        collect_descendants(self, name, &mut found);
        found
    }

    /// Text of the first element named `tag`, or `None` when no such element exists.
    #[must_use]
    pub fn first_text(&self, tag: &str) -> Option<String> {
        self.descendants(tag).first().map(|e| e.text())
    }

    /// Text of the first element named `tag` whose attributes match every pair in `attrs`.
    ///
    /// A missing attribute compares as the empty string.
    #[must_use]
    pub fn first_text_matching(&self, tag: &str, attrs: &[(&str, &str)]) -> Option<String> {
        self.descendants(tag)
            .into_iter()
            .find(|e| {
                attrs
                    .iter()
                    .all(|(key, value)| e.attr(key).unwrap_or_default() == *value)
            })
            .map(Self::text)
    }
}

fn collect_descendants<'a>(element: &'a Element, name: &str, found: &mut Vec<&'a Element>) {
    if element.name == name {
        found.push(element);
    }
    for child in &element.children {
        if let Node::Element(e) = child {
            collect_descendants(e, name, found);
        }
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn push_text(stack: &mut [Element], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if let Some(Node::Text(existing)) = parent.children.last_mut() {
        existing.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_string()));
    }
}

fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse::<u32>().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_string)
}
