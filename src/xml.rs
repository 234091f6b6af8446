//! XML document layer
//!
//! Responses are small, so they are read into a tree of [`XmlElement`]s with
//! `quick-xml` and decoded from there. Elements are matched by local name
//! (`oml:run_id` matches `run_id`); the qualified name is kept for messages.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::{Error, Result};

/// One element of a parsed document. Attributes are not retained.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element with a qualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Qualified name, e.g. `oml:run_id`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix, e.g. `run_id`.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Whether the local name equals `local`.
    #[must_use]
    pub fn is_named(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Text content with surrounding whitespace removed.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Child elements in document order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// First child with the given local name.
    #[must_use]
    pub fn child(&self, local: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.is_named(local))
    }

    /// All children with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.is_named(local))
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Parse a complete document and return its root element.
///
/// # Errors
///
/// Returns [`Error::Xml`] for malformed input, an empty document, or more than
/// one root element.
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(XmlElement::new(String::from_utf8_lossy(e.name().as_ref())));
            }
            Ok(Event::Empty(e)) => {
                let element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()));
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Xml("closing tag without opening tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::Xml(format!("bad text content: {err}")))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!(
                    "at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Xml(format!("unclosed element <{}>", open.name())));
    }
    root.ok_or_else(|| Error::Xml("document has no root element".to_string()))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(Error::Xml(format!(
            "second root element <{}>",
            element.name()
        )));
    }
    *root = Some(element);
    Ok(())
}

/// Interpret an `<oml:error>` document, if `root` is one.
///
/// Returns [`Error::NoResult`] for "no results" codes and [`Error::Server`]
/// for everything else.
#[must_use]
pub fn server_error(root: &XmlElement) -> Option<Error> {
    if !root.is_named("error") {
        return None;
    }
    let code = root
        .child("code")
        .and_then(|c| c.text().parse::<u32>().ok())
        .unwrap_or(0);
    let message = root
        .child("message")
        .map(|m| m.text().to_string())
        .unwrap_or_default();
    let additional = root
        .child("additional_information")
        .map(|a| a.text().to_string())
        .filter(|a| !a.is_empty());
    Some(Error::from_server(code, message, additional))
}

/// Parse a response body that must be rooted at `expected` (qualified name).
///
/// # Errors
///
/// - The server error carried by an `<oml:error>` document
/// - [`Error::MissingTag`] embedding `xml` when the root differs
/// - [`Error::Xml`] for malformed input
pub fn open_document(xml: &str, expected: &'static str) -> Result<XmlElement> {
    let root = parse_document(xml)?;
    if let Some(err) = server_error(&root) {
        return Err(err);
    }
    let local = expected.rsplit(':').next().unwrap_or(expected);
    if !root.is_named(local) {
        return Err(Error::MissingTag {
            expected,
            payload: xml.to_string(),
        });
    }
    Ok(root)
}

/// The children of one record element, checked against an explicit field list.
///
/// Unknown or repeated children are rejected when the set is collected;
/// typed accessors report missing and malformed fields.
#[derive(Debug)]
pub(crate) struct FieldSet<'a> {
    record: &'static str,
    names: &'static [&'static str],
    values: Vec<Option<&'a XmlElement>>,
}

impl<'a> FieldSet<'a> {
    /// Collect the children of `element`, skipping those named in `nested`
    /// (repeated sub-records the caller decodes itself).
    pub(crate) fn collect(
        record: &'static str,
        names: &'static [&'static str],
        nested: &[&str],
        element: &'a XmlElement,
    ) -> Result<Self> {
        let mut values = vec![None; names.len()];
        for child in element.children() {
            let local = child.local_name();
            if nested.contains(&local) {
                continue;
            }
            let slot = names
                .iter()
                .position(|name| *name == local)
                .ok_or_else(|| Error::UnexpectedField {
                    record,
                    field: child.name().to_string(),
                })?;
            if values[slot].replace(child).is_some() {
                return Err(Error::UnexpectedField {
                    record,
                    field: format!("{} (repeated)", child.name()),
                });
            }
        }
        Ok(Self {
            record,
            names,
            values,
        })
    }

    fn slot(&self, name: &'static str) -> Option<&'a XmlElement> {
        self.names
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.values[i])
    }

    /// Text of an optional field; empty elements count as absent.
    pub(crate) fn text(&self, name: &'static str) -> Option<&'a str> {
        self.slot(name).map(XmlElement::text).filter(|t| !t.is_empty())
    }

    /// Text of a required field; an empty element is kept as `""`.
    pub(crate) fn required(&self, name: &'static str) -> Result<&'a str> {
        self.slot(name)
            .map(XmlElement::text)
            .ok_or(Error::MissingField {
                record: self.record,
                field: name,
            })
    }

    /// Required positive integer identifier.
    pub(crate) fn id(&self, name: &'static str) -> Result<u64> {
        let raw = self.required(name)?;
        self.parse_id(name, raw)
    }

    /// Optional positive integer identifier.
    pub(crate) fn optional_id(&self, name: &'static str) -> Result<Option<u64>> {
        self.text(name).map(|raw| self.parse_id(name, raw)).transpose()
    }

    fn parse_id(&self, name: &'static str, raw: &str) -> Result<u64> {
        match raw.parse::<u64>() {
            Ok(0) => Err(self.malformed(name, raw, "identifier must be positive")),
            Ok(id) => Ok(id),
            Err(e) => Err(self.malformed(name, raw, e)),
        }
    }

    /// Build a [`Error::MalformedField`] for this record.
    pub(crate) fn malformed(
        &self,
        name: &'static str,
        raw: &str,
        reason: impl std::fmt::Display,
    ) -> Error {
        Error::MalformedField {
            record: self.record,
            field: name,
            value: raw.to_string(),
            reason: reason.to_string(),
        }
    }
}
