//! Owned XML element tree used for both backup schemas.
//!
//! Documents are small (one user's message history), so they are read fully
//! into an [`Element`] tree with `xml-rs` and written back out the same way.

use std::collections::BTreeMap;

use xml::EventWriter;
use xml::common::XmlVersion;
use xml::name::OwnedName;
use xml::namespace::{NS_XML_PREFIX, NS_XMLNS_PREFIX, Namespace};
use xml::reader::{ParserConfig, XmlEvent};
use xml::writer::{EmitterConfig, XmlEvent as XmlWriteEvent};

use crate::error::ConvertError;

/// A single XML element with its attributes, child elements, and text.
///
/// `text` is the verbatim concatenation of the element's own text and CDATA
/// nodes. Attribute order is preserved as stored; namespace declarations are
/// kept as `xmlns`/`xmlns:prefix` attributes ahead of the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Value of the first attribute named `key`.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements named `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parse a complete document and return its root element.
    ///
    /// Element names have any namespace prefix stripped; attribute names keep
    /// theirs (so `xsi:nil` stays `xsi:nil`).
    pub fn parse_document(input: &str) -> Result<Element, ConvertError> {
        let reader = ParserConfig::new()
            .ignore_comments(true)
            .whitespace_to_characters(true)
            .cdata_to_characters(true)
            .trim_whitespace(false)
            .create_reader(input.as_bytes());

        // Open elements, each with the namespace scope it was opened in.
        let mut stack: Vec<(Element, Namespace)> = Vec::new();
        let mut root: Option<Element> = None;

        for event in reader {
            match event? {
                XmlEvent::StartElement {
                    name,
                    attributes,
                    namespace,
                } => {
                    let mut element = Element::new(name.local_name);
                    let parent_scope = stack.last().map(|(_, ns)| &ns.0);
                    element.attributes = declared_namespaces(&namespace, parent_scope);
                    element.attributes.extend(
                        attributes
                            .into_iter()
                            .map(|a| (qualified(&a.name), a.value)),
                    );
                    stack.push((element, namespace));
                }
                XmlEvent::EndElement { .. } => {
                    let (element, _) = stack.pop().ok_or_else(|| {
                        ConvertError::Malformed("closing tag without an open element".to_string())
                    })?;
                    match stack.last_mut() {
                        Some((parent, _)) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                XmlEvent::Characters(text) => {
                    if let Some((current, _)) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                // Declaration, processing instructions, DOCTYPE, end of document.
                _ => {}
            }
        }

        root.ok_or_else(|| ConvertError::Malformed("document has no root element".to_string()))
    }

    /// Render as a standalone UTF-8 document indented by two spaces.
    pub fn to_document_string(&self) -> Result<String, ConvertError> {
        let mut buf = Vec::new();
        let mut writer = EmitterConfig::new()
            .write_document_declaration(false)
            .perform_indent(true)
            .indent_string("  ")
            .create_writer(&mut buf);
        writer.write(XmlWriteEvent::StartDocument {
            version: XmlVersion::Version10,
            encoding: Some("UTF-8"),
            standalone: Some(true),
        })?;
        self.write_into(&mut writer)?;
        drop(writer);
        String::from_utf8(buf)
            .map_err(|e| ConvertError::Malformed(format!("rendered document is not UTF-8: {e}")))
    }

    fn write_into<W: std::io::Write>(&self, writer: &mut EventWriter<W>) -> Result<(), ConvertError> {
        let mut start = XmlWriteEvent::start_element(self.name.as_str());
        for (key, value) in &self.attributes {
            start = match key.split_once(':') {
                Some((NS_XMLNS_PREFIX, prefix)) => start.ns(prefix.to_string(), value.as_str()),
                None if key == NS_XMLNS_PREFIX => start.default_ns(value.as_str()),
                _ => start.attr(key.as_str(), value.as_str()),
            };
        }
        writer.write(start)?;

        // Whitespace between child elements is formatting, not content.
        let has_text = if self.children.is_empty() {
            !self.text.is_empty()
        } else {
            !self.text.trim().is_empty()
        };
        if has_text {
            writer.write(XmlWriteEvent::characters(&self.text))?;
        }
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer.write(XmlWriteEvent::end_element())?;
        Ok(())
    }
}

/// Namespace bindings introduced by an element, as `xmlns` attributes.
fn declared_namespaces(
    scope: &Namespace,
    parent: Option<&BTreeMap<String, String>>,
) -> Vec<(String, String)> {
    scope
        .0
        .iter()
        .filter(|(prefix, uri)| {
            let builtin = prefix.as_str() == NS_XML_PREFIX || prefix.as_str() == NS_XMLNS_PREFIX;
            let unbound_default = prefix.is_empty() && uri.is_empty();
            let inherited = parent.and_then(|p| p.get(prefix.as_str())) == Some(*uri);
            !builtin && !unbound_default && !inherited
        })
        .map(|(prefix, uri)| {
            let key = if prefix.is_empty() {
                NS_XMLNS_PREFIX.to_string()
            } else {
                format!("{NS_XMLNS_PREFIX}:{prefix}")
            };
            (key, uri.clone())
        })
        .collect()
}

fn qualified(name: &OwnedName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{prefix}:{}", name.local_name),
        None => name.local_name.clone(),
    }
}
