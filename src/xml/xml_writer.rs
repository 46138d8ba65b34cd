use std::fmt;
use std::io::Write;

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::error::{FeedError, FeedResult};

/// One element of an XML tree: a qualified name, ordered XML attributes, optional text
/// and ordered child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Qualified name of the element, prefix included (`g:price`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a new child element and returns it for further decoration.
    pub fn add_element(&mut self, name: impl Into<String>) -> &mut XmlElement {
        self.children.push(XmlElement::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Appends an already built element.
    pub fn push_element(&mut self, element: XmlElement) {
        self.children.push(element);
    }

    /// Sets an XML attribute. An existing attribute with the same key is replaced in place.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        let position = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(position).1)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn clear_text(&mut self) {
        self.text = None;
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First child element with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given qualified name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> FeedResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(|e| FeedError::XmlWriter(format!("Failed to write XML element: {}", e)));
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| FeedError::XmlWriter(format!("Failed to write XML element: {}", e)))?;

        if let Some(text) = &self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| FeedError::XmlWriter(format!("Failed to write XML text: {}", e)))?;
        }

        for child in &self.children {
            child.write_to(writer)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| FeedError::XmlWriter(format!("Failed to write XML end: {}", e)))
    }
}

/// A complete XML document: a declaration followed by a single root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    pub fn into_root(self) -> XmlElement {
        self.root
    }

    /// Writes the document, declaration included, to `wtr`.
    pub fn write_to<W: Write>(&self, wtr: W) -> FeedResult<()> {
        let mut writer = Writer::new(wtr);
        self.write_with(&mut writer)
    }

    /// Serializes the document without any indentation, as sent over the wire.
    pub fn to_xml_string(&self) -> FeedResult<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_with(&mut writer)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| FeedError::XmlWriter(format!("Generated XML is not UTF-8: {}", e)))
    }

    /// Serializes the document indented by two spaces. Useful for logging.
    pub fn to_pretty_string(&self) -> FeedResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_with(&mut writer)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| FeedError::XmlWriter(format!("Generated XML is not UTF-8: {}", e)))
    }

    fn write_with<W: Write>(&self, writer: &mut Writer<W>) -> FeedResult<()> {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| FeedError::XmlWriter(format!("Failed to write XML declaration: {}", e)))?;
        self.root.write_to(writer)
    }
}

impl fmt::Display for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xml = self.to_xml_string().map_err(|_| fmt::Error)?;
        f.write_str(&xml)
    }
}
