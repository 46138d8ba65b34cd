use std::str;

use log::debug;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader as XmlReader;

use crate::error::{FeedError, FeedResult};

use super::xml_writer::{XmlDocument, XmlElement};

impl XmlDocument {
    /// Parses an XML document into an element tree.
    ///
    /// Text next to child elements is trimmed and whitespace-only text between elements
    /// is dropped, so indented output reads back unchanged. Comments, processing
    /// instructions and the declaration are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::XmlReader`] if the input is not well formed or has no root element.
    pub fn parse(xml: &str) -> FeedResult<XmlDocument> {
        let mut reader = XmlReader::from_str(xml);
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| FeedError::XmlReader(format!("XML parsing error: {}", e)))?;

            match event {
                Event::Start(ref start) => {
                    stack.push(OpenElement::new(element_from_start(start)?));
                }
                Event::Empty(ref start) => {
                    let element = element_from_start(start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let open = stack.pop().ok_or_else(|| {
                        FeedError::XmlReader("Unexpected closing tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, open.close())?;
                }
                Event::Text(ref text) => {
                    if let Some(open) = stack.last_mut() {
                        let raw = utf8(text.as_ref())?;
                        let unescaped = unescape(raw)
                            .map_err(|e| FeedError::XmlReader(format!("Invalid escape: {}", e)))?;
                        open.segment.push_str(&unescaped);
                    }
                }
                Event::CData(ref cdata) => {
                    if let Some(open) = stack.last_mut() {
                        open.segment.push_str(utf8(cdata.as_ref())?);
                    }
                }
                Event::GeneralRef(ref reference) => {
                    if let Some(open) = stack.last_mut() {
                        open.segment.push_str(&resolve_reference(utf8(reference.as_ref())?)?);
                    }
                }
                Event::Eof => break,
                _ => continue,
            }
        }

        if !stack.is_empty() {
            return Err(FeedError::XmlReader("Unexpected end of file".to_string()));
        }

        let root = root.ok_or_else(|| FeedError::XmlReader("Missing root element".to_string()))?;
        debug!("Parsed XML document with root '{}'", root.name());
        Ok(XmlDocument::new(root))
    }
}

/// An element whose end tag has not been read yet.
///
/// Text is collected per segment, a segment ending at the next child or at the end tag.
/// Segments next to a child element are trimmed, and dropped when only whitespace is
/// left, so indentation around children never leaks into the element's text.
struct OpenElement {
    element: XmlElement,
    text: String,
    segment: String,
}

impl OpenElement {
    fn new(element: XmlElement) -> Self {
        Self {
            element,
            text: String::new(),
            segment: String::new(),
        }
    }

    fn flush_segment(&mut self, next_to_child: bool) {
        let segment = std::mem::take(&mut self.segment);
        if next_to_child {
            let trimmed = segment.trim();
            if !trimmed.is_empty() {
                self.text.push_str(trimmed);
            }
        } else {
            self.text.push_str(&segment);
        }
    }

    fn push_child(&mut self, child: XmlElement) {
        self.flush_segment(true);
        self.element.push_element(child);
    }

    fn close(mut self) -> XmlElement {
        let has_children = !self.element.children().is_empty();
        self.flush_segment(has_children);
        if !self.text.is_empty() {
            self.element.set_text(self.text);
        }
        self.element
    }
}

fn attach(
    stack: &mut [OpenElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> FeedResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_child(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(FeedError::XmlReader(
                "Multiple root elements".to_string(),
            ));
        }
    }
    Ok(())
}

fn element_from_start(start: &BytesStart<'_>) -> FeedResult<XmlElement> {
    let name = start.name();
    let mut element = XmlElement::new(utf8(name.as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| FeedError::XmlReader(format!("Invalid attribute: {}", e)))?;
        let key = utf8(attr.key.as_ref())?;
        let value = unescape(utf8(&attr.value)?)
            .map_err(|e| FeedError::XmlReader(format!("Invalid escape: {}", e)))?;
        element.set_attribute(key, value.into_owned());
    }
    Ok(element)
}

fn resolve_reference(name: &str) -> FeedResult<String> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        };
        return parsed
            .ok()
            .and_then(char::from_u32)
            .map(|c| c.to_string())
            .ok_or_else(|| FeedError::XmlReader(format!("Invalid character reference: &{};", name)));
    }

    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| FeedError::XmlReader(format!("Unknown entity: &{};", name)))
}

fn utf8(bytes: &[u8]) -> FeedResult<&str> {
    str::from_utf8(bytes).map_err(|e| FeedError::XmlReader(format!("Invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let xml = r#"<?xml version="1.0"?>
            <entry xmlns="http://www.w3.org/2005/Atom" xmlns:g="http://base.google.com/ns/1.0">
              <title>Widget</title>
              <g:location type="location">Paris<latitude>48.85</latitude></g:location>
              <link rel="alternate" href="http://example.com/w"/>
            </entry>"#;

        let document = XmlDocument::parse(xml).unwrap();
        let root = document.root();

        assert_eq!(root.name(), "entry");
        assert_eq!(root.attribute("xmlns:g"), Some("http://base.google.com/ns/1.0"));
        assert_eq!(root.text(), None);
        assert_eq!(root.children().len(), 3);
        assert_eq!(root.child("title").unwrap().text(), Some("Widget"));

        let location = root.child("g:location").unwrap();
        assert_eq!(location.text(), Some("Paris"));
        assert_eq!(location.child("latitude").unwrap().text(), Some("48.85"));

        let link = root.child("link").unwrap();
        assert_eq!(link.attribute("href"), Some("http://example.com/w"));
        assert_eq!(link.text(), None);
    }

    #[test]
    fn test_parse_indented_mixed_content() {
        let mut root = XmlElement::new("entry");
        let location = root.add_element("g:location");
        location.set_text("1 Main St");
        location.add_element("latitude").set_text("47.6");
        location.add_element("longitude").set_text("-122.3");
        let document = XmlDocument::new(root);

        let pretty = document.to_pretty_string().unwrap();
        let parsed = XmlDocument::parse(&pretty).unwrap();

        assert_eq!(parsed, document);
        assert_eq!(parsed.root().child("g:location").unwrap().text(), Some("1 Main St"));
    }

    #[test]
    fn test_parse_entities() {
        let xml = "<title a=\"x &amp; y\">Fish &amp; Chips &#65;&#x42;</title>";
        let document = XmlDocument::parse(xml).unwrap();

        assert_eq!(document.root().text(), Some("Fish & Chips AB"));
        assert_eq!(document.root().attribute("a"), Some("x & y"));
    }

    #[test]
    fn test_parse_round_trip_of_writer_output() {
        let mut root = XmlElement::new("entry");
        root.add_element("g:description").set_text("A <small> widget");
        let document = XmlDocument::new(root);

        let parsed = XmlDocument::parse(&document.to_xml_string().unwrap()).unwrap();
        assert_eq!(parsed, document);
    }

    #[test]
    fn test_parse_error_on_unclosed_element() {
        let result = XmlDocument::parse("<entry><title>oops</entry>");
        assert!(matches!(result, Err(FeedError::XmlReader(_))));
    }

    #[test]
    fn test_parse_error_on_empty_input() {
        let result = XmlDocument::parse("");
        match result {
            Err(FeedError::XmlReader(message)) => assert!(message.contains("Missing root")),
            other => panic!("Expected XmlReader error, got {:?}", other),
        }
    }
}
