/// Minimal namespaced XML tree used to assemble feed documents.
///
/// Attributes and items never write bytes directly. They build an in-memory tree of
/// [`XmlElement`]s (create a child element, set an XML attribute, set text) rooted in an
/// [`XmlDocument`], which is then serialized with `quick-xml`. Element names are kept as
/// qualified names (`g:price`); namespace declarations are plain `xmlns*` attributes on
/// the root element.
///
/// # Examples
///
/// ```
/// use base_feed::xml::{XmlDocument, XmlElement};
///
/// let mut entry = XmlElement::new("entry");
/// entry.set_attribute("xmlns:g", "http://base.google.com/ns/1.0");
/// entry.add_element("g:price").set_text("10 USD");
///
/// let document = XmlDocument::new(entry);
/// let xml = document.to_string();
///
/// assert!(xml.starts_with("<?xml version=\"1.0\""));
/// assert!(xml.contains("<g:price>10 USD</g:price>"));
///
/// let parsed = XmlDocument::parse(&xml).unwrap();
/// assert_eq!(parsed.root().child("g:price").unwrap().text(), Some("10 USD"));
/// ```
pub mod xml_reader;
pub mod xml_writer;

pub use xml_writer::{XmlDocument, XmlElement};
