use std::sync::Arc;

use log::debug;
use serde_json::Value as JsonValue;

use crate::error::{FeedError, FeedResult};
use crate::xml::{XmlDocument, XmlElement};

use super::attribute::{Attribute, AttributeOptions, RenderOptions};
use super::attribute_type::{AttributeType, resolve};
use super::definition::AttributeDefinitionRegistry;
use super::value::AttributeValue;

pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
pub const BASE_NAMESPACE: &str = "http://base.google.com/ns/1.0";
pub const APP_NAMESPACE: &str = "http://www.w3.org/2007/app";
pub const METADATA_NAMESPACE: &str = "http://base.google.com/ns-metadata/1.0";
pub const CATEGORY_SCHEME: &str = "http://www.google.com/type";
pub const CATEGORY_TERM: &str = "googlebase.item";

const UNIQUE_ID_KEY: &str = "unique_id";

/// Settings of the Atom `entry` envelope written by [`Item::to_document_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryConfig {
    namespaces: Vec<(String, String)>,
    category_scheme: String,
    category_term: String,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            namespaces: vec![
                (String::new(), ATOM_NAMESPACE.to_string()),
                ("g".to_string(), BASE_NAMESPACE.to_string()),
                ("app".to_string(), APP_NAMESPACE.to_string()),
                ("gm".to_string(), METADATA_NAMESPACE.to_string()),
            ],
            category_scheme: CATEGORY_SCHEME.to_string(),
            category_term: CATEGORY_TERM.to_string(),
        }
    }
}

impl EntryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares (or redeclares) a namespace prefix. An empty prefix sets the default namespace.
    pub fn namespace(mut self, prefix: &str, uri: &str) -> Self {
        match self.namespaces.iter_mut().find(|(p, _)| p == prefix) {
            Some(existing) => existing.1 = uri.to_string(),
            None => self.namespaces.push((prefix.to_string(), uri.to_string())),
        }
        self
    }

    pub fn category(mut self, scheme: &str, term: &str) -> Self {
        self.category_scheme = scheme.to_string();
        self.category_term = term.to_string();
        self
    }

    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }
}

/// Structured input used to construct an [`Item`] in one step.
///
/// # Examples
///
/// ```
/// use base_feed::core::item::ItemRecord;
///
/// let record = ItemRecord::new()
///     .title("Widget")
///     .attribute("description", "A widget")
///     .attribute("link", "http://example.com/w");
/// assert_eq!(record.attributes().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemRecord {
    title: Option<String>,
    draft: Option<bool>,
    base_id: Option<String>,
    unique_id: Option<String>,
    attributes: Vec<(String, AttributeOptions)>,
}

impl ItemRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn draft(mut self, draft: bool) -> Self {
        self.draft = Some(draft);
        self
    }

    pub fn base_id(mut self, base_id: &str) -> Self {
        self.base_id = Some(base_id.to_string());
        self
    }

    pub fn unique_id(mut self, unique_id: &str) -> Self {
        self.unique_id = Some(unique_id.to_string());
        self
    }

    /// Adds an attribute entry. The same key may be given several times.
    pub fn attribute(mut self, key: &str, options: impl Into<AttributeOptions>) -> Self {
        self.attributes.push((key.to_string(), options.into()));
        self
    }

    pub fn attributes(&self) -> &[(String, AttributeOptions)] {
        &self.attributes
    }

    /// Reads a record from a JSON object.
    ///
    /// `title`, `draft`, `base_id` and `unique_id` fill the item fields; every other key is
    /// an attribute. Arrays give one attribute per element and `null` entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidRecord`] when the JSON does not have that shape.
    pub fn from_json(json: &JsonValue) -> FeedResult<ItemRecord> {
        let map = json
            .as_object()
            .ok_or_else(|| FeedError::InvalidRecord("an item record must be an object".to_string()))?;

        let mut record = ItemRecord::new();
        for (key, entry) in map {
            if entry.is_null() {
                continue;
            }
            match key.as_str() {
                "title" => record.title = Some(json_text(key, entry)?),
                "base_id" => record.base_id = Some(json_text(key, entry)?),
                "unique_id" => record.unique_id = Some(json_text(key, entry)?),
                "draft" => {
                    record.draft = Some(entry.as_bool().ok_or_else(|| {
                        FeedError::InvalidRecord("'draft' must be a boolean".to_string())
                    })?)
                }
                _ => match entry {
                    JsonValue::Array(values) => {
                        for value in values.iter().filter(|v| !v.is_null()) {
                            record.attributes.push((key.clone(), value.try_into()?));
                        }
                    }
                    value => record.attributes.push((key.clone(), value.try_into()?)),
                },
            }
        }
        Ok(record)
    }
}

fn json_text(key: &str, json: &JsonValue) -> FeedResult<String> {
    match json {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        _ => Err(FeedError::InvalidRecord(format!("'{}' must be a string", key))),
    }
}

/// A feed item: title, identifiers, draft flag and an ordered list of typed attributes.
///
/// Every attribute goes through [`Item::add_attribute`], which consults the item class's
/// definitions in the shared [`AttributeDefinitionRegistry`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use base_feed::core::definition::{AttributeDefinition, AttributeDefinitionRegistry};
/// use base_feed::core::item::{Item, ItemRecord};
///
/// let registry = Arc::new(
///     AttributeDefinitionRegistry::builder()
///         .define_attributes("widget", [
///             ("description", AttributeDefinition::of_type("text")),
///             ("link", AttributeDefinition::of_type("url").unprefixed()),
///         ])
///         .build()
///         .unwrap(),
/// );
///
/// let record = ItemRecord::new()
///     .title("Widget")
///     .attribute("description", "A widget")
///     .attribute("link", "http://example.com/w");
/// let item = Item::from_record(registry, "widget", record).unwrap();
///
/// let xml = item.to_document().to_string();
/// assert!(xml.contains("<g:description type=\"text\">A widget</g:description>"));
/// assert!(xml.contains("href=\"http://example.com/w\""));
/// ```
#[derive(Debug, Clone)]
pub struct Item {
    registry: Arc<AttributeDefinitionRegistry>,
    class: String,
    /// Title of the item.
    pub title: Option<String>,
    /// Identifier assigned by the remote service once the item is created.
    pub base_id: Option<String>,
    /// Caller-side identifier; must stay stable across submissions.
    pub unique_id: Option<String>,
    pub draft: bool,
    attributes: Vec<Attribute>,
}

impl Item {
    /// Creates an empty item of `class`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::UnknownItemClass`] if the registry does not know `class`.
    pub fn new(registry: Arc<AttributeDefinitionRegistry>, class: &str) -> FeedResult<Item> {
        if !registry.contains_class(class) {
            return Err(FeedError::UnknownItemClass(class.to_string()));
        }
        Ok(Item {
            registry,
            class: class.to_string(),
            title: None,
            base_id: None,
            unique_id: None,
            draft: false,
            attributes: Vec::new(),
        })
    }

    pub fn from_record(
        registry: Arc<AttributeDefinitionRegistry>,
        class: &str,
        record: ItemRecord,
    ) -> FeedResult<Item> {
        let mut item = Item::new(registry, class)?;
        item.apply_record(record)?;
        Ok(item)
    }

    pub fn from_json(
        registry: Arc<AttributeDefinitionRegistry>,
        class: &str,
        json: &JsonValue,
    ) -> FeedResult<Item> {
        Item::from_record(registry, class, ItemRecord::from_json(json)?)
    }

    /// Copies the record's fields and appends its attributes, in order.
    pub fn apply_record(&mut self, record: ItemRecord) -> FeedResult<()> {
        if record.title.is_some() {
            self.title = record.title;
        }
        if record.base_id.is_some() {
            self.base_id = record.base_id;
        }
        if let Some(draft) = record.draft {
            self.draft = draft;
        }
        if let Some(unique_id) = record.unique_id {
            self.set_unique_id(&unique_id)?;
        }
        for (key, options) in record.attributes {
            self.add_attribute(&key, options)?;
        }
        Ok(())
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    pub fn registry(&self) -> &Arc<AttributeDefinitionRegistry> {
        &self.registry
    }

    /// Builds an attribute for `key` and appends it.
    ///
    /// The type is `options.type_tag`, else the definition's type, else text. The namespace
    /// is the options', else the definition's, else the default. The rendered name is the
    /// definition's `renamed_to`, else `key`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::UnknownAttributeType`] if the effective type tag is unknown.
    pub fn add_attribute(
        &mut self,
        key: &str,
        options: impl Into<AttributeOptions>,
    ) -> FeedResult<&mut Attribute> {
        let mut options = options.into();
        let definition = self.registry.attribute_definition(&self.class, key);

        let kind = match (&options.type_tag, definition.and_then(|d| d.type_tag.as_deref())) {
            (Some(tag), _) => resolve(tag.clone())?,
            (None, Some(tag)) => resolve(tag)?,
            (None, None) => AttributeType::Text,
        };

        let name = match definition {
            Some(definition) => {
                if options.namespace.is_none() {
                    options.namespace = definition.namespace.clone();
                }
                options.child_shapes.extend(definition.child_shapes()?);
                definition.renamed_to.clone().unwrap_or_else(|| key.to_string())
            }
            None => key.to_string(),
        };

        let attribute = Attribute::new(name, kind, options)?;
        debug!(
            "Adding attribute '{}' as {} to item class '{}'",
            attribute.qualified_name(),
            kind,
            self.class
        );

        let index = self.attributes.len();
        self.attributes.push(attribute);
        Ok(&mut self.attributes[index])
    }

    /// Sets the caller-side identifier and records it as an attribute, replacing the one
    /// recorded by an earlier call.
    pub fn set_unique_id(&mut self, unique_id: &str) -> FeedResult<()> {
        let name = self
            .registry
            .attribute_definition(&self.class, UNIQUE_ID_KEY)
            .and_then(|definition| definition.renamed_to.clone())
            .unwrap_or_else(|| UNIQUE_ID_KEY.to_string());
        self.remove_attributes(&name);

        self.unique_id = Some(unique_id.to_string());
        self.add_attribute(UNIQUE_ID_KEY, AttributeValue::from(unique_id))?;
        Ok(())
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// First attribute whose rendered name is `name`.
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn get_attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.name() == name)
    }

    /// All attributes whose rendered name is `name`, in insertion order.
    pub fn get_attributes(&self, name: &str) -> Vec<&Attribute> {
        self.attributes.iter().filter(|a| a.name() == name).collect()
    }

    /// Marks every attribute named `name` private (or public). Returns how many matched.
    pub fn set_attribute_private(&mut self, name: &str, private: bool) -> usize {
        let mut count = 0;
        for attribute in self.attributes.iter_mut().filter(|a| a.name() == name) {
            attribute.set_private(private);
            count += 1;
        }
        count
    }

    /// Removes every attribute named `name`. Returns how many were removed.
    pub fn remove_attributes(&mut self, name: &str) -> usize {
        let before = self.attributes.len();
        self.attributes.retain(|a| a.name() != name);
        before - self.attributes.len()
    }

    pub fn to_document(&self) -> XmlDocument {
        self.to_document_with(&EntryConfig::default())
    }

    /// Assembles the Atom entry: namespace declarations, category, optional draft
    /// control, title, then every attribute in insertion order.
    pub fn to_document_with(&self, config: &EntryConfig) -> XmlDocument {
        let mut entry = XmlElement::new("entry");
        for (prefix, uri) in &config.namespaces {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            entry.set_attribute(key, uri.as_str());
        }

        let category = entry.add_element("category");
        category.set_attribute("scheme", config.category_scheme.as_str());
        category.set_attribute("term", config.category_term.as_str());

        if self.draft {
            entry
                .add_element("app:control")
                .add_element("app:draft")
                .set_text("yes");
        }

        let title = entry.add_element("title");
        if let Some(text) = &self.title {
            title.set_text(text.as_str());
        }

        let rendered = self
            .attributes
            .iter()
            .filter(|attribute| attribute.render(&mut entry, RenderOptions::default()).is_some())
            .count();
        debug!(
            "Assembled entry for item class '{}' with {} of {} attributes rendered",
            self.class,
            rendered,
            self.attributes.len()
        );

        XmlDocument::new(entry)
    }
}
