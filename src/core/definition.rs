use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FeedError, FeedResult};

use super::attribute::ChildShape;
use super::attribute_type::resolve;

/// Configuration of one attribute key on an item class.
///
/// Every field is optional: the type tag used when the caller passes none, the rendered
/// name when it differs from the key, the namespace default and child shapes.
///
/// In JSON, `"namespace": null` means explicitly unprefixed while an absent `namespace`
/// leaves the default in place.
///
/// # Examples
///
/// ```
/// use base_feed::core::definition::AttributeDefinition;
///
/// let link = AttributeDefinition::of_type("url").unprefixed();
/// assert_eq!(link.namespace, Some(None));
///
/// let parsed: AttributeDefinition =
///     serde_json::from_str(r#"{"type": "url", "namespace": null}"#).unwrap();
/// assert_eq!(parsed, link);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_to: Option<String>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub namespace: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, ChildDefinition>,
}

/// Default shape of a child attribute, as declared in a definition table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub namespace: Option<Option<String>>,
}

fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl AttributeDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_type(tag: &str) -> Self {
        Self::new().type_tag(tag)
    }

    pub fn type_tag(mut self, tag: &str) -> Self {
        self.type_tag = Some(tag.to_string());
        self
    }

    pub fn renamed_to(mut self, name: &str) -> Self {
        self.renamed_to = Some(name.to_string());
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(Some(namespace.to_string()));
        self
    }

    pub fn unprefixed(mut self) -> Self {
        self.namespace = Some(None);
        self
    }

    pub fn child(mut self, key: &str, child: ChildDefinition) -> Self {
        self.children.insert(key.to_string(), child);
        self
    }

    /// Child shapes with their type tags resolved.
    pub fn child_shapes(&self) -> FeedResult<Vec<(String, ChildShape)>> {
        self.children
            .iter()
            .map(|(key, child)| Ok((key.clone(), child.to_shape()?)))
            .collect()
    }

    fn validate(&self) -> FeedResult<()> {
        if let Some(tag) = &self.type_tag {
            resolve(tag.as_str())?;
        }
        self.child_shapes().map(|_| ())
    }
}

impl ChildDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_tag(mut self, tag: &str) -> Self {
        self.type_tag = Some(tag.to_string());
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(Some(namespace.to_string()));
        self
    }

    pub fn unprefixed(mut self) -> Self {
        self.namespace = Some(None);
        self
    }

    pub fn to_shape(&self) -> FeedResult<ChildShape> {
        let kind = match &self.type_tag {
            Some(tag) => Some(resolve(tag.as_str())?),
            None => None,
        };
        Ok(ChildShape {
            kind,
            namespace: self.namespace.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
struct ItemClassTable {
    parent: Option<String>,
    /// Entries declared on this class only.
    own: HashMap<String, AttributeDefinition>,
    /// `own` laid over every ancestor's entries.
    merged: HashMap<String, AttributeDefinition>,
}

/// Per item class attribute definitions, already merged along the ancestor chain.
///
/// Each class keeps its own entries apart from the merged view, so a registry extended
/// with new ancestor entries or a new parent is re-merged as a whole.
///
/// A registry is produced once by [`AttributeDefinitionRegistryBuilder::build`] and is
/// read-only afterwards, so it can be shared between threads behind an `Arc`.
///
/// # Examples
///
/// ```
/// use base_feed::core::definition::{AttributeDefinition, AttributeDefinitionRegistry};
///
/// let registry = AttributeDefinitionRegistry::builder()
///     .item_class("base", None)
///     .define_attributes("base", [
///         ("price", AttributeDefinition::of_type("text")),
///         ("label", AttributeDefinition::of_type("text")),
///     ])
///     .item_class("product", Some("base"))
///     .define_attributes("product", [("price", AttributeDefinition::of_type("float_unit"))])
///     .build()
///     .unwrap();
///
/// let price = registry.attribute_definition("product", "price").unwrap();
/// assert_eq!(price.type_tag.as_deref(), Some("float_unit"));
/// assert!(registry.attribute_definition("product", "label").is_some());
/// assert_eq!(
///     registry.attribute_definition("base", "price").unwrap().type_tag.as_deref(),
///     Some("text")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct AttributeDefinitionRegistry {
    classes: HashMap<String, ItemClassTable>,
}

impl AttributeDefinitionRegistry {
    pub fn builder() -> AttributeDefinitionRegistryBuilder {
        AttributeDefinitionRegistryBuilder::new()
    }

    /// Starts a builder that adds classes on top of the ones already registered here.
    pub fn extend(&self) -> AttributeDefinitionRegistryBuilder {
        AttributeDefinitionRegistryBuilder {
            base: self.classes.clone(),
            declarations: Vec::new(),
        }
    }

    /// Definition of `key` for `class`; the most specific class in the ancestor chain wins.
    pub fn attribute_definition(&self, class: &str, key: &str) -> Option<&AttributeDefinition> {
        self.classes.get(class)?.merged.get(key)
    }

    pub fn contains_class(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    pub fn parent(&self, class: &str) -> Option<&str> {
        self.classes.get(class)?.parent.as_deref()
    }

    /// The class followed by its ancestors, nearest first.
    pub fn ancestors(&self, class: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.classes.get_key_value(class);
        while let Some((name, table)) = current {
            chain.push(name.as_str());
            current = table
                .parent
                .as_deref()
                .and_then(|parent| self.classes.get_key_value(parent));
        }
        chain
    }

    /// Keys defined for `class`, sorted.
    pub fn attribute_keys(&self, class: &str) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .classes
            .get(class)
            .map(|table| table.merged.keys().map(String::as_str).collect())
            .unwrap_or_default();
        keys.sort_unstable();
        keys
    }
}

struct ClassDeclaration {
    name: String,
    parent: Option<String>,
    definitions: Vec<(String, AttributeDefinition)>,
}

/// Builder collecting item class declarations and their attribute definitions.
///
/// Parents must be declared before their subclasses. Calling `define_attributes` on a
/// class that was not declared declares it as a root class.
#[derive(Default)]
pub struct AttributeDefinitionRegistryBuilder {
    base: HashMap<String, ItemClassTable>,
    declarations: Vec<ClassDeclaration>,
}

impl AttributeDefinitionRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an item class, optionally extending `parent`.
    pub fn item_class(mut self, name: &str, parent: Option<&str>) -> Self {
        let parent = parent.map(str::to_string);
        match self.declaration_mut(name) {
            Some(declaration) => declaration.parent = parent,
            None => self.declarations.push(ClassDeclaration {
                name: name.to_string(),
                parent,
                definitions: Vec::new(),
            }),
        }
        self
    }

    /// Merges `definitions` into the class's own table. A key defined twice keeps the last entry.
    pub fn define_attributes<I, K>(mut self, class: &str, definitions: I) -> Self
    where
        I: IntoIterator<Item = (K, AttributeDefinition)>,
        K: Into<String>,
    {
        if self.declaration_mut(class).is_none() {
            self = self.item_class(class, None);
        }
        if let Some(declaration) = self.declaration_mut(class) {
            for (key, definition) in definitions {
                let key = key.into();
                match declaration.definitions.iter_mut().find(|(k, _)| *k == key) {
                    Some(existing) => existing.1 = definition,
                    None => declaration.definitions.push((key, definition)),
                }
            }
        }
        self
    }

    /// Same as [`define_attributes`](Self::define_attributes), reading a JSON object of
    /// `key -> definition`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidRecord`] if the JSON is not such an object.
    pub fn define_attributes_json(self, class: &str, json: &str) -> FeedResult<Self> {
        let definitions: BTreeMap<String, AttributeDefinition> = serde_json::from_str(json)
            .map_err(|e| FeedError::InvalidRecord(format!("Invalid definition table: {}", e)))?;
        Ok(self.define_attributes(class, definitions))
    }

    fn declaration_mut(&mut self, name: &str) -> Option<&mut ClassDeclaration> {
        self.declarations.iter_mut().find(|d| d.name == name)
    }

    /// Merges every class's table over its parent's and validates all type tags.
    ///
    /// Classes carried over from an extended registry are re-merged too, so entries
    /// added to an ancestor reach every descendant.
    ///
    /// # Errors
    ///
    /// - [`FeedError::UnknownItemClass`] if a parent is not declared before its subclass.
    /// - [`FeedError::UnknownAttributeType`] if a definition names an unknown type.
    /// - [`FeedError::InvalidRecord`] if the class hierarchy has a cycle.
    pub fn build(self) -> FeedResult<AttributeDefinitionRegistry> {
        let mut classes = self.base;

        for declaration in self.declarations {
            if let Some(parent) = &declaration.parent {
                if !classes.contains_key(parent) {
                    return Err(FeedError::UnknownItemClass(parent.clone()));
                }
            }

            let table = classes.entry(declaration.name).or_default();
            if declaration.parent.is_some() {
                table.parent = declaration.parent;
            }
            for (key, definition) in declaration.definitions {
                definition.validate()?;
                table.own.insert(key, definition);
            }
        }

        let mut merged = Vec::with_capacity(classes.len());
        for name in classes.keys() {
            merged.push((name.clone(), merge_chain(&classes, name)?));
        }
        for (name, definitions) in merged {
            debug!(
                "Registered item class '{}' with {} attribute definitions",
                name,
                definitions.len()
            );
            if let Some(table) = classes.get_mut(&name) {
                table.merged = definitions;
            }
        }

        Ok(AttributeDefinitionRegistry { classes })
    }
}

/// Lays the own entries of `class` and its ancestors over each other, root first.
fn merge_chain(
    classes: &HashMap<String, ItemClassTable>,
    class: &str,
) -> FeedResult<HashMap<String, AttributeDefinition>> {
    let mut chain: Vec<&ItemClassTable> = Vec::new();
    let mut current = Some(class);
    while let Some(name) = current {
        let table = classes
            .get(name)
            .ok_or_else(|| FeedError::UnknownItemClass(name.to_string()))?;
        if chain.len() >= classes.len() {
            return Err(FeedError::InvalidRecord(format!(
                "Item class '{}' inherits from itself",
                class
            )));
        }
        chain.push(table);
        current = table.parent.as_deref();
    }

    let mut merged = HashMap::new();
    for table in chain.iter().rev() {
        merged.extend(
            table
                .own
                .iter()
                .map(|(key, definition)| (key.clone(), definition.clone())),
        );
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute_type::AttributeType;

    fn hierarchy() -> AttributeDefinitionRegistry {
        AttributeDefinitionRegistry::builder()
            .item_class("base", None)
            .define_attributes(
                "base",
                [
                    ("price", AttributeDefinition::of_type("text")),
                    ("label", AttributeDefinition::of_type("text")),
                ],
            )
            .item_class("product", Some("base"))
            .define_attributes("product", [("price", AttributeDefinition::of_type("float_unit"))])
            .item_class("book", Some("product"))
            .define_attributes("book", [("isbn", AttributeDefinition::new().renamed_to("id"))])
            .build()
            .unwrap()
    }

    #[test]
    fn test_subclass_entry_overrides_ancestor() {
        let registry = hierarchy();

        let price = registry.attribute_definition("product", "price").unwrap();
        assert_eq!(price.type_tag.as_deref(), Some("float_unit"));
        assert!(registry.attribute_definition("product", "label").is_some());
        assert_eq!(
            registry.attribute_definition("base", "price").unwrap().type_tag.as_deref(),
            Some("text")
        );
    }

    #[test]
    fn test_grandchild_sees_whole_chain() {
        let registry = hierarchy();

        assert_eq!(
            registry.attribute_definition("book", "price").unwrap().type_tag.as_deref(),
            Some("float_unit")
        );
        assert!(registry.attribute_definition("book", "label").is_some());
        assert!(registry.attribute_definition("product", "isbn").is_none());
        assert_eq!(registry.ancestors("book"), vec!["book", "product", "base"]);
        assert_eq!(registry.parent("book"), Some("product"));
        assert_eq!(registry.attribute_keys("book"), vec!["isbn", "label", "price"]);
    }

    #[test]
    fn test_define_attributes_merges_repeated_calls() {
        let registry = AttributeDefinitionRegistry::builder()
            .define_attributes("item", [("a", AttributeDefinition::of_type("int"))])
            .define_attributes("item", [("b", AttributeDefinition::of_type("url"))])
            .define_attributes("item", [("a", AttributeDefinition::of_type("boolean"))])
            .build()
            .unwrap();

        assert!(registry.contains_class("item"));
        assert_eq!(registry.parent("item"), None);
        assert_eq!(
            registry.attribute_definition("item", "a").unwrap().type_tag.as_deref(),
            Some("boolean")
        );
        assert!(registry.attribute_definition("item", "b").is_some());
    }

    #[test]
    fn test_unknown_parent() {
        let result = AttributeDefinitionRegistry::builder()
            .item_class("product", Some("missing"))
            .build();

        match result {
            Err(FeedError::UnknownItemClass(name)) => assert_eq!(name, "missing"),
            other => panic!("Expected UnknownItemClass, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected_eagerly() {
        let result = AttributeDefinitionRegistry::builder()
            .define_attributes("item", [("a", AttributeDefinition::of_type("bogus_type"))])
            .build();
        assert!(matches!(result, Err(FeedError::UnknownAttributeType(_))));

        let result = AttributeDefinitionRegistry::builder()
            .define_attributes(
                "item",
                [(
                    "a",
                    AttributeDefinition::new().child("x", ChildDefinition::new().type_tag("nope")),
                )],
            )
            .build();
        assert!(matches!(result, Err(FeedError::UnknownAttributeType(_))));
    }

    #[test]
    fn test_extend_existing_registry() {
        let registry = hierarchy()
            .extend()
            .item_class("car", Some("product"))
            .define_attributes("car", [("mileage", AttributeDefinition::of_type("int"))])
            .build()
            .unwrap();

        assert!(registry.attribute_definition("car", "mileage").is_some());
        assert!(registry.attribute_definition("car", "label").is_some());
        assert!(registry.attribute_definition("book", "isbn").is_some());
    }

    #[test]
    fn test_extension_of_ancestor_reaches_descendants() {
        let registry = hierarchy()
            .extend()
            .define_attributes("base", [("warranty", AttributeDefinition::of_type("int"))])
            .build()
            .unwrap();

        for class in ["base", "product", "book"] {
            let warranty = registry.attribute_definition(class, "warranty").unwrap();
            assert_eq!(warranty.type_tag.as_deref(), Some("int"));
        }
        assert_eq!(registry.parent("book"), Some("product"));
    }

    #[test]
    fn test_redeclared_class_keeps_own_entries() {
        let registry = hierarchy()
            .extend()
            .item_class("product", Some("base"))
            .define_attributes("product", [("colour", AttributeDefinition::of_type("text"))])
            .build()
            .unwrap();

        assert_eq!(
            registry.attribute_definition("product", "price").unwrap().type_tag.as_deref(),
            Some("float_unit")
        );
        assert!(registry.attribute_definition("product", "colour").is_some());
        assert!(registry.attribute_definition("book", "colour").is_some());
        assert!(registry.attribute_definition("book", "isbn").is_some());
    }

    #[test]
    fn test_reparenting_into_a_cycle_fails() {
        let result = hierarchy().extend().item_class("base", Some("book")).build();
        assert!(matches!(result, Err(FeedError::InvalidRecord(_))));
    }

    #[test]
    fn test_definitions_from_json() {
        let json = r#"{
            "link": { "type": "url", "namespace": null },
            "unique_id": { "renamed_to": "id" },
            "shipping": { "children": { "region": { "type": "text", "namespace": "g" } } }
        }"#;
        let registry = AttributeDefinitionRegistry::builder()
            .define_attributes_json("item", json)
            .unwrap()
            .build()
            .unwrap();

        let link = registry.attribute_definition("item", "link").unwrap();
        assert_eq!(link.namespace, Some(None));
        let unique_id = registry.attribute_definition("item", "unique_id").unwrap();
        assert_eq!(unique_id.namespace, None);
        assert_eq!(unique_id.renamed_to.as_deref(), Some("id"));

        let shapes = registry
            .attribute_definition("item", "shipping")
            .unwrap()
            .child_shapes()
            .unwrap();
        assert_eq!(shapes[0].0, "region");
        assert_eq!(shapes[0].1.kind, Some(AttributeType::Text));
        assert_eq!(shapes[0].1.namespace, Some(Some("g".to_string())));
    }

    #[test]
    fn test_definitions_from_invalid_json() {
        let result = AttributeDefinitionRegistry::builder().define_attributes_json("item", "[1, 2]");
        assert!(matches!(result, Err(FeedError::InvalidRecord(_))));
    }
}
