use serde_json::Value as JsonValue;

use crate::error::{FeedError, FeedResult};
use crate::xml::XmlElement;

use super::attribute_type::{AttributeType, TypeTag, resolve};
use super::value::AttributeValue;

/// Namespace prefix given to top-level attributes that do not name one.
pub const DEFAULT_NAMESPACE: &str = "g";

/// Default configuration of a child attribute: its variant and namespace.
///
/// `namespace: Some(None)` means explicitly unprefixed; `None` leaves the decision to the
/// variant's declared child or the unprefixed default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildShape {
    pub kind: Option<AttributeType>,
    pub namespace: Option<Option<String>>,
}

/// Options record used to build an attribute.
///
/// A bare value converts into an options record holding just that value, so every
/// function taking `impl Into<AttributeOptions>` accepts either form.
///
/// # Examples
///
/// ```
/// use base_feed::core::attribute::AttributeOptions;
///
/// let plain: AttributeOptions = "A widget".into();
/// assert!(plain.value.is_some());
///
/// let price = AttributeOptions::new()
///     .value(50)
///     .units("USD")
///     .type_tag("float_unit")
///     .private(true);
/// assert_eq!(price.units.as_deref(), Some("USD"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeOptions {
    pub value: Option<AttributeValue>,
    pub type_tag: Option<TypeTag>,
    pub namespace: Option<Option<String>>,
    pub type_label: Option<String>,
    pub private: bool,
    pub units: Option<String>,
    pub decorations: Vec<(String, String)>,
    pub children: Vec<(String, AttributeOptions)>,
    pub child_shapes: Vec<(String, ChildShape)>,
}

impl AttributeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: impl Into<AttributeValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn type_tag(mut self, tag: impl Into<TypeTag>) -> Self {
        self.type_tag = Some(tag.into());
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(Some(namespace.to_string()));
        self
    }

    /// Renders the attribute without a namespace prefix.
    pub fn no_namespace(mut self) -> Self {
        self.namespace = Some(None);
        self
    }

    pub fn type_label(mut self, label: &str) -> Self {
        self.type_label = Some(label.to_string());
        self
    }

    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    /// Adds an XML attribute written on the rendered element.
    pub fn decoration(mut self, key: &str, value: &str) -> Self {
        self.decorations.push((key.to_string(), value.to_string()));
        self
    }

    pub fn child(mut self, key: &str, options: impl Into<AttributeOptions>) -> Self {
        self.children.push((key.to_string(), options.into()));
        self
    }

    pub fn child_shape(mut self, key: &str, shape: ChildShape) -> Self {
        self.child_shapes.push((key.to_string(), shape));
        self
    }
}

macro_rules! options_from_value {
    ($($source:ty),*) => {
        $(
            impl From<$source> for AttributeOptions {
                fn from(value: $source) -> Self {
                    AttributeOptions::new().value(value)
                }
            }
        )*
    };
}

options_from_value!(&str, String, &String, bool, i64, i32, u32, f64, AttributeValue);

impl TryFrom<&JsonValue> for AttributeOptions {
    type Error = FeedError;

    /// Interprets a JSON value as an options record.
    ///
    /// Scalars become the value. Objects may carry `value`, `type`, `namespace`
    /// (`null` for unprefixed), `type_label`, `private`, `units`, `decorations` and
    /// `children`; any other key is read as a child attribute.
    fn try_from(json: &JsonValue) -> Result<Self, Self::Error> {
        match json {
            JsonValue::Object(map) => {
                let mut options = AttributeOptions::new();
                for (key, entry) in map {
                    match key.as_str() {
                        "value" => options.value = json_scalar(entry)?,
                        "type" => options.type_tag = Some(json_str(key, entry)?.into()),
                        "namespace" => {
                            options.namespace = Some(match entry {
                                JsonValue::Null => None,
                                other => Some(json_str(key, other)?.to_string()),
                            })
                        }
                        "type_label" => options.type_label = Some(json_str(key, entry)?.to_string()),
                        "private" => {
                            options.private = entry.as_bool().ok_or_else(|| {
                                FeedError::InvalidRecord("'private' must be a boolean".to_string())
                            })?
                        }
                        "units" => options.units = Some(json_str(key, entry)?.to_string()),
                        "decorations" => {
                            let decorations = entry.as_object().ok_or_else(|| {
                                FeedError::InvalidRecord("'decorations' must be an object".to_string())
                            })?;
                            for (name, value) in decorations {
                                options
                                    .decorations
                                    .push((name.clone(), json_str(name, value)?.to_string()));
                            }
                        }
                        "children" => {
                            let children = entry.as_object().ok_or_else(|| {
                                FeedError::InvalidRecord("'children' must be an object".to_string())
                            })?;
                            for (name, child) in children {
                                options.children.push((name.clone(), child.try_into()?));
                            }
                        }
                        _ => options.children.push((key.clone(), entry.try_into()?)),
                    }
                }
                Ok(options)
            }
            JsonValue::Array(_) => Err(FeedError::InvalidRecord(
                "an attribute value cannot be an array".to_string(),
            )),
            scalar => Ok(AttributeOptions {
                value: json_scalar(scalar)?,
                ..Default::default()
            }),
        }
    }
}

fn json_scalar(json: &JsonValue) -> FeedResult<Option<AttributeValue>> {
    match json {
        JsonValue::Null => Ok(None),
        JsonValue::Bool(b) => Ok(Some(AttributeValue::Boolean(*b))),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Ok(Some(AttributeValue::Integer(i))),
            None => n
                .as_f64()
                .map(|f| Some(AttributeValue::Float(f)))
                .ok_or_else(|| FeedError::InvalidRecord(format!("unsupported number {}", n))),
        },
        JsonValue::String(s) => Ok(Some(AttributeValue::Text(s.clone()))),
        other => Err(FeedError::InvalidRecord(format!(
            "expected a scalar value, got {}",
            other
        ))),
    }
}

fn json_str<'a>(key: &str, json: &'a JsonValue) -> FeedResult<&'a str> {
    json.as_str()
        .ok_or_else(|| FeedError::InvalidRecord(format!("'{}' must be a string", key)))
}

/// Rejects anything that is not an unprefixed XML name: a letter or `_`, then letters,
/// digits, `_`, `-` or `.`.
fn check_xml_name(what: &str, name: &str) -> FeedResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FeedError::InvalidRecord(format!("Invalid {}: '{}'", what, name)))
    }
}

/// Options for [`Attribute::render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render the element even if it has neither value nor children.
    pub force: bool,
}

impl RenderOptions {
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// A named, typed value node that renders itself as one decorated XML element.
///
/// The variant ([`AttributeType`]) decides the `type` label, fixed decorations, declared
/// children and text behaviour. Children are kept in insertion order and looked up by key.
///
/// # Examples
///
/// ```
/// use base_feed::core::attribute::{Attribute, AttributeOptions, RenderOptions};
/// use base_feed::core::attribute_type::AttributeType;
/// use base_feed::xml::XmlElement;
///
/// let price = Attribute::new("price", AttributeType::FloatUnit, "42 USD".into()).unwrap();
/// assert_eq!(price.value().as_deref(), Some("42 USD"));
/// assert_eq!(price.units(), Some("USD"));
///
/// let mut entry = XmlElement::new("entry");
/// let element = price.render(&mut entry, RenderOptions::default()).unwrap();
/// assert_eq!(element.name(), "g:price");
/// assert_eq!(element.attribute("type"), Some("floatUnit"));
/// assert_eq!(element.text(), Some("42 USD"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    kind: AttributeType,
    value: Option<AttributeValue>,
    units: Option<String>,
    namespace: Option<String>,
    type_label: Option<String>,
    private: bool,
    decorations: Vec<(String, String)>,
    children: Vec<(String, Attribute)>,
    child_shapes: Vec<(String, ChildShape)>,
}

impl Attribute {
    /// Builds an attribute of an already resolved variant.
    ///
    /// The namespace defaults to [`DEFAULT_NAMESPACE`] unless the options name one or ask
    /// for none. Children found in the options are created through [`Attribute::add_child`],
    /// declared children first.
    ///
    /// # Errors
    ///
    /// - [`FeedError::UnknownAttributeType`] if a child option names an unknown type.
    /// - [`FeedError::InvalidRecord`] if the name, the namespace prefix or a decoration key
    ///   is not a valid XML name.
    pub fn new(
        name: impl Into<String>,
        kind: AttributeType,
        options: AttributeOptions,
    ) -> FeedResult<Attribute> {
        let AttributeOptions {
            value,
            type_tag: _,
            namespace,
            type_label,
            private,
            units,
            decorations,
            children,
            child_shapes,
        } = options;

        let name = name.into();
        check_xml_name("attribute name", &name)?;
        if let Some(Some(prefix)) = &namespace {
            check_xml_name("namespace prefix", prefix)?;
        }
        for (key, _) in &decorations {
            check_xml_name("decoration key", key)?;
        }

        let namespace = if kind.allows_namespace() {
            namespace.unwrap_or_else(|| Some(DEFAULT_NAMESPACE.to_string()))
        } else {
            None
        };

        let mut attribute = Attribute {
            name,
            kind,
            value: None,
            units: None,
            namespace,
            type_label,
            private,
            decorations,
            children: Vec::new(),
            child_shapes,
        };

        match (value, units) {
            (value, Some(units)) if kind.has_units() => {
                attribute.value = value;
                attribute.units = Some(units);
            }
            (Some(value), _) => attribute.set_value(value),
            (None, _) => {}
        }

        attribute.add_default_children(children)?;
        Ok(attribute)
    }

    /// Builds an attribute from an options record, resolving `options.type_tag`
    /// (text when absent).
    pub fn from_options(name: impl Into<String>, options: AttributeOptions) -> FeedResult<Attribute> {
        let kind = match &options.type_tag {
            Some(tag) => resolve(tag.clone())?,
            None => AttributeType::default(),
        };
        Attribute::new(name, kind, options)
    }

    fn add_default_children(&mut self, mut pending: Vec<(String, AttributeOptions)>) -> FeedResult<()> {
        for declared in self.kind.declared_children() {
            if let Some(position) = pending.iter().position(|(key, _)| key == declared.key) {
                let (key, options) = pending.remove(position);
                self.add_child(&key, options)?;
            }
        }
        for (key, options) in pending {
            self.add_child(&key, options)?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the attribute. Unlike [`Attribute::new`], the name is not checked.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> AttributeType {
        self.kind
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Changes the namespace prefix. Ignored for variants that are always unprefixed.
    pub fn set_namespace(&mut self, namespace: Option<&str>) {
        if self.kind.allows_namespace() {
            self.namespace = namespace.map(str::to_string);
        }
    }

    /// Element name as rendered: `namespace:name`, or just `name` when unprefixed.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}:{}", namespace, self.name),
            None => self.name.clone(),
        }
    }

    /// Value of the `type` XML attribute: the explicit override, else the variant's label.
    pub fn type_label(&self) -> Option<&str> {
        if self.kind == AttributeType::Author {
            return None;
        }
        match &self.type_label {
            Some(label) => Some(label),
            None if self.kind == AttributeType::Bare => None,
            None => self.kind.type_label(),
        }
    }

    pub fn set_type_label(&mut self, label: Option<&str>) {
        self.type_label = label.map(str::to_string);
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn set_private(&mut self, private: bool) {
        self.private = private;
    }

    /// Rendered value. Float-unit attributes compose `"<amount> <units>"`.
    pub fn value(&self) -> Option<String> {
        if self.kind.has_units() {
            let amount = self.value.as_ref().map(|v| v.to_string()).unwrap_or_default();
            let units = self.units.as_deref().unwrap_or_default();
            let composed = format!("{} {}", amount, units).trim().to_string();
            return if composed.is_empty() { None } else { Some(composed) };
        }
        self.value.as_ref().map(|v| v.to_string())
    }

    /// The stored value; for float-unit attributes, the amount without units.
    pub fn raw_value(&self) -> Option<&AttributeValue> {
        self.value.as_ref()
    }

    /// Assigns the value.
    ///
    /// On a float-unit attribute a text value is split on whitespace into amount and
    /// units; any other value replaces only the amount.
    pub fn set_value(&mut self, value: impl Into<AttributeValue>) {
        let value = value.into();
        if !self.kind.has_units() {
            self.value = Some(value);
            return;
        }
        match value {
            AttributeValue::Text(text) => {
                let mut parts = text.split_whitespace();
                self.value = parts.next().map(AttributeValue::from);
                self.units = parts.next().map(str::to_string);
            }
            other => self.value = Some(other),
        }
    }

    pub fn clear_value(&mut self) {
        self.value = None;
        self.units = None;
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn set_units(&mut self, units: Option<&str>) {
        self.units = units.map(str::to_string);
    }

    pub fn amount(&self) -> Option<&AttributeValue> {
        self.value.as_ref()
    }

    pub fn amount_as_f64(&self) -> Option<f64> {
        self.value.as_ref().and_then(AttributeValue::as_f64)
    }

    pub fn instance_decorations(&self) -> &[(String, String)] {
        &self.decorations
    }

    /// Sets a per-instance XML attribute; it wins over a variant decoration with the same key.
    pub fn set_decoration(&mut self, key: &str, value: &str) {
        match self.decorations.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.to_string(),
            None => self.decorations.push((key.to_string(), value.to_string())),
        }
    }

    /// Variant decorations evaluated against this attribute, overridden by instance ones.
    pub fn decoration_map(&self) -> Vec<(String, Option<String>)> {
        let mut merged: Vec<(String, Option<String>)> = self
            .kind
            .static_decorations()
            .iter()
            .map(|(key, decoration)| (key.to_string(), decoration.evaluate(self)))
            .collect();

        for (key, value) in &self.decorations {
            match merged.iter_mut().find(|(k, _)| k == key) {
                Some(existing) => existing.1 = Some(value.clone()),
                None => merged.push((key.clone(), Some(value.clone()))),
            }
        }
        merged
    }

    /// Renders this attribute as a new child element of `parent`.
    ///
    /// Nothing is added and `None` is returned when the attribute has no value, no
    /// children and rendering is not forced. Url attributes are always rendered.
    pub fn render<'p>(
        &self,
        parent: &'p mut XmlElement,
        options: RenderOptions,
    ) -> Option<&'p mut XmlElement> {
        let value = self.value();
        let force = options.force || self.kind.always_renders();
        if value.is_none() && self.children.is_empty() && !force {
            return None;
        }

        let element = parent.add_element(self.qualified_name());

        if let Some(label) = self.type_label().filter(|label| !label.is_empty()) {
            element.set_attribute("type", label);
        }
        if self.private {
            element.set_attribute("access", "private");
        }
        for (key, decoration) in self.decoration_map() {
            if let Some(decoration) = decoration {
                element.set_attribute(key, decoration);
            }
        }

        if self.kind.renders_text() {
            if let Some(value) = value {
                element.set_text(value);
            }
        }

        for (_, child) in &self.children {
            child.render(&mut *element, RenderOptions::default());
        }

        Some(element)
    }

    /// Adds (or replaces) the child stored under `key`.
    ///
    /// The child's configuration is the shape configured for `key` (options child shapes
    /// first, then the variant's declared child) overridden by `options`. Children are
    /// bare and unprefixed unless configured otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::UnknownAttributeType`] if `options` names an unknown type.
    pub fn add_child(
        &mut self,
        key: &str,
        options: impl Into<AttributeOptions>,
    ) -> FeedResult<&mut Attribute> {
        let mut options = options.into();
        let declared = self.kind.declared_child(key);
        let shape = self
            .child_shapes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, shape)| shape);

        let kind = match &options.type_tag {
            Some(tag) => resolve(tag.clone())?,
            None => shape
                .and_then(|s| s.kind)
                .or(declared.map(|d| d.kind))
                .unwrap_or(AttributeType::Bare),
        };

        let namespace = match options.namespace.take() {
            Some(namespace) => namespace,
            None => match shape.and_then(|s| s.namespace.clone()) {
                Some(namespace) => namespace,
                None => declared.and_then(|d| d.namespace).map(str::to_string),
            },
        };
        options.namespace = Some(namespace);

        let child = Attribute::new(key, kind, options)?;
        Ok(self.add_child_attribute(key, child))
    }

    /// Stores a prebuilt attribute as the child `key`, replacing any previous one in place.
    pub fn add_child_attribute(&mut self, key: &str, child: Attribute) -> &mut Attribute {
        let position = match self.children.iter().position(|(k, _)| k == key) {
            Some(position) => {
                self.children[position].1 = child;
                position
            }
            None => {
                self.children.push((key.to_string(), child));
                self.children.len() - 1
            }
        };
        &mut self.children[position].1
    }

    pub fn child(&self, key: &str) -> Option<&Attribute> {
        self.children.iter().find(|(k, _)| k == key).map(|(_, c)| c)
    }

    pub fn child_mut(&mut self, key: &str) -> Option<&mut Attribute> {
        self.children.iter_mut().find(|(k, _)| k == key).map(|(_, c)| c)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.children.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child_value(&self, key: &str) -> Option<String> {
        self.child(key).and_then(Attribute::value)
    }

    /// Sets the value of child `key`, creating the child from its default shape if needed.
    pub fn set_child_value(&mut self, key: &str, value: impl Into<AttributeValue>) -> FeedResult<()> {
        match self.child_mut(key) {
            Some(child) => child.set_value(value),
            None => {
                self.add_child(key, AttributeOptions::new().value(value))?;
            }
        }
        Ok(())
    }

    pub fn latitude(&self) -> Option<String> {
        self.child_value("latitude")
    }

    pub fn set_latitude(&mut self, latitude: impl Into<AttributeValue>) -> FeedResult<()> {
        self.set_child_value("latitude", latitude)
    }

    pub fn longitude(&self) -> Option<String> {
        self.child_value("longitude")
    }

    pub fn set_longitude(&mut self, longitude: impl Into<AttributeValue>) -> FeedResult<()> {
        self.set_child_value("longitude", longitude)
    }

    /// The `name` child of an author attribute.
    pub fn author_name(&self) -> Option<String> {
        self.child_value("name")
    }

    pub fn set_author_name(&mut self, name: impl Into<AttributeValue>) -> FeedResult<()> {
        self.set_child_value("name", name)
    }

    pub fn email(&self) -> Option<String> {
        self.child_value("email")
    }

    pub fn set_email(&mut self, email: impl Into<AttributeValue>) -> FeedResult<()> {
        self.set_child_value("email", email)
    }
}
