use std::fmt;
use std::str::FromStr;

use crate::error::{FeedError, FeedResult};

use super::attribute::Attribute;

/// The closed set of attribute variants.
///
/// Each variant fixes how an [`Attribute`] renders: the `type` label it writes, the
/// XML attributes it always carries, the children it declares and whether it renders
/// text at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttributeType {
    #[default]
    Text,
    Bare,
    Url,
    DateTime,
    Int,
    Boolean,
    FloatUnit,
    Location,
    Author,
    Reference,
}

/// Value of a variant-level XML attribute decoration.
#[derive(Clone, Copy)]
pub enum Decoration {
    /// A fixed string.
    Literal(&'static str),
    /// Computed from the attribute being rendered, at render time. `None` skips the attribute.
    Computed(fn(&Attribute) -> Option<String>),
}

impl Decoration {
    pub fn evaluate(&self, attribute: &Attribute) -> Option<String> {
        match self {
            Decoration::Literal(value) => Some((*value).to_string()),
            Decoration::Computed(compute) => compute(attribute),
        }
    }
}

impl fmt::Debug for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoration::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Decoration::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A child attribute declared by a variant, e.g. `latitude` on a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredChild {
    pub key: &'static str,
    pub kind: AttributeType,
    pub namespace: Option<&'static str>,
}

const NO_DECORATIONS: &[(&str, Decoration)] = &[];

const URL_DECORATIONS: &[(&str, Decoration)] = &[
    ("rel", Decoration::Literal("alternate")),
    ("type", Decoration::Literal("text/html")),
    ("href", Decoration::Computed(Attribute::value)),
];

const LOCATION_CHILDREN: &[DeclaredChild] = &[
    DeclaredChild {
        key: "latitude",
        kind: AttributeType::Bare,
        namespace: None,
    },
    DeclaredChild {
        key: "longitude",
        kind: AttributeType::Bare,
        namespace: None,
    },
];

const AUTHOR_CHILDREN: &[DeclaredChild] = &[
    DeclaredChild {
        key: "name",
        kind: AttributeType::Bare,
        namespace: None,
    },
    DeclaredChild {
        key: "email",
        kind: AttributeType::Bare,
        namespace: None,
    },
];

impl AttributeType {
    pub const ALL: [AttributeType; 10] = [
        AttributeType::Text,
        AttributeType::Bare,
        AttributeType::Url,
        AttributeType::DateTime,
        AttributeType::Int,
        AttributeType::Boolean,
        AttributeType::FloatUnit,
        AttributeType::Location,
        AttributeType::Author,
        AttributeType::Reference,
    ];

    /// Looks a symbolic type tag up in the closed tag table.
    pub fn from_tag(tag: &str) -> Option<AttributeType> {
        match tag {
            "text" => Some(AttributeType::Text),
            "bare" => Some(AttributeType::Bare),
            "url" => Some(AttributeType::Url),
            "dateTime" | "date_time" => Some(AttributeType::DateTime),
            "int" => Some(AttributeType::Int),
            "boolean" => Some(AttributeType::Boolean),
            "float_unit" | "floatUnit" => Some(AttributeType::FloatUnit),
            "location" => Some(AttributeType::Location),
            "author" => Some(AttributeType::Author),
            "reference" => Some(AttributeType::Reference),
            _ => None,
        }
    }

    /// Canonical tag of the variant, as accepted by [`resolve`].
    pub fn tag(&self) -> &'static str {
        match self {
            AttributeType::Text => "text",
            AttributeType::Bare => "bare",
            AttributeType::Url => "url",
            AttributeType::DateTime => "dateTime",
            AttributeType::Int => "int",
            AttributeType::Boolean => "boolean",
            AttributeType::FloatUnit => "float_unit",
            AttributeType::Location => "location",
            AttributeType::Author => "author",
            AttributeType::Reference => "reference",
        }
    }

    /// Default value of the `type` XML attribute. Bare and author attributes carry none.
    pub fn type_label(&self) -> Option<&'static str> {
        match self {
            AttributeType::Bare | AttributeType::Author => None,
            AttributeType::FloatUnit => Some("floatUnit"),
            other => Some(other.tag()),
        }
    }

    /// Url attributes render even without a value or children.
    pub fn always_renders(&self) -> bool {
        matches!(self, AttributeType::Url)
    }

    /// Url attributes carry their value in `href` instead of text content.
    pub fn renders_text(&self) -> bool {
        !matches!(self, AttributeType::Url)
    }

    /// Author attributes are always unprefixed.
    pub fn allows_namespace(&self) -> bool {
        !matches!(self, AttributeType::Author)
    }

    pub fn has_units(&self) -> bool {
        matches!(self, AttributeType::FloatUnit)
    }

    pub fn static_decorations(&self) -> &'static [(&'static str, Decoration)] {
        match self {
            AttributeType::Url => URL_DECORATIONS,
            _ => NO_DECORATIONS,
        }
    }

    pub fn declared_children(&self) -> &'static [DeclaredChild] {
        match self {
            AttributeType::Location => LOCATION_CHILDREN,
            AttributeType::Author => AUTHOR_CHILDREN,
            _ => &[],
        }
    }

    pub fn declared_child(&self, key: &str) -> Option<&'static DeclaredChild> {
        self.declared_children().iter().find(|child| child.key == key)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AttributeType {
    type Err = FeedError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        resolve(tag)
    }
}

/// Either a symbolic tag still to be resolved, or an already resolved variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Name(String),
    Resolved(AttributeType),
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        TypeTag::Name(tag.to_string())
    }
}

impl From<String> for TypeTag {
    fn from(tag: String) -> Self {
        TypeTag::Name(tag)
    }
}

impl From<AttributeType> for TypeTag {
    fn from(kind: AttributeType) -> Self {
        TypeTag::Resolved(kind)
    }
}

/// Resolves a type tag to its attribute variant.
///
/// An already resolved variant is returned unchanged.
///
/// # Errors
///
/// Returns [`FeedError::UnknownAttributeType`] when the tag names no variant.
///
/// # Examples
///
/// ```
/// use base_feed::core::attribute_type::{resolve, AttributeType};
///
/// assert_eq!(resolve("float_unit").unwrap(), AttributeType::FloatUnit);
/// assert_eq!(resolve(AttributeType::Url).unwrap(), AttributeType::Url);
/// assert!(resolve("bogus_type").is_err());
/// ```
pub fn resolve(tag: impl Into<TypeTag>) -> FeedResult<AttributeType> {
    match tag.into() {
        TypeTag::Resolved(kind) => Ok(kind),
        TypeTag::Name(name) => {
            AttributeType::from_tag(&name).ok_or(FeedError::UnknownAttributeType(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_canonical_tag_resolves_to_itself() {
        for kind in AttributeType::ALL {
            assert_eq!(resolve(kind.tag()).unwrap(), kind);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(resolve("date_time").unwrap(), AttributeType::DateTime);
        assert_eq!(resolve("floatUnit").unwrap(), AttributeType::FloatUnit);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let kind = resolve("location").unwrap();
        assert_eq!(resolve(kind).unwrap(), kind);
    }

    #[test]
    fn test_unknown_tag() {
        match resolve("bogus_type") {
            Err(FeedError::UnknownAttributeType(tag)) => assert_eq!(tag, "bogus_type"),
            other => panic!("Expected UnknownAttributeType, got {:?}", other),
        }
        assert!("Text".parse::<AttributeType>().is_err());
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(AttributeType::Text.type_label(), Some("text"));
        assert_eq!(AttributeType::DateTime.type_label(), Some("dateTime"));
        assert_eq!(AttributeType::FloatUnit.type_label(), Some("floatUnit"));
        assert_eq!(AttributeType::Bare.type_label(), None);
        assert_eq!(AttributeType::Author.type_label(), None);
    }

    #[test]
    fn test_declared_children() {
        let keys: Vec<_> = AttributeType::Location
            .declared_children()
            .iter()
            .map(|c| c.key)
            .collect();
        assert_eq!(keys, vec!["latitude", "longitude"]);

        let email = AttributeType::Author.declared_child("email").unwrap();
        assert_eq!(email.namespace, None);
        assert!(AttributeType::Text.declared_children().is_empty());
    }

    #[test]
    fn test_url_is_forced_and_textless() {
        assert!(AttributeType::Url.always_renders());
        assert!(!AttributeType::Url.renders_text());
        assert_eq!(AttributeType::Url.static_decorations().len(), 3);
        assert!(AttributeType::Text.static_decorations().is_empty());
    }
}
