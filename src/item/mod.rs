//! Standard item classes and their typed setters.
//!
//! [`standard_registry`] holds the definitions of the `universal` and `product` classes;
//! [`UniversalItem`] and [`ProductItem`] wrap an [`Item`](crate::core::item::Item) of
//! those classes and expose one setter per known attribute. Setters only forward to
//! [`Item::add_attribute`](crate::core::item::Item::add_attribute).

use std::sync::{Arc, OnceLock};

use crate::core::definition::{AttributeDefinition, AttributeDefinitionRegistry, AttributeDefinitionRegistryBuilder};
use crate::error::FeedResult;

/// Deprecated aliases kept for callers of the older setter names.
pub mod compat;

/// The `product` item class.
pub mod product;

/// The `universal` item class.
pub mod universal;

pub use compat::{LegacyProductSetters, LegacyUniversalSetters};
pub use product::{ProductAttributes, ProductItem};
pub use universal::{UniversalAttributes, UniversalItem};

pub const UNIVERSAL_CLASS: &str = "universal";
pub const PRODUCT_CLASS: &str = "product";

static STANDARD_REGISTRY: OnceLock<Arc<AttributeDefinitionRegistry>> = OnceLock::new();

/// Builder pre-filled with the standard classes, for registries extending them.
pub fn standard_registry_builder() -> AttributeDefinitionRegistryBuilder {
    let text = || AttributeDefinition::of_type("text");

    AttributeDefinitionRegistry::builder()
        .item_class(UNIVERSAL_CLASS, None)
        .define_attributes(
            UNIVERSAL_CLASS,
            [
                ("description", text()),
                ("contact_phone", text()),
                ("item_type", text()),
                ("target_country", text()),
                ("item_language", text()),
                ("application", text()),
                ("label", text()),
                ("link", AttributeDefinition::of_type("url").unprefixed()),
                ("expiration_date", AttributeDefinition::of_type("dateTime")),
                ("image_link", AttributeDefinition::of_type("bare")),
                ("unique_id", text().renamed_to("id")),
                ("author", AttributeDefinition::of_type("author")),
            ],
        )
        .item_class(PRODUCT_CLASS, Some(UNIVERSAL_CLASS))
        .define_attributes(
            PRODUCT_CLASS,
            [
                ("condition", text()),
                ("delivery_notes", text()),
                ("department", text()),
                ("payment", text()),
                ("payment_notes", text()),
                ("price_type", text()),
                ("price_units", text()),
                ("product_type", text()),
                ("delivery", AttributeDefinition::of_type("boolean")),
                ("pickup", AttributeDefinition::of_type("boolean")),
                ("price", AttributeDefinition::of_type("float_unit")),
                ("location", AttributeDefinition::of_type("location")),
                ("quantity", AttributeDefinition::of_type("int")),
                ("reference_id", AttributeDefinition::of_type("reference")),
            ],
        )
}

/// The shared registry of the standard item classes, built on first use.
pub fn standard_registry() -> FeedResult<Arc<AttributeDefinitionRegistry>> {
    if let Some(registry) = STANDARD_REGISTRY.get() {
        return Ok(Arc::clone(registry));
    }
    let registry = Arc::new(standard_registry_builder().build()?);
    Ok(Arc::clone(STANDARD_REGISTRY.get_or_init(|| registry)))
}
