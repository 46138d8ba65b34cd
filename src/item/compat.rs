use crate::core::attribute::{Attribute, AttributeOptions};
use crate::core::value::AttributeValue;
use crate::error::FeedResult;

use super::product::ProductAttributes;
use super::universal::UniversalAttributes;

/// Older names of the universal setters. Every method forwards to its replacement.
pub trait LegacyUniversalSetters: UniversalAttributes {
    #[deprecated(note = "use `set_item_language`")]
    fn set_item_lang(&mut self, language: &str) -> FeedResult<&mut Attribute> {
        self.set_item_language(language)
    }

    #[deprecated(note = "use `add_image_link`")]
    fn set_image_link(&mut self, url: &str) -> FeedResult<&mut Attribute> {
        self.add_image_link(url)
    }

    #[deprecated(note = "use `add_label`")]
    fn set_label(&mut self, label: &str) -> FeedResult<&mut Attribute> {
        self.add_label(label)
    }

    #[deprecated(note = "use `add_custom_attribute`")]
    fn add_custom_text(&mut self, name: &str, value: &str) -> FeedResult<&mut Attribute> {
        self.add_custom_attribute(name, value)
    }
}

impl<T: UniversalAttributes + ?Sized> LegacyUniversalSetters for T {}

/// Older names of the product setters.
pub trait LegacyProductSetters: ProductAttributes {
    /// `quantity` (any case) maps to the integer quantity attribute; anything else is a
    /// custom attribute.
    #[deprecated(note = "use `set_quantity` or `add_custom_attribute`")]
    fn add_custom(
        &mut self,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> FeedResult<&mut Attribute> {
        if name.eq_ignore_ascii_case("quantity") {
            return self
                .item_mut()
                .add_attribute("quantity", AttributeOptions::new().value(value));
        }
        self.add_custom_attribute(name, AttributeOptions::new().value(value))
    }

    #[deprecated(note = "use `add_payment`")]
    fn set_payment(&mut self, payment: &str) -> FeedResult<&mut Attribute> {
        self.add_payment(payment)
    }
}

impl<T: ProductAttributes + ?Sized> LegacyProductSetters for T {}
