use serde_json::Value as JsonValue;

use crate::core::attribute::{Attribute, AttributeOptions};
use crate::core::item::{Item, ItemRecord};
use crate::core::value::AttributeValue;
use crate::error::FeedResult;

use super::{UNIVERSAL_CLASS, standard_registry};

/// Setters for the attributes every item class shares.
///
/// Implementors only provide access to their [`Item`]; each setter appends one
/// attribute through [`Item::add_attribute`].
pub trait UniversalAttributes {
    fn item(&self) -> &Item;

    fn item_mut(&mut self) -> &mut Item;

    fn set_title(&mut self, title: &str) {
        self.item_mut().title = Some(title.to_string());
    }

    fn set_draft(&mut self, draft: bool) {
        self.item_mut().draft = draft;
    }

    fn set_unique_id(&mut self, unique_id: &str) -> FeedResult<()> {
        self.item_mut().set_unique_id(unique_id)
    }

    fn set_description(&mut self, description: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("description", description)
    }

    fn set_contact_phone(&mut self, phone: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("contact_phone", phone)
    }

    fn set_item_type(&mut self, item_type: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("item_type", item_type)
    }

    /// Country code such as `GB`.
    fn set_target_country(&mut self, country: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("target_country", country)
    }

    /// Language code such as `EN`.
    fn set_item_language(&mut self, language: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("item_language", language)
    }

    fn set_link(&mut self, url: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("link", url)
    }

    fn set_application(&mut self, application: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("application", application)
    }

    /// Expiration date, pre-formatted (or any value convertible to one).
    fn set_expiration_date(&mut self, expires: impl Into<AttributeValue>) -> FeedResult<&mut Attribute> {
        self.item_mut()
            .add_attribute("expiration_date", AttributeOptions::new().value(expires))
    }

    fn add_image_link(&mut self, url: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("image_link", url)
    }

    fn add_label(&mut self, label: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("label", label)
    }

    fn set_author(&mut self, name: &str, email: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute(
            "author",
            AttributeOptions::new().child("name", name).child("email", email),
        )
    }

    /// Any attribute outside the typed setters; definitions still apply if the key has one.
    fn add_custom_attribute(
        &mut self,
        key: &str,
        options: impl Into<AttributeOptions>,
    ) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute(key, options)
    }
}

/// An item of the `universal` class.
///
/// # Examples
///
/// ```
/// use base_feed::item::{UniversalAttributes, UniversalItem};
///
/// let mut item = UniversalItem::new().unwrap();
/// item.set_title("Garden chair");
/// item.set_description("Folding, oak").unwrap();
/// item.add_label("garden").unwrap();
/// item.add_label("furniture").unwrap();
///
/// assert_eq!(item.item().get_attributes("label").len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct UniversalItem {
    item: Item,
}

impl UniversalItem {
    pub fn new() -> FeedResult<Self> {
        Ok(Self {
            item: Item::new(standard_registry()?, UNIVERSAL_CLASS)?,
        })
    }

    pub fn from_record(record: ItemRecord) -> FeedResult<Self> {
        Ok(Self {
            item: Item::from_record(standard_registry()?, UNIVERSAL_CLASS, record)?,
        })
    }

    pub fn from_json(json: &JsonValue) -> FeedResult<Self> {
        Ok(Self {
            item: Item::from_json(standard_registry()?, UNIVERSAL_CLASS, json)?,
        })
    }

    pub fn into_item(self) -> Item {
        self.item
    }
}

impl UniversalAttributes for UniversalItem {
    fn item(&self) -> &Item {
        &self.item
    }

    fn item_mut(&mut self) -> &mut Item {
        &mut self.item
    }
}
