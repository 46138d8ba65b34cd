use serde_json::Value as JsonValue;

use crate::core::attribute::{Attribute, AttributeOptions};
use crate::core::item::{Item, ItemRecord};
use crate::core::value::AttributeValue;
use crate::error::FeedResult;

use super::universal::UniversalAttributes;
use super::{PRODUCT_CLASS, standard_registry};

/// Setters for the attributes suggested for products.
pub trait ProductAttributes: UniversalAttributes {
    fn set_condition(&mut self, condition: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("condition", condition)
    }

    fn set_delivery(&mut self, will_deliver: bool) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("delivery", will_deliver)
    }

    fn set_delivery_notes(&mut self, notes: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("delivery_notes", notes)
    }

    fn set_department(&mut self, department: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("department", department)
    }

    /// Accepted payment method; may be called once per method.
    fn add_payment(&mut self, payment: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("payment", payment)
    }

    fn set_payment_notes(&mut self, notes: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("payment_notes", notes)
    }

    fn set_pickup(&mut self, pickup: bool) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("pickup", pickup)
    }

    /// Price as an amount with optional units, rendered `"<amount> <units>"`.
    fn set_price(
        &mut self,
        amount: impl Into<AttributeValue>,
        units: Option<&str>,
    ) -> FeedResult<&mut Attribute> {
        let mut options = AttributeOptions::new().value(amount);
        if let Some(units) = units {
            options = options.units(units);
        }
        self.item_mut().add_attribute("price", options)
    }

    fn set_price_type(&mut self, price_type: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("price_type", price_type)
    }

    fn set_price_units(&mut self, units: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("price_units", units)
    }

    /// Location as an address; coordinates can be added on the returned attribute.
    fn set_location(&mut self, address: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("location", address)
    }

    fn set_product_type(&mut self, product_type: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("product_type", product_type)
    }

    fn set_quantity(&mut self, quantity: i64) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("quantity", quantity)
    }

    /// Identifier of a related item, kept as a reference attribute.
    fn set_reference_id(&mut self, reference: &str) -> FeedResult<&mut Attribute> {
        self.item_mut().add_attribute("reference_id", reference)
    }
}

/// An item of the `product` class.
///
/// # Examples
///
/// ```
/// use base_feed::item::{ProductAttributes, ProductItem, UniversalAttributes};
///
/// let mut product = ProductItem::new().unwrap();
/// product.set_title("Oak chair");
/// product.set_price(50, Some("USD")).unwrap();
/// product.set_location("1 Main St").unwrap().set_latitude(47.6).unwrap();
///
/// let xml = product.item().to_document().to_string();
/// assert!(xml.contains("<g:price type=\"floatUnit\">50 USD</g:price>"));
/// assert!(xml.contains("<latitude>47.6</latitude>"));
/// ```
#[derive(Debug, Clone)]
pub struct ProductItem {
    item: Item,
}

impl ProductItem {
    pub fn new() -> FeedResult<Self> {
        Ok(Self {
            item: Item::new(standard_registry()?, PRODUCT_CLASS)?,
        })
    }

    pub fn from_record(record: ItemRecord) -> FeedResult<Self> {
        Ok(Self {
            item: Item::from_record(standard_registry()?, PRODUCT_CLASS, record)?,
        })
    }

    pub fn from_json(json: &JsonValue) -> FeedResult<Self> {
        Ok(Self {
            item: Item::from_json(standard_registry()?, PRODUCT_CLASS, json)?,
        })
    }

    pub fn into_item(self) -> Item {
        self.item
    }
}

impl UniversalAttributes for ProductItem {
    fn item(&self) -> &Item {
        &self.item
    }

    fn item_mut(&mut self) -> &mut Item {
        &mut self.item
    }
}

impl ProductAttributes for ProductItem {}
