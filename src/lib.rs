#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # Base feed

 Typed attribute trees for content-feed items, serialized to namespaced Atom XML.

 An item is a title plus an ordered list of attributes. Each attribute has a type
 (text, url, dateTime, int, boolean, floatUnit, location, author, reference...) that
 decides how it renders: its namespace prefix, its `type` label, its fixed decorations
 and the sub-elements it declares. Item classes (`universal`, `product` or your own)
 carry attribute definitions that pick the type, rename the key or change the namespace,
 and are inherited along the class hierarchy.

 ## Core Concepts

- **Attribute:** A named node with an optional scalar value, a type, decorations and
  ordered children. Renders itself into a parent XML element.
- **AttributeType:** The closed set of attribute variants, resolved from a type tag.
- **AttributeDefinitionRegistry:** Per-class attribute definitions, merged with those
  of the ancestor classes.
- **Item:** The aggregate that turns keys into attributes through the registry and
  assembles the Atom `entry` document.
- **BaseClient:** Creates, updates, deletes and fetches items through a caller supplied
  `Transport`.

 ## Features

| **Feature**   | **Description**                                                |
|---------------|----------------------------------------------------------------|
| chrono        | Converts `chrono` dates and timestamps into attribute values   |
| full          | Enables all available features                                 |

 ## Getting Started

```rust
# use base_feed::{
#     core::definition::{AttributeDefinition, AttributeDefinitionRegistry},
#     core::item::Item,
#     error::FeedError,
# };
# use std::sync::Arc;
# fn main() -> Result<(), FeedError> {
let registry = AttributeDefinitionRegistry::builder()
    .define_attributes(
        "widget",
        [
            ("description", AttributeDefinition::of_type("text")),
            ("link", AttributeDefinition::of_type("url").unprefixed()),
            ("weight", AttributeDefinition::of_type("floatUnit")),
        ],
    )
    .build()?;

let mut item = Item::new(Arc::new(registry), "widget")?;
item.title = Some("Widget".to_string());
item.add_attribute("description", "A widget")?;
item.add_attribute("link", "http://example.com/w")?;
item.add_attribute("weight", "3.5 kg")?;

let xml = item.to_document().to_xml_string()?;
assert!(xml.contains("<title>Widget</title>"));
assert!(xml.contains("<g:description type=\"text\">A widget</g:description>"));
assert!(xml.contains("<g:weight type=\"floatUnit\">3.5 kg</g:weight>"));
# Ok(())
# }
```

 The standard classes come with typed setters:

```rust
# use base_feed::item::{ProductAttributes, ProductItem, UniversalAttributes};
let mut product = ProductItem::new().unwrap();
product.set_title("Oak chair");
product.set_condition("new").unwrap();
product.set_price(50, Some("USD")).unwrap();

let xml = product.item().to_document().to_pretty_string().unwrap();
assert!(xml.contains("<g:condition type=\"text\">new</g:condition>"));
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core module: attribute model, definitions and items
pub mod core;

/// Error types
pub mod error;

#[doc(inline)]
pub use error::*;

/// Standard item classes (universal, product) and their setters
pub mod item;

/// Request building and response handling for the remote feed service
pub mod client;

/// Minimal XML tree with a writer and a reader
pub mod xml;
