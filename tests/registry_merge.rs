pub mod common;

use base_feed::{
    core::{
        attribute_type::{AttributeType, resolve},
        definition::{AttributeDefinition, AttributeDefinitionRegistry, ChildDefinition},
        item::Item,
    },
    error::FeedError,
    item::{PRODUCT_CLASS, standard_registry, standard_registry_builder},
};
use std::sync::Arc;

#[test]
fn subclass_overrides_and_inherits() {
    common::init_logger();

    let registry = AttributeDefinitionRegistry::builder()
        .define_attributes(
            "base",
            [
                ("price", AttributeDefinition::of_type("text")),
                ("colour", AttributeDefinition::of_type("text")),
            ],
        )
        .item_class("sub", Some("base"))
        .define_attributes("sub", [("price", AttributeDefinition::of_type("float_unit"))])
        .build()
        .unwrap();

    let price = registry.attribute_definition("sub", "price").unwrap();
    assert_eq!(price.type_tag.as_deref(), Some("float_unit"));
    assert!(registry.attribute_definition("sub", "colour").is_some());
    assert_eq!(
        registry
            .attribute_definition("base", "price")
            .and_then(|d| d.type_tag.as_deref()),
        Some("text")
    );
    assert_eq!(registry.ancestors("sub"), vec!["sub", "base"]);
    assert_eq!(registry.attribute_keys("sub"), vec!["colour", "price"]);
}

#[test]
fn subclass_of_undeclared_parent_fails() {
    let result = AttributeDefinitionRegistry::builder()
        .item_class("sub", Some("missing"))
        .build();

    assert!(matches!(result, Err(FeedError::UnknownItemClass(name)) if name == "missing"));
}

#[test]
fn unknown_type_in_definition_fails_at_build() {
    let result = AttributeDefinitionRegistry::builder()
        .define_attributes("widget", [("size", AttributeDefinition::of_type("bogus_type"))])
        .build();

    assert!(matches!(result, Err(FeedError::UnknownAttributeType(tag)) if tag == "bogus_type"));
}

#[test]
fn item_of_unknown_class_fails() {
    let result = Item::new(standard_registry().unwrap(), "vehicle");
    assert!(matches!(result, Err(FeedError::UnknownItemClass(name)) if name == "vehicle"));
}

#[test]
fn json_definitions_with_explicit_null_namespace() {
    let registry = standard_registry_builder()
        .item_class("listing", Some(PRODUCT_CLASS))
        .define_attributes_json(
            "listing",
            r#"{
                "homepage": { "type": "url", "namespace": null },
                "rating": { "type": "int", "namespace": "gm" },
                "venue": {
                    "type": "location",
                    "children": { "latitude": { "type": "text", "namespace": "g" } }
                },
                "summary": {}
            }"#,
        )
        .unwrap()
        .build()
        .unwrap();
    let mut item = Item::new(Arc::new(registry), "listing").unwrap();

    assert_eq!(
        item.add_attribute("homepage", "http://example.com").unwrap().qualified_name(),
        "homepage"
    );
    assert_eq!(item.add_attribute("rating", 5).unwrap().qualified_name(), "gm:rating");
    assert_eq!(item.add_attribute("summary", "Short").unwrap().qualified_name(), "g:summary");
    assert_eq!(item.add_attribute("condition", "new").unwrap().kind(), AttributeType::Text);

    let venue = item.add_attribute("venue", "Town hall").unwrap();
    venue.set_latitude(51.5).unwrap();
    venue.set_longitude(-0.1).unwrap();

    let latitude = venue.child("latitude").unwrap();
    assert_eq!(latitude.qualified_name(), "g:latitude");
    assert_eq!(latitude.kind(), AttributeType::Text);
    assert_eq!(venue.child("longitude").unwrap().qualified_name(), "longitude");
}

#[test]
fn invalid_json_definitions() {
    let result = AttributeDefinitionRegistry::builder().define_attributes_json("widget", "[1, 2]");
    assert!(matches!(result, Err(FeedError::InvalidRecord(_))));
}

#[test]
fn extending_a_built_registry() {
    let standard = standard_registry().unwrap();
    let extended = standard
        .extend()
        .item_class("vehicle", Some(PRODUCT_CLASS))
        .define_attributes("vehicle", [("mileage", AttributeDefinition::of_type("int"))])
        .build()
        .unwrap();

    assert!(extended.contains_class("vehicle"));
    assert!(extended.attribute_definition("vehicle", "price").is_some());
    assert!(!standard.contains_class("vehicle"));
}

#[test]
fn universal_extension_reaches_product() {
    let extended = standard_registry()
        .unwrap()
        .extend()
        .define_attributes("universal", [("warranty", AttributeDefinition::of_type("int"))])
        .build()
        .unwrap();

    let warranty = extended.attribute_definition(PRODUCT_CLASS, "warranty").unwrap();
    assert_eq!(warranty.type_tag.as_deref(), Some("int"));

    let mut item = Item::new(Arc::new(extended), PRODUCT_CLASS).unwrap();
    assert_eq!(item.add_attribute("warranty", 2).unwrap().kind(), AttributeType::Int);
}

#[test]
fn redeclaring_product_keeps_its_definitions() {
    let extended = standard_registry()
        .unwrap()
        .extend()
        .item_class(PRODUCT_CLASS, Some("universal"))
        .define_attributes(PRODUCT_CLASS, [("colour", AttributeDefinition::of_type("text"))])
        .build()
        .unwrap();

    assert_eq!(
        extended
            .attribute_definition(PRODUCT_CLASS, "price")
            .and_then(|d| d.type_tag.as_deref()),
        Some("float_unit")
    );
    assert!(extended.attribute_definition(PRODUCT_CLASS, "condition").is_some());
    assert!(extended.attribute_definition(PRODUCT_CLASS, "colour").is_some());
    assert!(extended.attribute_definition(PRODUCT_CLASS, "description").is_some());
}

#[test]
fn resolve_type_tags() {
    assert!(matches!(resolve("bogus_type"), Err(FeedError::UnknownAttributeType(_))));

    let location = resolve("location").unwrap();
    assert_eq!(location, AttributeType::Location);
    let children: Vec<_> = location.declared_children().iter().map(|c| c.key).collect();
    assert_eq!(children, vec!["latitude", "longitude"]);

    assert_eq!(resolve("float_unit").unwrap(), AttributeType::FloatUnit);
    assert_eq!(resolve("floatUnit").unwrap(), AttributeType::FloatUnit);
    assert_eq!(resolve("date_time").unwrap(), AttributeType::DateTime);
}

#[test]
fn child_definitions_in_code() {
    let registry = AttributeDefinitionRegistry::builder()
        .define_attributes(
            "event",
            [(
                "organizer",
                AttributeDefinition::of_type("author")
                    .child("phone", ChildDefinition::new().type_tag("text").namespace("g")),
            )],
        )
        .build()
        .unwrap();
    let mut item = Item::new(Arc::new(registry), "event").unwrap();

    let organizer = item.add_attribute("organizer", "").unwrap();
    organizer.set_child_value("phone", "555-0100").unwrap();
    organizer.set_email("sam@example.com").unwrap();
    organizer.set_author_name("Sam").unwrap();

    assert_eq!(organizer.qualified_name(), "organizer");
    assert_eq!(organizer.child_names(), vec!["phone", "email", "name"]);
    assert_eq!(organizer.child("phone").unwrap().qualified_name(), "g:phone");
}
