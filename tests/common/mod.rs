#![allow(dead_code)]

mod mocks;

pub use mocks::MockTransport;

use std::sync::Arc;

use base_feed::core::definition::{AttributeDefinition, AttributeDefinitionRegistry};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A one-class registry used by the document tests.
pub fn widget_registry() -> Arc<AttributeDefinitionRegistry> {
    let registry = AttributeDefinitionRegistry::builder()
        .define_attributes(
            "widget",
            [
                ("description", AttributeDefinition::of_type("text")),
                ("link", AttributeDefinition::of_type("url").unprefixed()),
                ("price", AttributeDefinition::of_type("floatUnit")),
            ],
        )
        .build()
        .unwrap();
    Arc::new(registry)
}
