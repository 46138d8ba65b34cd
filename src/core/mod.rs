/// Attribute variants and the resolver from type tags to variants.
pub mod attribute_type;

/// Scalar attribute payloads.
pub mod value;

/// The attribute node, its options and XML rendering.
pub mod attribute;

/// Per item class attribute definitions, merged along the class hierarchy.
pub mod definition;

/// The item aggregate and Atom entry assembly.
pub mod item;
