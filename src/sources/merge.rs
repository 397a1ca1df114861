//! Laying a decoded file document over the current configuration state.
//!
//! Both sides are `serde_yaml::Value` trees, which keep non-finite floats
//! and non-string map keys intact. Mappings merge key by key; sequences,
//! scalars and tagged values replace what was there. A null in the document
//! means "not given" and leaves the current value alone.

use serde_yaml::Value;

/// Lay `document` over `current` in place.
///
/// ```
/// use tierconf::sources::overlay;
///
/// let mut current: serde_yaml::Value =
///     serde_yaml::from_str("server: { port: 8080, host: localhost }\norigins: [a, b]").unwrap();
/// let document = serde_yaml::from_str("server: { port: 9000 }\norigins: [c]").unwrap();
///
/// overlay(&mut current, document);
///
/// let expected: serde_yaml::Value =
///     serde_yaml::from_str("server: { port: 9000, host: localhost }\norigins: [c]").unwrap();
/// assert_eq!(current, expected);
/// ```
pub fn overlay(current: &mut Value, document: Value) {
    match (current, document) {
        (_, Value::Null) => {}
        (Value::Mapping(fields), Value::Mapping(given)) => {
            for (key, value) in given {
                if let Some(field) = fields.get_mut(&key) {
                    overlay(field, value);
                } else {
                    fields.insert(key, value);
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
