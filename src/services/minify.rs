use serde_json::Value;

/// True for `null`, `[]` and `{}`.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Recursively drops every object key whose value is `null`, `[]` or `{}`.
///
/// Children are cleaned before their parent is checked, so an object that only
/// held empty values disappears as well. Array elements are cleaned but never
/// removed.
#[must_use]
pub fn remove_empty_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| (key, remove_empty_keys(child)))
                .filter(|(_, child)| !is_empty_value(child))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(remove_empty_keys).collect()),
        other => other,
    }
}
