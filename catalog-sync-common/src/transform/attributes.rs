//! Reading values out of the Rawls attribute bag.
//!
//! An attribute is a scalar or a list object:
//! `{"itemsType": "AttributeValue", "items": ["a", "b"]}`.

use serde_json::{Map, Value};

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn list_items(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(obj) => obj.get("items").and_then(Value::as_array),
        _ => None,
    }
}

/// First non-empty string form of an attribute.
pub fn attr_string(attrs: &Map<String, Value>, key: &str) -> Option<String> {
    let value = attrs.get(key)?;
    match list_items(value) {
        Some(items) => items.iter().find_map(scalar_to_string),
        None => scalar_to_string(value),
    }
}

/// All non-empty string forms of an attribute, flattening list objects.
pub fn attr_list(attrs: &Map<String, Value>, key: &str) -> Vec<String> {
    let Some(value) = attrs.get(key) else {
        return Vec::new();
    };
    match list_items(value) {
        Some(items) => items.iter().filter_map(scalar_to_string).collect(),
        None => scalar_to_string(value).into_iter().collect(),
    }
}

/// Largest float that still holds every integer below it exactly.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Attribute as a non-negative integer; numeric strings are accepted.
///
/// Floats are accepted only when they are whole and exactly representable,
/// so `1e30` is `None` rather than a saturated `u64::MAX`.
pub fn attr_u64(attrs: &Map<String, Value>, key: &str) -> Option<u64> {
    match attrs.get(key)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| (0.0..=MAX_EXACT_FLOAT).contains(f) && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_attr_string_forms() {
        let attrs = attrs(json!({
            "plain": "  Cancer study ",
            "blank": "   ",
            "number": 42,
            "flag": true,
            "list": {"itemsType": "AttributeValue", "items": ["", "first", "second"]},
            "nested": {"entityType": "participant", "entityName": "p1"}
        }));
        assert_eq!(attr_string(&attrs, "plain").as_deref(), Some("Cancer study"));
        assert_eq!(attr_string(&attrs, "blank"), None);
        assert_eq!(attr_string(&attrs, "number").as_deref(), Some("42"));
        assert_eq!(attr_string(&attrs, "flag").as_deref(), Some("true"));
        assert_eq!(attr_string(&attrs, "list").as_deref(), Some("first"));
        assert_eq!(attr_string(&attrs, "nested"), None);
        assert_eq!(attr_string(&attrs, "missing"), None);
    }

    #[test]
    fn test_attr_list_flattens() {
        let attrs = attrs(json!({
            "list": {"itemsType": "AttributeValue", "items": ["WGS", " ", "RNA-seq"]},
            "array": ["a", 1],
            "scalar": "Exome"
        }));
        assert_eq!(attr_list(&attrs, "list"), vec!["WGS", "RNA-seq"]);
        assert_eq!(attr_list(&attrs, "array"), vec!["a", "1"]);
        assert_eq!(attr_list(&attrs, "scalar"), vec!["Exome"]);
        assert!(attr_list(&attrs, "missing").is_empty());
    }

    #[test]
    fn test_attr_u64() {
        let attrs = attrs(json!({
            "int": 120,
            "float": 12.0,
            "text": " 7 ",
            "neg": -3,
            "bad": "many",
            "huge": 1e30,
            "fraction": 2.5
        }));
        assert_eq!(attr_u64(&attrs, "int"), Some(120));
        assert_eq!(attr_u64(&attrs, "float"), Some(12));
        assert_eq!(attr_u64(&attrs, "text"), Some(7));
        assert_eq!(attr_u64(&attrs, "neg"), None);
        assert_eq!(attr_u64(&attrs, "bad"), None);
        assert_eq!(attr_u64(&attrs, "huge"), None);
        assert_eq!(attr_u64(&attrs, "fraction"), None);
    }
}
